use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::FeedCommand;
use crate::derive_desired_set;
use crate::metrics::EVENTS_ACCEPTED_TOTAL;
use crate::metrics::EVENTS_DISCARDED_TOTAL;
use crate::read_model::ReadModelStore;
use crate::ChannelEvent;
use crate::ChannelTransport;
use crate::FeedErrorInfo;
use crate::Reconciler;
use crate::Result;
use crate::SensorCatalog;

/// Live feed engine: one task owning the channel registry and read model.
///
/// All reconciliation and event folding happens inside [`FeedEngine::run`],
/// strictly sequentially, so no pass ever observes another pass mid-flight
/// and no read-model write can happen after teardown.
pub struct FeedEngine<T, C>
where
    T: ChannelTransport,
    C: SensorCatalog,
{
    transport: Arc<T>,
    catalog: Arc<C>,

    reconciler: Reconciler,
    read_model: ReadModelStore,

    // Consumer commands
    command_rx: mpsc::Receiver<FeedCommand>,

    // Channel events; the sender side is handed to every opened channel
    event_tx: mpsc::Sender<ChannelEvent>,
    event_rx: mpsc::Receiver<ChannelEvent>,

    // Shutdown signal
    shutdown_signal: watch::Receiver<()>,

    torn_down: bool,

    // For unit test
    #[cfg(test)]
    test_reconcile_listener: Vec<mpsc::UnboundedSender<crate::ReconcileStats>>,
}

impl<T, C> FeedEngine<T, C>
where
    T: ChannelTransport,
    C: SensorCatalog,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        transport: Arc<T>,
        catalog: Arc<C>,
        read_model: ReadModelStore,
        command_rx: mpsc::Receiver<FeedCommand>,
        event_tx: mpsc::Sender<ChannelEvent>,
        event_rx: mpsc::Receiver<ChannelEvent>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            transport,
            catalog,
            reconciler: Reconciler::new(),
            read_model,
            command_rx,
            event_tx,
            event_rx,
            shutdown_signal,
            torn_down: false,
            #[cfg(test)]
            test_reconcile_listener: Vec::new(),
        }
    }

    /// Runs the engine loop until shutdown.
    ///
    /// The loop ends when the shutdown signal fires or when every
    /// [`FeedHandle`](super::FeedHandle) has been dropped; both paths tear
    /// down all live channels before returning.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                // Use biased to ensure branch order
                biased;
                // P0: shutdown received;
                _ = self.shutdown_signal.changed() => {
                    warn!("[FeedEngine] shutdown signal received.");
                    self.teardown();
                    return Ok(());
                }
                // P1: consumer commands; a closed queue means the consuming
                // context is gone
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => {
                            debug!("receive feed command: {:?}", command);
                            self.handle_command(command);
                        }
                        None => {
                            info!("all feed handles dropped, tearing down");
                            self.teardown();
                            return Ok(());
                        }
                    }
                }
                // P2: channel events
                Some(event) = self.event_rx.recv() => {
                    trace!("receive channel event: {}", event);
                    self.handle_channel_event(event);
                }
            }
        }
    }

    pub(crate) fn handle_command(
        &mut self,
        command: FeedCommand,
    ) {
        match command {
            FeedCommand::UpdateDevices {
                devices,
                sensor_filter,
            } => {
                let desired =
                    derive_desired_set(&devices, sensor_filter.as_ref(), self.catalog.as_ref());
                debug!(desired = desired.len(), "desired set recomputed");

                let stats = self.reconciler.reconcile(
                    &desired,
                    self.transport.as_ref(),
                    &self.read_model,
                    &self.event_tx,
                );
                if !stats.is_noop() {
                    info!(
                        opened = stats.opened,
                        cancelled = stats.cancelled,
                        open_failures = stats.open_failures,
                        "channel registry converged"
                    );
                }

                #[cfg(test)]
                self.notify_reconcile(stats);
            }
        }
    }

    /// Folds one channel event into the read model, or discards it.
    ///
    /// Acceptance requires: the engine is still alive, the event's key is
    /// registered with a matching generation, and the push addresses the
    /// sensor the channel was bound to.
    pub(crate) fn handle_channel_event(
        &mut self,
        event: ChannelEvent,
    ) {
        if self.torn_down {
            EVENTS_DISCARDED_TOTAL.with_label_values(&["torn_down"]).inc();
            return;
        }

        if !self.reconciler.accepts(&event.key, event.generation) {
            trace!(key = %event.key, generation = event.generation, "discarding event for retired channel");
            EVENTS_DISCARDED_TOTAL.with_label_values(&["stale"]).inc();
            return;
        }

        let push = event.push;
        if push.sensor_id != event.key.sensor_id {
            warn!(
                key = %event.key,
                pushed_sensor = %push.sensor_id,
                "discarding push addressed to a different sensor"
            );
            EVENTS_DISCARDED_TOTAL.with_label_values(&["sensor_mismatch"]).inc();
            return;
        }
        if push.device_id != event.key.device_id {
            // Writes stay keyed by the registry binding
            trace!(key = %event.key, pushed_device = %push.device_id, "push reports a different device id");
        }

        if let Some(error) = push.error {
            match FeedErrorInfo::from_push_error(&error) {
                Some(info) => {
                    debug!(key = %event.key, code = ?info.code, "recording feed error");
                    self.read_model.record_error(&event.key, info);
                    EVENTS_ACCEPTED_TOTAL.inc();
                }
                None => {
                    debug!(key = %event.key, %error, "discarding unclassified push error");
                    EVENTS_DISCARDED_TOTAL.with_label_values(&["unclassified_error"]).inc();
                }
            }
        } else if let Some(value) = push.value {
            self.read_model.record_value(&event.key, push.time, value);
            EVENTS_ACCEPTED_TOTAL.inc();
        } else {
            // Value-less, error-less pushes are keepalive noise
            EVENTS_DISCARDED_TOTAL.with_label_values(&["heartbeat"]).inc();
        }
    }

    /// Cancels every live channel and clears the read model. Runs once; later
    /// calls are no-ops.
    pub(crate) fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let cancelled = self.reconciler.retire_all(self.transport.as_ref());
        self.read_model.clear();
        info!(cancelled, "feed engine torn down");
    }

    #[cfg(test)]
    pub(crate) fn register_reconcile_listener(
        &mut self,
        tx: mpsc::UnboundedSender<crate::ReconcileStats>,
    ) {
        self.test_reconcile_listener.push(tx);
    }

    #[cfg(test)]
    fn notify_reconcile(
        &self,
        stats: crate::ReconcileStats,
    ) {
        for tx in &self.test_reconcile_listener {
            tx.send(stats).expect("should succeed");
        }
    }
}

impl<T, C> Drop for FeedEngine<T, C>
where
    T: ChannelTransport,
    C: SensorCatalog,
{
    fn drop(&mut self) {
        self.teardown();
        info!("FeedEngine been dropped.");
    }
}
