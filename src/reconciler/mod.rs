//! Level-triggered channel reconciliation.
//!
//! Maintains the registry of open push channels and converges it to the
//! desired feed set on every pass: channels whose key is no longer desired
//! are cancelled and their readings dropped, missing keys get a fresh
//! channel, unchanged keys are left untouched. After a pass the registry key
//! set equals the desired key set exactly, with at most one channel per key.


use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

use crate::build_query_document;
use crate::metrics::CHANNELS_CANCELLED_TOTAL;
use crate::metrics::CHANNELS_OPENED_TOTAL;
use crate::metrics::CHANNEL_OPEN_FAILURES;
use crate::metrics::LIVE_CHANNELS;
use crate::read_model::ReadModelStore;
use crate::ChannelEvent;
use crate::ChannelHandle;
use crate::ChannelTransport;
use crate::DesiredEntry;
use crate::SensorType;
use crate::SubscriptionKey;

/// One live channel tracked by the registry.
///
/// `generation` is the open-counter stamped on the channel at open time;
/// events carrying a different generation belong to a predecessor channel for
/// the same key and are ignored.
#[derive(Debug, Clone)]
pub(crate) struct ChannelRegistryEntry {
    pub(crate) sensor_type: SensorType,
    pub(crate) generation: u64,
    pub(crate) handle: ChannelHandle,
}

/// Outcome summary of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub opened: usize,
    pub cancelled: usize,
    pub kept: usize,
    pub open_failures: usize,
}

impl ReconcileStats {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.opened == 0 && self.cancelled == 0 && self.open_failures == 0
    }
}

/// Registry owner; all mutation happens on the engine task.
pub(crate) struct Reconciler {
    registry: DashMap<SubscriptionKey, ChannelRegistryEntry>,
    next_generation: u64,
}

impl Reconciler {
    pub(crate) fn new() -> Self {
        Self {
            registry: DashMap::new(),
            next_generation: 1,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.registry.len()
    }

    #[cfg(test)]
    pub(crate) fn live_keys(&self) -> HashSet<SubscriptionKey> {
        self.registry.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether an event for `key` with `generation` belongs to the channel
    /// currently registered for that key.
    pub(crate) fn accepts(
        &self,
        key: &SubscriptionKey,
        generation: u64,
    ) -> bool {
        self.registry
            .get(key)
            .map(|entry| entry.generation == generation)
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn entry_generation(
        &self,
        key: &SubscriptionKey,
    ) -> Option<u64> {
        self.registry.get(key).map(|entry| entry.generation)
    }

    /// Converges the registry to `desired`.
    ///
    /// Retired channels are cancelled and their read-model sub-entries
    /// removed before any new channel opens, so a key moving out and back in
    /// within one pass still gets a fresh channel. A synchronous open failure
    /// leaves its key missing; the next pass retries it.
    pub(crate) fn reconcile<T>(
        &mut self,
        desired: &[DesiredEntry],
        transport: &T,
        read_model: &ReadModelStore,
        events: &mpsc::Sender<ChannelEvent>,
    ) -> ReconcileStats
    where
        T: ChannelTransport + ?Sized,
    {
        let mut stats = ReconcileStats::default();

        let desired_keys: HashSet<&SubscriptionKey> = desired.iter().map(|entry| &entry.key).collect();

        // Step 1: partition the registry; keys no longer desired get retired.
        let retire: Vec<SubscriptionKey> = self
            .registry
            .iter()
            .filter(|entry| !desired_keys.contains(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        // Step 2: cancel retired channels and drop their readings.
        for key in retire {
            if let Some((key, entry)) = self.registry.remove(&key) {
                debug!(%key, generation = entry.generation, "retiring channel");
                transport.cancel(entry.handle);
                read_model.retire(&key);
                CHANNELS_CANCELLED_TOTAL.inc();
                stats.cancelled += 1;
            }
        }

        // Steps 3-4: open channels for desired keys with no registry entry.
        for entry in desired {
            if let Some(existing) = self.registry.get(&entry.key) {
                // A sensor's type is stable for the lifetime of its key
                if existing.sensor_type != entry.sensor_type {
                    warn!(
                        key = %entry.key,
                        registered = ?existing.sensor_type,
                        desired = ?entry.sensor_type,
                        "sensor type changed for a live key"
                    );
                    debug_assert!(false, "sensor type changed for live key {}", entry.key);
                }
                stats.kept += 1;
                continue;
            }

            let document = build_query_document(entry.sensor_type);
            let generation = self.next_generation;

            match transport.open_channel(entry.key.clone(), document, generation, events.clone()) {
                Ok(handle) => {
                    self.next_generation += 1;
                    let _previous = self.registry.insert(
                        entry.key.clone(),
                        ChannelRegistryEntry {
                            sensor_type: entry.sensor_type,
                            generation,
                            handle,
                        },
                    );
                    debug_assert!(
                        _previous.is_none(),
                        "registry held two channels for {}",
                        entry.key
                    );
                    CHANNELS_OPENED_TOTAL.inc();
                    stats.opened += 1;
                }
                Err(e) => {
                    // Not fatal: the key stays missing and the next pass retries.
                    warn!(key = %entry.key, error = %e, "open_channel failed");
                    CHANNEL_OPEN_FAILURES.inc();
                    stats.open_failures += 1;
                }
            }
        }

        LIVE_CHANNELS.set(self.registry.len() as i64);
        debug!(
            opened = stats.opened,
            cancelled = stats.cancelled,
            kept = stats.kept,
            open_failures = stats.open_failures,
            "reconciliation pass complete"
        );

        stats
    }

    /// Cancels every live channel and empties the registry. Safe to call on
    /// an already-empty registry.
    pub(crate) fn retire_all<T>(
        &mut self,
        transport: &T,
    ) -> usize
    where
        T: ChannelTransport + ?Sized,
    {
        let mut cancelled = 0;
        let keys: Vec<SubscriptionKey> = self.registry.iter().map(|entry| entry.key().clone()).collect();
        for key in keys {
            if let Some((key, entry)) = self.registry.remove(&key) {
                debug!(%key, generation = entry.generation, "cancelling channel on teardown");
                transport.cancel(entry.handle);
                CHANNELS_CANCELLED_TOTAL.inc();
                cancelled += 1;
            }
        }

        LIVE_CHANNELS.set(0);
        cancelled
    }
}
