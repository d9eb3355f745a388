//! Builder for constructing a [`FeedEngine`] and its consumer handle.
//!
//! Wires the command/event channels from configuration, defaults the sensor
//! catalog to the built-in vocabulary, and optionally launches the metrics
//! endpoint.
//!
//! ## Example
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(());
//! let (mut engine, handle) = FeedEngineBuilder::new(transport, shutdown_rx)?
//!     .start_metrics_server(shutdown_tx.subscribe())
//!     .build()?;
//! tokio::spawn(async move { engine.run().await });
//! handle.update_devices(devices, None).await?;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;

use super::FeedEngine;
use super::FeedHandle;
use crate::metrics;
use crate::read_model::ReadModelStore;
use crate::ChannelTransport;
use crate::FeedConfig;
use crate::Result;
use crate::SensorCatalog;
use crate::StaticSensorCatalog;

pub struct FeedEngineBuilder<T, C = StaticSensorCatalog>
where
    T: ChannelTransport,
    C: SensorCatalog,
{
    config: FeedConfig,
    transport: T,
    catalog: C,
    shutdown_signal: watch::Receiver<()>,
}

impl<T> FeedEngineBuilder<T, StaticSensorCatalog>
where
    T: ChannelTransport,
{
    /// Creates a builder with configuration loaded from the environment.
    pub fn new(
        transport: T,
        shutdown_signal: watch::Receiver<()>,
    ) -> Result<Self> {
        let config = FeedConfig::load(None)?;
        Ok(Self::from_config(config, transport, shutdown_signal))
    }

    /// Constructs the builder from in-memory configuration.
    pub fn from_config(
        config: FeedConfig,
        transport: T,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            config,
            transport,
            catalog: StaticSensorCatalog::default(),
            shutdown_signal,
        }
    }
}

impl<T, C> FeedEngineBuilder<T, C>
where
    T: ChannelTransport,
    C: SensorCatalog,
{
    /// Replaces the engine configuration
    pub fn config(
        mut self,
        config: FeedConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Replaces the sensor vocabulary
    pub fn catalog<C2>(
        self,
        catalog: C2,
    ) -> FeedEngineBuilder<T, C2>
    where
        C2: SensorCatalog,
    {
        FeedEngineBuilder {
            config: self.config,
            transport: self.transport,
            catalog,
            shutdown_signal: self.shutdown_signal,
        }
    }

    /// Starts the metrics server when monitoring is enabled.
    ///
    /// Launches a Prometheus endpoint on the configured port.
    pub fn start_metrics_server(
        self,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        if self.config.monitoring.prometheus_enabled {
            let port = self.config.monitoring.prometheus_port;
            tokio::spawn(async move {
                metrics::start_server(port, shutdown_signal).await;
            });
        }
        self
    }

    /// Finalizes the builder: validates configuration, wires the command and
    /// event queues, and returns the engine with its consumer handle.
    ///
    /// The engine does nothing until [`FeedEngine::run`] is polled.
    pub fn build(self) -> Result<(FeedEngine<T, C>, FeedHandle)> {
        self.config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(self.config.engine.command_buffer_capacity);
        let (event_tx, event_rx) = mpsc::channel(self.config.engine.event_buffer_capacity);

        let read_model = ReadModelStore::new();
        let handle = FeedHandle {
            command_tx,
            read_model_rx: read_model.subscribe(),
        };

        let engine = FeedEngine::new(
            Arc::new(self.transport),
            Arc::new(self.catalog),
            read_model,
            command_rx,
            event_tx,
            event_rx,
            self.shutdown_signal,
        );

        Ok((engine, handle))
    }
}
