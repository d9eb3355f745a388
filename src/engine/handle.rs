use std::collections::HashSet;

use autometrics::autometrics;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::FeedCommand;
use crate::DeviceDescriptor;
use crate::ReadModel;
use crate::Result;
use crate::SensorId;
use crate::SubscriptionError;
use crate::API_SLO;

/// Cloneable consumer handle for a running [`FeedEngine`](super::FeedEngine).
///
/// Dropping the last handle closes the command queue, which the engine treats
/// as teardown.
#[derive(Clone)]
pub struct FeedHandle {
    pub(crate) command_tx: mpsc::Sender<FeedCommand>,
    pub(crate) read_model_rx: watch::Receiver<ReadModel>,
}

impl FeedHandle {
    /// Declares the device inventory the live feed set is derived from.
    ///
    /// `sensor_filter` is an optional allow-list of sensor ids; `Some(empty)`
    /// allows nothing. The engine reconciles asynchronously - convergence is
    /// observable through [`FeedHandle::read_model`].
    #[autometrics(objective = API_SLO)]
    pub async fn update_devices(
        &self,
        devices: Vec<DeviceDescriptor>,
        sensor_filter: Option<HashSet<SensorId>>,
    ) -> Result<()> {
        self.command_tx
            .send(FeedCommand::UpdateDevices {
                devices,
                sensor_filter,
            })
            .await
            .map_err(|_| SubscriptionError::EngineClosed.into())
    }

    /// Continuously updated read-only view of the last known readings.
    pub fn read_model(&self) -> watch::Receiver<ReadModel> {
        self.read_model_rx.clone()
    }
}
