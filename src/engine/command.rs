use std::collections::HashSet;

use crate::DeviceDescriptor;
use crate::SensorId;

/// Consumer-facing engine commands.
#[derive(Debug)]
pub enum FeedCommand {
    /// Replace the device inventory (and optional sensor allow-list) the
    /// desired feed set is derived from. Triggers one reconciliation pass.
    UpdateDevices {
        devices: Vec<DeviceDescriptor>,
        sensor_filter: Option<HashSet<SensorId>>,
    },
}
