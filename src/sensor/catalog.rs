use std::collections::HashSet;

#[cfg(test)]
use mockall::automock;

use super::SensorId;

/// Default smart-city sensor vocabulary.
const DEFAULT_SENSOR_IDS: &[&str] = &[
    "temperature",
    "humidity",
    "pressure",
    "co2",
    "noise",
    "pm10",
    "pm25",
    "illuminance",
    "water_level",
    "door_open",
    "motion",
    "relay_state",
    "battery",
    "status_label",
    "camera_snapshot",
];

/// Validates incoming sensor ids against the known domain vocabulary.
#[cfg_attr(test, automock)]
pub trait SensorCatalog: Send + Sync + 'static {
    fn is_recognized(
        &self,
        id: &SensorId,
    ) -> bool;
}

/// Catalog backed by a fixed id set.
#[derive(Debug, Clone)]
pub struct StaticSensorCatalog {
    known: HashSet<SensorId>,
}

impl StaticSensorCatalog {
    pub fn new(ids: impl IntoIterator<Item = SensorId>) -> Self {
        Self {
            known: ids.into_iter().collect(),
        }
    }
}

impl Default for StaticSensorCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_IDS.iter().map(|id| SensorId::new(*id)))
    }
}

impl SensorCatalog for StaticSensorCatalog {
    fn is_recognized(
        &self,
        id: &SensorId,
    ) -> bool {
        self.known.contains(id)
    }
}
