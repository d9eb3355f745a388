//! Desired-set derivation.
//!
//! Computes the target set of live feeds from the current device inventory
//! and an optional sensor allow-list. The reconciler converges the channel
//! registry to whatever this module produces.


use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::DeviceId;
use crate::SensorCatalog;
use crate::SensorId;
use crate::SensorType;
use crate::SubscriptionKey;

/// One sensor as described by the device inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub sensor_id: SensorId,
    pub sensor_type: SensorType,
}

/// One device as described by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub device_id: DeviceId,
    pub sensors: Vec<SensorDescriptor>,
}

/// One feed that should currently be live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    pub key: SubscriptionKey,
    pub sensor_type: SensorType,
}

/// Derives the flat desired set from the device inventory.
///
/// A sensor is kept only if its id is part of the recognized vocabulary and,
/// when an allow-list is supplied, the id is present in it. `Some(empty)`
/// therefore allows nothing, while `None` applies no filter.
///
/// Inventory data is assumed de-duplicated upstream. A collision of two
/// entries on the same `(device, sensor)` key is a logic error: the first
/// entry wins, later ones are dropped.
pub fn derive_desired_set<C>(
    devices: &[DeviceDescriptor],
    sensor_filter: Option<&HashSet<SensorId>>,
    catalog: &C,
) -> Vec<DesiredEntry>
where
    C: SensorCatalog + ?Sized,
{
    let mut seen: HashSet<SubscriptionKey> = HashSet::new();
    let mut desired = Vec::new();

    for device in devices {
        for sensor in &device.sensors {
            if !catalog.is_recognized(&sensor.sensor_id) {
                continue;
            }
            if let Some(filter) = sensor_filter {
                if !filter.contains(&sensor.sensor_id) {
                    continue;
                }
            }

            let key = SubscriptionKey {
                device_id: device.device_id.clone(),
                sensor_id: sensor.sensor_id.clone(),
            };
            if !seen.insert(key.clone()) {
                warn!(%key, "duplicate sensor entry in device inventory, keeping first");
                debug_assert!(
                    !desired
                        .iter()
                        .any(|e: &DesiredEntry| e.key == key && e.sensor_type != sensor.sensor_type),
                    "sensor {key} listed twice with different types"
                );
                continue;
            }

            desired.push(DesiredEntry {
                key,
                sensor_type: sensor.sensor_type,
            });
        }
    }

    desired
}
