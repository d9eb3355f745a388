//! Consumer-facing read model.
//!
//! Last-known readings per device and sensor, published through a
//! `tokio::sync::watch` channel. All writes happen on the engine task; the
//! store only hands out receivers, so consumers get consistent snapshots and
//! change notification but can never mutate.


use std::collections::HashMap;

use tokio::sync::watch;

use crate::DeviceId;
use crate::FeedErrorInfo;
use crate::SensorId;
use crate::SensorReading;
use crate::SensorValue;
use crate::SubscriptionKey;

/// `device -> sensor -> last known reading`.
pub type ReadModel = HashMap<DeviceId, HashMap<SensorId, SensorReading>>;

/// Single-writer store behind the watch channel.
pub(crate) struct ReadModelStore {
    tx: watch::Sender<ReadModel>,
}

impl ReadModelStore {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ReadModel::new());
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ReadModel> {
        self.tx.subscribe()
    }

    /// Records a successful reading, replacing the previous one entirely. A
    /// fresh value clears any error left by an earlier failure.
    pub(crate) fn record_value(
        &self,
        key: &SubscriptionKey,
        time: Option<i64>,
        value: SensorValue,
    ) {
        self.tx.send_modify(|model| {
            model.entry(key.device_id.clone()).or_default().insert(
                key.sensor_id.clone(),
                SensorReading {
                    time,
                    value: Some(value),
                    error: None,
                },
            );
        });
    }

    /// Records a transport failure, preserving the last good `time`/`value`
    /// so a transient error does not blank a previously healthy reading.
    pub(crate) fn record_error(
        &self,
        key: &SubscriptionKey,
        error: FeedErrorInfo,
    ) {
        self.tx.send_modify(|model| {
            let reading = model
                .entry(key.device_id.clone())
                .or_default()
                .entry(key.sensor_id.clone())
                .or_default();
            reading.error = Some(error);
        });
    }

    /// Drops the reading for a retired key; the device entry goes with it
    /// once its last sensor is gone.
    pub(crate) fn retire(
        &self,
        key: &SubscriptionKey,
    ) {
        self.tx.send_if_modified(|model| {
            let Some(sensors) = model.get_mut(&key.device_id) else {
                return false;
            };
            let removed = sensors.remove(&key.sensor_id).is_some();
            if sensors.is_empty() {
                model.remove(&key.device_id);
            }
            removed
        });
    }

    pub(crate) fn clear(&self) {
        self.tx.send_if_modified(|model| {
            if model.is_empty() {
                return false;
            }
            model.clear();
            true
        });
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> ReadModel {
        self.tx.borrow().clone()
    }
}
