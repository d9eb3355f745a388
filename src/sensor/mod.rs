//! Sensor domain vocabulary.
//!
//! Identity types for devices and sensors, the sensor type tags that select a
//! feed's value domain, and the reading/error shapes recorded in the read
//! model.

mod catalog;
pub use catalog::*;

#[cfg(test)]
mod sensor_test;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::PushError;

/// Identifies one device in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifies one sensor on a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity of one live feed inside the channel registry.
///
/// The sensor type is carried alongside a key but is not part of identity. A
/// sensor's type is assumed stable for the lifetime of its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub device_id: DeviceId,
    pub sensor_id: SensorId,
}

impl SubscriptionKey {
    pub fn new(
        device_id: impl Into<DeviceId>,
        sensor_id: impl Into<SensorId>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            sensor_id: sensor_id.into(),
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.sensor_id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for SensorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tag determining a sensor's value domain and hence its wire response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    /// Numeric gauge reading (temperature, particulate level, ...)
    Gauge,
    /// Free-form text reading (status labels, display lines)
    Text,
    /// Boolean switch reading (relay, door contact, motion)
    Switch,
    /// Reference to a captured snapshot image
    Snapshot,
}

/// One sensor value, tagged by its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorValue {
    Number(f64),
    Text(String),
    Switch(bool),
    Snapshot(String),
}

impl SensorValue {
    /// The sensor type this value belongs to.
    pub fn kind(&self) -> SensorType {
        match self {
            SensorValue::Number(_) => SensorType::Gauge,
            SensorValue::Text(_) => SensorType::Text,
            SensorValue::Switch(_) => SensorType::Switch,
            SensorValue::Snapshot(_) => SensorType::Snapshot,
        }
    }
}

/// Last known state of one feed, as served to consumers.
///
/// `time` is epoch milliseconds as reported by the device. A transport error
/// is attached without clearing the last good `time`/`value` so a transient
/// failure does not blank a previously healthy reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub time: Option<i64>,
    pub value: Option<SensorValue>,
    pub error: Option<FeedErrorInfo>,
}

/// Recognized transport-error codes surfaced to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedErrorCode {
    PermissionDenied,
    ConnectionLost,
    Rejected,
}

/// Per-feed error record stored in the read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedErrorInfo {
    pub code: FeedErrorCode,
    pub message: String,
}

impl FeedErrorInfo {
    /// Decodes a wire-level push error into the recognized shape.
    ///
    /// Unclassified errors yield `None` and are dropped by the caller.
    pub fn from_push_error(error: &PushError) -> Option<Self> {
        let (code, message) = match error {
            PushError::PermissionDenied(msg) => (FeedErrorCode::PermissionDenied, msg),
            PushError::ConnectionLost(msg) => (FeedErrorCode::ConnectionLost, msg),
            PushError::Rejected(msg) => (FeedErrorCode::Rejected, msg),
            PushError::Unclassified(_) => return None,
        };
        Some(Self {
            code,
            message: message.clone(),
        })
    }
}
