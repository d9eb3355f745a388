//! Wire-level subscription document construction.
//!
//! The subscription document is selected by sensor type, so a feed's response
//! selection always matches its value domain. Building by variant dispatch
//! keeps invalid type/shape combinations unrepresentable.


use serde::Serialize;
use serde_json::json;

use crate::SensorType;
use crate::SubscriptionKey;

/// One wire-level subscription document, ready to be bound to a feed key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDocument {
    pub operation_name: &'static str,
    pub document: String,
    pub sensor_type: SensorType,
}

impl QueryDocument {
    /// Variable bindings for one feed key.
    pub fn variables(
        &self,
        key: &SubscriptionKey,
    ) -> serde_json::Value {
        json!({
            "deviceId": key.device_id.as_str(),
            "sensorId": key.sensor_id.as_str(),
        })
    }
}

/// Builds the subscription document whose response shape matches the sensor
/// type's value domain.
pub fn build_query_document(sensor_type: SensorType) -> QueryDocument {
    let (operation_name, selection) = match sensor_type {
        SensorType::Gauge => ("OnGaugeReading", "numericValue"),
        SensorType::Text => ("OnTextReading", "textValue"),
        SensorType::Switch => ("OnSwitchReading", "switchedOn"),
        SensorType::Snapshot => ("OnSnapshotReading", "snapshotUrl"),
    };

    let document = format!(
        "subscription {operation_name}($deviceId: ID!, $sensorId: ID!) {{\n\
         \x20 sensorReading(deviceId: $deviceId, sensorId: $sensorId) {{\n\
         \x20   deviceId\n\
         \x20   sensorId\n\
         \x20   time\n\
         \x20   {selection}\n\
         \x20 }}\n\
         }}"
    );

    QueryDocument {
        operation_name,
        document,
        sensor_type,
    }
}
