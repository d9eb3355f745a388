//! Reusable fakes and fixtures for unit tests.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::ChannelEvent;
use crate::ChannelHandle;
use crate::ChannelPush;
use crate::ChannelTransport;
use crate::DeviceDescriptor;
use crate::PushError;
use crate::QueryDocument;
use crate::Result;
use crate::SensorDescriptor;
use crate::SensorId;
use crate::SensorType;
use crate::SensorValue;
use crate::StaticSensorCatalog;
use crate::SubscriptionKey;
use crate::TransportError;

pub static TEST_CATALOG: Lazy<StaticSensorCatalog> = Lazy::new(StaticSensorCatalog::default);

/// One recorded `open_channel` call.
#[derive(Clone)]
pub struct OpenRecord {
    pub key: SubscriptionKey,
    pub document: QueryDocument,
    pub generation: u64,
    pub handle: ChannelHandle,
    pub events: mpsc::Sender<ChannelEvent>,
}

#[derive(Default)]
struct RecordingState {
    next_channel_id: u64,
    opens: Vec<OpenRecord>,
    cancelled: Vec<u64>,
    failing_keys: HashSet<SubscriptionKey>,
}

/// Fake transport that records opens/cancels and lets tests inject pushes
/// and open failures.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<RecordingState>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `open_channel` fail synchronously for `key` until cleared.
    pub fn fail_opens_for(
        &self,
        key: SubscriptionKey,
    ) {
        self.inner.lock().failing_keys.insert(key);
    }

    pub fn allow_opens_for(
        &self,
        key: &SubscriptionKey,
    ) {
        self.inner.lock().failing_keys.remove(key);
    }

    pub fn open_count(&self) -> usize {
        self.inner.lock().opens.len()
    }

    pub fn cancel_count(&self) -> usize {
        self.inner.lock().cancelled.len()
    }

    pub fn cancelled_channel_ids(&self) -> Vec<u64> {
        self.inner.lock().cancelled.clone()
    }

    pub fn opens_for(
        &self,
        key: &SubscriptionKey,
    ) -> Vec<OpenRecord> {
        self.inner
            .lock()
            .opens
            .iter()
            .filter(|record| &record.key == key)
            .cloned()
            .collect()
    }

    pub fn latest_open(
        &self,
        key: &SubscriptionKey,
    ) -> Option<OpenRecord> {
        self.opens_for(key).into_iter().last()
    }

    /// Emits a push on the most recently opened channel for `key`, echoing
    /// that channel's generation.
    pub async fn push(
        &self,
        key: &SubscriptionKey,
        push: ChannelPush,
    ) {
        let record = self.latest_open(key).expect("no open channel for key");
        record
            .events
            .send(ChannelEvent {
                key: record.key,
                generation: record.generation,
                push,
            })
            .await
            .expect("event channel should accept pushes");
    }

    /// Emits a push with an explicit generation, for stale-delivery tests.
    pub async fn push_with_generation(
        &self,
        key: &SubscriptionKey,
        generation: u64,
        push: ChannelPush,
    ) {
        let record = self.latest_open(key).expect("no open channel for key");
        record
            .events
            .send(ChannelEvent {
                key: key.clone(),
                generation,
                push,
            })
            .await
            .expect("event channel should accept pushes");
    }
}

impl ChannelTransport for RecordingTransport {
    fn open_channel(
        &self,
        key: SubscriptionKey,
        document: QueryDocument,
        generation: u64,
        events: mpsc::Sender<ChannelEvent>,
    ) -> Result<ChannelHandle> {
        let mut state = self.inner.lock();
        if state.failing_keys.contains(&key) {
            return Err(TransportError::OpenFailed("injected failure".to_string()).into());
        }

        let channel_id = state.next_channel_id;
        state.next_channel_id += 1;
        let handle = ChannelHandle::new(channel_id);
        state.opens.push(OpenRecord {
            key,
            document,
            generation,
            handle: handle.clone(),
            events,
        });
        Ok(handle)
    }

    fn cancel(
        &self,
        handle: ChannelHandle,
    ) {
        handle.cancel();
        self.inner.lock().cancelled.push(handle.channel_id());
    }
}

//-----------------------------------------------------------
// Fixtures

pub fn device_with_sensors(
    device_id: &str,
    sensors: &[(&str, SensorType)],
) -> DeviceDescriptor {
    DeviceDescriptor {
        device_id: device_id.into(),
        sensors: sensors
            .iter()
            .map(|(sensor_id, sensor_type)| SensorDescriptor {
                sensor_id: SensorId::new(*sensor_id),
                sensor_type: *sensor_type,
            })
            .collect(),
    }
}

pub fn gauge_push(
    device_id: &str,
    sensor_id: &str,
    time: i64,
    value: f64,
) -> ChannelPush {
    ChannelPush {
        device_id: device_id.into(),
        sensor_id: sensor_id.into(),
        time: Some(time),
        value: Some(SensorValue::Number(value)),
        error: None,
    }
}

pub fn heartbeat_push(
    device_id: &str,
    sensor_id: &str,
) -> ChannelPush {
    ChannelPush {
        device_id: device_id.into(),
        sensor_id: sensor_id.into(),
        time: None,
        value: None,
        error: None,
    }
}

pub fn error_push(
    device_id: &str,
    sensor_id: &str,
    error: PushError,
) -> ChannelPush {
    ChannelPush {
        device_id: device_id.into(),
        sensor_id: sensor_id.into(),
        time: None,
        value: None,
        error: Some(error),
    }
}
