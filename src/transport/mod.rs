//! Channel transport seam.
//!
//! The transport that actually opens a push subscription and delivers its
//! events lives outside this crate. The engine consumes it through
//! [`ChannelTransport`]: `open_channel` must be non-blocking (implementations
//! spawn their own delivery loop) and `cancel` must be idempotent.


use std::fmt;

#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::DeviceId;
use crate::QueryDocument;
use crate::Result;
use crate::SensorId;
use crate::SensorValue;
use crate::SubscriptionKey;

/// Opaque cancellable resource for one open push channel.
///
/// Cancellation is level-based: cancelling twice is a no-op, and a transport
/// delivery loop parked on [`ChannelHandle::cancellation_token`] observes the
/// first cancel regardless of ordering.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    channel_id: u64,
    token: CancellationToken,
}

impl ChannelHandle {
    pub fn new(channel_id: u64) -> Self {
        Self {
            channel_id,
            token: CancellationToken::new(),
        }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Stops further delivery. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token for transport delivery loops to park on.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Wire-level failure attached to a push.
///
/// Only the first three shapes are recognized by the engine; anything else is
/// treated as noise and dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Subscription rejected: {0}")]
    Rejected(String),

    #[error("{0}")]
    Unclassified(String),
}

/// One asynchronous push as delivered by a channel.
///
/// `device_id`/`sensor_id` are what the wire reported, not what the channel
/// was bound to. The engine validates them against the bound key.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPush {
    pub device_id: DeviceId,
    pub sensor_id: SensorId,
    pub time: Option<i64>,
    pub value: Option<SensorValue>,
    pub error: Option<PushError>,
}

/// Engine-facing event envelope.
///
/// `key` and `generation` echo the values supplied at `open_channel` time, so
/// late events from a retired or replaced channel stay identifiable.
#[derive(Debug, Clone)]
pub struct ChannelEvent {
    pub key: SubscriptionKey,
    pub generation: u64,
    pub push: ChannelPush,
}

impl fmt::Display for ChannelEvent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}#{}", self.key, self.generation)
    }
}

/// Push-subscription primitive consumed by the reconciler.
#[cfg_attr(test, automock)]
pub trait ChannelTransport: Send + Sync + 'static {
    /// Opens one push subscription for `key` using `document`.
    ///
    /// Must not block and must not await establishment: implementations spawn
    /// their own delivery loop and report pushes through `events`, echoing
    /// `key` and `generation` on every envelope. A synchronous failure means
    /// the channel never opened; the caller retries on a later pass.
    fn open_channel(
        &self,
        key: SubscriptionKey,
        document: QueryDocument,
        generation: u64,
        events: mpsc::Sender<ChannelEvent>,
    ) -> Result<ChannelHandle>;

    /// Stops further delivery for the handle's channel. Idempotent; must not
    /// fail on an already-closed channel.
    fn cancel(
        &self,
        handle: ChannelHandle,
    ) {
        handle.cancel();
    }
}
