//! Feed Engine Error Hierarchy
//!
//! Defines error types for the live sensor feed subsystem, categorized by
//! infrastructure, configuration and subscription concerns.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (channel plumbing, startup)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Live feed subscription failures
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// Channel transport failures
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Breach of the one-channel-per-key registry invariant
    #[error("Duplicate live channel for device {device_id} sensor {sensor_id}")]
    DuplicateChannel { device_id: String, sensor_id: String },

    /// Command sent after the engine loop has stopped
    #[error("Feed engine is no longer accepting commands")]
    EngineClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Channel establishment failures
    #[error("Failed to open channel: {0}")]
    OpenFailed(String),

    /// Upstream refused the subscription document
    #[error("Subscription rejected by upstream: {0}")]
    Rejected(String),

    /// Event delivery channel is gone
    #[error("Failed to deliver channel event: {0}")]
    DeliveryFailed(String),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Subscription(SubscriptionError::Transport(err))
    }
}

#[derive(Debug, thiserror::Error)]
#[doc(hidden)]
pub enum SystemError {
    #[error("Engine failed to start: {0}")]
    EngineStartFailed(String),

    #[error("{0}")]
    SignalSendFailed(String),
}
