use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Channel capacities for the engine event loop
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Capacity of the consumer command queue
    #[serde(default = "default_command_buffer_capacity")]
    pub command_buffer_capacity: usize,

    /// Capacity of the channel-event queue shared by all open feeds
    #[serde(default = "default_event_buffer_capacity")]
    pub event_buffer_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_buffer_capacity: default_command_buffer_capacity(),
            event_buffer_capacity: default_event_buffer_capacity(),
        }
    }
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.command_buffer_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "command_buffer_capacity cannot be 0".into(),
            )));
        }

        if self.event_buffer_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "event_buffer_capacity cannot be 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_command_buffer_capacity() -> usize {
    64
}

fn default_event_buffer_capacity() -> usize {
    10240
}
