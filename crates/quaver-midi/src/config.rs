//! Buffer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::length::MAX_MESSAGE_LEN;

/// Sizing for a [`MidiBuffer`](crate::MidiBuffer) built ahead of the audio callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiBufferConfig {
    /// Bytes reserved up front, so a typical cycle never grows the storage.
    pub initial_capacity: usize,
    /// Longest raw message `add_raw_event` will store.
    pub max_message_len: usize,
}

impl Default for MidiBufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}

impl MidiBufferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_message_len == 0 || self.max_message_len > MAX_MESSAGE_LEN {
            return Err(Error::InvalidConfig(format!(
                "max_message_len {} out of range (1-{})",
                self.max_message_len, MAX_MESSAGE_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MidiBufferConfig::default();
        assert_eq!(config.initial_capacity, 1024);
        assert_eq!(config.max_message_len, 65535);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_message_len_rejected() {
        let config = MidiBufferConfig {
            max_message_len: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_max_message_len_rejected() {
        let config = MidiBufferConfig {
            max_message_len: MAX_MESSAGE_LEN + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_is_valid() {
        let config = MidiBufferConfig {
            initial_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_bincode_roundtrip() {
        let config = MidiBufferConfig {
            initial_capacity: 4096,
            max_message_len: 512,
        };
        let bytes = bincode::serialize(&config).unwrap();
        let back: MidiBufferConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, config);
        assert!(back.validate().is_ok());
    }
}
