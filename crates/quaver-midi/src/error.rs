//! Error types for the MIDI buffer subsystem.
//!
//! Only construction paths return these. The real-time insert path drops bad
//! input silently instead.

use crate::compat::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid MIDI message: {0}")]
    InvalidMessage(String),

    #[error("MIDI message too long: {len} bytes (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("Truncated MIDI message: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("midi-msg conversion failed: {0}")]
    MidiMsg(String),
}

impl From<midi_msg::ParseError> for Error {
    fn from(e: midi_msg::ParseError) -> Self {
        Error::MidiMsg(format!("{:?}", e))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
