//! Centralized error type for the quaver umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "midi")]
    #[error("MIDI: {0}")]
    Midi(#[from] quaver_midi::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
