//! # Quaver - real-time MIDI event buffering
//!
//! Umbrella crate over the quaver subsystems.
//!
//! ## Architecture
//!
//! - **quaver-midi** - Time-ordered, packed MIDI event buffer with borrowing cursors
//!
//! ## Quick Start
//!
//! ```
//! use quaver::prelude::*;
//!
//! let mut block = MidiBuffer::from_config(&MidiBufferConfig::default())?;
//! block.add_event(&MidiMessage::note_on(0, 60, 100), 32);
//! block.add_raw_event(&[0xB0, 64, 127], 0);
//!
//! let mut cursor = block.cursor();
//! while let Some(event) = cursor.next_event() {
//!     println!("{} {:02X?}", event.time, event.data);
//! }
//! # Ok::<(), quaver::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - `midi` + `std`
//! - `midi` - MIDI event buffer
//! - `std` - std support in the error and logging crates

pub mod error;
pub use error::{Error, Result};

#[cfg(feature = "midi")]
pub use quaver_midi as midi;

#[cfg(feature = "midi")]
pub use quaver_midi::{
    message_length, MidiBuffer, MidiBufferConfig, MidiBufferCursor, MidiEventRef, MidiMessage,
};

/// Common imports.
pub mod prelude {
    pub use crate::{Error, Result};

    #[cfg(feature = "midi")]
    pub use crate::{MidiBuffer, MidiBufferConfig, MidiBufferCursor, MidiEventRef, MidiMessage};
}
