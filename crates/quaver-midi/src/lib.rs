//! Time-ordered MIDI event buffer for real-time audio callbacks.
//!
//! A [`MidiBuffer`] holds the MIDI events for one processing block, packed
//! into a single allocation and kept sorted by sample position. Producers add
//! events as they arrive; consumers walk them in order with a
//! [`MidiBufferCursor`].
//!
//! - Events at the same sample position keep the order they were added in
//! - Reading never allocates; only inserts may grow the storage
//! - Cursors borrow the buffer, so it can't change underneath them
//!
//! # Example
//!
//! ```
//! use quaver_midi::{MidiBuffer, MidiMessage};
//!
//! let mut input = MidiBuffer::new();
//! input.add_event(&MidiMessage::note_on(0, 60, 100), 0);
//! input.add_raw_event(&[0x80, 60, 0, 0, 0], 256);
//!
//! // Shift the block into the second half of a 512-sample output
//! let mut output = MidiBuffer::with_capacity(256);
//! output.add_events(&input, 0, 512, 512);
//!
//! for event in &output {
//!     println!("{}: {:02X?}", event.time, event.data);
//! }
//! assert_eq!(output.last_event_time(), 768);
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
extern crate alloc;

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::MidiBufferConfig;

mod buffer;
pub use buffer::MidiBuffer;

mod cursor;
pub use cursor::{MidiBufferCursor, MidiEventRef};

mod message;
pub use message::MidiMessage;

pub mod length;
pub use length::{message_length, MAX_MESSAGE_LEN};

// Re-export upstream message types for conversions
pub use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

pub(crate) mod compat;
pub(crate) mod record;
pub(crate) mod serde_support;
