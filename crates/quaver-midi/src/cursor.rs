//! Sequential, repositionable reading of a [`MidiBuffer`].

use core::iter::FusedIterator;

use crate::buffer::MidiBuffer;
use crate::message::MidiMessage;
use crate::record;

/// One event viewed in place inside its buffer.
///
/// `data` points straight into the buffer's storage, so the view cannot
/// outlive the borrow of the buffer it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEventRef<'a> {
    /// Sample position.
    pub time: i32,
    /// Raw message bytes.
    pub data: &'a [u8],
}

impl MidiEventRef<'_> {
    /// Copies the bytes out into an owned message.
    #[inline]
    pub fn to_message(&self) -> MidiMessage {
        MidiMessage::from_record(self.data)
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0]
    }
}

/// Walks the events of a [`MidiBuffer`] in time order.
///
/// Holds a shared borrow of the buffer, so the buffer can't change while the
/// cursor is in use. Reading never allocates (except [`next_message`] for
/// messages too long to store inline).
///
/// [`next_message`]: MidiBufferCursor::next_message
///
/// ```
/// use quaver_midi::{MidiBuffer, MidiMessage};
///
/// let mut buffer = MidiBuffer::new();
/// for t in [1, 3, 3, 7] {
///     buffer.add_event(&MidiMessage::note_on(0, t as u8, 100), t);
/// }
///
/// let mut cursor = buffer.cursor();
/// cursor.set_next_sample_position(3);
/// assert_eq!(cursor.next_event().map(|e| e.time), Some(3));
///
/// cursor.set_next_sample_position(8);
/// assert!(cursor.next_event().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct MidiBufferCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MidiBufferCursor<'a> {
    pub fn new(buffer: &'a MidiBuffer) -> Self {
        Self {
            data: buffer.storage(),
            pos: 0,
        }
    }

    /// Moves to the first event whose time is `>= sample_position`.
    ///
    /// Searches from the start of the buffer, so the cursor can move
    /// backwards as well as forwards.
    pub fn set_next_sample_position(&mut self, sample_position: i32) {
        self.pos = record::seek(self.data, 0, |t| t >= sample_position);
    }

    /// Returns the next event as a view into the buffer and advances.
    #[inline]
    pub fn next_event(&mut self) -> Option<MidiEventRef<'a>> {
        if self.is_exhausted() {
            return None;
        }
        let event = MidiEventRef {
            time: record::time_at(self.data, self.pos),
            data: record::payload_at(self.data, self.pos),
        };
        self.pos += record::size_at(self.data, self.pos);
        Some(event)
    }

    /// Returns a copy of the next message with its time, and advances.
    #[inline]
    pub fn next_message(&mut self) -> Option<(MidiMessage, i32)> {
        self.next_event()
            .map(|event| (event.to_message(), event.time))
    }

    /// Time of the event [`next_event`](Self::next_event) would return.
    #[inline]
    pub fn peek_time(&self) -> Option<i32> {
        (!self.is_exhausted()).then(|| record::time_at(self.data, self.pos))
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl<'a> Iterator for MidiBufferCursor<'a> {
    type Item = MidiEventRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

impl FusedIterator for MidiBufferCursor<'_> {}
