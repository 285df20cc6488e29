//! Time-ordered MIDI event storage.

use core::fmt;

use tracing::{debug, trace};

use crate::compat::Vec;
use crate::config::MidiBufferConfig;
use crate::cursor::{MidiBufferCursor, MidiEventRef};
use crate::error::Result;
use crate::length::{message_length, MAX_MESSAGE_LEN};
use crate::message::MidiMessage;
use crate::record;

/// Smallest allocation made when an empty buffer first grows.
const MIN_CAPACITY: usize = 64;

/// A sequence of timestamped MIDI messages, kept sorted by sample position.
///
/// All events live packed in one contiguous byte allocation. Events with
/// equal timestamps keep the order they were added in. Reading never
/// allocates; only inserts may grow the storage, and growth doubles the
/// capacity so a buffer reused across cycles settles at a steady size.
///
/// Any [`MidiBufferCursor`] borrows the buffer, so the buffer cannot be
/// modified while a cursor over it is alive.
///
/// ```
/// use quaver_midi::{MidiBuffer, MidiMessage};
///
/// let mut buffer = MidiBuffer::new();
/// buffer.add_event(&MidiMessage::note_on(0, 60, 100), 128);
/// buffer.add_event(&MidiMessage::note_off(0, 60, 0), 0);
///
/// let times: Vec<i32> = buffer.iter().map(|e| e.time).collect();
/// assert_eq!(times, [0, 128]);
/// ```
#[derive(Clone)]
pub struct MidiBuffer {
    data: Vec<u8>,
    max_message_len: usize,
}

impl MidiBuffer {
    /// Creates an empty buffer without allocating.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            max_message_len: MAX_MESSAGE_LEN,
        }
    }

    /// Creates an empty buffer with room for `bytes` bytes of framed events.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            max_message_len: MAX_MESSAGE_LEN,
        }
    }

    pub fn from_config(config: &MidiBufferConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Created MIDI buffer: {} bytes reserved, max message {} bytes",
            config.initial_capacity, config.max_message_len
        );
        Ok(Self {
            data: Vec::with_capacity(config.initial_capacity),
            max_message_len: config.max_message_len,
        })
    }

    /// Creates a buffer holding a single message at time 0.
    pub fn from_message(message: &MidiMessage) -> Self {
        let mut buffer = Self::new();
        buffer.add_event(message, 0);
        buffer
    }

    /// Removes every event. Capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Removes events with `start <= time < start + num_samples`.
    ///
    /// Does nothing when `num_samples <= 0`.
    pub fn clear_range(&mut self, start: i32, num_samples: i32) {
        if num_samples <= 0 {
            return;
        }
        let end = i64::from(start) + i64::from(num_samples);
        let first = record::seek(&self.data, 0, |t| t >= start);
        let last = record::seek(&self.data, first, |t| i64::from(t) >= end);
        if first < last {
            let used = self.data.len();
            self.data.copy_within(last..used, first);
            self.data.truncate(used - (last - first));
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Counts the events.
    ///
    /// Walks the whole buffer, since events have different sizes. Prefer
    /// [`is_empty`](Self::is_empty) when that is all you need.
    pub fn num_events(&self) -> usize {
        let mut count = 0;
        let mut pos = 0;
        while pos < self.data.len() {
            pos += record::size_at(&self.data, pos);
            count += 1;
        }
        count
    }

    /// Inserts `message` at `sample_time`, after any events already at that time.
    pub fn add_event(&mut self, message: &MidiMessage, sample_time: i32) {
        self.insert(sample_time, message.as_bytes());
    }

    /// Inserts the message at the start of `data`, after any events already
    /// at `sample_time`.
    ///
    /// `data.len()` is only an upper bound: the message's real length is
    /// worked out from its status byte and just those bytes are stored. If
    /// the data is unrecognised, truncated, or longer than this buffer's
    /// message limit, nothing is added and `false` is returned.
    pub fn add_raw_event(&mut self, data: &[u8], sample_time: i32) -> bool {
        let len = message_length(data);
        if len == 0 || len > self.max_message_len {
            trace!(sample_time, len, offered = data.len(), "dropped raw MIDI event");
            return false;
        }
        self.insert(sample_time, &data[..len]);
        true
    }

    /// Copies events from `source` whose time `t` satisfies `start_sample <= t`
    /// and `t < start_sample + num_samples`, adding `sample_delta` to each.
    ///
    /// A negative `num_samples` takes everything from `start_sample` on. The
    /// result is the same as calling [`add_event`](Self::add_event) for each
    /// source event in order, but done in one merge pass over the buffer.
    pub fn add_events(
        &mut self,
        source: &MidiBuffer,
        start_sample: i32,
        num_samples: i32,
        sample_delta: i32,
    ) {
        let src = &source.data;
        let first = record::seek(src, 0, |t| t >= start_sample);
        let last = if num_samples < 0 {
            src.len()
        } else {
            let end = i64::from(start_sample) + i64::from(num_samples);
            record::seek(src, first, |t| i64::from(t) >= end)
        };
        if first == last {
            return;
        }

        // Existing events move to the tail, then get merged back down to the
        // front. The write head never passes the read head because the gap
        // between them is exactly the bytes still to come from `source`.
        let extra = last - first;
        let used = self.data.len();
        self.ensure_capacity(used + extra);
        self.data.resize(used + extra, 0);
        self.data.copy_within(0..used, extra);

        let end = used + extra;
        let mut read = extra;
        let mut write = 0;
        let mut src_pos = first;

        while src_pos < last {
            let time = record::time_at(src, src_pos).saturating_add(sample_delta);

            while read < end && record::time_at(&self.data, read) <= time {
                let size = record::size_at(&self.data, read);
                if write != read {
                    self.data.copy_within(read..read + size, write);
                }
                read += size;
                write += size;
            }

            let size = record::size_at(src, src_pos);
            record::write(
                &mut self.data[write..write + size],
                time,
                record::payload_at(src, src_pos),
            );
            write += size;
            src_pos += size;
        }

        debug_assert_eq!(write, read);
    }

    /// Time of the first event, or 0 if empty.
    #[inline]
    pub fn first_event_time(&self) -> i32 {
        if self.data.is_empty() {
            0
        } else {
            record::time_at(&self.data, 0)
        }
    }

    /// Time of the last event, or 0 if empty. Walks the whole buffer.
    pub fn last_event_time(&self) -> i32 {
        if self.data.is_empty() {
            return 0;
        }
        let mut last = 0;
        let mut pos = 0;
        while pos < self.data.len() {
            last = pos;
            pos += record::size_at(&self.data, pos);
        }
        record::time_at(&self.data, last)
    }

    /// Exchanges contents with `other` without copying any events.
    #[inline]
    pub fn swap(&mut self, other: &mut MidiBuffer) {
        core::mem::swap(&mut self.data, &mut other.data);
    }

    #[inline]
    pub fn cursor(&self) -> MidiBufferCursor<'_> {
        MidiBufferCursor::new(self)
    }

    #[inline]
    pub fn iter(&self) -> MidiBufferCursor<'_> {
        self.cursor()
    }

    /// Bytes currently occupied by framed events.
    #[inline]
    pub fn used_bytes(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Makes room for at least `additional` more bytes of framed events.
    ///
    /// Each event costs its message length plus a 6-byte header.
    pub fn reserve(&mut self, additional: usize) {
        self.ensure_capacity(self.data.len() + additional);
    }

    #[inline]
    pub(crate) fn storage(&self) -> &[u8] {
        &self.data
    }

    fn insert(&mut self, time: i32, payload: &[u8]) {
        let size = record::framed_size(payload.len());
        let pos = record::seek(&self.data, 0, |t| t > time);
        let used = self.data.len();

        self.ensure_capacity(used + size);
        self.data.resize(used + size, 0);
        self.data.copy_within(pos..used, pos + size);
        record::write(&mut self.data[pos..pos + size], time, payload);
    }

    fn ensure_capacity(&mut self, needed: usize) {
        let capacity = self.data.capacity();
        if needed <= capacity {
            return;
        }
        let new_capacity = needed.max(capacity * 2).max(MIN_CAPACITY);
        trace!(from = capacity, to = new_capacity, "growing MIDI buffer");
        self.data.reserve_exact(new_capacity - self.data.len());
    }
}

impl Default for MidiBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MidiBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for MidiBuffer {}

impl fmt::Debug for MidiBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl From<MidiMessage> for MidiBuffer {
    fn from(message: MidiMessage) -> Self {
        Self::from_message(&message)
    }
}

impl Extend<(MidiMessage, i32)> for MidiBuffer {
    fn extend<I: IntoIterator<Item = (MidiMessage, i32)>>(&mut self, iter: I) {
        for (message, time) in iter {
            self.add_event(&message, time);
        }
    }
}

impl FromIterator<(MidiMessage, i32)> for MidiBuffer {
    fn from_iter<I: IntoIterator<Item = (MidiMessage, i32)>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a> IntoIterator for &'a MidiBuffer {
    type Item = MidiEventRef<'a>;
    type IntoIter = MidiBufferCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::Vec;
    use crate::config::MidiBufferConfig;

    fn note(n: u8) -> MidiMessage {
        MidiMessage::note_on(0, n, 100)
    }

    fn times(buffer: &MidiBuffer) -> Vec<i32> {
        buffer.iter().map(|e| e.time).collect()
    }

    fn notes(buffer: &MidiBuffer) -> Vec<u8> {
        buffer.iter().map(|e| e.data[1]).collect()
    }

    fn buffer_at(event_times: &[i32]) -> MidiBuffer {
        let mut buffer = MidiBuffer::new();
        for (i, &t) in event_times.iter().enumerate() {
            buffer.add_event(&note(i as u8), t);
        }
        buffer
    }

    #[test]
    fn test_new_is_empty() {
        let buffer = MidiBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.num_events(), 0);
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.first_event_time(), 0);
        assert_eq!(buffer.last_event_time(), 0);
    }

    #[test]
    fn test_events_sorted_by_time() {
        let buffer = buffer_at(&[40, -3, 12, 0, 12, 99, -50]);
        assert_eq!(times(&buffer), [-50, -3, 0, 12, 12, 40, 99]);
        assert_eq!(buffer.num_events(), 7);
        assert_eq!(buffer.first_event_time(), -50);
        assert_eq!(buffer.last_event_time(), 99);
    }

    #[test]
    fn test_equal_times_keep_insertion_order() {
        let mut buffer = MidiBuffer::new();
        buffer.add_event(&note(b'A'), 5);
        buffer.add_event(&note(b'B'), 2);
        buffer.add_event(&note(b'C'), 5);
        assert_eq!(notes(&buffer), [b'B', b'A', b'C']);
        assert_eq!(times(&buffer), [2, 5, 5]);
    }

    #[test]
    fn test_packing() {
        let mut buffer = MidiBuffer::new();
        buffer.add_event(&MidiMessage::note_on(0, 60, 100), 0);
        buffer.add_event(&MidiMessage::program_change(0, 3), 1);
        buffer.add_event(&MidiMessage::sysex(&[1, 2, 3, 4]).unwrap(), 2);
        assert_eq!(buffer.used_bytes(), (6 + 3) + (6 + 2) + (6 + 6));
    }

    #[test]
    fn test_clear_range() {
        let mut buffer = buffer_at(&[0, 2, 4, 6, 8]);
        buffer.clear_range(2, 4);
        assert_eq!(times(&buffer), [0, 6, 8]);
        assert_eq!(notes(&buffer), [0, 3, 4]);
    }

    #[test]
    fn test_clear_range_non_positive_length() {
        let mut buffer = buffer_at(&[0, 2, 4]);
        buffer.clear_range(0, 0);
        buffer.clear_range(0, -10);
        assert_eq!(times(&buffer), [0, 2, 4]);
    }

    #[test]
    fn test_clear_range_removes_ties_and_handles_overflow() {
        let mut buffer = buffer_at(&[1, 3, 3, 3, i32::MAX]);
        buffer.clear_range(3, 1);
        assert_eq!(times(&buffer), [1, i32::MAX]);
        buffer.clear_range(2, i32::MAX);
        assert_eq!(times(&buffer), [1]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = buffer_at(&[0, 1, 2]);
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.num_events(), 0);
    }

    #[test]
    fn test_add_raw_event_stores_only_message_length() {
        let mut buffer = MidiBuffer::new();
        assert!(buffer.add_raw_event(&[0x90, 60, 100, 0x80, 60, 0], 10));
        let event = buffer.iter().next().unwrap();
        assert_eq!(event.data, &[0x90, 60, 100]);
        assert_eq!(event.time, 10);
        assert_eq!(buffer.used_bytes(), 9);
    }

    #[test]
    fn test_add_raw_event_drops_malformed() {
        let mut buffer = buffer_at(&[0]);
        assert!(!buffer.add_raw_event(&[0x90, 60], 5));
        assert!(!buffer.add_raw_event(&[], 5));
        assert!(!buffer.add_raw_event(&[0x3C, 0x40], 5));
        assert!(!buffer.add_raw_event(&[0xFF, 0x51, 0x03, 0x07], 5));
        assert_eq!(buffer.num_events(), 1);
    }

    #[test]
    fn test_add_raw_event_reset_before_status_byte() {
        let mut buffer = MidiBuffer::new();
        assert!(buffer.add_raw_event(&[0xFF, 0xF8], 0));
        assert!(buffer.add_raw_event(&[0xFF, 0x90, 60, 100], 1));
        let stored: Vec<&[u8]> = buffer.iter().map(|e| e.data).collect();
        assert_eq!(stored, [&[0xFF][..], &[0xFF][..]]);
    }

    #[test]
    fn test_add_raw_event_sysex_with_clock_inside() {
        let mut buffer = MidiBuffer::new();
        assert!(buffer.add_raw_event(&[0xF0, 0x43, 0xF8, 0x12, 0xF7, 0x90], 0));
        let event = buffer.iter().next().unwrap();
        assert_eq!(event.data, &[0xF0, 0x43, 0xF8, 0x12, 0xF7]);
    }

    #[test]
    fn test_add_raw_event_respects_config_limit() {
        let config = MidiBufferConfig {
            initial_capacity: 256,
            max_message_len: 8,
        };
        let mut buffer = MidiBuffer::from_config(&config).unwrap();
        assert!(buffer.capacity() >= 256);
        assert!(buffer.add_raw_event(&[0xF0, 1, 2, 3, 0xF7], 0));
        assert!(!buffer.add_raw_event(&[0xF0, 1, 2, 3, 4, 5, 6, 7, 0xF7], 0));
        assert_eq!(buffer.num_events(), 1);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = MidiBufferConfig {
            max_message_len: 0,
            ..Default::default()
        };
        assert!(MidiBuffer::from_config(&config).is_err());
    }

    #[test]
    fn test_add_events_window_and_delta() {
        let source = buffer_at(&[0, 10, 20, 30, 40]);
        let mut dest = MidiBuffer::new();
        dest.add_events(&source, 10, 25, 100);
        assert_eq!(times(&dest), [110, 120, 130]);
        assert_eq!(notes(&dest), [1, 2, 3]);
    }

    #[test]
    fn test_add_events_negative_length_takes_rest() {
        let source = buffer_at(&[0, 10, 20, 30]);
        let mut dest = MidiBuffer::new();
        dest.add_events(&source, 15, -1, 0);
        assert_eq!(times(&dest), [20, 30]);
    }

    #[test]
    fn test_add_events_zero_length_adds_nothing() {
        let source = buffer_at(&[0, 10]);
        let mut dest = buffer_at(&[5]);
        dest.add_events(&source, 0, 0, 0);
        assert_eq!(times(&dest), [5]);
    }

    #[test]
    fn test_add_events_ties_go_after_existing() {
        let mut dest = MidiBuffer::new();
        dest.add_event(&note(1), 5);
        dest.add_event(&note(2), 10);

        let mut source = MidiBuffer::new();
        source.add_event(&note(3), 5);
        source.add_event(&note(4), 5);
        source.add_event(&note(5), 7);

        dest.add_events(&source, 0, -1, 0);
        assert_eq!(times(&dest), [5, 5, 5, 7, 10]);
        assert_eq!(notes(&dest), [1, 3, 4, 5, 2]);
    }

    #[test]
    fn test_add_events_matches_individual_adds() {
        let mut source = MidiBuffer::new();
        source.add_event(&MidiMessage::sysex(&[0x10; 20]).unwrap(), -4);
        for (i, t) in [3, 3, 8, 15, 15, 22, 40].iter().enumerate() {
            source.add_event(&note(i as u8), *t);
        }
        source.add_event(&MidiMessage::program_change(2, 9), 15);

        let seed = [(0, 1), (5, 2), (6, 3), (6, 4), (30, 5), (31, 6)];
        let mut merged = MidiBuffer::new();
        let mut expected = MidiBuffer::new();
        for &(t, n) in &seed {
            merged.add_event(&note(n), t);
            expected.add_event(&note(n), t);
        }

        merged.add_events(&source, 0, 30, 3);
        for event in source.iter() {
            if event.time >= 0 && event.time < 30 {
                expected.add_event(&event.to_message(), event.time + 3);
            }
        }

        assert_eq!(merged, expected);
    }

    #[test]
    fn test_add_events_delta_saturates() {
        let source = buffer_at(&[10]);
        let mut dest = MidiBuffer::new();
        dest.add_events(&source, 0, -1, i32::MAX);
        assert_eq!(times(&dest), [i32::MAX]);
    }

    #[test]
    fn test_swap() {
        let mut a = buffer_at(&[1, 2, 3]);
        let mut b = buffer_at(&[100]);
        let a_ptr = a.storage().as_ptr();
        let b_ptr = b.storage().as_ptr();

        a.swap(&mut b);

        assert_eq!(times(&a), [100]);
        assert_eq!(times(&b), [1, 2, 3]);
        assert_eq!(a.storage().as_ptr(), b_ptr);
        assert_eq!(b.storage().as_ptr(), a_ptr);
    }

    #[test]
    fn test_geometric_growth() {
        let mut buffer = MidiBuffer::new();
        buffer.add_event(&note(0), 0);
        let first = buffer.capacity();
        assert!(first >= MIN_CAPACITY);

        while buffer.used_bytes() + 9 <= first {
            buffer.add_event(&note(1), 0);
        }
        assert_eq!(buffer.capacity(), first);

        buffer.add_event(&note(2), 0);
        assert!(buffer.capacity() >= first * 2);
    }

    #[test]
    fn test_reserve() {
        let mut buffer = MidiBuffer::new();
        buffer.reserve(500);
        assert!(buffer.capacity() >= 500);
        let capacity = buffer.capacity();
        for i in 0..50 {
            buffer.add_event(&note(i), i as i32);
        }
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_from_message() {
        let buffer = MidiBuffer::from(MidiMessage::control_change(1, 7, 64));
        assert_eq!(buffer.num_events(), 1);
        assert_eq!(buffer.first_event_time(), 0);
        assert_eq!(buffer.iter().next().unwrap().data, &[0xB1, 7, 64]);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = buffer_at(&[1, 2]);
        let mut copy = original.clone();
        copy.add_event(&note(9), 0);
        assert_eq!(times(&original), [1, 2]);
        assert_eq!(times(&copy), [0, 1, 2]);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_from_iterator() {
        let buffer: MidiBuffer = [(note(1), 20), (note(2), 10), (note(3), 20)]
            .into_iter()
            .collect();
        assert_eq!(notes(&buffer), [2, 1, 3]);
    }

    #[test]
    fn test_debug_lists_events() {
        let buffer = MidiBuffer::from(MidiMessage::note_on(0, 60, 100));
        let text = format!("{:?}", buffer);
        assert!(text.starts_with('['));
        assert!(text.contains("time: 0"));
    }
}
