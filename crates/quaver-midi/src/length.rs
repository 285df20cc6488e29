//! Message length from the leading status byte.
//!
//! Channel and system-common messages have a length fixed by their status
//! byte. System exclusive runs until its `0xF7` terminator (or until another
//! non-real-time status byte interrupts it, or the caller's bound); real-time
//! bytes inside it are kept in place. `0xFF` followed by a data byte is
//! treated as a meta event, otherwise as a one-byte system reset.

/// Longest payload a single record can frame.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;
const REALTIME_START: u8 = 0xF8;
const META: u8 = 0xFF;

/// Returns how many bytes of `data` the message at `data[0]` occupies.
///
/// `data.len()` is the caller's upper bound. Returns 0 when the data is empty,
/// starts with a data byte, is truncated, or has a status byte where a data
/// byte belongs.
///
/// ```
/// use quaver_midi::message_length;
///
/// assert_eq!(message_length(&[0x90, 60, 100, 0x00]), 3);
/// assert_eq!(message_length(&[0xC0, 5]), 2);
/// assert_eq!(message_length(&[0x90, 60]), 0);
/// assert_eq!(message_length(&[0xF0, 0x7E, 0x01, 0xF7, 0x90]), 4);
/// ```
pub fn message_length(data: &[u8]) -> usize {
    let Some(&status) = data.first() else {
        return 0;
    };

    let len = match status {
        0x00..=0x7F => return 0,
        0x80..=0xBF | 0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        SYSEX_START => return sysex_length(data),
        0xF1 | 0xF3 => 2,
        0xF2 => 3,
        META if data.len() > 1 && data[1] & 0x80 == 0 => return meta_length(data),
        // Undefined system common, stray EOX, real-time, reset
        _ => 1,
    };

    if len > data.len() || data[1..len].iter().any(|&b| b & 0x80 != 0) {
        return 0;
    }
    len
}

/// Length of a message whose size does not depend on anything past its
/// status byte, or `None` for the open-ended classes.
#[inline]
pub fn fixed_length(status: u8) -> Option<usize> {
    match status {
        0x00..=0x7F => None,
        0x80..=0xBF | 0xE0..=0xEF => Some(3),
        0xC0..=0xDF => Some(2),
        SYSEX_START | META => None,
        0xF1 | 0xF3 => Some(2),
        0xF2 => Some(3),
        _ => Some(1),
    }
}

fn sysex_length(data: &[u8]) -> usize {
    for (i, &byte) in data.iter().enumerate().skip(1) {
        match byte {
            0x00..=0x7F | REALTIME_START..=0xFF => {}
            // Terminator belongs to the message, any other status byte starts the next one
            SYSEX_END => return i + 1,
            _ => return i,
        }
    }
    data.len()
}

fn meta_length(data: &[u8]) -> usize {
    let Some((payload_len, vlq_len)) = read_variable_length(&data[2..]) else {
        return 0;
    };
    let total = 2 + vlq_len + payload_len as usize;
    if total > data.len() {
        0
    } else {
        total
    }
}

/// Decodes a variable-length quantity (at most 4 bytes).
///
/// Returns the value and the number of bytes it used, or `None` if the
/// quantity is unterminated.
pub(crate) fn read_variable_length(data: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (i, &byte) in data.iter().take(4).enumerate() {
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
