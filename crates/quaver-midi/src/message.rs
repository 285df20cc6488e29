//! Owned MIDI message value.

use core::fmt;

use midi_msg::MidiMsg;
use smallvec::SmallVec;

use crate::compat::Vec;
use crate::error::{Error, Result};
use crate::length::{fixed_length, message_length, MAX_MESSAGE_LEN};

/// A single complete MIDI message, stored as raw bytes.
///
/// Short messages live inline; only system exclusive and meta events spill to
/// the heap. A `MidiMessage` carries no timestamp: the buffer it is added to
/// assigns one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    data: SmallVec<[u8; 3]>,
}

impl MidiMessage {
    /// Parses the message at the start of `bytes`.
    ///
    /// Trailing bytes past the message's own length are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let len = message_length(bytes);
        if len == 0 {
            return Err(Self::length_error(bytes));
        }
        if len > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong {
                len,
                max: MAX_MESSAGE_LEN,
            });
        }
        Ok(Self::from_record(&bytes[..len]))
    }

    /// Wraps bytes that were already framed by a buffer.
    #[inline]
    pub(crate) fn from_record(payload: &[u8]) -> Self {
        Self {
            data: SmallVec::from_slice(payload),
        }
    }

    fn length_error(bytes: &[u8]) -> Error {
        match bytes.first() {
            None => Error::InvalidMessage("empty message".into()),
            Some(&status) if status & 0x80 == 0 => {
                Error::InvalidMessage(format!("0x{:02X} is not a status byte", status))
            }
            Some(&status) => match fixed_length(status) {
                Some(expected) if expected > bytes.len() => Error::Truncated {
                    expected,
                    actual: bytes.len(),
                },
                _ => Error::InvalidMessage(format!(
                    "malformed message with status 0x{:02X}",
                    status
                )),
            },
        }
    }

    #[inline]
    fn channel_message(status: u8, channel: u8, data1: u8, data2: u8) -> Self {
        Self {
            data: SmallVec::from_buf([status | (channel & 0x0F), data1 & 0x7F, data2 & 0x7F]),
        }
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_message(0x90, channel, note, velocity)
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_message(0x80, channel, note, velocity)
    }

    #[inline]
    pub fn poly_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        Self::channel_message(0xA0, channel, note, pressure)
    }

    #[inline]
    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::channel_message(0xB0, channel, control, value)
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self {
            data: SmallVec::from_slice(&[0xC0 | (channel & 0x0F), program & 0x7F]),
        }
    }

    #[inline]
    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self {
            data: SmallVec::from_slice(&[0xD0 | (channel & 0x0F), pressure & 0x7F]),
        }
    }

    /// 14-bit bend, 8192 = centre.
    #[inline]
    pub fn pitch_bend(channel: u8, bend: u16) -> Self {
        Self::channel_message(0xE0, channel, (bend & 0x7F) as u8, (bend >> 7) as u8)
    }

    /// Builds `F0 <payload> F7`. Payload bytes must all be 7-bit.
    pub fn sysex(payload: &[u8]) -> Result<Self> {
        if let Some(&bad) = payload.iter().find(|&&b| b & 0x80 != 0) {
            return Err(Error::InvalidMessage(format!(
                "sysex payload contains status byte 0x{:02X}",
                bad
            )));
        }
        let len = payload.len() + 2;
        if len > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong {
                len,
                max: MAX_MESSAGE_LEN,
            });
        }
        let mut data = SmallVec::with_capacity(len);
        data.push(0xF0);
        data.extend_from_slice(payload);
        data.push(0xF7);
        Ok(Self { data })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: a message has at least its status byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0]
    }

    /// Channel (0-15) for channel messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        (self.status() < 0xF0).then(|| self.status() & 0x0F)
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        self.status() & 0xF0 == 0x90 && self.data[2] > 0
    }

    /// Note-off, or note-on with velocity 0.
    #[inline]
    pub fn is_note_off(&self) -> bool {
        match self.status() & 0xF0 {
            0x80 => true,
            0x90 => self.data[2] == 0,
            _ => false,
        }
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        matches!(self.status() & 0xF0, 0x80 | 0x90 | 0xA0).then(|| self.data[1])
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        matches!(self.status() & 0xF0, 0x80 | 0x90).then(|| self.data[2])
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.status() == 0xF0
    }

    /// Meta events only appear in buffers filled from file data.
    #[inline]
    pub fn is_meta(&self) -> bool {
        self.status() == 0xFF && self.data.len() > 1
    }

    pub fn from_midi_msg(msg: &MidiMsg) -> Result<Self> {
        let bytes: Vec<u8> = msg.to_midi();
        Self::from_bytes(&bytes)
    }

    pub fn to_midi_msg(&self) -> Result<MidiMsg> {
        let (msg, _len) = MidiMsg::from_midi(&self.data)?;
        Ok(msg)
    }
}

impl AsRef<[u8]> for MidiMessage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for MidiMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<&MidiMsg> for MidiMessage {
    type Error = Error;

    fn try_from(msg: &MidiMsg) -> Result<Self> {
        Self::from_midi_msg(msg)
    }
}

impl fmt::Debug for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MidiMessage[")?;
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        write!(f, "]")
    }
}
