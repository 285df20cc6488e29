//! Serde support for MIDI messages
//!
//! A `MidiMessage` serializes as its raw bytes and is re-validated on the way
//! back in, so a deserialized message always has a legal length.

use core::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compat::Vec;
use crate::message::MidiMessage;

impl Serialize for MidiMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

struct MidiMessageVisitor;

impl<'de> Visitor<'de> for MidiMessageVisitor {
    type Value = MidiMessage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the raw bytes of one MIDI message")
    }

    fn visit_bytes<E>(self, bytes: &[u8]) -> Result<MidiMessage, E>
    where
        E: de::Error,
    {
        let message = MidiMessage::from_bytes(bytes).map_err(E::custom)?;
        if message.len() != bytes.len() {
            return Err(E::invalid_length(bytes.len(), &self));
        }
        Ok(message)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<MidiMessage, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(3));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        self.visit_bytes(&bytes)
    }
}

impl<'de> Deserialize<'de> for MidiMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_bytes(MidiMessageVisitor)
    }
}
