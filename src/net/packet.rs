//! # Packet
//!
//! The basic unit between peers: a one-byte tag followed by a fixed
//! 1024-byte payload. Numbers cross the wire as decimal text inside the
//! payload, NUL-padded; strings are chunked across as many packets as they
//! need, terminated by a FINAL tag.

use std::fmt;
use std::str::FromStr;

use crate::constants::{FRAME_SIZE, PACKET_SIZE};
use crate::error::{ProtocolError, Result};

/// Metadata tag describing what a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    /// Something went wrong (also synthesised locally on receive failure)
    Error = 0,
    /// A deliberately empty packet
    Empty = 1,
    /// A packet of data
    Data = 2,
    /// A chunk of an HMAC transfer
    Hmac = 3,
    /// A CTR nonce value
    Nonce = 4,
    /// A GCM IV/nonce value
    Iv = 5,
    /// The final packet of a string transfer
    Final = 6,
    /// A request to initiate a message exchange
    Message = 7,
    /// An acknowledgement
    Ack = 8,
    /// A refusal of a request
    Refused = 9,
    /// A request to regenerate the shared key
    Reexchange = 10,
}

impl Tag {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Tag::Error),
            1 => Ok(Tag::Empty),
            2 => Ok(Tag::Data),
            3 => Ok(Tag::Hmac),
            4 => Ok(Tag::Nonce),
            5 => Ok(Tag::Iv),
            6 => Ok(Tag::Final),
            7 => Ok(Tag::Message),
            8 => Ok(Tag::Ack),
            9 => Ok(Tag::Refused),
            10 => Ok(Tag::Reexchange),
            other => Err(ProtocolError::InvalidTag(other).into()),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Error => "ERROR",
            Tag::Empty => "EMPTY",
            Tag::Data => "DATA",
            Tag::Hmac => "HMAC",
            Tag::Nonce => "NONCE",
            Tag::Iv => "IV",
            Tag::Final => "FINAL",
            Tag::Message => "MESSAGE",
            Tag::Ack => "ACK",
            Tag::Refused => "REFUSED",
            Tag::Reexchange => "REEXCHANGE",
        };
        write!(f, "{}", name)
    }
}

/// A fixed-size frame. The payload is always transmitted whole; shorter
/// content is NUL-padded.
#[derive(Clone)]
pub struct Packet {
    pub tag: Tag,
    pub payload: [u8; PACKET_SIZE],
}

impl Packet {
    /// An all-zero packet with the given tag.
    pub fn new(tag: Tag) -> Self {
        Packet {
            tag,
            payload: [0u8; PACKET_SIZE],
        }
    }

    /// A packet whose payload starts with the rendered text.
    pub fn with_text(tag: Tag, text: &str) -> Result<Self> {
        if text.len() > PACKET_SIZE {
            return Err(ProtocolError::ValueTooLarge(text.len()).into());
        }
        let mut packet = Packet::new(tag);
        packet.payload[..text.len()].copy_from_slice(text.as_bytes());
        Ok(packet)
    }

    /// A packet whose payload starts with the given bytes. `data` must fit.
    pub fn with_bytes(tag: Tag, data: &[u8]) -> Self {
        debug_assert!(data.len() <= PACKET_SIZE);
        let mut packet = Packet::new(tag);
        packet.payload[..data.len()].copy_from_slice(data);
        packet
    }

    pub fn serialize(&self) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        frame[0] = self.tag as u8;
        frame[1..].copy_from_slice(&self.payload);
        frame
    }

    pub fn deserialize(frame: &[u8; FRAME_SIZE]) -> Result<Self> {
        let tag = Tag::from_u8(frame[0])?;
        let mut payload = [0u8; PACKET_SIZE];
        payload.copy_from_slice(&frame[1..]);
        Ok(Packet { tag, payload })
    }

    /// Parse the payload's textual content (up to the first NUL) as a value.
    pub fn parse<T: FromStr>(&self) -> Result<T>
    where
        T::Err: fmt::Display,
    {
        let end = self
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PACKET_SIZE);
        let text = std::str::from_utf8(&self.payload[..end])
            .map_err(|e| ProtocolError::MalformedValue(e.to_string()))?;
        text.trim()
            .parse::<T>()
            .map_err(|e| ProtocolError::MalformedValue(e.to_string()).into())
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = PACKET_SIZE
            - self
                .payload
                .iter()
                .rev()
                .take_while(|&&b| b == 0)
                .count();
        f.debug_struct("Packet")
            .field("tag", &self.tag)
            .field("used_bytes", &used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_bytes() {
        for value in 0u8..=10 {
            let tag = Tag::from_u8(value).unwrap();
            assert_eq!(tag as u8, value);
        }
        assert!(Tag::from_u8(11).is_err());
        assert!(Tag::from_u8(0xff).is_err());
    }

    #[test]
    fn frame_round_trip() {
        let packet = Packet::with_bytes(Tag::Nonce, b"1234567890");
        let frame = packet.serialize();
        assert_eq!(frame.len(), FRAME_SIZE);
        let back = Packet::deserialize(&frame).unwrap();
        assert_eq!(back.tag, Tag::Nonce);
        assert_eq!(back.payload, packet.payload);
    }

    #[test]
    fn value_text_round_trip() {
        let packet = Packet::with_text(Tag::Data, &u64::MAX.to_string()).unwrap();
        assert_eq!(packet.parse::<u64>().unwrap(), u64::MAX);
    }

    #[test]
    fn oversize_text_is_rejected() {
        let text = "x".repeat(PACKET_SIZE + 1);
        assert!(Packet::with_text(Tag::Data, &text).is_err());
    }

    #[test]
    fn garbage_payload_fails_to_parse() {
        let packet = Packet::with_bytes(Tag::Data, b"not a number");
        assert!(packet.parse::<u64>().is_err());
    }

    #[test]
    fn bad_tag_byte_fails_deserialisation() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[0] = 200;
        assert!(Packet::deserialize(&frame).is_err());
    }
}
