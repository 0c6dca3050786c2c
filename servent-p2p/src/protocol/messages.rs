//! Gnutella binary messages.
//!
//! Only PING is originated today. The other descriptor types are named so
//! that decoding and dispatch stay exhaustive.

use std::fmt;

use bytes::Bytes;
use uuid::Uuid;

/// Descriptor type carried in byte 16 of the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Liveness probe / host discovery request.
    Ping,
    /// Reply to a PING.
    Pong,
    /// Graceful disconnect notice.
    Bye,
    /// Firewalled-servent push request.
    Push,
    /// Search request.
    Query,
    /// Search reply.
    QueryHit,
    /// Any code this servent does not know.
    Unknown(u8),
}

impl MessageType {
    /// Wire code for this type.
    pub fn code(self) -> u8 {
        match self {
            MessageType::Ping => 0x00,
            MessageType::Pong => 0x01,
            MessageType::Bye => 0x02,
            MessageType::Push => 0x40,
            MessageType::Query => 0x80,
            MessageType::QueryHit => 0x81,
            MessageType::Unknown(code) => code,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Ping => "PING",
            MessageType::Pong => "PONG",
            MessageType::Bye => "BYE",
            MessageType::Push => "PUSH",
            MessageType::Query => "QUERY",
            MessageType::QueryHit => "QUERYHIT",
            MessageType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for MessageType {
    fn from(code: u8) -> Self {
        match code {
            0x00 => MessageType::Ping,
            0x01 => MessageType::Pong,
            0x02 => MessageType::Bye,
            0x40 => MessageType::Push,
            0x80 => MessageType::Query,
            0x81 => MessageType::QueryHit,
            other => MessageType::Unknown(other),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Unknown(code) => write!(f, "UNKNOWN(0x{:02x})", code),
            known => f.write_str(known.name()),
        }
    }
}

/// 16-byte message / servent identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(Uuid);

impl Guid {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero identifier, used when a received one is unreadable.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a received identifier. Anything that is not exactly 16 bytes
    /// yields the nil identifier and a warning instead of an error.
    ///
    /// `MessageCodec::decode` rejects short input before getting here and
    /// always passes a full 16-byte slice, so decoded messages never carry a
    /// nil GUID from this path.
    pub fn parse_lossy(bytes: &[u8]) -> Self {
        match Uuid::from_slice(bytes) {
            Ok(uuid) => Self(uuid),
            Err(e) => {
                tracing::warn!(len = bytes.len(), error = %e, "Unable to parse GUID, using nil");
                Self::nil()
            }
        }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Whether this is the nil identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self.0.hyphenated())
    }
}

/// A decoded or locally built message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message identifier.
    pub guid: Guid,
    /// Descriptor type.
    pub message_type: MessageType,
    /// Remaining hops before the message is dropped.
    pub ttl: u8,
    /// Hops travelled so far.
    pub hops: u8,
    /// Payload length as written in the header. Decoding does not enforce it.
    pub declared_len: u16,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Message {
    /// Build a message with a fresh random GUID.
    pub fn new(message_type: MessageType, ttl: u8, hops: u8, payload: Bytes) -> Self {
        Self::with_guid(Guid::random(), message_type, ttl, hops, payload)
    }

    /// Build a message with the given GUID. The declared length is the
    /// payload length, saturated to the 16-bit field.
    pub fn with_guid(
        guid: Guid,
        message_type: MessageType,
        ttl: u8,
        hops: u8,
        payload: Bytes,
    ) -> Self {
        Self {
            guid,
            message_type,
            ttl,
            hops,
            declared_len: u16::try_from(payload.len()).unwrap_or(u16::MAX),
            payload,
        }
    }

    /// A PING: empty payload, zero hops.
    pub fn ping(guid: Guid, ttl: u8) -> Self {
        Self::with_guid(guid, MessageType::Ping, ttl, 0, Bytes::new())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(guid={}, ttl={}, hops={}, len={})",
            self.message_type,
            self.guid,
            self.ttl,
            self.hops,
            self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        let table = [
            (MessageType::Ping, 0x00),
            (MessageType::Pong, 0x01),
            (MessageType::Bye, 0x02),
            (MessageType::Push, 0x40),
            (MessageType::Query, 0x80),
            (MessageType::QueryHit, 0x81),
        ];
        for (kind, code) in table {
            assert_eq!(kind.code(), code);
            assert_eq!(MessageType::from(code), kind);
        }
    }

    #[test]
    fn test_unknown_type_keeps_code() {
        let kind = MessageType::from(0x31);
        assert_eq!(kind, MessageType::Unknown(0x31));
        assert_eq!(kind.code(), 0x31);
        assert_eq!(kind.to_string(), "UNKNOWN(0x31)");
    }

    #[test]
    fn test_guid_display() {
        let guid = Guid::from_bytes([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ]);
        assert_eq!(guid.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
    }

    #[test]
    fn test_guid_parse_lossy() {
        let guid = Guid::random();
        assert_eq!(Guid::parse_lossy(guid.as_bytes()), guid);

        let short = Guid::parse_lossy(&[1, 2, 3]);
        assert!(short.is_nil());
    }

    #[test]
    fn test_random_guids_differ() {
        assert_ne!(Guid::random(), Guid::random());
    }

    #[test]
    fn test_ping_shape() {
        let guid = Guid::random();
        let ping = Message::ping(guid, 5);
        assert_eq!(ping.guid, guid);
        assert_eq!(ping.message_type, MessageType::Ping);
        assert_eq!(ping.ttl, 5);
        assert_eq!(ping.hops, 0);
        assert_eq!(ping.declared_len, 0);
        assert!(ping.payload.is_empty());
    }
}
