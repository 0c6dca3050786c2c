//! Binary message codec.
//!
//! Messages are framed as:
//! - 16 bytes: GUID
//! - 1 byte: descriptor type
//! - 1 byte: TTL
//! - 1 byte: hops
//! - 3 bytes: payload length, little-endian u16 followed by one reserved byte
//! - N bytes: payload
//!
//! The reserved length byte is always written as zero and ignored on read;
//! it has to stay in place so the payload starts at offset 22.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{P2pError, P2pResult};
use crate::protocol::messages::{Guid, Message, MessageType};

/// GUID size.
pub const GUID_LEN: usize = 16;

/// Size of the length field on the wire.
pub const LENGTH_FIELD_LEN: usize = 3;

/// Header size: GUID + type + TTL + hops + length field.
pub const HEADER_LEN: usize = GUID_LEN + 3 + LENGTH_FIELD_LEN;

/// Largest payload the 16-bit length can describe.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Encoder and decoder for the fixed binary header format.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageCodec;

impl MessageCodec {
    /// Create a new message codec.
    pub fn new() -> Self {
        Self
    }

    /// Append the wire form of `message` to `dst`.
    pub fn encode(&self, message: &Message, dst: &mut BytesMut) -> P2pResult<()> {
        let length = message.payload.len();
        if length > MAX_PAYLOAD_SIZE {
            return Err(P2pError::MessageTooLarge {
                size: length,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        dst.reserve(HEADER_LEN + length);
        dst.put_slice(message.guid.as_bytes());
        dst.put_u8(message.message_type.code());
        dst.put_u8(message.ttl);
        dst.put_u8(message.hops);
        dst.put_u16_le(length as u16);
        dst.put_u8(0); // reserved
        dst.put_slice(&message.payload);

        Ok(())
    }

    /// Build and encode a message with a fresh GUID.
    pub fn encode_new(
        &self,
        message_type: MessageType,
        ttl: u8,
        hops: u8,
        payload: Bytes,
    ) -> P2pResult<Bytes> {
        let mut dst = BytesMut::new();
        self.encode(&Message::new(message_type, ttl, hops, payload), &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode one message occupying all of `src`.
    ///
    /// A zero declared length gives an empty payload; any other value takes
    /// every byte after the header, whatever the declared length says.
    pub fn decode(&self, src: &[u8]) -> P2pResult<Message> {
        if src.len() < HEADER_LEN {
            return Err(P2pError::MessageTruncated { len: src.len() });
        }

        let guid = Guid::parse_lossy(&src[..GUID_LEN]);
        let message_type = MessageType::from(src[GUID_LEN]);
        let ttl = src[GUID_LEN + 1];
        let hops = src[GUID_LEN + 2];
        let declared_len = u16::from_le_bytes([src[GUID_LEN + 3], src[GUID_LEN + 4]]);

        let payload = if declared_len > 0 {
            Bytes::copy_from_slice(&src[HEADER_LEN..])
        } else {
            Bytes::new()
        };

        Ok(Message {
            guid,
            message_type,
            ttl,
            hops,
            declared_len,
            payload,
        })
    }
}

impl Message {
    /// Wire form of this message.
    pub fn encode(&self) -> P2pResult<Bytes> {
        let mut dst = BytesMut::new();
        MessageCodec::new().encode(self, &mut dst)?;
        Ok(dst.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(message: &Message) -> BytesMut {
        let mut buf = BytesMut::new();
        MessageCodec::new().encode(message, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_roundtrip_ping() {
        let codec = MessageCodec::new();
        let sent = Message::ping(Guid::random(), 5);

        let buf = encode(&sent);
        assert_eq!(buf.len(), HEADER_LEN);

        let decoded = codec.decode(&buf).unwrap();
        assert_eq!(decoded.guid.as_bytes(), sent.guid.as_bytes());
        assert_eq!(decoded.message_type, MessageType::Ping);
        assert_eq!(decoded.ttl, 5);
        assert_eq!(decoded.hops, 0);
        assert!(decoded.payload.is_empty());
        assert_eq!(decoded, sent);
        assert_eq!(sent.encode().unwrap(), buf.freeze());
    }

    #[test]
    fn test_wire_layout() {
        let guid = Guid::from_bytes([0xab; 16]);
        let payload = Bytes::from(vec![7u8; 0x0102]);
        let message = Message::with_guid(guid, MessageType::Query, 7, 2, payload);

        let buf = encode(&message);

        assert_eq!(&buf[..16], &[0xab; 16]);
        assert_eq!(buf[16], 0x80);
        assert_eq!(buf[17], 7);
        assert_eq!(buf[18], 2);
        // Little-endian length, then the reserved byte
        assert_eq!(&buf[19..22], &[0x02, 0x01, 0x00]);
        assert_eq!(buf.len(), HEADER_LEN + 0x0102);
    }

    #[test]
    fn test_payload_ignores_declared_length() {
        let codec = MessageCodec::new();
        let mut buf = encode(&Message::with_guid(
            Guid::random(),
            MessageType::Pong,
            3,
            1,
            Bytes::from_static(b"abcd"),
        ));
        // Trailing bytes beyond the declared length still land in the payload
        buf.put_slice(b"ef");

        let decoded = codec.decode(&buf).unwrap();
        assert_eq!(decoded.declared_len, 4);
        assert_eq!(&decoded.payload[..], b"abcdef");
    }

    #[test]
    fn test_zero_length_drops_trailing_bytes() {
        let codec = MessageCodec::new();
        let mut buf = encode(&Message::ping(Guid::random(), 5));
        buf.put_slice(b"junk");

        let decoded = codec.decode(&buf).unwrap();
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_reserved_byte_ignored() {
        let codec = MessageCodec::new();
        let mut buf = encode(&Message::ping(Guid::random(), 5));
        buf[21] = 0xff;

        let decoded = codec.decode(&buf).unwrap();
        assert_eq!(decoded.declared_len, 0);
    }

    #[test]
    fn test_unknown_type_decodes() {
        let codec = MessageCodec::new();
        let mut buf = encode(&Message::ping(Guid::random(), 5));
        buf[16] = 0x31;

        let decoded = codec.decode(&buf).unwrap();
        assert_eq!(decoded.message_type, MessageType::Unknown(0x31));
    }

    #[test]
    fn test_truncated() {
        let codec = MessageCodec::new();
        let result = codec.decode(&[0u8; HEADER_LEN - 1]);
        assert!(matches!(result, Err(P2pError::MessageTruncated { len: 21 })));
    }

    #[test]
    fn test_message_too_large() {
        let message = Message::with_guid(
            Guid::random(),
            MessageType::QueryHit,
            1,
            0,
            Bytes::from(vec![0u8; MAX_PAYLOAD_SIZE + 1]),
        );

        let mut buf = BytesMut::new();
        let result = MessageCodec::new().encode(&message, &mut buf);
        assert!(matches!(result, Err(P2pError::MessageTooLarge { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_new_uses_fresh_guid() {
        let codec = MessageCodec::new();
        let a = codec.encode_new(MessageType::Ping, 5, 0, Bytes::new()).unwrap();
        let b = codec.encode_new(MessageType::Ping, 5, 0, Bytes::new()).unwrap();
        assert_ne!(&a[..GUID_LEN], &b[..GUID_LEN]);
        assert_eq!(&a[GUID_LEN..], &b[GUID_LEN..]);
    }
}
