use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Message, MAX_MESSAGE_SIZE};

/// Length of the frame header: 4-byte big-endian length, 1-byte tag.
pub const HEADER_LEN: usize = 5;

/// Codec for encoding/decoding cask protocol messages.
pub struct CaskCodec;

impl CaskCodec {
    /// Encode a message with framing: [4 bytes len][1 byte tag][payload]
    ///
    /// `len` counts the tag byte and the payload.
    pub fn encode<M: Message>(msg: &M) -> ProtocolResult<Vec<u8>> {
        let payload = Self::encode_payload(msg)?;
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(msg.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode a framed message. Returns (message, bytes_consumed).
    ///
    /// Trailing bytes after the frame are left for the caller. The frame tag
    /// must agree with the decoded message.
    pub fn decode<M: Message>(data: &[u8]) -> ProtocolResult<(M, usize)> {
        let Some((header, rest)) = data.split_first_chunk::<4>() else {
            return Err(ProtocolError::FramingError("too short".into()));
        };
        let len = u32::from_be_bytes(*header) as usize;
        if len < 1 {
            return Err(ProtocolError::FramingError("zero-length frame".into()));
        }
        if len - 1 > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: len - 1,
                max: MAX_MESSAGE_SIZE,
            });
        }
        if rest.len() < len {
            return Err(ProtocolError::FramingError(format!(
                "incomplete: have {}, need {}",
                data.len(),
                4 + len
            )));
        }
        let tag = rest[0];
        let msg: M = Self::decode_payload(&rest[1..len])?;
        if msg.type_tag() != tag {
            return Err(ProtocolError::InvalidMessageType(tag));
        }
        Ok((msg, 4 + len))
    }

    /// Encode payload only (no framing).
    pub fn encode_payload<M: Message>(msg: &M) -> ProtocolResult<Vec<u8>> {
        bincode::serialize(msg).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Decode payload only (no framing).
    pub fn decode_payload<M: Message>(data: &[u8]) -> ProtocolResult<M> {
        bincode::deserialize(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::*;
    use cask_crypto::digest;
    use cask_store::Database;

    fn all_requests() -> Vec<Request> {
        vec![
            Request::Add { payload: b"hello".to_vec() },
            Request::Get { db: Database::Content, id: digest(b"x").into_inner() },
            Request::Put { pointer: "p".into(), content: "c".into() },
            Request::Remove { db: Database::Pointer, id: String::new() },
            Request::Find { db: Database::Content, prefix: "ab".into() },
            Request::Contains { db: Database::Pointer, id: "z".into() },
        ]
    }

    fn all_replies() -> Vec<Reply> {
        vec![
            Reply::Added { id: digest(b"x") },
            Reply::Payload { payload: vec![0, 1, 2] },
            Reply::Previous { content: None },
            Reply::Removed { payload: Some(vec![9]) },
            Reply::Identifiers { ids: vec![digest(b"a"), digest(b"b")] },
            Reply::Contains { present: true },
            Reply::error(codes::BAD_REQUEST, "bad"),
        ]
    }

    #[test]
    fn requests_survive_framing() {
        for req in all_requests() {
            let encoded = CaskCodec::encode(&req).unwrap();
            let (decoded, consumed): (Request, usize) = CaskCodec::decode(&encoded).unwrap();
            assert_eq!(consumed, encoded.len());
            assert_eq!(decoded, req);
        }
    }

    #[test]
    fn replies_survive_framing() {
        for reply in all_replies() {
            let encoded = CaskCodec::encode(&reply).unwrap();
            let (decoded, _): (Reply, usize) = CaskCodec::decode(&encoded).unwrap();
            assert_eq!(decoded, reply);
        }
    }

    #[test]
    fn type_tags_unique() {
        let mut tags: Vec<u8> = all_requests().iter().map(|m| m.type_tag()).collect();
        tags.extend(all_replies().iter().map(|m| m.type_tag()));
        let len = tags.len();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), len, "type tags should be unique");
    }

    #[test]
    fn frame_header_layout() {
        let req = Request::Add { payload: vec![] };
        let encoded = CaskCodec::encode(&req).unwrap();
        let len = u32::from_be_bytes(encoded[0..4].try_into().unwrap()) as usize;
        assert_eq!(len + 4, encoded.len());
        assert_eq!(encoded[4], 1);
    }

    #[test]
    fn decode_leaves_trailing_bytes() {
        let mut data = CaskCodec::encode(&Reply::Contains { present: false }).unwrap();
        let frame_len = data.len();
        data.extend_from_slice(&[0xde, 0xad]);
        let (_, consumed): (Reply, usize) = CaskCodec::decode(&data).unwrap();
        assert_eq!(consumed, frame_len);
    }

    #[test]
    fn decode_truncated() {
        let err = CaskCodec::decode::<Request>(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));

        let encoded = CaskCodec::encode(&Request::Add { payload: vec![1; 10] }).unwrap();
        let err = CaskCodec::decode::<Request>(&encoded[..encoded.len() - 1]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_zero_length() {
        let data = [0u8, 0, 0, 0, 0]; // length = 0
        let err = CaskCodec::decode::<Request>(&data).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_oversized_header() {
        let data = [0xffu8, 0xff, 0xff, 0xff, 1];
        let err = CaskCodec::decode::<Request>(&data).unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
    }

    #[test]
    fn mismatched_tag_is_rejected() {
        let mut encoded = CaskCodec::encode(&Request::Find {
            db: Database::Content,
            prefix: String::new(),
        })
        .unwrap();
        encoded[4] = 2;
        let err = CaskCodec::decode::<Request>(&encoded).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessageType(2)));
    }

    #[test]
    fn reply_frame_is_not_a_request() {
        let encoded = CaskCodec::encode(&Reply::Contains { present: true }).unwrap();
        assert!(CaskCodec::decode::<Request>(&encoded).is_err());
    }
}
