//! Encoder/decoder port.
//!
//! # Design
//! A `Codec` converts between bytes and a `serde_json::Value` tree, which
//! keeps the trait object-safe so one codec can be shared by every request
//! in a configuration. Typed payloads cross into the tree through `serde`.
//! `JsonCodec` is the default; custom codecs can rewrite keys, pretty-print,
//! or reject payloads before they reach the wire.

use std::any::{Any, TypeId};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::response::NoContent;

/// Errors raised by a `Codec`.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Converts payload trees to bytes and back.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<serde_json::Value, CodecError>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> Result<serde_json::Value, CodecError> {
        serde_json::from_slice(data).map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}

/// Serialize a typed model through `codec`.
pub fn encode_model<T: Serialize + ?Sized>(codec: &dyn Codec, value: &T) -> Result<Vec<u8>, CodecError> {
    let tree = serde_json::to_value(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
    codec.encode(&tree)
}

/// Decode a typed model through `codec`.
///
/// When `T` is `NoContent` the bytes are never looked at and the marker value
/// is returned, whatever the body holds.
pub fn decode_model<T: DeserializeOwned + 'static>(codec: &dyn Codec, data: &[u8]) -> Result<T, CodecError> {
    if TypeId::of::<T>() == TypeId::of::<NoContent>() {
        let marker: Box<dyn Any> = Box::new(NoContent);
        if let Ok(value) = marker.downcast::<T>() {
            return Ok(*value);
        }
    }
    let tree = codec.decode(data)?;
    serde_json::from_value(tree).map_err(|e| CodecError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    #[test]
    fn encodes_model_as_compact_json() {
        let user = User {
            id: 123,
            name: "John Doe".to_string(),
        };
        let bytes = encode_model(&JsonCodec::new(), &user).unwrap();
        assert_eq!(bytes, br#"{"id":123,"name":"John Doe"}"#);
    }

    #[test]
    fn preserves_field_order() {
        #[derive(Serialize)]
        struct Ordered {
            zeta: u8,
            alpha: u8,
        }
        let bytes = encode_model(&JsonCodec::new(), &Ordered { zeta: 1, alpha: 2 }).unwrap();
        assert_eq!(bytes, br#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn pretty_codec_indents() {
        let bytes = encode_model(&JsonCodec::pretty(), &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn decodes_typed_model() {
        let user: User = decode_model(&JsonCodec::new(), br#"{"id":7,"name":"Ada"}"#).unwrap();
        assert_eq!(
            user,
            User {
                id: 7,
                name: "Ada".to_string()
            }
        );
    }

    #[test]
    fn decode_reports_malformed_input() {
        let err = decode_model::<User>(&JsonCodec::new(), b"{ invalid json").unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)));
    }

    #[test]
    fn decode_reports_shape_mismatch() {
        let err = decode_model::<User>(&JsonCodec::new(), br#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)));
    }

    #[test]
    fn no_content_skips_decoding() {
        let codec = JsonCodec::new();
        assert_eq!(decode_model::<NoContent>(&codec, b"").unwrap(), NoContent);
        assert_eq!(decode_model::<NoContent>(&codec, b"\x00garbage{").unwrap(), NoContent);
    }

    #[test]
    fn unit_type_is_not_the_no_content_marker() {
        assert!(decode_model::<()>(&JsonCodec::new(), b"").is_err());
    }
}
