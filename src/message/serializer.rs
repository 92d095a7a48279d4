//! Pluggable message codecs.
//!
//! A `CanSerialize<M>` trait with a default `Bincode` impl, plus optional
//! `Json`/`MessagePack` impls behind feature flags. Encoding writes straight
//! into an owned `Vec<u8>` — there is no host boundary to cross.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("serialization to Bincode failed: {0}")]
    Bincode(#[from] bincode::Error),
    #[cfg(feature = "json_serializer")]
    #[error("serialization to JSON failed: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "msgpack_serializer")]
    #[error("serialization to MessagePack failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("deserialization from Bincode failed: {0}")]
    Bincode(#[from] bincode::Error),
    #[cfg(feature = "json_serializer")]
    #[error("deserialization from JSON failed: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "msgpack_serializer")]
    #[error("deserialization from MessagePack failed: {0}")]
    MessagePack(#[from] rmp_serde::decode::Error),
}

impl From<DecodeError> for crate::error::StrandError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Bincode(e) => crate::error::StrandError::Codec(e),
            #[cfg(feature = "json_serializer")]
            DecodeError::Json(_) => crate::error::StrandError::Decode(err.to_string()),
            #[cfg(feature = "msgpack_serializer")]
            DecodeError::MessagePack(_) => crate::error::StrandError::Decode(err.to_string()),
        }
    }
}

impl From<EncodeError> for crate::error::StrandError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Bincode(e) => crate::error::StrandError::Codec(e),
            #[cfg(feature = "json_serializer")]
            EncodeError::Json(_) => crate::error::StrandError::Encode(err.to_string()),
            #[cfg(feature = "msgpack_serializer")]
            EncodeError::MessagePack(_) => crate::error::StrandError::Encode(err.to_string()),
        }
    }
}

/// A codec able to turn `M` into bytes and back.
///
/// The generic parameter lets one serializer type (e.g. [`Bincode`]) serve
/// many message types `M`, while still letting each `M` constrain which
/// serializers it's compatible with (for instance, only `serde`-enabled
/// types work with `Bincode`).
pub trait CanSerialize<M> {
    fn encode(message: &M) -> Result<Vec<u8>, EncodeError>;
    fn decode(bytes: &[u8]) -> Result<M, DecodeError>;
}

/// The default codec: `serde` + `bincode`. Deterministic and compact.
#[derive(Debug, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct Bincode;

impl<M> CanSerialize<M> for Bincode
where
    M: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(message: &M) -> Result<Vec<u8>, EncodeError> {
        bincode::serialize(message).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<M, DecodeError> {
        bincode::deserialize(bytes).map_err(DecodeError::from)
    }
}

#[cfg(feature = "json_serializer")]
#[derive(Debug, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct Json;

#[cfg(feature = "json_serializer")]
impl<M> CanSerialize<M> for Json
where
    M: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(message: &M) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(message).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<M, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError::from)
    }
}

#[cfg(feature = "msgpack_serializer")]
#[derive(Debug, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct MessagePack;

#[cfg(feature = "msgpack_serializer")]
impl<M> CanSerialize<M> for MessagePack
where
    M: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(message: &M) -> Result<Vec<u8>, EncodeError> {
        rmp_serde::to_vec(message).map_err(EncodeError::from)
    }

    fn decode(bytes: &[u8]) -> Result<M, DecodeError> {
        rmp_serde::from_slice(bytes).map_err(DecodeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bincode_roundtrip() {
        let bytes = Bincode::encode(&42i32).unwrap();
        let value: i32 = Bincode::decode(&bytes).unwrap();
        assert_eq!(value, 42);
    }
}
