//! The message envelope: an opaque, fingerprinted payload
//! that crosses a mailbox or channel boundary.

mod envelope;
mod serializer;

pub(crate) use envelope::create_internal_message;
pub use envelope::{create_message, decode, try_decode, Envelope};
pub use serializer::{Bincode, CanSerialize, DecodeError, EncodeError};

#[cfg(feature = "json_serializer")]
pub use serializer::Json;

#[cfg(feature = "msgpack_serializer")]
pub use serializer::MessagePack;
