use crate::error::StrandError;
use crate::fingerprint::Fingerprint;

use super::serializer::{Bincode, CanSerialize};

/// `{fingerprint, encoding}`: the wire/in-process shape every
/// message takes once it leaves a typed Rust value. The fingerprint IS
/// equality over types for routing; the payload is decoded only by a
/// receiver that already knows, from the fingerprint, which type to decode
/// into.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub fingerprint: Fingerprint,
    pub bytes: Vec<u8>,
}

/// Produces an envelope from any serializable value, capturing its type
/// fingerprint and a payload encoding.
///
/// Returns `Err` rather than panicking if `value`'s `Serialize` impl fails:
/// the spec defines `send`/`nsend`/`say` as returning unit with no error
/// channel, so a fallible user type must not be able to panic the sending
/// process. Callers on that path dead-letter (log and drop) on `Err`; see
/// [`create_internal_message`] for the framework's own reply/notification
/// types, which are assumed infallible to encode.
pub fn create_message<T>(value: &T) -> Result<Envelope, StrandError>
where
    Bincode: CanSerialize<T>,
{
    Ok(Envelope {
        fingerprint: Fingerprint::of::<T>(),
        bytes: Bincode::encode(value)?,
    })
}

/// Like [`create_message`], for the controller's own reply and notification
/// types (`WhereIsReply`, `SpawnReply`, `MonitorNotification`, ...). These
/// are plain derived-`Serialize` structs over data we construct ourselves,
/// so a failure here is an implementation bug rather than a user-reportable
/// error, and is kept as a panic rather than threaded through every
/// internal call site.
pub(crate) fn create_internal_message<T>(value: &T) -> Envelope
where
    Bincode: CanSerialize<T>,
{
    create_message(value).expect("framework-internal reply/notification types are infallible to encode")
}

/// Produces a typed value from an envelope. Defined only when
/// `envelope.fingerprint == Fingerprint::of::<T>()`; panics otherwise, for
/// callers (like `expect`) that have already matched on the fingerprint and
/// treat a mismatch as an invariant violation rather than a reportable error.
pub fn decode<T>(envelope: &Envelope) -> T
where
    Bincode: CanSerialize<T>,
{
    try_decode(envelope).expect("fingerprint was checked by the caller")
}

/// Same as [`decode`], but returns a `Result` instead of panicking on a
/// fingerprint mismatch or decode failure. Used by `unClosure` and other
/// call sites that must surface a user-visible error instead of
/// treating the mismatch as an implementation bug.
pub fn try_decode<T>(envelope: &Envelope) -> Result<T, StrandError>
where
    Bincode: CanSerialize<T>,
{
    let expected = Fingerprint::of::<T>();
    if envelope.fingerprint != expected {
        return Err(StrandError::FingerprintMismatch(envelope.fingerprint));
    }
    Bincode::decode(&envelope.bytes).map_err(StrandError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let envelope = create_message(&"hi".to_string()).unwrap();
        let value: String = decode(&envelope);
        assert_eq!(value, "hi");
    }

    #[test]
    fn mismatched_fingerprint_is_rejected() {
        let envelope = create_message(&42i32).unwrap();
        let result: Result<String, _> = try_decode(&envelope);
        assert!(matches!(result, Err(StrandError::FingerprintMismatch(_))));
    }
}
