//! Error kinds.
//!
//! Most synchronous primitives in this crate are defined to always complete
//! (unmonitor/unlink acks are idempotent) and so stay infallible. The
//! handful of operations that can genuinely fail — resolving a closure,
//! decoding an envelope against the wrong type, observing a terminated
//! process through `catch` — return `Result<_, StrandError>`.

use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::process::ExitReason;

#[derive(Error, Debug)]
pub enum StrandError {
    /// `unClosure` was asked to resolve a label the closure resolver doesn't
    /// know about.
    #[error("no closure registered under label {0:?}")]
    ClosureNotFound(String),

    /// The value the closure resolver produced doesn't fingerprint as the
    /// caller expected.
    #[error("closure resolved to the wrong type: expected fingerprint {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// The target process's mailbox has already been torn down. Sends to a
    /// dead mailbox are normally a silent drop, mirroring Erlang — this is
    /// surfaced only where the caller explicitly asked for a `Result`, e.g.
    /// `try_send`.
    #[error("mailbox of {0} is closed")]
    MailboxClosed(crate::id::ProcessId),

    /// Bubbled up through `catch`: the wrapped computation's process boundary
    /// recorded an exit instead of returning normally.
    #[error("process terminated: {0:?}")]
    Terminated(ExitReason),

    /// A payload's fingerprint didn't decode to any type the decoder was
    /// asked about.
    #[error("envelope fingerprint {0:?} does not match the expected type")]
    FingerprintMismatch(Fingerprint),

    #[error("failed to encode/decode message: {0}")]
    Codec(#[from] bincode::Error),

    #[error("failed to decode message: {0}")]
    Decode(String),

    /// A value's `Serialize` impl failed. The `send`/`nsend`/`say` family
    /// dead-letters (logs and drops) on this rather than propagate it, since
    /// those primitives are defined to return unit with no error channel.
    #[error("failed to encode message: {0}")]
    Encode(String),
}
