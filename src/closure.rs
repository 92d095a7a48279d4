//! The closure resolver contract: an opaque resolver mapping a label plus
//! environment bytes to a typed value or a process entry point. Consumed,
//! not implemented, by this crate — a real implementation requires a
//! static symbol table built by the embedding application's own build,
//! which is outside this crate's concerns.

use std::future::Future;
use std::pin::Pin;

use crate::error::StrandError;
use crate::message::Envelope;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Resolves a `(label, environment bytes)` pair to either a process entry
/// point (used by remote `Spawn`) or an arbitrary typed value (used by
/// `unClosure`'s general deserialization form).
pub trait ClosureResolver: Send + Sync {
    /// Resolves `label` to a statically-known entry point, handing it the
    /// raw environment bytes to decode however it needs; the returned
    /// future becomes a newly spawned process's computation.
    fn resolve_entry(&self, label: &str, env: &[u8]) -> Result<BoxFuture, StrandError>;

    /// Resolves `label` + `env` into a fingerprinted envelope, for callers
    /// that want a typed value rather than a process entry point.
    fn resolve_value(&self, label: &str, env: &[u8]) -> Result<Envelope, StrandError>;
}

/// `unClosure<T>`: resolves `label` through `resolver`, then decodes the
/// result as `T`. A missing label or a fingerprint mismatch on the resolved
/// value both produce a user-visible [`StrandError`] — one of the few
/// primitives in this crate allowed to fail.
pub fn un_closure<T>(
    resolver: &dyn ClosureResolver,
    label: &str,
    env: &[u8],
) -> Result<T, StrandError>
where
    crate::message::Bincode: crate::message::CanSerialize<T>,
{
    let envelope = resolver.resolve_value(label, env)?;
    crate::message::try_decode::<T>(&envelope)
}
