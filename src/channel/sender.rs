//! The writable half of a typed channel: a cheap, cloneable handle wrapping
//! a channel id and an `mpsc` sender. Cross-node delivery of a `SendPort` is
//! out of scope (no transport is wired for it by default), so unlike a
//! process handle this one does not implement `Serialize`/`Deserialize`.

use tokio::sync::mpsc;

use crate::id::SendPortId;

/// The writable half of a typed channel.
///
/// Cloning a `SendPort` is cheap and unlimited — any number of holders may
/// write concurrently; only the messages from a single sender are ordered
/// relative to each other (matching `mpsc::UnboundedSender`'s own
/// guarantee).
#[derive(Debug)]
pub struct SendPort<T> {
    id: SendPortId,
    sender: mpsc::UnboundedSender<T>,
}

impl<T> SendPort<T> {
    pub(crate) fn new(id: SendPortId, sender: mpsc::UnboundedSender<T>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> SendPortId {
        self.id
    }

    /// Enqueues `value` on this port. A port whose `ReceivePort` has been
    /// dropped silently discards the value, the same no-op rule a plain
    /// process mailbox follows when its owner is already dead.
    pub fn send(&self, value: T) {
        let _ = self.sender.send(value);
    }
}

impl<T> Clone for SendPort<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
        }
    }
}
