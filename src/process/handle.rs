//! `Process<M>`: a typed, cloneable handle to a spawned process, carrying
//! only a `ProcessId` plus a reference to the node that can look its
//! mailbox up.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::id::{Identifier, ProcessId};
use crate::message::{create_message, Bincode, CanSerialize};
use crate::node::NodeHandle;
use crate::process::context::current_process;

/// A handle to a process that receives messages of type `M`.
///
/// Cloning a `Process<M>` is cheap — it carries only an id and a reference
/// to its node.
pub struct Process<M> {
    pub(crate) pid: ProcessId,
    pub(crate) node: Arc<NodeHandle>,
    _marker: PhantomData<fn(M)>,
}

impl<M> Process<M> {
    pub(crate) fn new(pid: ProcessId, node: Arc<NodeHandle>) -> Self {
        Self {
            pid,
            node,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.pid
    }

    /// Sends `message` to this process. Silently dropped if the process
    /// has already died.
    pub fn send(&self, message: M)
    where
        Bincode: CanSerialize<M>,
    {
        match create_message(&message) {
            Ok(envelope) => self.node.deliver(self.pid, envelope),
            Err(error) => {
                tracing::error!(%error, pid = ?self.pid, "dropping send: failed to encode message")
            }
        }
    }

    /// Links this process with the calling process.
    pub fn link(&self) {
        let origin = current_process(|ctx| ctx.pid);
        self.node
            .send_control(crate::node::signal::ControlSignal::Link {
                origin,
                target: Identifier::Process(self.pid),
            });
    }

    /// Removes a link between this process and the calling process.
    /// Fire-and-forget from the caller's perspective; use
    /// [`crate::primitives::unlink`] for the acknowledged form.
    pub fn unlink(&self) {
        let origin = current_process(|ctx| ctx.pid);
        self.node
            .send_control(crate::node::signal::ControlSignal::Unlink {
                origin,
                target: Identifier::Process(self.pid),
            });
    }
}

impl<M> Clone for Process<M> {
    fn clone(&self) -> Self {
        Self {
            pid: self.pid,
            node: self.node.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for Process<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process").field("pid", &self.pid).finish()
    }
}

impl<M> PartialEq for Process<M> {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl<M> Eq for Process<M> {}
