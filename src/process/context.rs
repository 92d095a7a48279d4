//! The ambient per-process state: identity, mailbox, and the monotonic
//! counters (next channel index, next tag) a running process carries with
//! it, reachable from anywhere inside its task without threading it through
//! every call explicitly. Implemented with `tokio::task_local!`.
//!
//! Counters use `AtomicU64`/`parking_lot::Mutex` rather than `Cell`/
//! `RefCell`: although they're accessed only by the owning process's own
//! task, that task can migrate between worker threads between `.await`
//! points on tokio's multi-threaded runtime, and a `tokio::spawn`ed future
//! must be `Send` — which a `Cell`/`RefCell` field would rule out since
//! they're never `Sync`. `parking_lot`'s lock is uncontended in practice
//! (single accessing task) and is already the mailbox's own lock primitive.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::id::ProcessId;
use crate::mailbox::Mailbox;
use crate::node::NodeHandle;
use crate::tag::{Tag, TagCounter};

tokio::task_local! {
    pub(crate) static CURRENT_PROCESS: Arc<ProcessContext>;
}

/// Borrows the calling task's [`ProcessContext`].
///
/// # Panics
///
/// Panics if called outside a task spawned by [`crate::process::spawn::spawn`]
/// or [`crate::process::spawn::spawn_link`] — every primitive in
/// [`crate::primitives`] relies on this.
pub fn current_process<R>(f: impl FnOnce(&ProcessContext) -> R) -> R {
    CURRENT_PROCESS.with(|ctx| f(ctx))
}

/// Per-process state: identity, the owning node, the mailbox, and the
/// monotonic counters used to mint local channel indices and tags.
#[derive(Debug)]
pub struct ProcessContext {
    pub node: Arc<NodeHandle>,
    pub pid: ProcessId,
    pub mailbox: Arc<Mailbox>,
    channel_index: AtomicU64,
    tags: Mutex<TagCounter>,
    /// Indices of channels this process has created and not yet forgotten.
    /// A `ReceivePort` is owned directly by user code rather than stashed
    /// here, so this set only needs to answer "did this process ever open
    /// channel N" for diagnostics.
    live_channels: Mutex<HashSet<u64>>,
}

impl ProcessContext {
    pub(crate) fn new(node: Arc<NodeHandle>, pid: ProcessId, mailbox: Arc<Mailbox>) -> Self {
        Self {
            node,
            pid,
            mailbox,
            channel_index: AtomicU64::new(0),
            tags: Mutex::new(TagCounter::new()),
            live_channels: Mutex::new(HashSet::new()),
        }
    }

    /// Test/demo helper: builds a context with a freshly minted pid on
    /// `node`, for exercising mailbox/channel/primitive code without a real
    /// `spawn`.
    #[cfg(test)]
    pub(crate) fn new_for_test(node: Arc<NodeHandle>) -> Self {
        let pid = node.fresh_pid();
        let mailbox = Arc::new(Mailbox::new());
        Self::new(node, pid, mailbox)
    }

    pub(crate) fn next_channel_index(&self) -> u64 {
        let index = self.channel_index.fetch_add(1, Ordering::Relaxed);
        self.live_channels.lock().insert(index);
        index
    }

    pub(crate) fn next_tag(&self) -> Tag {
        self.tags.lock().next()
    }
}
