//! The node: the owning scope for a set of local processes, their
//! mailboxes, the supervision graph, the name registry, and the controller
//! task that serializes mutation of the latter two.

pub mod controller;
pub mod graph;
pub mod registry;
pub mod signal;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::closure::ClosureResolver;
use crate::config::NodeConfig;
use crate::id::{LocalProcessId, NodeId, ProcessId};
use crate::mailbox::Mailbox;
use crate::message::Envelope;
use crate::process::exit::ExitReason;
use graph::SupervisionGraph;
use registry::Registry;
use signal::ControlSignal;
use transport::Transport;

/// A local process's bookkeeping entry as seen from outside its own task:
/// the mailbox other processes enqueue onto, and a kill switch the
/// controller uses to propagate link death into the process's running task.
pub(crate) struct ProcessEntry {
    pub mailbox: Arc<Mailbox>,
    pub kill: mpsc::UnboundedSender<ExitReason>,
}

/// Owns everything local to one node: its live processes, the control
/// channel feeding the node controller task, the supervision graph, the
/// name registry, and (optionally) a transport for reaching other nodes.
pub struct NodeHandle {
    pub id: NodeId,
    config: NodeConfig,
    processes: DashMap<ProcessId, Arc<ProcessEntry>>,
    control_tx: mpsc::UnboundedSender<ControlSignal>,
    graph: Arc<SupervisionGraph>,
    registry: Arc<Registry>,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    closure_resolver: RwLock<Option<Arc<dyn ClosureResolver>>>,
    next_local: AtomicU64,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.id)
            .field("processes", &self.processes.len())
            .finish()
    }
}

impl NodeHandle {
    /// Builds a node and starts its controller task.
    pub fn new(config: NodeConfig) -> Arc<NodeHandle> {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let node = Arc::new(NodeHandle {
            id: config.node_id,
            config,
            processes: DashMap::new(),
            control_tx,
            graph: Arc::new(SupervisionGraph::new()),
            registry: Arc::new(Registry::new()),
            transport: RwLock::new(None),
            closure_resolver: RwLock::new(None),
            next_local: AtomicU64::new(1),
        });
        controller::spawn(node.clone(), control_rx);
        node
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        *self.transport.write() = Some(transport);
    }

    pub(crate) fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.read().clone()
    }

    pub fn set_closure_resolver(&self, resolver: Arc<dyn ClosureResolver>) {
        *self.closure_resolver.write() = Some(resolver);
    }

    pub(crate) fn closure_resolver(&self) -> Option<Arc<dyn ClosureResolver>> {
        self.closure_resolver.read().clone()
    }

    pub(crate) fn graph(&self) -> &Arc<SupervisionGraph> {
        &self.graph
    }

    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Mints a fresh, node-unique `ProcessId` without registering a process
    /// under it. Used by `spawn` (which registers immediately after) and by
    /// tests that need a pid with no backing task.
    pub(crate) fn fresh_pid(&self) -> ProcessId {
        let local = self.next_local.fetch_add(1, Ordering::Relaxed);
        ProcessId::new(self.id, LocalProcessId(local))
    }

    pub(crate) fn register_process(&self, pid: ProcessId, entry: Arc<ProcessEntry>) {
        self.processes.insert(pid, entry);
    }

    pub(crate) fn remove_process(&self, pid: ProcessId) {
        self.processes.remove(&pid);
    }

    pub(crate) fn has_process(&self, pid: ProcessId) -> bool {
        self.processes.contains_key(&pid)
    }

    pub(crate) fn mailbox_of(&self, pid: ProcessId) -> Option<Arc<Mailbox>> {
        self.processes.get(&pid).map(|entry| entry.mailbox.clone())
    }

    pub(crate) fn kill_process(&self, pid: ProcessId, reason: ExitReason) {
        if let Some(entry) = self.processes.get(&pid) {
            let _ = entry.kill.send(reason);
        }
    }

    pub fn send_control(&self, signal: ControlSignal) {
        let _ = self.control_tx.send(signal);
    }

    /// Delivers `envelope` to `pid`'s mailbox, locally if `pid` lives on
    /// this node, via the configured transport otherwise. Silently dropped
    /// if the target is dead and no transport reaches it.
    pub fn deliver(&self, pid: ProcessId, envelope: Envelope) {
        if pid.node == self.id {
            match self.mailbox_of(pid) {
                Some(mailbox) => {
                    if let Some(watermark) = self.config.mailbox_backpressure_warn_at {
                        if mailbox.len() >= watermark {
                            tracing::warn!(?pid, len = mailbox.len(), "mailbox past warn watermark");
                        }
                    }
                    mailbox.enqueue(envelope);
                }
                None => tracing::debug!(?pid, "delivery to dead mailbox dropped"),
            }
        } else if let Some(transport) = self.transport() {
            transport.send_envelope(pid, envelope);
        } else {
            tracing::warn!(?pid, "no transport configured, remote delivery dropped");
        }
    }
}
