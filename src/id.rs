//! Identity types: [`NodeId`], [`ProcessId`], [`SendPortId`], [`MonitorRef`],
//! [`SpawnRef`] and the [`Identifier`] union a monitor/link can target.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::tag::Tag;

/// Network-unique identity of a node (conceptually `host:port`, but opaque
/// here since the transport byte-framing is out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// A node id derived from a process-wide counter, suitable for tests and
    /// single-node embeddings. Real deployments should derive `NodeId` from
    /// the transport's own addressing (host:port or equivalent) instead.
    pub fn next_local() -> NodeId {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A per-node monotonic integer identifying a process. Total order within a
/// node; paired with [`NodeId`] it is globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalProcessId(pub u64);

/// `{NodeId, LocalProcessId}` — globally unique process address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId {
    pub node: NodeId,
    pub local: LocalProcessId,
}

impl ProcessId {
    pub fn new(node: NodeId, local: LocalProcessId) -> Self {
        Self { node, local }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}.{}>", self.node.0, self.local.0)
    }
}

/// `{owning ProcessId, local channel index}` — identifies one [`crate::channel::TypedChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SendPortId {
    pub owner: ProcessId,
    pub index: u64,
}

/// The tagged union a [`MonitorRef`]/link can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Identifier {
    Process(ProcessId),
    Node(NodeId),
    SendPort(SendPortId),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Process(pid) => write!(f, "{pid}"),
            Identifier::Node(nid) => write!(f, "{nid}"),
            Identifier::SendPort(spid) => write!(f, "<port {}.{}>", spid.owner, spid.index),
        }
    }
}

/// `{Identifier, per-process monotonic counter}` correlating a `Monitor`
/// control signal with the death notification it eventually produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonitorRef {
    pub target: Identifier,
    pub tag: Tag,
}

/// Correlates a `Spawn` control signal with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnRef(pub Tag);
