//! The transport contract: framed delivery of a controller message or
//! message envelope between nodes. The network layer itself is assumed
//! reliable and ordered per (sender, receiver) and lives outside this
//! crate; this module only defines the trait it consumes, plus one
//! in-process test double, [`LocalTransport`], good enough to exercise the
//! remote-facing primitives (`monitor_node`, `whereis_remote`, cross-node
//! `nsend`) without a real network stack.
//!
//! Cross-node `SendPort<T>` delivery is not part of this trait: this crate
//! does not implement a remote `SendPort<T>` (see `src/channel/sender.rs`),
//! so there is nothing for a transport to carry there.

use std::sync::Arc;

use dashmap::DashMap;

use crate::id::{NodeId, ProcessId};
use crate::message::Envelope;
use crate::node::signal::ControlSignal;
use crate::node::NodeHandle;

/// Delivers controller signals and message envelopes to a remote node.
///
/// Implementations are expected to be reliable and ordered per
/// (sender, receiver) — the crate's own ordering guarantees assume this of
/// whatever sits behind the trait.
pub trait Transport: Send + Sync {
    fn send_control(&self, target: NodeId, signal: ControlSignal);
    fn send_envelope(&self, target: ProcessId, envelope: Envelope);
}

/// An in-process `Transport` that multiplexes several [`NodeHandle`]s inside
/// one OS process via direct channel hand-off. Test/demo scaffolding only.
#[derive(Debug, Default)]
pub struct LocalTransport {
    nodes: DashMap<NodeId, Arc<NodeHandle>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` so other nodes sharing this transport can reach it.
    pub fn register(&self, node: Arc<NodeHandle>) {
        self.nodes.insert(node.id, node);
    }
}

impl Transport for LocalTransport {
    fn send_control(&self, target: NodeId, signal: ControlSignal) {
        match self.nodes.get(&target) {
            Some(node) => node.send_control(signal),
            None => tracing::warn!(?target, "LocalTransport: unknown node, control signal dropped"),
        }
    }

    fn send_envelope(&self, target: ProcessId, envelope: Envelope) {
        match self.nodes.get(&target.node) {
            Some(node) => node.deliver(target, envelope),
            None => tracing::warn!(?target, "LocalTransport: unknown node, envelope dropped"),
        }
    }
}
