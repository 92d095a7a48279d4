//! The node controller's wire protocol: the `ControlSignal`s it accepts,
//! and the reply message shapes it sends back into a mailbox to correlate
//! with a synchronous primitive. Each reply is a concrete type rather than
//! a raw tuple, so a `receive!`/`expect` call can select on it by type.

use serde::{Deserialize, Serialize};

use crate::id::{Identifier, MonitorRef, NodeId, ProcessId, SpawnRef};
use crate::message::Envelope;
use crate::process::exit::ExitReason;
use crate::tag::Tag;

/// A request to resolve a statically-known entry point plus a serialized
/// environment, handed to a [`crate::closure::ClosureResolver`].
#[derive(Debug, Clone)]
pub struct ClosureRequest {
    pub label: String,
    pub env: Vec<u8>,
}

/// One entry in the node controller's ordered signal stream.
#[derive(Debug)]
pub enum ControlSignal {
    Monitor {
        watcher: ProcessId,
        target: Identifier,
        tag: Tag,
    },
    Unmonitor {
        origin: ProcessId,
        mref: MonitorRef,
    },
    Link {
        origin: ProcessId,
        target: Identifier,
    },
    Unlink {
        origin: ProcessId,
        target: Identifier,
    },
    Register {
        label: String,
        pid: Option<ProcessId>,
    },
    WhereIs {
        requester: ProcessId,
        label: String,
    },
    NamedSend {
        label: String,
        envelope: Envelope,
    },
    Spawn {
        requester: ProcessId,
        spawn_ref: SpawnRef,
        closure: ClosureRequest,
    },
    /// A process on this node finished running, for any reason. Emitted by
    /// the process task wrapper (`src/process/spawn.rs`), never by user
    /// code directly — it is how process death reaches the controller, the
    /// sole mutator of the supervision graph and registry.
    ProcessExited {
        pid: ProcessId,
        reason: ExitReason,
    },
    /// Delivered by a [`crate::node::transport::Transport`] impl when it
    /// determines a remote node is unreachable. Modeled as the death of
    /// every identifier on that node.
    NodeUnreachable {
        node: NodeId,
    },
    /// Cross-node request to kill a local process, used to propagate link
    /// death across a [`crate::node::transport::Transport`] — link
    /// termination is symmetric even across nodes.
    Kill {
        pid: ProcessId,
        reason: ExitReason,
    },
}

/// Delivered to a monitor's watcher on the target's death.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorNotification {
    pub mref: MonitorRef,
    pub reason: ExitReason,
}

/// Acknowledges an `Unmonitor` signal. Always emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidUnmonitor(pub MonitorRef);

/// Acknowledges an `Unlink` signal, keyed on the identifier variant that was
/// unlinked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidUnlink(pub Identifier);

/// Reply to a `WhereIs` signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhereIsReply {
    pub label: String,
    pub pid: Option<ProcessId>,
}

/// Reply to a `Spawn` signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnReply {
    pub spawn_ref: SpawnRef,
    pub pid: Option<ProcessId>,
}
