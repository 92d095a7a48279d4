//! The node controller: a single tokio task draining an ordered stream of
//! [`ControlSignal`]s and acting as the sole mutator of the supervision
//! graph and registry.

use tokio::sync::mpsc;

use crate::id::{Identifier, MonitorRef, ProcessId};
use crate::message::create_internal_message;
use crate::node::signal::{
    ClosureRequest, ControlSignal, DidUnlink, DidUnmonitor, MonitorNotification, SpawnReply,
    WhereIsReply,
};
use crate::node::NodeHandle;
use crate::process::exit::ExitReason;
use std::sync::Arc;

/// Spawns the controller task for `node`, consuming `rx`. Returns
/// immediately; the task runs until `node`'s control sender is dropped.
pub(crate) fn spawn(node: Arc<NodeHandle>, rx: mpsc::UnboundedReceiver<ControlSignal>) {
    tokio::spawn(run(node, rx));
}

async fn run(node: Arc<NodeHandle>, mut rx: mpsc::UnboundedReceiver<ControlSignal>) {
    while let Some(signal) = rx.recv().await {
        dispatch(&node, signal).await;
    }
}

#[tracing::instrument(skip(node, signal), fields(node = %node.id))]
async fn dispatch(node: &Arc<NodeHandle>, signal: ControlSignal) {
    match signal {
        ControlSignal::Monitor { watcher, target, tag } => {
            tracing::trace!(?watcher, ?target, "monitor");
            handle_monitor(node, watcher, target, tag);
        }
        ControlSignal::Unmonitor { origin, mref } => {
            tracing::trace!(?origin, ?mref, "unmonitor");
            node.graph().remove_monitor(liveness_key(mref.target), mref);
            reply(node, origin, DidUnmonitor(mref));
        }
        ControlSignal::Link { origin, target } => {
            tracing::trace!(?origin, ?target, "link");
            handle_link(node, origin, target);
        }
        ControlSignal::Unlink { origin, target } => {
            tracing::trace!(?origin, ?target, "unlink");
            node.graph()
                .remove_link(Identifier::Process(origin), liveness_key(target));
            reply(node, origin, DidUnlink(target));
        }
        ControlSignal::Register { label, pid } => {
            tracing::debug!(%label, ?pid, "register");
            match pid {
                Some(pid) => node.registry().register(label, pid),
                None => node.registry().unregister(&label),
            }
        }
        ControlSignal::WhereIs { requester, label } => {
            let pid = node.registry().whereis(&label);
            reply(node, requester, WhereIsReply { label, pid });
        }
        ControlSignal::NamedSend { label, envelope } => match node.registry().whereis(&label) {
            Some(pid) => node.deliver(pid, envelope),
            None => tracing::warn!(%label, "nsend to unknown label dropped"),
        },
        ControlSignal::Spawn {
            requester,
            spawn_ref,
            closure,
        } => handle_spawn(node, requester, spawn_ref, closure).await,
        ControlSignal::ProcessExited { pid, reason } => handle_exit(node, pid, reason),
        ControlSignal::NodeUnreachable { node: unreachable } => {
            tracing::warn!(%unreachable, "node unreachable, propagating as death");
            handle_exit_identifier(node, Identifier::Node(unreachable), ExitReason::Custom("unreachable".into()));
        }
        ControlSignal::Kill { pid, reason } => node.kill_process(pid, reason),
    }
}

/// A monitor/link against a `SendPortIdentifier` tracks the liveness of the
/// port's *owning process* — ports have no independent lifetime in this
/// model.
fn liveness_key(target: Identifier) -> Identifier {
    match target {
        Identifier::SendPort(spid) => Identifier::Process(spid.owner),
        other => other,
    }
}

fn handle_monitor(node: &Arc<NodeHandle>, watcher: ProcessId, target: Identifier, tag: crate::tag::Tag) {
    let mref = MonitorRef { target, tag };
    let key = liveness_key(target);
    if is_locally_dead(node, key) {
        notify_monitor(node, watcher, mref, ExitReason::UnknownEntity);
    } else {
        node.graph().add_monitor(key, watcher, mref);
    }
}

fn handle_link(node: &Arc<NodeHandle>, origin: ProcessId, target: Identifier) {
    let key = liveness_key(target);
    if is_locally_dead(node, key) {
        // Symmetric termination with an already-dead target: the origin
        // dies too.
        node.kill_process(origin, ExitReason::LinkedProcessDied);
    } else {
        node.graph().add_link(Identifier::Process(origin), key);
    }
}

fn is_locally_dead(node: &Arc<NodeHandle>, key: Identifier) -> bool {
    match key {
        Identifier::Process(pid) if pid.node == node.id => !node.has_process(pid),
        _ => false,
    }
}

fn notify_monitor(node: &Arc<NodeHandle>, watcher: ProcessId, mref: MonitorRef, reason: ExitReason) {
    let envelope = create_internal_message(&MonitorNotification { mref, reason });
    node.deliver(watcher, envelope);
}

fn reply<T>(node: &Arc<NodeHandle>, to: ProcessId, message: T)
where
    T: serde::Serialize,
    crate::message::Bincode: crate::message::CanSerialize<T>,
{
    node.deliver(to, create_internal_message(&message));
}

fn handle_exit(node: &Arc<NodeHandle>, pid: ProcessId, reason: ExitReason) {
    node.remove_process(pid);
    let labels = node.registry().remove_process(&pid);
    if !labels.is_empty() {
        tracing::debug!(?pid, ?labels, "process death removed registry entries");
    }
    handle_exit_identifier(node, Identifier::Process(pid), reason);
}

fn handle_exit_identifier(node: &Arc<NodeHandle>, dying: Identifier, reason: ExitReason) {
    for (mref, watcher) in node.graph().take_monitors_of(&dying) {
        notify_monitor(node, watcher, mref, reason.clone());
    }
    for other in node.graph().take_links_of(&dying) {
        propagate_link_death(node, other);
    }
}

fn propagate_link_death(node: &Arc<NodeHandle>, other: Identifier) {
    match other {
        Identifier::Process(pid) if pid.node == node.id => {
            node.kill_process(pid, ExitReason::LinkedProcessDied);
        }
        Identifier::Process(pid) => {
            if let Some(transport) = node.transport() {
                transport.send_control(
                    pid.node,
                    ControlSignal::Kill {
                        pid,
                        reason: ExitReason::LinkedProcessDied,
                    },
                );
            }
        }
        _ => {}
    }
}

async fn handle_spawn(
    node: &Arc<NodeHandle>,
    requester: ProcessId,
    spawn_ref: crate::id::SpawnRef,
    closure: ClosureRequest,
) {
    let resolver = node.closure_resolver();
    let resolved = match resolver {
        Some(resolver) => resolver.resolve_entry(&closure.label, &closure.env),
        None => Err(crate::error::StrandError::ClosureNotFound(closure.label.clone())),
    };
    let pid = match resolved {
        Ok(entry) => Some(crate::process::spawn::spawn_boxed(node.clone(), entry)),
        Err(error) => {
            tracing::warn!(%error, label = %closure.label, "spawn closure resolution failed");
            None
        }
    };
    reply(node, requester, SpawnReply { spawn_ref, pid });
}
