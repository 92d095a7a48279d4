//! The primitive surface: thin composition over the lower-level modules,
//! the API user code actually calls.
//!
//! Synchronous-looking primitives like `unmonitor`/`unlink`/`whereis` are
//! realized by round-tripping a correlation token through the calling
//! process's own mailbox: the control signal goes out, and the function
//! `await`s a reply message tagged with that correlation value.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;

use crate::channel::{self, ReceivePort, SendPort};
use crate::error::StrandError;
use crate::id::{Identifier, MonitorRef, NodeId, ProcessId, SpawnRef};
use crate::mailbox::DequeueMode;
use crate::message::{create_message, Bincode, CanSerialize, Envelope};
use crate::node::signal::{
    ClosureRequest, ControlSignal, DidUnlink, DidUnmonitor, MonitorNotification, SpawnReply,
    WhereIsReply,
};
use crate::process::context::current_process;
use crate::process::exit::{panic_message, ExitReason};
use crate::process::handle::Process;

pub use crate::closure::un_closure;

/// A single arm of a `receive_wait`/`receive_timeout` predicate list: given
/// an envelope, either reject it (`None`) or consume it and produce `A`.
pub type Predicate<'a, A> = Box<dyn Fn(&Envelope) -> Option<A> + Send + 'a>;

/// Builds a predicate that accepts any envelope whose fingerprint matches
/// `T`, decoding it. The building block `expect`/`expect_timeout` are built
/// from, and exported for callers composing their own predicate lists (and
/// for the `receive!` macro).
pub fn match_type<T>() -> Predicate<'static, T>
where
    Bincode: CanSerialize<T>,
{
    Box::new(|envelope: &Envelope| crate::message::try_decode::<T>(envelope).ok())
}

/// Blocks until some predicate in `predicates` accepts a message, in
/// FIFO/ordered-predicate scan order.
pub async fn receive_wait<A>(predicates: &[Predicate<'_, A>]) -> A {
    let mailbox = current_process(|ctx| ctx.mailbox.clone());
    mailbox
        .dequeue(DequeueMode::Blocking, predicates)
        .await
        .expect("a blocking dequeue always resolves to Some")
}

/// Like [`receive_wait`], but gives up and returns `None` after `timeout`.
pub async fn receive_timeout<A>(timeout: Duration, predicates: &[Predicate<'_, A>]) -> Option<A> {
    let mailbox = current_process(|ctx| ctx.mailbox.clone());
    mailbox.dequeue(DequeueMode::Timeout(timeout), predicates).await
}

/// Selective receive with a single predicate accepting any envelope whose
/// fingerprint matches `T`.
pub async fn expect<T>() -> T
where
    Bincode: CanSerialize<T>,
{
    let predicates = [match_type::<T>()];
    receive_wait(&predicates).await
}

/// Like [`expect`], but gives up and returns `None` after `timeout`.
pub async fn expect_timeout<T>(timeout: Duration) -> Option<T>
where
    Bincode: CanSerialize<T>,
{
    let predicates = [match_type::<T>()];
    receive_timeout(timeout, &predicates).await
}

/// Creates an envelope and routes it via transport if `pid` is remote,
/// else enqueues directly on its local mailbox.
pub fn send<M>(pid: ProcessId, message: M)
where
    Bincode: CanSerialize<M>,
{
    let node = current_process(|ctx| ctx.node.clone());
    match create_message(&message) {
        Ok(envelope) => node.deliver(pid, envelope),
        Err(error) => tracing::error!(%error, ?pid, "dropping send: failed to encode message"),
    }
}

/// Opens a fresh typed channel, returning its send and receive halves.
pub fn new_chan<T>() -> (SendPort<T>, ReceivePort<T>) {
    channel::new_chan()
}

/// Sends `value` down `port`.
pub fn send_chan<T>(port: &SendPort<T>, value: T) {
    port.send(value);
}

/// Awaits the next value on `port`.
pub async fn receive_chan<T>(port: &mut ReceivePort<T>) -> T {
    port.receive_chan().await
}

/// Merges `ports` into one, always preferring the earliest-listed port
/// among those simultaneously ready.
pub fn merge_ports_biased<T>(ports: Vec<ReceivePort<T>>) -> ReceivePort<T> {
    ReceivePort::merge_biased(ports)
}

/// Merges `ports` into one, rotating which port is preferred on each poll.
pub fn merge_ports_rr<T>(ports: Vec<ReceivePort<T>>) -> ReceivePort<T> {
    ReceivePort::merge_round_robin(ports)
}

/// Installs a one-way death observation on `target`. Fire-and-forget — the
/// resulting [`MonitorNotification`] arrives later through the calling
/// process's mailbox, matched with `mref`.
pub fn monitor<M>(target: &Process<M>) -> MonitorRef {
    monitor_identifier(&target.node, Identifier::Process(target.pid))
}

/// Monitors an entire remote node: dies as a single identifier when the
/// node becomes unreachable.
pub fn monitor_node(node_id: NodeId) -> MonitorRef {
    let node = current_process(|ctx| ctx.node.clone());
    monitor_identifier(&node, Identifier::Node(node_id))
}

/// Watches the liveness of `port`'s owning process — a port has no
/// independent lifetime of its own.
pub fn monitor_port<T>(port: &SendPort<T>) -> MonitorRef {
    let node = current_process(|ctx| ctx.node.clone());
    monitor_identifier(&node, Identifier::SendPort(port.id()))
}

fn monitor_identifier(node: &std::sync::Arc<crate::node::NodeHandle>, target: Identifier) -> MonitorRef {
    let (watcher, tag) = current_process(|ctx| (ctx.pid, ctx.next_tag()));
    node.send_control(ControlSignal::Monitor { watcher, target, tag });
    MonitorRef { target, tag }
}

/// Removes a monitor. Always completes, even for an unknown or
/// already-removed `mref` — idempotent.
pub async fn unmonitor(mref: MonitorRef) {
    let node = current_process(|ctx| ctx.node.clone());
    let origin = current_process(|ctx| ctx.pid);
    node.send_control(ControlSignal::Unmonitor { origin, mref });

    let predicates = [ack_predicate::<DidUnmonitor, _>(move |ack| {
        (ack.0 == mref).then_some(())
    })];
    receive_wait(&predicates).await;
}

/// Links this process with `target`. Fire-and-forget, symmetric.
pub fn link<M>(target: &Process<M>) {
    target.link();
}

/// Links this process with an entire remote node.
pub fn link_node(node_id: NodeId) {
    let (origin, node) = current_process(|ctx| (ctx.pid, ctx.node.clone()));
    node.send_control(ControlSignal::Link {
        origin,
        target: Identifier::Node(node_id),
    });
}

/// Links this process with `port`'s owning process — see `monitor_port`'s
/// note on port liveness.
pub fn link_port<T>(port: &SendPort<T>) {
    let (origin, node) = current_process(|ctx| (ctx.pid, ctx.node.clone()));
    node.send_control(ControlSignal::Link {
        origin,
        target: Identifier::SendPort(port.id()),
    });
}

/// Removes a link with `target`. Acknowledged, idempotent.
pub async fn unlink<M>(target: &Process<M>) {
    unlink_identifier(&target.node, Identifier::Process(target.pid)).await;
}

/// Removes a link with an entire remote node.
pub async fn unlink_node(node_id: NodeId) {
    let node = current_process(|ctx| ctx.node.clone());
    unlink_identifier(&node, Identifier::Node(node_id)).await;
}

/// Removes a link with `port`'s owning process.
pub async fn unlink_port<T>(port: &SendPort<T>) {
    let node = current_process(|ctx| ctx.node.clone());
    unlink_identifier(&node, Identifier::SendPort(port.id())).await;
}

async fn unlink_identifier(node: &std::sync::Arc<crate::node::NodeHandle>, target: Identifier) {
    let origin = current_process(|ctx| ctx.pid);
    node.send_control(ControlSignal::Unlink { origin, target });

    let predicates = [ack_predicate::<DidUnlink, _>(move |ack| {
        (ack.0 == target).then_some(())
    })];
    receive_wait(&predicates).await;
}

/// Builds a predicate that decodes an acknowledgement of type `R` and
/// applies `keep` to decide whether it's the specific correlation this call
/// is waiting for. Overlapping outstanding requests of the same ack type
/// must not steal each other's replies, hence the correlation check.
fn ack_predicate<R, F>(keep: F) -> Predicate<'static, ()>
where
    R: 'static,
    Bincode: CanSerialize<R>,
    F: Fn(R) -> Option<()> + Send + 'static,
{
    Box::new(move |envelope: &Envelope| {
        crate::message::try_decode::<R>(envelope)
            .ok()
            .and_then(|ack| keep(ack))
    })
}

/// Registers `pid` under `label`. Fire-and-forget; installing over an
/// existing label replaces it.
pub fn register(label: impl Into<String>, pid: ProcessId) {
    let node = current_process(|ctx| ctx.node.clone());
    node.send_control(ControlSignal::Register {
        label: label.into(),
        pid: Some(pid),
    });
}

/// Removes `label`'s registration, if any.
pub fn unregister(label: impl Into<String>) {
    let node = current_process(|ctx| ctx.node.clone());
    node.send_control(ControlSignal::Register {
        label: label.into(),
        pid: None,
    });
}

/// Looks up `label` in the local registry. Synchronous wrapper over the
/// `WhereIs` control signal.
pub async fn whereis(label: impl Into<String>) -> Option<ProcessId> {
    let label = label.into();
    let (requester, node) = current_process(|ctx| (ctx.pid, ctx.node.clone()));
    node.send_control(ControlSignal::WhereIs {
        requester,
        label: label.clone(),
    });
    wait_for_whereis(label).await
}

/// Looks up `label` in a remote node's registry.
pub async fn whereis_remote(node_id: NodeId, label: impl Into<String>) -> Option<ProcessId> {
    let label = label.into();
    let (requester, node) = current_process(|ctx| (ctx.pid, ctx.node.clone()));
    match node.transport() {
        Some(transport) => transport.send_control(
            node_id,
            ControlSignal::WhereIs {
                requester,
                label: label.clone(),
            },
        ),
        None => {
            tracing::warn!("whereis_remote called with no transport configured");
            return None;
        }
    }
    wait_for_whereis(label).await
}

async fn wait_for_whereis(label: String) -> Option<ProcessId> {
    let predicates = [ack_predicate_value::<WhereIsReply, _, _>(move |reply| {
        (reply.label == label).then_some(reply.pid)
    })];
    receive_wait(&predicates).await
}

fn ack_predicate_value<R, F, A>(keep: F) -> Predicate<'static, A>
where
    R: 'static,
    Bincode: CanSerialize<R>,
    F: Fn(R) -> Option<A> + Send + 'static,
{
    Box::new(move |envelope: &Envelope| {
        crate::message::try_decode::<R>(envelope)
            .ok()
            .and_then(|ack| keep(ack))
    })
}

/// Named-send: delivers `message` to whoever is registered under `label`
/// on the local node.
pub fn nsend<M>(label: impl Into<String>, message: M)
where
    Bincode: CanSerialize<M>,
{
    let node = current_process(|ctx| ctx.node.clone());
    let label = label.into();
    match create_message(&message) {
        Ok(envelope) => node.send_control(ControlSignal::NamedSend { label, envelope }),
        Err(error) => tracing::error!(%error, %label, "dropping nsend: failed to encode message"),
    }
}

/// Named-send to a label registered on a remote node.
pub fn nsend_remote<M>(node_id: NodeId, label: impl Into<String>, message: M)
where
    Bincode: CanSerialize<M>,
{
    let node = current_process(|ctx| ctx.node.clone());
    let label = label.into();
    let envelope = match create_message(&message) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::error!(%error, %label, "dropping nsend_remote: failed to encode message");
            return;
        }
    };
    match node.transport() {
        Some(transport) => {
            transport.send_control(node_id, ControlSignal::NamedSend { label, envelope })
        }
        None => tracing::warn!("nsend_remote called with no transport configured"),
    }
}

/// The payload `say()` named-sends to the logger label.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogMessage {
    pub timestamp_millis: u128,
    pub from: ProcessId,
    pub text: String,
}

/// Named-send to the configured logger label (see
/// `NodeConfig::logger_label`, default `"logger"`).
pub fn say(text: impl Into<String>) {
    let (pid, node) = current_process(|ctx| (ctx.pid, ctx.node.clone()));
    let label = node.config().logger_label.clone();
    let timestamp_millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let message = LogMessage {
        timestamp_millis,
        from: pid,
        text: text.into(),
    };
    match create_message(&message) {
        Ok(envelope) => node.send_control(ControlSignal::NamedSend { label, envelope }),
        Err(error) => tracing::error!(%error, "dropping say: failed to encode message"),
    }
}

/// Marker panic payload for [`terminate`], distinguished from an ordinary
/// panic so the process boundary records `ExitReason::KilledBySelf` instead
/// of `ExitReason::Custom`.
pub(crate) struct TerminateSignal;

/// Raises a distinguished termination condition caught at the process
/// boundary, which shuts the process down cleanly with reason "killed by
/// self".
pub fn terminate() -> ! {
    std::panic::panic_any(TerminateSignal)
}

/// Returns the calling process's own id.
pub fn get_self_pid() -> ProcessId {
    current_process(|ctx| ctx.pid)
}

/// Returns the id of the node the calling process lives on.
pub fn get_self_node() -> NodeId {
    current_process(|ctx| ctx.pid.node)
}

/// Runs `future`, converting a panic inside it (including one raised by
/// `terminate()`) into `Err(StrandError::Terminated)` instead of letting it
/// unwind to the process boundary.
pub async fn catch<Fut, T>(future: Fut) -> Result<T, StrandError>
where
    Fut: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => Ok(value),
        Err(panic) if panic.is::<TerminateSignal>() => {
            Err(StrandError::Terminated(ExitReason::KilledBySelf))
        }
        Err(panic) => Err(StrandError::Terminated(ExitReason::Custom(panic_message(
            panic.as_ref(),
        )))),
    }
}

/// The initiating side of a remote spawn — resolves `label` via the target node's
/// [`crate::closure::ClosureResolver`] and returns the new process's id
/// once the correlated `SpawnReply` arrives. Returns `None` if the label
/// can't be resolved there, or if no transport reaches `node_id`.
pub async fn spawn_async(
    node_id: NodeId,
    label: impl Into<String>,
    env: Vec<u8>,
) -> Option<ProcessId> {
    let (requester, node, spawn_ref_tag) =
        current_process(|ctx| (ctx.pid, ctx.node.clone(), ctx.next_tag()));
    let spawn_ref = SpawnRef(spawn_ref_tag);
    let signal = ControlSignal::Spawn {
        requester,
        spawn_ref,
        closure: ClosureRequest {
            label: label.into(),
            env,
        },
    };

    if node_id == node.id {
        node.send_control(signal);
    } else {
        match node.transport() {
            Some(transport) => transport.send_control(node_id, signal),
            None => {
                tracing::warn!("spawn_async called with no transport configured");
                return None;
            }
        }
    }

    let predicates = [ack_predicate_value::<SpawnReply, _, _>(move |reply| {
        (reply.spawn_ref == spawn_ref).then_some(reply.pid)
    })];
    receive_wait(&predicates).await
}
