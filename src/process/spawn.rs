//! `spawn`/`spawn_link`: starts a new process as a tokio task with its own
//! mailbox and ambient [`ProcessContext`], reporting its exit back to the
//! node controller so the supervision graph and registry stay consistent.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::id::{Identifier, ProcessId};
use crate::mailbox::Mailbox;
use crate::node::signal::ControlSignal;
use crate::node::{NodeHandle, ProcessEntry};
use crate::process::context::{ProcessContext, CURRENT_PROCESS};
use crate::process::exit::ExitReason;
use crate::process::handle::Process;

/// Spawns `entry` as a new, unlinked process on `node`.
pub fn spawn<F, Fut>(node: Arc<NodeHandle>, entry: F) -> Process<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    spawn_inner(node, None, entry)
}

/// Spawns `entry` linked to the calling process (`link` composed with
/// `spawn`). Must be called from inside a running process.
pub fn spawn_link<F, Fut>(node: Arc<NodeHandle>, entry: F) -> Process<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let parent = CURRENT_PROCESS.try_with(|ctx| ctx.pid).ok();
    spawn_inner(node, parent, entry)
}

/// Spawns a boxed, already-erased entry point — used by the node
/// controller's `Spawn` signal handler, which resolves a closure through a
/// [`crate::closure::ClosureResolver`] into exactly this shape.
pub(crate) fn spawn_boxed(
    node: Arc<NodeHandle>,
    entry: crate::closure::BoxFuture,
) -> ProcessId {
    spawn_inner(node, None, move || entry).id()
}

fn spawn_inner<F, Fut>(node: Arc<NodeHandle>, link_to: Option<ProcessId>, entry: F) -> Process<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let pid = node.fresh_pid();
    let mailbox = Arc::new(Mailbox::new());
    let (kill_tx, mut kill_rx) = mpsc::unbounded_channel::<ExitReason>();
    node.register_process(
        pid,
        Arc::new(ProcessEntry {
            mailbox: mailbox.clone(),
            kill: kill_tx,
        }),
    );

    if let Some(parent) = link_to {
        node.send_control(ControlSignal::Link {
            origin: parent,
            target: Identifier::Process(pid),
        });
    }

    let ctx = Arc::new(ProcessContext::new(node.clone(), pid, mailbox));
    let task_node = node.clone();
    tokio::spawn(CURRENT_PROCESS.scope(ctx, async move {
        let outcome = AssertUnwindSafe(async {
            tokio::select! {
                biased;
                reason = kill_rx.recv() => reason.unwrap_or(ExitReason::Normal),
                _ = entry() => ExitReason::Normal,
            }
        })
        .catch_unwind()
        .await;

        let reason = match outcome {
            Ok(reason) => reason,
            Err(panic) if panic.is::<crate::primitives::TerminateSignal>() => {
                ExitReason::KilledBySelf
            }
            Err(panic) => ExitReason::Custom(crate::process::exit::panic_message(panic.as_ref())),
        };

        task_node.send_control(ControlSignal::ProcessExited { pid, reason });
    }));

    Process::new(pid, node)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::NodeConfig;

    pub(crate) fn test_node() -> Arc<NodeHandle> {
        NodeHandle::new(NodeConfig::new())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_node;
    use super::*;
    use crate::primitives;
    use std::time::Duration;

    #[tokio::test]
    async fn spawned_process_runs_and_exits_normally() {
        let node = test_node();
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn(node, move || async move {
            let _ = tx.send(());
        });
        tokio::time::timeout(Duration::from_millis(500), rx)
            .await
            .expect("process ran")
            .unwrap();
    }

    #[tokio::test]
    async fn panicking_process_reports_custom_exit_reason() {
        let node = test_node();
        let watcher_ctx = Arc::new(ProcessContext::new_for_test(node.clone()));

        CURRENT_PROCESS
            .scope(watcher_ctx, async move {
                let target = spawn(node, || async {
                    panic!("boom");
                });
                primitives::monitor(&target);
                let notification: crate::node::signal::MonitorNotification =
                    tokio::time::timeout(Duration::from_millis(500), primitives::expect())
                        .await
                        .expect("monitor notification arrives");
                assert!(matches!(
                    notification.reason,
                    crate::process::exit::ExitReason::Custom(ref s) if s == "boom"
                ));
            })
            .await;
    }
}
