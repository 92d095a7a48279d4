//! Typed channels: `SendPort`/`ReceivePort` pairs and their composition via
//! biased and round-robin merge.
//!
//! Each channel is an `mpsc` queue of one fixed type, with a send half that
//! is cheap to clone and shared, and a receive half that stays with the
//! process that created it. The merge combinators build a composite
//! waitable: a selector that registers for notification on every underlying
//! channel, where the first to fire commits and the others are deregistered
//! atomically, implemented with `futures::future::poll_fn`.

mod receiver;
mod sender;

pub use receiver::ReceivePort;
pub use sender::SendPort;

use tokio::sync::mpsc;

use crate::id::SendPortId;
use crate::process::context::current_process;

/// Creates a fresh typed channel owned by the calling process, returning
/// its `SendPort`/`ReceivePort` pair.
///
/// Increments the owning process's channel counter.
pub fn new_chan<T>() -> (SendPort<T>, ReceivePort<T>) {
    let owner = current_process(|ctx| ctx.pid);
    let index = current_process(|ctx| ctx.next_channel_index());
    let id = SendPortId { owner, index };

    let (tx, rx) = mpsc::unbounded_channel();
    (SendPort::new(id, tx), ReceivePort::single(id, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::context::{ProcessContext, CURRENT_PROCESS};
    use crate::process::exit::ExitReason;
    use crate::process::spawn::test_support::test_node;
    use std::sync::Arc;

    async fn with_process<F, Fut>(f: F)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let node = test_node();
        let ctx = Arc::new(ProcessContext::new_for_test(node));
        CURRENT_PROCESS
            .scope(ctx, async move {
                f().await;
            })
            .await;
        let _ = ExitReason::Normal;
    }

    #[tokio::test]
    async fn send_then_receive() {
        with_process(|| async {
            let (tx, mut rx) = new_chan::<i32>();
            tx.send(42);
            assert_eq!(rx.receive_chan().await, 42);
        })
        .await;
    }
}
