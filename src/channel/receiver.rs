//! The read side of a typed channel, built over `mpsc::UnboundedReceiver`.
//!
//! `ReceivePort` deliberately does not implement `Clone`: a channel has
//! exactly one consumer at a time, and the cleanest way to enforce that in
//! Rust is to make `receive_chan` take `&mut self` on a non-`Clone` type
//! rather than track it at runtime.
//!
//! The `Biased`/`RoundRobin` variants implement composite reads with
//! `futures::future::poll_fn`: every sub-port is polled in order on every
//! wake, so a message arriving on an earlier port always wins over one
//! arriving on a later port even if both became ready in the same wake, and
//! a port that isn't selected keeps its waker registered so it doesn't miss
//! the next wakeup.

use std::task::{Context, Poll};

use futures::future::poll_fn;
use tokio::sync::mpsc;

use crate::id::SendPortId;

/// The read side of a single, non-merged channel.
#[derive(Debug)]
struct RawReceiver<T> {
    id: SendPortId,
    inner: mpsc::UnboundedReceiver<T>,
}

impl<T> RawReceiver<T> {
    fn id(&self) -> SendPortId {
        self.id
    }

    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<T> {
        match self.inner.poll_recv(cx) {
            Poll::Ready(Some(value)) => Poll::Ready(value),
            // The paired `SendPort`s are all gone: there will never be
            // another message. A selective receive over a dead port simply
            // never fires again.
            Poll::Ready(None) => Poll::Pending,
            Poll::Pending => Poll::Pending,
        }
    }
}

/// The read side of a typed channel.
///
/// A bare port ([`ReceivePort::single`]) reads one channel. `merge_biased`
/// and `merge_round_robin` (in [`crate::channel`]) combine several ports into
/// one without copying messages or allocating new channels — they just wrap
/// the existing ports in a selector.
#[derive(Debug)]
pub enum ReceivePort<T> {
    Single(RawReceiver<T>),
    /// Leftmost-wins: the first port in the list with a ready message always
    /// takes priority, regardless of arrival order.
    Biased(Vec<ReceivePort<T>>),
    /// Like `Biased`, but the winning port is rotated to the back of the
    /// list after each read so no single sub-port can starve the others.
    RoundRobin(Vec<ReceivePort<T>>),
}

impl<T> ReceivePort<T> {
    pub(crate) fn single(id: SendPortId, inner: mpsc::UnboundedReceiver<T>) -> Self {
        ReceivePort::Single(RawReceiver { id, inner })
    }

    /// The id of the underlying port(s) feeding this receiver. For a
    /// composite port this is the leftmost sub-port's id: `monitor_port`/
    /// `link_port` watch a merged receiver by watching its first branch,
    /// the closest analogue to watching the merge as a whole.
    pub fn id(&self) -> SendPortId {
        match self {
            ReceivePort::Single(raw) => raw.id(),
            ReceivePort::Biased(ports) | ReceivePort::RoundRobin(ports) => ports[0].id(),
        }
    }

    /// Combines `ports` into one leftmost-wins composite port.
    pub fn merge_biased(ports: Vec<ReceivePort<T>>) -> Self {
        ReceivePort::Biased(ports)
    }

    /// Combines `ports` into one fairness-rotating composite port.
    pub fn merge_round_robin(ports: Vec<ReceivePort<T>>) -> Self {
        ReceivePort::RoundRobin(ports)
    }

    /// Waits for and returns the next message, applying this port's merge
    /// policy if it is a composite.
    pub async fn receive_chan(&mut self) -> T {
        match self {
            ReceivePort::Single(raw) => {
                poll_fn(|cx| raw.poll_recv(cx)).await
            }
            ReceivePort::Biased(ports) => poll_fn(|cx| Self::poll_biased(ports, cx)).await,
            ReceivePort::RoundRobin(ports) => {
                let (value, index) = poll_fn(|cx| Self::poll_indexed(ports, cx)).await;
                let winner = ports.remove(index);
                ports.push(winner);
                value
            }
        }
    }

    /// Polls this port for readiness without consuming anything beyond what
    /// the returned `Ready` carries. Used recursively by composite ports so
    /// nesting (a `Biased` of `RoundRobin`s, etc.) polls every leaf in a
    /// single pass.
    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<T> {
        match self {
            ReceivePort::Single(raw) => raw.poll_recv(cx),
            ReceivePort::Biased(ports) => Self::poll_biased(ports, cx),
            ReceivePort::RoundRobin(ports) => match Self::poll_indexed(ports, cx) {
                Poll::Ready((value, index)) => {
                    let winner = ports.remove(index);
                    ports.push(winner);
                    Poll::Ready(value)
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }

    /// Polls `ports` in index order, returning the first `Ready` found.
    ///
    /// Stops at the first branch found ready instead of polling every
    /// branch unconditionally: `poll_recv` on an `mpsc` receiver *dequeues*
    /// on `Ready`, so polling a later branch after a winner was already
    /// found would silently drop that branch's message. Ports after the
    /// winner simply don't get a freshly registered waker this round, which
    /// is fine — the composite future is about to resolve, and the next
    /// `receive_chan` call polls every branch again from scratch.
    fn poll_biased(ports: &mut [ReceivePort<T>], cx: &mut Context<'_>) -> Poll<T> {
        for port in ports.iter_mut() {
            if let Poll::Ready(value) = port.poll_recv(cx) {
                return Poll::Ready(value);
            }
        }
        Poll::Pending
    }

    /// Same early-stop discipline as [`Self::poll_biased`], for the
    /// round-robin case that also needs to know which index won.
    fn poll_indexed(
        ports: &mut [ReceivePort<T>],
        cx: &mut Context<'_>,
    ) -> Poll<(T, usize)> {
        for (index, port) in ports.iter_mut().enumerate() {
            if let Poll::Ready(value) = port.poll_recv(cx) {
                return Poll::Ready((value, index));
            }
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{LocalProcessId, NodeId, ProcessId};
    use tokio::sync::mpsc::unbounded_channel;

    fn dummy_port_id(index: u64) -> SendPortId {
        SendPortId {
            owner: ProcessId::new(NodeId(0), LocalProcessId(0)),
            index,
        }
    }

    #[tokio::test]
    async fn single_port_roundtrip() {
        let (tx, rx) = unbounded_channel::<i32>();
        let mut port = ReceivePort::single(dummy_port_id(0), rx);
        tx.send(1).unwrap();
        assert_eq!(port.receive_chan().await, 1);
    }

    #[tokio::test]
    async fn biased_merge_prefers_leftmost() {
        let (tx_a, rx_a) = unbounded_channel::<i32>();
        let (tx_b, rx_b) = unbounded_channel::<i32>();
        let port_a = ReceivePort::single(dummy_port_id(0), rx_a);
        let port_b = ReceivePort::single(dummy_port_id(1), rx_b);
        let mut merged = ReceivePort::merge_biased(vec![port_a, port_b]);

        tx_b.send(20).unwrap();
        tx_a.send(10).unwrap();

        assert_eq!(merged.receive_chan().await, 10);
        assert_eq!(merged.receive_chan().await, 20);
    }

    #[tokio::test]
    async fn round_robin_rotates_winner() {
        let (tx_a, rx_a) = unbounded_channel::<i32>();
        let (tx_b, rx_b) = unbounded_channel::<i32>();
        let port_a = ReceivePort::single(dummy_port_id(0), rx_a);
        let port_b = ReceivePort::single(dummy_port_id(1), rx_b);
        let mut merged = ReceivePort::merge_round_robin(vec![port_a, port_b]);

        tx_a.send(1).unwrap();
        tx_b.send(2).unwrap();
        assert_eq!(merged.receive_chan().await, 1);

        tx_a.send(3).unwrap();
        tx_b.send(4).unwrap();
        assert_eq!(merged.receive_chan().await, 2);
    }
}
