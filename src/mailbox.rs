//! The concurrent mailbox: an unbounded FIFO of [`Envelope`]s supporting
//! selective dequeue against an ordered list of predicates.
//!
//! A `parking_lot::Mutex<VecDeque<Envelope>>` holds the queue and a
//! `tokio::sync::Notify` wakes a suspended scan when a producer appends.
//! `Notify` gives the race-free "check condition, then wait" pattern this
//! needs: a `notify_one()` that lands before the waiter starts waiting is
//! not lost.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::message::Envelope;

/// How long a selective dequeue is willing to wait for a match.
#[derive(Debug, Clone, Copy)]
pub enum DequeueMode {
    /// Waits indefinitely for a matching message.
    Blocking,
    /// Returns `None` immediately if nothing currently queued matches.
    NonBlocking,
    /// Waits up to `Duration` for a matching message; `Duration::ZERO` is
    /// equivalent to `NonBlocking`.
    Timeout(Duration),
}

/// An unbounded, ordered mailbox of [`Envelope`]s with selective receive.
///
/// Insertion order is never reordered by a dequeue; a scan that rejects a
/// message leaves it exactly where it was; concurrent producers are
/// serialized at the enqueue point so their arrival order is the mailbox's
/// acceptance order.
#[derive(Debug)]
pub struct Mailbox {
    queue: Mutex<VecDeque<Envelope>>,
    notify: Notify,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Appends `envelope` to the tail of the mailbox and wakes a waiting
    /// consumer, if any. The lock is held only long enough to push a single
    /// element.
    pub fn enqueue(&self, envelope: Envelope) {
        self.queue.lock().push_back(envelope);
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The selective-receive "scan": iterate messages in FIFO order, probing
    /// `predicates` in the given order against each; the first predicate
    /// that returns `Some` consumes that message. Messages that matched no
    /// predicate are left in place at their original positions.
    ///
    /// `mode` controls what happens when no message in the current queue
    /// matches: return `None` ([`DequeueMode::NonBlocking`]), wait forever
    /// ([`DequeueMode::Blocking`]), or wait up to a deadline
    /// ([`DequeueMode::Timeout`]) that starts counting only once the initial
    /// scan has completed.
    pub async fn dequeue<A>(
        &self,
        mode: DequeueMode,
        predicates: &[Box<dyn Fn(&Envelope) -> Option<A> + Send + '_>],
    ) -> Option<A> {
        let duration = match mode {
            DequeueMode::Timeout(d) if d.is_zero() => return self.scan_once(predicates),
            DequeueMode::Timeout(d) => Some(d),
            DequeueMode::NonBlocking => return self.scan_once(predicates),
            DequeueMode::Blocking => None,
        };

        // The deadline is armed lazily, after the first scan of whatever is
        // already queued: the timer must start counting only once the
        // currently-queued messages have been scanned, not before.
        let mut deadline: Option<Option<Instant>> = None;

        loop {
            let notified = self.notify.notified();
            if let Some(action) = self.scan_once(predicates) {
                return Some(action);
            }
            let deadline = *deadline.get_or_insert_with(|| duration.map(|d| Instant::now() + d));
            match deadline {
                None => notified.await,
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        // One last scan: a message may have arrived exactly
                        // at the deadline, between the timeout firing and us
                        // observing it.
                        return self.scan_once(predicates);
                    }
                }
            }
        }
    }

    fn scan_once<A>(
        &self,
        predicates: &[Box<dyn Fn(&Envelope) -> Option<A> + Send + '_>],
    ) -> Option<A> {
        let mut queue = self.queue.lock();
        for index in 0..queue.len() {
            for predicate in predicates {
                if let Some(action) = predicate(&queue[index]) {
                    queue.remove(index);
                    return Some(action);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::create_message;

    fn accept_any<T: 'static>() -> Box<dyn Fn(&Envelope) -> Option<T> + Send>
    where
        T: serde::de::DeserializeOwned,
    {
        Box::new(|envelope: &Envelope| crate::message::try_decode::<T>(envelope).ok())
    }

    #[tokio::test]
    async fn fifo_non_blocking() {
        let mailbox = Mailbox::new();
        mailbox.enqueue(create_message(&1i32).unwrap());
        mailbox.enqueue(create_message(&2i32).unwrap());

        let preds = vec![accept_any::<i32>()];
        let first = mailbox.dequeue(DequeueMode::NonBlocking, &preds).await;
        assert_eq!(first, Some(1));
        let second = mailbox.dequeue(DequeueMode::NonBlocking, &preds).await;
        assert_eq!(second, Some(2));
        let third = mailbox.dequeue(DequeueMode::NonBlocking, &preds).await;
        assert_eq!(third, None);
    }

    #[tokio::test]
    async fn selective_receive_preserves_order() {
        let mailbox = Mailbox::new();
        mailbox.enqueue(create_message(&1i32).unwrap());
        mailbox.enqueue(create_message(&2i32).unwrap());
        mailbox.enqueue(create_message(&3i32).unwrap());

        let even: Box<dyn Fn(&Envelope) -> Option<i32> + Send> = Box::new(|envelope| {
            crate::message::try_decode::<i32>(envelope)
                .ok()
                .filter(|v| v % 2 == 0)
        });
        let preds = vec![even];
        let matched = mailbox.dequeue(DequeueMode::NonBlocking, &preds).await;
        assert_eq!(matched, Some(2));

        let preds_any = vec![accept_any::<i32>()];
        let first = mailbox.dequeue(DequeueMode::NonBlocking, &preds_any).await;
        assert_eq!(first, Some(1));
        let second = mailbox.dequeue(DequeueMode::NonBlocking, &preds_any).await;
        assert_eq!(second, Some(3));
    }

    #[tokio::test]
    async fn timeout_zero_never_suspends() {
        let mailbox = Mailbox::new();
        let preds = vec![accept_any::<i32>()];
        let result = mailbox
            .dequeue(DequeueMode::Timeout(Duration::ZERO), &preds)
            .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn blocking_wakes_on_enqueue() {
        let mailbox = std::sync::Arc::new(Mailbox::new());
        let producer = mailbox.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.enqueue(create_message(&7i32).unwrap());
        });

        let preds = vec![accept_any::<i32>()];
        let result = mailbox.dequeue(DequeueMode::Blocking, &preds).await;
        assert_eq!(result, Some(7));
        handle.await.unwrap();
    }
}
