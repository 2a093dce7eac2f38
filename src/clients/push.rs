//! # Push Event Port
//!
//! The asynchronous half of the venue connection: two fan-out feeds announcing that an
//! order was accepted or declined, independent of any polling.
//!
//! ## Subscription contract
//!
//! Feeds are not buffered for late subscribers. A receiver only observes events published
//! *after* it subscribed, so a take operation must subscribe before it issues its first
//! command. Every subscriber gets its own copy of each event; subscribers never interfere
//! with one another.
//!
//! Feeds are unbounded: each subscriber owns an unbounded queue, so a slow reader never
//! loses an event, however many events for other orders pile up in front of it.
//!
//! [`PushHub`] is the in-process implementation. A network push client would own a hub
//! and publish decoded frames into it.

use crate::model::{DeclineNotice, OrderId};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// Fan-out feeds of push notifications.
pub trait PushEventPort: Send + Sync {
    /// Subscribe to "order accepted" notifications.
    fn subscribe_accepted(&self) -> mpsc::UnboundedReceiver<OrderId>;

    /// Subscribe to "order declined" notifications.
    fn subscribe_declined(&self) -> mpsc::UnboundedReceiver<DeclineNotice>;
}

/// Fan-out list of subscriber queues for one feed.
#[derive(Debug)]
struct Feed<T> {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<T: Clone> Feed<T> {
    fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().push(sender);
        receiver
    }

    /// Delivers `event` to every live subscriber and forgets the dropped ones.
    fn publish(&self, event: T) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        subscribers.len()
    }

    fn receiver_count(&self) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<T>>> {
        // the list stays consistent even if a holder panicked
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory fan-out hub for push notifications.
///
/// Clones share the same feeds. The feeds close once every clone is dropped.
#[derive(Debug, Clone)]
pub struct PushHub {
    accepted: Feed<OrderId>,
    declined: Feed<DeclineNotice>,
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PushHub {
    pub fn new() -> Self {
        Self {
            accepted: Feed::new(),
            declined: Feed::new(),
        }
    }

    /// Publishes an acceptance. Returns how many subscribers received it.
    pub fn publish_accepted(&self, order_id: OrderId) -> usize {
        let delivered = self.accepted.publish(order_id);
        debug!(%order_id, delivered, "Push accepted");
        delivered
    }

    /// Publishes a decline. Returns how many subscribers received it.
    pub fn publish_declined(&self, order_id: OrderId, reason: impl Into<String>) -> usize {
        let delivered = self.declined.publish(DeclineNotice::new(order_id, reason));
        debug!(%order_id, delivered, "Push declined");
        delivered
    }

    pub fn accepted_receiver_count(&self) -> usize {
        self.accepted.receiver_count()
    }

    pub fn declined_receiver_count(&self) -> usize {
        self.declined.receiver_count()
    }
}

impl PushEventPort for PushHub {
    fn subscribe_accepted(&self) -> mpsc::UnboundedReceiver<OrderId> {
        self.accepted.subscribe()
    }

    fn subscribe_declined(&self) -> mpsc::UnboundedReceiver<DeclineNotice> {
        self.declined.subscribe()
    }
}

/// Waits for the next event on `receiver` that satisfies `matches`.
///
/// Non-matching events are skipped. Returns `None` once the feed is closed.
pub async fn next_matching<T, F>(receiver: &mut mpsc::UnboundedReceiver<T>, matches: F) -> Option<T>
where
    F: Fn(&T) -> bool,
{
    while let Some(event) = receiver.recv().await {
        if matches(&event) {
            return Some(event);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let hub = PushHub::default();
        let early = OrderId::new();
        let late = OrderId::new();

        assert_eq!(hub.publish_accepted(early), 0);
        let mut rx = hub.subscribe_accepted();
        assert_eq!(hub.publish_accepted(late), 1);

        assert_eq!(rx.recv().await.unwrap(), late);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_its_own_copy() {
        let hub = PushHub::default();
        let mut first = hub.subscribe_declined();
        let mut second = hub.subscribe_declined();
        let id = OrderId::new();

        assert_eq!(hub.publish_declined(id, "taken_by_other"), 2);

        assert_eq!(first.recv().await.unwrap().reason, "taken_by_other");
        assert_eq!(second.recv().await.unwrap().reason, "taken_by_other");
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_forgotten() {
        let hub = PushHub::default();
        let kept = hub.subscribe_accepted();
        let dropped = hub.subscribe_accepted();
        assert_eq!(hub.accepted_receiver_count(), 2);

        drop(dropped);
        assert_eq!(hub.publish_accepted(OrderId::new()), 1);
        assert_eq!(hub.accepted_receiver_count(), 1);

        drop(kept);
        assert_eq!(hub.accepted_receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_next_matching_skips_other_orders() {
        let hub = PushHub::default();
        let mut rx = hub.subscribe_accepted();
        let mine = OrderId::new();

        hub.publish_accepted(OrderId::new());
        hub.publish_accepted(OrderId::new());
        hub.publish_accepted(mine);

        let found = next_matching(&mut rx, |id| *id == mine).await;
        assert_eq!(found, Some(mine));
    }

    #[tokio::test]
    async fn test_slow_subscriber_loses_nothing_in_a_burst() {
        let hub = PushHub::default();
        let mut rx = hub.subscribe_accepted();
        let mine = OrderId::new();

        hub.publish_accepted(mine);
        for _ in 0..5_000 {
            hub.publish_accepted(OrderId::new());
        }

        let found = next_matching(&mut rx, |id| *id == mine).await;
        assert_eq!(found, Some(mine));
    }

    #[tokio::test]
    async fn test_next_matching_ends_when_feed_closes() {
        let hub = PushHub::default();
        let mut rx = hub.subscribe_accepted();
        drop(hub);

        let found = next_matching(&mut rx, |_| true).await;
        assert!(found.is_none());
    }
}
