//! Event bus using tokio broadcast channel
//!
//! Slow subscribers miss events rather than blocking the engine.

use crate::events::NotificationEvent;
use tokio::sync::broadcast;

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// Event bus for notification lifecycle events
///
/// Events are fire-and-forget; if no subscribers are listening, they are dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: NotificationEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber to event bus
pub struct EventSubscriber {
    receiver: broadcast::Receiver<NotificationEvent>,
}

impl EventSubscriber {
    /// Receive the next event
    ///
    /// Returns None once the bus is dropped. Lagged events are skipped.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event subscriber lagged by {} events", n);
                    continue;
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Notification;

    fn shown(message: &str) -> NotificationEvent {
        NotificationEvent::Shown {
            notification: Notification::new_message("main".into(), "상대방", message),
        }
    }

    #[tokio::test]
    async fn test_event_bus_basic() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        let event = shown("hello");
        let id = event.notification_id();
        bus.emit(event);

        let received = sub.recv().await.unwrap();
        assert_eq!(received.notification_id(), id);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        bus.emit(shown("hi"));

        let r1 = sub1.recv().await.unwrap();
        let r2 = sub2.recv().await.unwrap();
        assert_eq!(r1.notification_id(), r2.notification_id());
    }

    #[test]
    fn test_no_subscribers_no_panic() {
        let bus = EventBus::new();
        bus.emit(shown("nobody"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_try_recv_empty() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
        bus.emit(shown("x"));
        assert!(sub.try_recv().is_some());
    }

    #[test]
    fn test_recv_wakes_on_emit() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        let mut recv = tokio_test::task::spawn(sub.recv());
        tokio_test::assert_pending!(recv.poll());

        bus.emit(shown("late"));
        assert!(recv.is_woken());
        let event = tokio_test::assert_ready!(recv.poll());
        assert!(event.is_some());
    }

    #[test]
    fn test_recv_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        drop(bus);
        assert!(tokio_test::block_on(sub.recv()).is_none());
    }
}
