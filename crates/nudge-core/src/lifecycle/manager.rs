//! Lifecycle manager: schedules dismiss timers and emits lifecycle events.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{DismissReason, EventBus, NotificationEvent};
use crate::lifecycle::NotificationRegistry;
use crate::types::{ConversationId, Notification, NotificationId};

/// Drives notifications through `created -> visible -> dismissed`.
///
/// Timer tasks never touch state directly. When a timer fires it posts the
/// notification id on the expiry channel, and the owner of this manager calls
/// [`LifecycleManager::expire`] from its own loop.
pub struct LifecycleManager {
    registry: NotificationRegistry,
    dismiss_after: Duration,
    expiry_tx: mpsc::UnboundedSender<NotificationId>,
    bus: EventBus,
}

impl LifecycleManager {
    /// Create a manager and the receiver its timers report expiries on.
    pub fn new(
        dismiss_after: Duration,
        bus: EventBus,
    ) -> (Self, mpsc::UnboundedReceiver<NotificationId>) {
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        let manager = Self {
            registry: NotificationRegistry::default(),
            dismiss_after,
            expiry_tx,
            bus,
        };
        (manager, expiry_rx)
    }

    /// Make a notification visible and schedule its dismiss timer.
    pub fn show(&mut self, notification: Notification) {
        let id = notification.id;
        let tx = self.expiry_tx.clone();
        let delay = self.dismiss_after;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(id);
        });

        if self.registry.register(notification.clone(), timer) {
            info!(
                notification_id = %id,
                conversation_id = %notification.conversation_id,
                kind = ?notification.kind,
                "Notification shown"
            );
            self.bus.emit(NotificationEvent::Shown { notification });
        }
    }

    /// Handle a fired timer. Returns false for ids already dismissed.
    pub fn expire(&mut self, id: &NotificationId) -> bool {
        match self.registry.expire(id) {
            Some(notification) => {
                debug!(notification_id = %id, "Notification timed out");
                self.bus
                    .emit(NotificationEvent::dismissed(&notification, DismissReason::Timeout));
                true
            }
            None => false,
        }
    }

    /// Dismiss one notification, cancelling its timer.
    pub fn dismiss(&mut self, id: &NotificationId, reason: DismissReason) -> Option<Notification> {
        let notification = self.registry.dismiss(id)?;
        debug!(notification_id = %id, reason = ?reason, "Notification dismissed");
        self.bus
            .emit(NotificationEvent::dismissed(&notification, reason));
        Some(notification)
    }

    /// Dismiss every notification of a conversation.
    pub fn dismiss_conversation(&mut self, conversation_id: &ConversationId, reason: DismissReason) -> usize {
        let removed = self.registry.dismiss_conversation(conversation_id);
        for notification in &removed {
            self.bus.emit(NotificationEvent::dismissed(notification, reason));
        }
        removed.len()
    }

    /// Tear down all notifications and timers.
    pub fn clear(&mut self, reason: DismissReason) -> usize {
        let removed = self.registry.clear();
        for notification in &removed {
            self.bus.emit(NotificationEvent::dismissed(notification, reason));
        }
        if !removed.is_empty() {
            debug!(count = removed.len(), reason = ?reason, "Notifications cleared");
        }
        removed.len()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.registry.get(id)
    }

    /// Visible notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.registry.notifications()
    }

    pub fn pending_timers(&self) -> usize {
        self.registry.pending_timers()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (LifecycleManager, mpsc::UnboundedReceiver<NotificationId>) {
        LifecycleManager::new(Duration::from_secs(4), EventBus::new())
    }

    fn notification() -> Notification {
        Notification::new_message("main".into(), "상대방", "안녕")
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expires_after_delay() {
        let (mut manager, mut expiries) = manager();
        let mut events = manager.bus().subscribe();
        let n = notification();
        let id = n.id;

        manager.show(n);
        assert_eq!(manager.pending_timers(), 1);
        assert!(matches!(events.recv().await, Some(NotificationEvent::Shown { .. })));

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(expiries.try_recv().is_err());

        let fired = expiries.recv().await.unwrap();
        assert_eq!(fired, id);
        assert!(manager.expire(&fired));
        assert!(manager.active().is_empty());

        match events.recv().await {
            Some(NotificationEvent::Dismissed { reason, .. }) => {
                assert_eq!(reason, DismissReason::Timeout)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_timer() {
        let (mut manager, mut expiries) = manager();
        let n = notification();
        let id = n.id;

        manager.show(n);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(manager.dismiss(&id, DismissReason::Dismissed).is_some());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(expiries.try_recv().is_err());
        assert!(!manager.expire(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_emits_power_off() {
        let (mut manager, mut expiries) = manager();
        let mut events = manager.bus().subscribe();
        manager.show(notification());
        manager.show(notification());

        assert_eq!(manager.clear(DismissReason::PowerOff), 2);
        assert_eq!(manager.pending_timers(), 0);

        let mut power_off = 0;
        while let Some(event) = events.try_recv() {
            if let NotificationEvent::Dismissed { reason, .. } = event {
                assert_eq!(reason, DismissReason::PowerOff);
                power_off += 1;
            }
        }
        assert_eq!(power_off, 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(expiries.try_recv().is_err());
    }
}
