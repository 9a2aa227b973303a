use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::types::{ConversationId, Notification, NotificationId};

/// A visible notification together with its dismiss timer.
#[derive(Debug)]
pub struct ActiveNotification {
    pub notification: Notification,
    timer: JoinHandle<()>,
}

/// Owned map from notification id to its active entry.
///
/// An entry exists exactly while the notification is visible, and every
/// entry owns exactly one timer. Removing an entry by explicit dismissal
/// aborts its timer; removing it by expiry only releases the finished handle.
#[derive(Debug, Default)]
pub struct NotificationRegistry {
    active: HashMap<NotificationId, ActiveNotification>,
}

impl NotificationRegistry {
    /// Register a notification and its scheduled timer.
    ///
    /// Returns false, aborting the new timer, if the id is already registered.
    pub fn register(&mut self, notification: Notification, timer: JoinHandle<()>) -> bool {
        match self.active.entry(notification.id) {
            Entry::Occupied(_) => {
                timer.abort();
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(ActiveNotification {
                    notification,
                    timer,
                });
                true
            }
        }
    }

    /// Release a notification whose timer fired. Unknown ids are ignored.
    pub fn expire(&mut self, id: &NotificationId) -> Option<Notification> {
        self.active.remove(id).map(|entry| entry.notification)
    }

    /// Remove a notification before its timer fires, cancelling the timer.
    pub fn dismiss(&mut self, id: &NotificationId) -> Option<Notification> {
        self.active.remove(id).map(|entry| {
            entry.timer.abort();
            entry.notification
        })
    }

    /// Dismiss every notification of one conversation.
    pub fn dismiss_conversation(&mut self, conversation_id: &ConversationId) -> Vec<Notification> {
        let ids: Vec<NotificationId> = self
            .active
            .values()
            .filter(|entry| &entry.notification.conversation_id == conversation_id)
            .map(|entry| entry.notification.id)
            .collect();
        ids.iter().filter_map(|id| self.dismiss(id)).collect()
    }

    /// Dismiss everything, oldest first.
    pub fn clear(&mut self) -> Vec<Notification> {
        let mut removed: Vec<Notification> = self
            .active
            .drain()
            .map(|(_, entry)| {
                entry.timer.abort();
                entry.notification
            })
            .collect();
        removed.sort_by_key(|n| n.created_at);
        removed
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.active.get(id).map(|entry| &entry.notification)
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.active.contains_key(id)
    }

    /// Visible notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        let mut visible: Vec<Notification> = self
            .active
            .values()
            .map(|entry| entry.notification.clone())
            .collect();
        visible.sort_by_key(|n| n.created_at);
        visible
    }

    /// Number of timers that have not yet fired or been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.active
            .values()
            .filter(|entry| !entry.timer.is_finished())
            .count()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Drop for NotificationRegistry {
    fn drop(&mut self) {
        for entry in self.active.values() {
            entry.timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pending_timer() -> JoinHandle<()> {
        tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        })
    }

    fn notification(conversation: &str) -> Notification {
        Notification::new_message(conversation.into(), "상대방", "안녕")
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_and_dismiss() {
        let mut registry = NotificationRegistry::default();
        let n = notification("main");
        let id = n.id;

        assert!(registry.register(n, pending_timer()));
        assert!(registry.contains(&id));
        assert_eq!(registry.pending_timers(), 1);

        let dismissed = registry.dismiss(&id).unwrap();
        assert_eq!(dismissed.id, id);
        assert!(registry.is_empty());
        assert!(registry.dismiss(&id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_register_rejected() {
        let mut registry = NotificationRegistry::default();
        let n = notification("main");
        assert!(registry.register(n.clone(), pending_timer()));
        assert!(!registry.register(n, pending_timer()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_unknown_is_ignored() {
        let mut registry = NotificationRegistry::default();
        assert!(registry.expire(&NotificationId::generate()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_conversation_only_touches_that_conversation() {
        let mut registry = NotificationRegistry::default();
        registry.register(notification("a"), pending_timer());
        registry.register(notification("a"), pending_timer());
        registry.register(notification("b"), pending_timer());

        let removed = registry.dismiss_conversation(&ConversationId::new("a"));
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.notifications()[0].conversation_id.as_str(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_aborts_all_timers() {
        let mut registry = NotificationRegistry::default();
        registry.register(notification("a"), pending_timer());
        registry.register(notification("b"), pending_timer());

        assert_eq!(registry.clear().len(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.pending_timers(), 0);
    }
}
