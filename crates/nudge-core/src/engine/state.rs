//! Engine-owned state and the snapshot types handed out to callers.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::types::{
    ClassificationRequest, Condition, ConversationId, InboundMessage, NotificationId, Sensitivity,
};

/// A registered conversation: its unread window and newest message.
///
/// Read messages are dropped; only the newest text is kept for previews.
#[derive(Debug, Clone)]
pub(crate) struct ConversationState {
    pub name: String,
    unread: Vec<InboundMessage>,
    last_message: Option<String>,
}

impl ConversationState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unread: Vec::new(),
            last_message: None,
        }
    }

    pub fn push(&mut self, message: InboundMessage) {
        self.last_message = Some(message.text.clone());
        self.unread.push(message);
    }

    pub fn unread(&self) -> &[InboundMessage] {
        &self.unread
    }

    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Mark every message read, returning how many were unread.
    pub fn mark_all_read(&mut self) -> usize {
        let changed = self.unread.len();
        self.unread.clear();
        changed
    }
}

/// A classification call that has been dispatched and not yet applied.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub conversation_id: ConversationId,
    pub request: ClassificationRequest,
    pub token: CancellationToken,
}

/// What happened to the classification side of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationDispatch {
    /// One classifier call was issued.
    Started,
    /// Condition matching is off or no conditions are configured.
    NoConditions,
    /// An identical call for this conversation is already in flight.
    Duplicate,
    /// Nothing unread to evaluate.
    NothingUnread,
}

/// Result of delivering an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiveOutcome {
    pub message_id: Uuid,
    /// The always-on "new message" notification, when general notifications are on.
    pub general_notification: Option<NotificationId>,
    pub classification: ClassificationDispatch,
}

/// Point-in-time view of one conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    pub name: String,
    pub unread_count: usize,
    pub last_message: Option<String>,
    pub general_enabled: bool,
    pub condition_matching_enabled: bool,
    pub sensitivity: Sensitivity,
    pub conditions: Vec<Condition>,
    /// Topics already notified in the current unread window, sorted.
    pub notified_topics: Vec<String>,
    /// Classifier calls dispatched and not yet applied, including cancelled ones.
    pub classifications_in_flight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_tracking() {
        let mut state = ConversationState::new("상대방");
        assert_eq!(state.unread_count(), 0);
        assert!(state.last_message().is_none());

        state.push(InboundMessage::new("안녕"));
        state.push(InboundMessage::new("여행 가자"));
        assert_eq!(state.unread_count(), 2);
        assert_eq!(state.last_message(), Some("여행 가자"));

        assert_eq!(state.mark_all_read(), 2);
        assert_eq!(state.unread_count(), 0);
        assert!(state.unread().is_empty());
        assert_eq!(state.mark_all_read(), 0);
        // The preview survives the read window
        assert_eq!(state.last_message(), Some("여행 가자"));
    }
}
