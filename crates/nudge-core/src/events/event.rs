//! Notification lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, Notification, NotificationId};

/// What a completed classification led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// A condition-match notification was shown.
    Notified {
        notification_id: NotificationId,
        topics: Vec<String>,
    },
    /// No condition cleared its threshold.
    NoMatch,
    /// Every matched topic was already notified in this unread window.
    AlreadyNotified,
    /// The classifier failed; treated as no match.
    Failed { error: String },
    /// The conversation was opened while the call was in flight.
    Discarded,
}

/// Why a notification left the visible set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// The dismiss timer fired.
    Timeout,
    /// The user activated the banner and navigated to the conversation.
    Activated,
    /// Explicit dismissal, or the conversation was opened.
    Dismissed,
    /// The display surface was powered off.
    PowerOff,
}

/// Events emitted by the engine as notifications move through their lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A notification became visible and its timer was scheduled.
    Shown { notification: Notification },
    /// A notification was removed and its timer released.
    Dismissed {
        id: NotificationId,
        conversation_id: ConversationId,
        reason: DismissReason,
        timestamp: DateTime<Utc>,
    },
    /// A classification finished and its result was applied or dropped.
    Evaluated {
        conversation_id: ConversationId,
        #[serde(flatten)]
        outcome: EvaluationOutcome,
    },
}

impl NotificationEvent {
    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Shown { .. } => "notification.shown",
            Self::Dismissed { .. } => "notification.dismissed",
            Self::Evaluated { .. } => "classification.evaluated",
        }
    }

    /// The notification this event concerns, if any.
    pub fn notification_id(&self) -> Option<NotificationId> {
        match self {
            Self::Shown { notification } => Some(notification.id),
            Self::Dismissed { id, .. } => Some(*id),
            Self::Evaluated {
                outcome: EvaluationOutcome::Notified { notification_id, .. },
                ..
            } => Some(*notification_id),
            Self::Evaluated { .. } => None,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            Self::Shown { notification } => &notification.conversation_id,
            Self::Dismissed {
                conversation_id, ..
            }
            | Self::Evaluated {
                conversation_id, ..
            } => conversation_id,
        }
    }

    pub(crate) fn dismissed(notification: &Notification, reason: DismissReason) -> Self {
        Self::Dismissed {
            id: notification.id,
            conversation_id: notification.conversation_id.clone(),
            reason,
            timestamp: Utc::now(),
        }
    }
}
