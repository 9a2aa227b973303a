//! Notification events shown as banners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, NotificationId};

/// Which path produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Always-on alert for any new message.
    NewMessage,
    /// One or more conditions matched.
    ConditionMatch,
}

/// An ephemeral, auto-dismissing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub conversation_id: ConversationId,
    pub message: String,
    pub source_name: String,
    pub created_at: DateTime<Utc>,
    /// Phrase the display layer emphasizes inside `message`. Empty = none.
    pub highlight_topic: String,
}

/// A run of banner text, emphasized or plain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

impl Notification {
    /// Create a plain new-message notification.
    pub fn new_message(
        conversation_id: ConversationId,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            kind: NotificationKind::NewMessage,
            conversation_id,
            message: message.into(),
            source_name: source_name.into(),
            created_at: Utc::now(),
            highlight_topic: String::new(),
        }
    }

    /// Create a condition-match notification.
    pub fn condition_match(
        conversation_id: ConversationId,
        source_name: impl Into<String>,
        message: impl Into<String>,
        highlight_topic: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            kind: NotificationKind::ConditionMatch,
            conversation_id,
            message: message.into(),
            source_name: source_name.into(),
            created_at: Utc::now(),
            highlight_topic: highlight_topic.into(),
        }
    }

    /// Split the message around every occurrence of the highlight topic.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        if self.highlight_topic.is_empty() {
            return vec![Segment {
                text: &self.message,
                emphasized: false,
            }];
        }

        let mut segments = Vec::new();
        let mut rest = self.message.as_str();
        while let Some(pos) = rest.find(&self.highlight_topic) {
            if pos > 0 {
                segments.push(Segment {
                    text: &rest[..pos],
                    emphasized: false,
                });
            }
            let end = pos + self.highlight_topic.len();
            segments.push(Segment {
                text: &rest[pos..end],
                emphasized: true,
            });
            rest = &rest[end..];
        }
        if !rest.is_empty() {
            segments.push(Segment {
                text: rest,
                emphasized: false,
            });
        }
        segments
    }
}
