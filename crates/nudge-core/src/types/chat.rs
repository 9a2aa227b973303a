//! Chat messages received by a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: Uuid,
    pub text: String,
    pub received_at: DateTime<Utc>,
    pub read: bool,
}

impl InboundMessage {
    /// Create a new unread message.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            received_at: Utc::now(),
            read: false,
        }
    }
}
