//! Interest conditions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NudgeError, NudgeResult};
use crate::types::{ConditionId, ConversationId};

/// A user-authored natural-language condition.
///
/// The text is immutable once created; edits are a remove followed by an add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    text: String,
    pub created_at: DateTime<Utc>,
}

impl Condition {
    /// Create a condition with a fresh id. Surrounding whitespace is trimmed.
    pub fn new(text: impl AsRef<str>) -> NudgeResult<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(NudgeError::validation("Condition text must not be empty"));
        }
        Ok(Self {
            id: ConditionId::generate(),
            text: text.to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Owner of a condition list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ConditionScope {
    Global,
    Conversation(ConversationId),
}

impl ConditionScope {
    pub fn conversation(id: impl Into<ConversationId>) -> Self {
        Self::Conversation(id.into())
    }
}
