//! Condition store: per-conversation and global condition lists.
//!
//! Each scope holds an ordered list of at most `max_conditions` conditions and
//! one sensitivity. Conversations additionally carry their notification
//! toggles and the `notified_topics` dedup guard.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::{NudgeError, NudgeResult};
use crate::types::{Condition, ConditionId, ConditionQuery, ConditionScope, ConversationId, Sensitivity};

/// Notification settings of a single conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationNotificationConfig {
    /// Whether the always-on "new message" notification fires.
    pub general_enabled: bool,
    /// Whether conversation conditions are evaluated.
    pub condition_matching_enabled: bool,
    pub sensitivity: Sensitivity,
    conditions: Vec<Condition>,
    notified_topics: BTreeSet<String>,
}

impl ConversationNotificationConfig {
    fn new(sensitivity: Sensitivity) -> Self {
        Self {
            general_enabled: true,
            condition_matching_enabled: true,
            sensitivity,
            conditions: Vec::new(),
            notified_topics: BTreeSet::new(),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Topics already surfaced during the current unread window.
    pub fn notified_topics(&self) -> &BTreeSet<String> {
        &self.notified_topics
    }

    pub(crate) fn notified_topics_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.notified_topics
    }
}

/// Settings of the global scope.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalNotificationConfig {
    pub condition_matching_enabled: bool,
    pub sensitivity: Sensitivity,
    conditions: Vec<Condition>,
}

impl GlobalNotificationConfig {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

/// In-memory store of all condition scopes.
#[derive(Debug, Clone)]
pub struct ConditionStore {
    global: GlobalNotificationConfig,
    conversations: HashMap<ConversationId, ConversationNotificationConfig>,
    max_conditions: usize,
    default_sensitivity: Sensitivity,
}

impl ConditionStore {
    /// Create an empty store.
    pub fn new(max_conditions: usize, default_sensitivity: Sensitivity) -> Self {
        Self {
            global: GlobalNotificationConfig {
                condition_matching_enabled: true,
                sensitivity: default_sensitivity,
                conditions: Vec::new(),
            },
            conversations: HashMap::new(),
            max_conditions,
            default_sensitivity,
        }
    }

    pub fn max_conditions(&self) -> usize {
        self.max_conditions
    }

    /// Get or create the config of a conversation.
    pub fn ensure_conversation(&mut self, id: &ConversationId) -> &mut ConversationNotificationConfig {
        let default_sensitivity = self.default_sensitivity;
        self.conversations
            .entry(id.clone())
            .or_insert_with(|| ConversationNotificationConfig::new(default_sensitivity))
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<&ConversationNotificationConfig> {
        self.conversations.get(id)
    }

    pub fn conversation_mut(&mut self, id: &ConversationId) -> Option<&mut ConversationNotificationConfig> {
        self.conversations.get_mut(id)
    }

    pub fn global(&self) -> &GlobalNotificationConfig {
        &self.global
    }

    /// Conditions of a scope; an unknown conversation has none.
    pub fn conditions(&self, scope: &ConditionScope) -> &[Condition] {
        match scope {
            ConditionScope::Global => &self.global.conditions,
            ConditionScope::Conversation(id) => self
                .conversations
                .get(id)
                .map(|c| c.conditions.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Append a condition to a scope.
    pub fn add_condition(&mut self, scope: &ConditionScope, text: &str) -> NudgeResult<Condition> {
        let condition = Condition::new(text)?;
        let limit = self.max_conditions;
        let list = self.conditions_mut(scope);
        if list.len() >= limit {
            return Err(NudgeError::condition_limit(limit));
        }
        list.push(condition.clone());
        debug!(scope = ?scope, condition_id = %condition.id, "Condition added");
        Ok(condition)
    }

    /// Remove a condition from a scope.
    pub fn remove_condition(
        &mut self,
        scope: &ConditionScope,
        id: &ConditionId,
    ) -> NudgeResult<Condition> {
        let list = self.conditions_mut(scope);
        let pos = list
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| NudgeError::condition_not_found(id))?;
        let removed = list.remove(pos);
        debug!(scope = ?scope, condition_id = %id, "Condition removed");
        Ok(removed)
    }

    /// Edit a condition: remove the old one and append a new one.
    ///
    /// The new text is validated first so a rejected edit leaves the scope untouched.
    pub fn replace_condition(
        &mut self,
        scope: &ConditionScope,
        id: &ConditionId,
        text: &str,
    ) -> NudgeResult<Condition> {
        let replacement = Condition::new(text)?;
        self.remove_condition(scope, id)?;
        self.conditions_mut(scope).push(replacement.clone());
        Ok(replacement)
    }

    /// Set the sensitivity of a scope, rejecting values outside [0, 100].
    pub fn set_sensitivity(&mut self, scope: &ConditionScope, value: i64) -> NudgeResult<Sensitivity> {
        let sensitivity = Sensitivity::new(value)?;
        match scope {
            ConditionScope::Global => self.global.sensitivity = sensitivity,
            ConditionScope::Conversation(id) => self.ensure_conversation(id).sensitivity = sensitivity,
        }
        Ok(sensitivity)
    }

    pub fn sensitivity(&self, scope: &ConditionScope) -> Sensitivity {
        match scope {
            ConditionScope::Global => self.global.sensitivity,
            ConditionScope::Conversation(id) => self
                .conversations
                .get(id)
                .map(|c| c.sensitivity)
                .unwrap_or(self.default_sensitivity),
        }
    }

    pub fn set_general_enabled(&mut self, id: &ConversationId, enabled: bool) {
        self.ensure_conversation(id).general_enabled = enabled;
    }

    pub fn set_condition_matching(&mut self, scope: &ConditionScope, enabled: bool) {
        match scope {
            ConditionScope::Global => self.global.condition_matching_enabled = enabled,
            ConditionScope::Conversation(id) => {
                self.ensure_conversation(id).condition_matching_enabled = enabled
            }
        }
    }

    /// Combined condition batch for a conversation.
    ///
    /// Conversation conditions (tagged with the conversation sensitivity) come
    /// first, then global conditions (tagged with the global sensitivity). A
    /// scope whose toggle is off contributes nothing.
    pub fn condition_batch(&self, id: &ConversationId) -> Vec<ConditionQuery> {
        let mut batch = Vec::new();
        if let Some(config) = self.conversations.get(id) {
            if config.condition_matching_enabled {
                batch.extend(
                    config
                        .conditions
                        .iter()
                        .map(|c| ConditionQuery::from_condition(c, config.sensitivity)),
                );
            }
        }
        if self.global.condition_matching_enabled {
            batch.extend(
                self.global
                    .conditions
                    .iter()
                    .map(|c| ConditionQuery::from_condition(c, self.global.sensitivity)),
            );
        }
        batch
    }

    /// Clear the dedup guard of a conversation.
    pub fn clear_notified_topics(&mut self, id: &ConversationId) {
        if let Some(config) = self.conversations.get_mut(id) {
            config.notified_topics.clear();
        }
    }

    fn conditions_mut(&mut self, scope: &ConditionScope) -> &mut Vec<Condition> {
        match scope {
            ConditionScope::Global => &mut self.global.conditions,
            ConditionScope::Conversation(id) => &mut self.ensure_conversation(id).conditions,
        }
    }
}

impl Default for ConditionStore {
    fn default() -> Self {
        Self::new(20, Sensitivity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv(id: &str) -> ConditionScope {
        ConditionScope::Conversation(ConversationId::new(id))
    }

    #[test]
    fn test_add_and_list_preserves_order() {
        let mut store = ConditionStore::default();
        store.add_condition(&conv("main"), "여행").unwrap();
        store.add_condition(&conv("main"), "맛집").unwrap();

        let texts: Vec<_> = store.conditions(&conv("main")).iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["여행", "맛집"]);
        assert!(store.conditions(&ConditionScope::Global).is_empty());
    }

    #[test]
    fn test_limit_is_enforced_per_scope() {
        let mut store = ConditionStore::new(2, Sensitivity::default());
        store.add_condition(&conv("a"), "one").unwrap();
        store.add_condition(&conv("a"), "two").unwrap();
        let err = store.add_condition(&conv("a"), "three").unwrap_err();
        assert!(matches!(err, NudgeError::ConditionLimit { limit: 2, .. }));

        // Other scopes are unaffected
        store.add_condition(&conv("b"), "one").unwrap();
        store.add_condition(&ConditionScope::Global, "one").unwrap();
    }

    #[test]
    fn test_remove_unknown_condition() {
        let mut store = ConditionStore::default();
        let err = store
            .remove_condition(&ConditionScope::Global, &ConditionId::new("missing"))
            .unwrap_err();
        assert!(matches!(err, NudgeError::NotFound { .. }));
    }

    #[test]
    fn test_replace_is_remove_then_add() {
        let mut store = ConditionStore::default();
        let first = store.add_condition(&conv("main"), "여행").unwrap();
        store.add_condition(&conv("main"), "맛집").unwrap();

        let edited = store.replace_condition(&conv("main"), &first.id, "해외여행").unwrap();
        assert_ne!(edited.id, first.id);

        let texts: Vec<_> = store.conditions(&conv("main")).iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["맛집", "해외여행"]);
    }

    #[test]
    fn test_replace_with_blank_text_keeps_original() {
        let mut store = ConditionStore::default();
        let first = store.add_condition(&conv("main"), "여행").unwrap();
        assert!(store.replace_condition(&conv("main"), &first.id, "  ").is_err());
        assert_eq!(store.conditions(&conv("main"))[0].id, first.id);
    }

    #[test]
    fn test_sensitivity_out_of_range_is_rejected() {
        let mut store = ConditionStore::default();
        assert!(store.set_sensitivity(&conv("main"), 101).is_err());
        assert!(store.set_sensitivity(&ConditionScope::Global, -5).is_err());
        store.set_sensitivity(&conv("main"), 60).unwrap();
        assert_eq!(store.sensitivity(&conv("main")).value(), 60);
        assert_eq!(store.sensitivity(&ConditionScope::Global).value(), 50);
    }

    #[test]
    fn test_condition_batch_tags_scope_sensitivity() {
        let mut store = ConditionStore::default();
        let id = ConversationId::new("main");
        store.add_condition(&conv("main"), "여행").unwrap();
        store.add_condition(&ConditionScope::Global, "긴급").unwrap();
        store.set_sensitivity(&conv("main"), 60).unwrap();
        store.set_sensitivity(&ConditionScope::Global, 20).unwrap();

        let batch = store.condition_batch(&id);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].condition, "여행");
        assert_eq!(batch[0].sensitivity.value(), 60);
        assert_eq!(batch[1].condition, "긴급");
        assert_eq!(batch[1].sensitivity.value(), 20);
    }

    #[test]
    fn test_condition_batch_respects_toggles() {
        let mut store = ConditionStore::default();
        let id = ConversationId::new("main");
        store.add_condition(&conv("main"), "여행").unwrap();
        store.add_condition(&ConditionScope::Global, "긴급").unwrap();

        store.set_condition_matching(&conv("main"), false);
        let batch = store.condition_batch(&id);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].condition, "긴급");

        store.set_condition_matching(&ConditionScope::Global, false);
        assert!(store.condition_batch(&id).is_empty());
    }

    #[test]
    fn test_clear_notified_topics() {
        let mut store = ConditionStore::default();
        let id = ConversationId::new("main");
        store
            .ensure_conversation(&id)
            .notified_topics_mut()
            .insert("여행".to_string());
        assert_eq!(store.conversation(&id).unwrap().notified_topics().len(), 1);

        store.clear_notified_topics(&id);
        assert!(store.conversation(&id).unwrap().notified_topics().is_empty());
    }
}
