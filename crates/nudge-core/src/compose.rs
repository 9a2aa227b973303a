//! Topic deduplication and notification composition.
//!
//! Matched topics are merged across all evaluated conditions, topics already
//! surfaced in the conversation's unread window are dropped, and at most one
//! condition-match notification is built from what remains.

use std::collections::BTreeSet;

use crate::config::{EngineConfig, TOPICS_PLACEHOLDER};
use crate::threshold;
use crate::types::{
    ClassificationRequest, ClassificationResult, ConditionId, ConversationId, Notification,
};

/// A condition that cleared its threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMatch {
    pub condition_id: ConditionId,
    /// Topic extracted by the classifier, or the condition text when none was given.
    pub label: String,
    /// False when `label` is a fallback; such labels never enter `notified_topics`.
    pub dedupable: bool,
}

/// Collect the matches of a classification, in request order.
///
/// `results` are expected to be aligned with `request` (see
/// [`align_results`](crate::types::align_results)).
pub fn matched_topics(
    request: &ClassificationRequest,
    results: &[ClassificationResult],
) -> Vec<TopicMatch> {
    request
        .conditions
        .iter()
        .zip(results)
        .filter(|(query, result)| threshold::is_match(result.score, query.sensitivity))
        .map(|(query, result)| {
            let topic = result.topic.trim();
            if topic.is_empty() {
                TopicMatch {
                    condition_id: query.condition_id.clone(),
                    label: query.condition.clone(),
                    dedupable: false,
                }
            } else {
                TopicMatch {
                    condition_id: query.condition_id.clone(),
                    label: topic.to_string(),
                    dedupable: true,
                }
            }
        })
        .collect()
}

/// Remove already-notified topics and record the survivors.
///
/// Returns distinct labels in order of first occurrence.
pub fn dedupe_topics(matches: &[TopicMatch], notified: &mut BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut fresh = Vec::new();

    for m in matches {
        if m.dedupable && notified.contains(&m.label) {
            continue;
        }
        if seen.insert(m.label.as_str()) {
            fresh.push(m.label.clone());
        }
    }

    for m in matches.iter().filter(|m| m.dedupable) {
        notified.insert(m.label.clone());
    }

    fresh
}

/// Builds condition-match notifications from a topic list.
#[derive(Debug, Clone)]
pub struct Composer {
    template: String,
    separator: String,
}

impl Composer {
    pub fn new(template: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.topic_template.clone(), config.topic_separator.clone())
    }

    /// Compose one notification listing `topics`, or `None` when there are none.
    ///
    /// The joined topic list is the highlight, so it always occurs in the message.
    pub fn compose(
        &self,
        conversation_id: ConversationId,
        source_name: &str,
        topics: &[String],
    ) -> Option<Notification> {
        if topics.is_empty() {
            return None;
        }
        let joined = topics.join(&self.separator);
        let message = self.template.replace(TOPICS_PLACEHOLDER, &joined);
        Some(Notification::condition_match(
            conversation_id,
            source_name,
            message,
            joined,
        ))
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
