//! Classification request and result types.

use serde::{Deserialize, Serialize};

use crate::types::{Condition, ConditionId, Sensitivity};

/// One condition to score, with the sensitivity of its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionQuery {
    pub condition_id: ConditionId,
    pub condition: String,
    pub sensitivity: Sensitivity,
}

impl ConditionQuery {
    pub fn new(
        condition_id: impl Into<ConditionId>,
        condition: impl Into<String>,
        sensitivity: Sensitivity,
    ) -> Self {
        Self {
            condition_id: condition_id.into(),
            condition: condition.into(),
            sensitivity,
        }
    }

    /// Tag a stored condition with its scope's sensitivity.
    pub fn from_condition(condition: &Condition, sensitivity: Sensitivity) -> Self {
        Self {
            condition_id: condition.id.clone(),
            condition: condition.text().to_string(),
            sensitivity,
        }
    }
}

/// Aggregated text plus an ordered batch of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
    pub conditions: Vec<ConditionQuery>,
}

impl ClassificationRequest {
    pub fn new(text: impl Into<String>, conditions: Vec<ConditionQuery>) -> Self {
        Self {
            text: text.into(),
            conditions,
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Classifier output for one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConditionScore {
    /// Batch form: probability in [0, 100].
    Probability(u8),
    /// Legacy form: explicit YES/NO.
    Verdict(bool),
    /// No usable classifier output for this condition. Never matches.
    Missing,
}

impl ConditionScore {
    /// The safest no-match value.
    ///
    /// Distinct from `Probability(0)`, which still matches at sensitivity 100.
    pub fn no_match() -> Self {
        Self::Missing
    }

    /// The probability, when the classifier gave one.
    pub fn probability(self) -> Option<u8> {
        match self {
            Self::Probability(p) => Some(p),
            Self::Verdict(_) | Self::Missing => None,
        }
    }
}

/// Result for one condition, positionally aligned with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub condition_id: ConditionId,
    pub score: ConditionScore,
    /// Extracted topic; empty when the classifier gave none.
    pub topic: String,
}

impl ClassificationResult {
    pub fn new(condition_id: ConditionId, score: ConditionScore, topic: impl Into<String>) -> Self {
        Self {
            condition_id,
            score,
            topic: topic.into(),
        }
    }

    /// A no-match result for the given condition.
    pub fn no_match(condition_id: ConditionId) -> Self {
        Self {
            condition_id,
            score: ConditionScore::no_match(),
            topic: String::new(),
        }
    }
}

/// Pad or truncate `results` to the request's length.
///
/// Results are positional; condition ids are re-labelled from the request so a
/// classifier that echoes wrong ids cannot shift matches between conditions.
pub fn align_results(
    request: &ClassificationRequest,
    results: Vec<ClassificationResult>,
) -> Vec<ClassificationResult> {
    let mut results = results.into_iter();
    request
        .conditions
        .iter()
        .map(|query| match results.next() {
            Some(mut result) => {
                result.condition_id = query.condition_id.clone();
                result
            }
            None => ClassificationResult::no_match(query.condition_id.clone()),
        })
        .collect()
}
