//! JSON shapes exchanged with the classification endpoint.
//!
//! Shared by the HTTP classifier client and the server so both sides agree on
//! field names. All fields are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::{NudgeError, NudgeResult};
use crate::types::{
    ClassificationRequest, ClassificationResult, ConditionId, ConditionScore, Sensitivity,
    SensitivityLevel,
};

/// One condition in a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCondition {
    pub id: String,
    pub condition: String,
    pub sensitivity: Sensitivity,
}

/// Body of `POST /api/check-notification`.
///
/// The presence of `conditions` selects the batch form; otherwise `condition`
/// selects the legacy single-condition form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckNotificationRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<WireCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<LegacySensitivity>,
}

impl CheckNotificationRequest {
    /// Batch form for a classification request.
    pub fn batch(request: &ClassificationRequest) -> Self {
        Self {
            message: Some(request.text.clone()),
            conditions: Some(
                request
                    .conditions
                    .iter()
                    .map(|q| WireCondition {
                        id: q.condition_id.to_string(),
                        condition: q.condition.clone(),
                        sensitivity: q.sensitivity,
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Legacy form for a single condition.
    pub fn legacy(message: &str, condition: &str, sensitivity: Sensitivity) -> Self {
        Self {
            message: Some(message.to_string()),
            condition: Some(condition.to_string()),
            sensitivity: Some(LegacySensitivity::Numeric(i64::from(sensitivity.value()))),
            ..Default::default()
        }
    }
}

/// Legacy sensitivity: `"low" | "medium" | "high"` or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacySensitivity {
    Level(SensitivityLevel),
    Numeric(i64),
}

impl LegacySensitivity {
    /// Convert to the canonical numeric form.
    pub fn resolve(self) -> NudgeResult<Sensitivity> {
        match self {
            Self::Level(level) => Ok(level.into()),
            Self::Numeric(value) => Sensitivity::new(value),
        }
    }
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResult {
    pub condition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    pub should_notify: bool,
    #[serde(default)]
    pub topic: String,
}

impl WireResult {
    /// Probability, falling back to `shouldNotify` as a verdict.
    pub fn score(&self) -> ConditionScore {
        match self.probability {
            Some(p) => ConditionScore::Probability(p.min(100)),
            None => ConditionScore::Verdict(self.should_notify),
        }
    }

    pub fn into_result(self) -> ClassificationResult {
        let score = self.score();
        ClassificationResult::new(ConditionId::new(self.condition_id), score, self.topic)
    }
}

/// Batch response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCheckResponse {
    pub results: Vec<WireResult>,
}

/// Legacy response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCheckResponse {
    pub should_notify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl LegacyCheckResponse {
    pub fn into_result(self, condition_id: ConditionId) -> ClassificationResult {
        ClassificationResult::new(
            condition_id,
            ConditionScore::Verdict(self.should_notify),
            self.topic.unwrap_or_default(),
        )
    }
}

/// Error body returned by the endpoint on 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Decode an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) => body.to_string(),
    }
}

/// Reject a legacy request without the fields it needs.
pub fn require_field<'a>(value: &'a Option<String>, field: &str) -> NudgeResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(NudgeError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConditionQuery;

    #[test]
    fn test_batch_request_shape() {
        let request = ClassificationRequest::new(
            "제주도 가자",
            vec![ConditionQuery::new("c1", "여행", Sensitivity::clamped(60))],
        );
        let json = serde_json::to_value(CheckNotificationRequest::batch(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "제주도 가자",
                "conditions": [{"id": "c1", "condition": "여행", "sensitivity": 60}]
            })
        );
    }

    #[test]
    fn test_legacy_sensitivity_forms() {
        let body: CheckNotificationRequest = serde_json::from_str(
            r#"{"message": "hi", "condition": "여행", "sensitivity": "high"}"#,
        )
        .unwrap();
        assert_eq!(body.sensitivity.unwrap().resolve().unwrap().value(), 75);

        let body: CheckNotificationRequest =
            serde_json::from_str(r#"{"message": "hi", "condition": "여행", "sensitivity": 30}"#)
                .unwrap();
        assert_eq!(body.sensitivity.unwrap().resolve().unwrap().value(), 30);

        assert!(LegacySensitivity::Numeric(130).resolve().is_err());
    }

    #[test]
    fn test_result_falls_back_to_should_notify() {
        let result: WireResult =
            serde_json::from_str(r#"{"conditionId": "c1", "shouldNotify": true, "topic": "여행"}"#)
                .unwrap();
        assert_eq!(result.score(), ConditionScore::Verdict(true));

        let result: WireResult =
            serde_json::from_str(r#"{"conditionId": "c1", "shouldNotify": false}"#).unwrap();
        assert_eq!(result.score(), ConditionScore::Verdict(false));
        assert_eq!(result.topic, "");

        let result: WireResult = serde_json::from_str(
            r#"{"conditionId": "c1", "probability": 45, "shouldNotify": false, "topic": "여행"}"#,
        )
        .unwrap();
        assert_eq!(result.score(), ConditionScore::Probability(45));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"error": "Failed to call Gemini API", "details": "quota"}"#),
            "Failed to call Gemini API: quota"
        );
        assert_eq!(error_message(r#"{"error": "bad"}"#), "bad");
        assert_eq!(error_message("plain"), "plain");
    }

    #[test]
    fn test_require_field() {
        assert_eq!(require_field(&Some(" hi ".into()), "message").unwrap(), "hi");
        assert!(require_field(&Some("  ".into()), "message").is_err());
        assert!(require_field(&None, "message").is_err());
    }
}
