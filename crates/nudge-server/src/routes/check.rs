//! Classification endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use nudge_core::classify::LlmClassifier;
use nudge_core::threshold;
use nudge_core::traits::Classifier;
use nudge_core::types::{align_results, ClassificationRequest, ConditionQuery, Sensitivity};
use nudge_core::wire::{
    BatchCheckResponse, CheckNotificationRequest, LegacyCheckResponse, WireCondition, WireResult,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Score text against one or more conditions.
/// POST /api/check-notification
///
/// A `conditions` array selects the batch form, otherwise `condition` selects
/// the legacy single-condition form. Request fields are validated before the
/// classifier credential is checked.
pub async fn check_notification(
    State(state): State<AppState>,
    body: Result<Json<CheckNotificationRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body.map_err(|e| {
        ApiError::bad_request("Invalid request body").with_details(e.body_text())
    })?;

    match body.conditions {
        Some(ref conditions) => {
            let request = batch_request(&body.message, conditions, state.max_batch_conditions())?;
            let classifier = require_classifier(&state)?;
            Ok(Json(check_batch(classifier, &request).await?).into_response())
        }
        None => {
            let (message, condition, sensitivity) = legacy_fields(&body)?;
            let classifier = require_classifier(&state)?;
            let response = check_legacy(classifier, message, condition, sensitivity).await?;
            Ok(Json(response).into_response())
        }
    }
}

fn require_classifier(state: &AppState) -> ApiResult<&LlmClassifier> {
    state
        .classifier()
        .ok_or_else(|| ApiError::not_configured("LLM API key not configured"))
}

fn batch_request(
    message: &Option<String>,
    conditions: &[WireCondition],
    max_conditions: usize,
) -> ApiResult<ClassificationRequest> {
    let message = message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() || conditions.is_empty() {
        return Err(ApiError::bad_request("Message and conditions are required"));
    }
    if conditions.len() > max_conditions {
        return Err(ApiError::bad_request(format!(
            "At most {} conditions are allowed per request",
            max_conditions
        )));
    }
    if conditions.iter().any(|c| c.condition.trim().is_empty()) {
        return Err(ApiError::bad_request("Condition text must not be empty"));
    }

    let queries = conditions
        .iter()
        .map(|c| ConditionQuery::new(c.id.as_str(), c.condition.trim(), c.sensitivity))
        .collect();
    Ok(ClassificationRequest::new(message, queries))
}

fn legacy_fields(body: &CheckNotificationRequest) -> ApiResult<(&str, &str, Sensitivity)> {
    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    let condition = body.condition.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() || condition.is_empty() {
        return Err(ApiError::bad_request("Message and condition are required"));
    }
    let sensitivity = match body.sensitivity {
        Some(s) => s.resolve()?,
        None => Sensitivity::default(),
    };
    Ok((message, condition, sensitivity))
}

async fn check_batch(
    classifier: &LlmClassifier,
    request: &ClassificationRequest,
) -> ApiResult<BatchCheckResponse> {
    let results = align_results(request, classifier.classify(request).await?);
    let results: Vec<WireResult> = request
        .conditions
        .iter()
        .zip(results)
        .map(|(query, result)| WireResult {
            condition_id: query.condition_id.to_string(),
            probability: result.score.probability(),
            should_notify: threshold::is_match(result.score, query.sensitivity),
            topic: result.topic,
        })
        .collect();

    info!(
        conditions = results.len(),
        matched = results.iter().filter(|r| r.should_notify).count(),
        "Batch checked"
    );
    Ok(BatchCheckResponse { results })
}

async fn check_legacy(
    classifier: &LlmClassifier,
    message: &str,
    condition: &str,
    sensitivity: Sensitivity,
) -> ApiResult<LegacyCheckResponse> {
    let (score, topic) = classifier
        .classify_single(message, condition, sensitivity)
        .await?;
    let should_notify = threshold::is_match(score, sensitivity);
    debug!(condition, should_notify, "Legacy check");

    Ok(LegacyCheckResponse {
        should_notify,
        topic: (!topic.is_empty()).then_some(topic),
    })
}
