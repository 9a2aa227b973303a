//! HTTP classifier for the classification endpoint.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use nudge_core::error::{NudgeError, NudgeResult};
use nudge_core::traits::Classifier;
use nudge_core::types::{ClassificationRequest, ClassificationResult, ConditionQuery};
use nudge_core::wire::{
    error_message, BatchCheckResponse, CheckNotificationRequest, LegacyCheckResponse,
};

use crate::config::{ClassifierClientConfig, ClassifierMode};

/// [`Classifier`] backed by `POST /api/check-notification`.
pub struct HttpClassifier {
    client: Client,
    config: ClassifierClientConfig,
}

impl HttpClassifier {
    /// Create a classifier client.
    pub fn new(config: ClassifierClientConfig) -> NudgeResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NudgeError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create a client configured from `NUDGE_CLASSIFIER_*` variables.
    pub fn from_env() -> NudgeResult<Self> {
        Self::new(ClassifierClientConfig::from_env())
    }

    pub fn config(&self) -> &ClassifierClientConfig {
        &self.config
    }

    async fn post<T: DeserializeOwned>(&self, body: &CheckNotificationRequest) -> NudgeResult<T> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| NudgeError::classifier(format!("Classification request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NudgeError::from_http_status(status.as_u16(), &error_message(&body)));
        }

        response
            .json()
            .await
            .map_err(|e| NudgeError::parse(format!("Failed to parse classifier response: {}", e)))
    }

    async fn classify_batch(
        &self,
        request: &ClassificationRequest,
    ) -> NudgeResult<Vec<ClassificationResult>> {
        let response: BatchCheckResponse =
            self.post(&CheckNotificationRequest::batch(request)).await?;
        Ok(response
            .results
            .into_iter()
            .map(|r| r.into_result())
            .collect())
    }

    async fn classify_one(&self, text: &str, query: &ConditionQuery) -> NudgeResult<ClassificationResult> {
        let body = CheckNotificationRequest::legacy(text, &query.condition, query.sensitivity);
        let response: LegacyCheckResponse = self.post(&body).await?;
        Ok(response.into_result(query.condition_id.clone()))
    }

    /// One call per condition. A failed call scores its condition as no-match;
    /// the batch only fails when every call failed.
    async fn classify_legacy(
        &self,
        request: &ClassificationRequest,
    ) -> NudgeResult<Vec<ClassificationResult>> {
        let calls = request
            .conditions
            .iter()
            .map(|query| self.classify_one(&request.text, query));
        let outcomes = join_all(calls).await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for (query, outcome) in request.conditions.iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(condition_id = %query.condition_id, error = %e, "Legacy classification failed");
                    results.push(ClassificationResult::no_match(query.condition_id.clone()));
                    errors.push(e);
                }
            }
        }

        if errors.len() == results.len() {
            if let Some(e) = errors.into_iter().next() {
                return Err(e);
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> NudgeResult<Vec<ClassificationResult>> {
        if request.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            mode = %self.config.mode,
            conditions = request.len(),
            endpoint = %self.config.endpoint,
            "Calling classification endpoint"
        );
        match self.config.mode {
            ClassifierMode::Batch => self.classify_batch(request).await,
            ClassifierMode::Legacy => self.classify_legacy(request).await,
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
