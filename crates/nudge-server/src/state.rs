//! Server state management.

use std::sync::Arc;

use nudge_core::classify::LlmClassifier;
use nudge_core::traits::Llm;
use nudge_llm::LlmFactory;
use tracing::warn;

/// Most conditions accepted in one batch request.
pub const MAX_BATCH_CONDITIONS: usize = 20;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    classifier: Option<LlmClassifier>,
    max_batch_conditions: usize,
}

impl AppState {
    /// State without a classifier; classification requests fail with 500.
    pub fn unconfigured() -> Self {
        Self::build(None)
    }

    /// State classifying through the given model.
    pub fn with_llm(llm: Arc<dyn Llm>) -> Self {
        Self::build(Some(LlmClassifier::new(llm)))
    }

    /// Build the provider selected by `NUDGE_LLM_PROVIDER`.
    ///
    /// A missing credential is not fatal: the server still starts and
    /// reports it per request, so health checks keep working.
    pub fn from_env() -> Self {
        match LlmFactory::from_env() {
            Ok(llm) => Self::with_llm(llm),
            Err(e) => {
                warn!(error = %e, "Classifier not configured");
                Self::unconfigured()
            }
        }
    }

    fn build(classifier: Option<LlmClassifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                classifier,
                max_batch_conditions: MAX_BATCH_CONDITIONS,
            }),
        }
    }

    pub fn classifier(&self) -> Option<&LlmClassifier> {
        self.inner.classifier.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.classifier.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.classifier().map(|c| c.model_name())
    }

    pub fn max_batch_conditions(&self) -> usize {
        self.inner.max_batch_conditions
    }
}
