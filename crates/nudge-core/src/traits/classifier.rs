//! Classifier trait: scores a batch of conditions against aggregated text.

use async_trait::async_trait;

use crate::error::NudgeResult;
use crate::types::{ClassificationRequest, ClassificationResult};

/// Black-box scoring function for conditions.
///
/// Implementations return at most one result per requested condition, in
/// request order. Callers pad missing trailing results with no-match, and
/// treat both an error and an empty list as "no conditions matched".
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Score every condition in the request against its text.
    async fn classify(&self, request: &ClassificationRequest)
        -> NudgeResult<Vec<ClassificationResult>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
