//! Classifier backed directly by an [`Llm`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::classify::parser::{parse_probability_lines, parse_verdict_line};
use crate::classify::prompts::{batch_prompt, verdict_prompt, CLASSIFIER_SYSTEM_PROMPT};
use crate::error::NudgeResult;
use crate::traits::{Classifier, GenerationOptions, Llm};
use crate::types::{ClassificationRequest, ClassificationResult, ConditionScore, Message, Sensitivity};

// Enough for one short line per condition.
const TOKENS_PER_CONDITION: u32 = 24;
const VERDICT_MAX_TOKENS: u32 = 32;

/// Scores conditions by prompting a language model.
///
/// LLM errors are returned as-is; fail-closed handling belongs to callers.
pub struct LlmClassifier {
    llm: Arc<dyn Llm>,
    temperature: f32,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            temperature: 0.1,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Single-condition verdict: returns `Verdict(true|false)` and the topic.
    pub async fn classify_single(
        &self,
        message: &str,
        condition: &str,
        sensitivity: Sensitivity,
    ) -> NudgeResult<(ConditionScore, String)> {
        let messages = vec![
            Message::system(CLASSIFIER_SYSTEM_PROMPT),
            Message::user(verdict_prompt(message, condition, sensitivity)),
        ];
        let response = self
            .llm
            .generate(&messages, Some(self.options(VERDICT_MAX_TOKENS)))
            .await?;
        let verdict = parse_verdict_line(response.content_or_empty());
        debug!(condition, verdict = ?verdict.0, "Verdict classified");
        Ok(verdict)
    }

    fn options(&self, max_tokens: u32) -> GenerationOptions {
        GenerationOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> NudgeResult<Vec<ClassificationResult>> {
        if request.is_empty() {
            return Ok(Vec::new());
        }

        let messages = vec![
            Message::system(CLASSIFIER_SYSTEM_PROMPT),
            Message::user(batch_prompt(request)),
        ];
        let max_tokens = TOKENS_PER_CONDITION * request.len() as u32;
        let response = self
            .llm
            .generate(&messages, Some(self.options(max_tokens)))
            .await?;

        let parsed = parse_probability_lines(response.content_or_empty(), request.len());
        debug!(
            model = self.llm.model_name(),
            conditions = request.len(),
            "Batch classified"
        );

        Ok(request
            .conditions
            .iter()
            .zip(parsed)
            .map(|(query, (score, topic))| {
                ClassificationResult::new(query.condition_id.clone(), score, topic)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NudgeError;
    use crate::traits::LlmResponse;
    use crate::types::ConditionQuery;
    use std::sync::Mutex;

    /// Returns a canned reply and records the prompts it was given.
    struct MockLlm {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Llm for MockLlm {
        async fn generate(
            &self,
            messages: &[Message],
            _options: Option<GenerationOptions>,
        ) -> NudgeResult<LlmResponse> {
            if let Some(last) = messages.last() {
                self.prompts.lock().unwrap().push(last.content.clone());
            }
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    content: Some(text.clone()),
                    usage: None,
                }),
                Err(message) => Err(NudgeError::llm(message.clone())),
            }
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn request() -> ClassificationRequest {
        ClassificationRequest::new(
            "다음 달에 해외여행 갈래?",
            vec![
                ConditionQuery::new("trip", "여행", Sensitivity::clamped(60)),
                ConditionQuery::new("food", "맛집", Sensitivity::clamped(60)),
                ConditionQuery::new("gym", "운동", Sensitivity::clamped(60)),
            ],
        )
    }

    #[tokio::test]
    async fn test_batch_results_are_aligned() {
        let llm = Arc::new(MockLlm::replying("95|해외여행\n40\n"));
        let classifier = LlmClassifier::new(llm.clone());

        let results = classifier.classify(&request()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].condition_id.as_str(), "trip");
        assert_eq!(results[0].score, ConditionScore::Probability(95));
        assert_eq!(results[0].topic, "해외여행");
        assert_eq!(results[1].score, ConditionScore::Probability(40));
        assert_eq!(results[2], ClassificationResult::no_match("gym".into()));

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("다음 달에 해외여행 갈래?"));
    }

    #[tokio::test]
    async fn test_empty_request_skips_llm() {
        let llm = Arc::new(MockLlm::replying("irrelevant"));
        let classifier = LlmClassifier::new(llm.clone());

        let results = classifier
            .classify(&ClassificationRequest::new("hi", Vec::new()))
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let classifier = LlmClassifier::new(Arc::new(MockLlm::failing("quota exceeded")));
        let err = classifier.classify(&request()).await.unwrap_err();
        assert!(matches!(err, NudgeError::Llm { .. }));
    }

    #[tokio::test]
    async fn test_single_verdict() {
        let classifier = LlmClassifier::new(Arc::new(MockLlm::replying("YES|해외여행")));
        let (score, topic) = classifier
            .classify_single("해외여행 가자", "여행", Sensitivity::default())
            .await
            .unwrap();
        assert_eq!(score, ConditionScore::Verdict(true));
        assert_eq!(topic, "해외여행");
    }
}
