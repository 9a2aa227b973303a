//! Factory for creating LLM providers.

use std::sync::Arc;

use nudge_core::config::LlmProvider;
use nudge_core::error::NudgeResult;
use nudge_core::traits::{Llm, LlmConfig};

use crate::anthropic::AnthropicLlm;
use crate::gemini::GeminiLlm;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> NudgeResult<Arc<dyn Llm>> {
        match provider {
            LlmProvider::Gemini => {
                let llm = GeminiLlm::new(config)?;
                Ok(Arc::new(llm))
            }
            LlmProvider::Anthropic => {
                let llm = AnthropicLlm::new(config)?;
                Ok(Arc::new(llm))
            }
        }
    }

    /// Create the provider named by `NUDGE_LLM_PROVIDER` (Gemini when unset),
    /// with the model from `NUDGE_LLM_MODEL` when set.
    pub fn from_env() -> NudgeResult<Arc<dyn Llm>> {
        let provider = LlmProvider::from_env().unwrap_or_default();
        let config = LlmConfig {
            model: std::env::var("NUDGE_LLM_MODEL").unwrap_or_default(),
            ..Default::default()
        };
        Self::create(provider, config)
    }

    /// Create a Gemini LLM provider with default configuration.
    pub fn gemini() -> NudgeResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Gemini, LlmConfig::default())
    }

    /// Create a Gemini LLM provider with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> NudgeResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Gemini, config)
    }

    /// Create an Anthropic LLM provider with default configuration.
    pub fn anthropic() -> NudgeResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Anthropic, LlmConfig::default())
    }

    /// Create an Anthropic LLM provider with a specific model.
    pub fn anthropic_with_model(model: impl Into<String>) -> NudgeResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Anthropic, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_explicit_keys() {
        let config = LlmConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let gemini = LlmFactory::create(LlmProvider::Gemini, config.clone()).unwrap();
        assert_eq!(gemini.model_name(), "gemini-2.5-flash");

        let config = LlmConfig {
            model: "claude-3-5-sonnet-20240620".to_string(),
            ..config
        };
        let anthropic = LlmFactory::create(LlmProvider::Anthropic, config).unwrap();
        assert_eq!(anthropic.model_name(), "claude-3-5-sonnet-20240620");
    }
}
