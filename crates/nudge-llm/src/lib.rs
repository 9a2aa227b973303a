//! nudge-llm - LLM provider implementations for nudge.
//!
//! # Supported Providers
//!
//! - **Gemini** - Google Gemini via the `generateContent` REST API (default)
//! - **Anthropic** - Claude via the Messages API
//!
//! # Example
//!
//! ```ignore
//! use nudge_llm::LlmFactory;
//!
//! // Provider from NUDGE_LLM_PROVIDER, key from the provider's env var
//! let llm = LlmFactory::from_env()?;
//!
//! // Or a specific Gemini model
//! let llm = LlmFactory::gemini_with_model("gemini-2.5-flash")?;
//! ```

mod anthropic;
mod factory;
mod gemini;

pub use anthropic::AnthropicLlm;
pub use factory::LlmFactory;
pub use gemini::GeminiLlm;

// Re-export core types for convenience
pub use nudge_core::config::LlmProvider;
pub use nudge_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse};
