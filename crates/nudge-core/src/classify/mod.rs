//! Classification: prompt templates, output parsing, and an LLM-backed classifier.

mod llm_classifier;
pub mod parser;
pub mod prompts;

pub use llm_classifier::LlmClassifier;
pub use parser::{parse_probability_lines, parse_verdict_line, remove_code_blocks};
