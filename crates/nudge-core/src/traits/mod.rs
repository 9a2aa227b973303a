//! Core traits for nudge providers.

mod classifier;
mod llm;

pub use classifier::*;
pub use llm::*;
