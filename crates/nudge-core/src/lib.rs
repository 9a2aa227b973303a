//! nudge-core - Core library for nudge.
//!
//! This crate provides the condition store, the evaluation pipeline
//! (aggregation, thresholds, topic dedup, composition), the notification
//! lifecycle manager, and the engine actor that wires them together.
//!
//! # Example
//!
//! ```ignore
//! use nudge_core::{ConditionScope, EngineConfig, NotificationEngine};
//!
//! let (engine, _task) = NotificationEngine::spawn(EngineConfig::default(), classifier)?;
//! engine.register_conversation("main", "상대방").await?;
//! engine
//!     .add_condition(ConditionScope::Conversation("main".into()), "여행")
//!     .await?;
//!
//! let mut events = engine.subscribe();
//! engine.receive_message("main", "다음 달에 해외여행 갈래?").await?;
//! ```

pub mod aggregator;
pub mod classify;
pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod store;
pub mod threshold;
pub mod traits;
pub mod types;
pub mod wire;

// Re-export commonly used types
pub use classify::LlmClassifier;
pub use config::{EngineConfig, LlmProvider};
pub use engine::{
    ClassificationDispatch, ConversationSnapshot, EngineHandle, NotificationEngine, ReceiveOutcome,
};
pub use error::{ErrorCode, NudgeError, NudgeResult};
pub use events::{DismissReason, EvaluationOutcome, EventBus, EventSubscriber, NotificationEvent};
pub use store::ConditionStore;
pub use traits::{Classifier, GenerationOptions, Llm, LlmConfig, LlmResponse, TokenUsage};
pub use types::{
    ClassificationRequest, ClassificationResult, Condition, ConditionId, ConditionQuery,
    ConditionScope, ConditionScore, ConversationId, Message, MessageRole, Notification,
    NotificationId, NotificationKind, Sensitivity, SensitivityLevel,
};
