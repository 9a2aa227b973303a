//! Error types for nudge operations.
//!
//! Every error carries a structured [`ErrorCode`] so callers (the REST layer in
//! particular) can map failures without matching on message text.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for nudge operations.
pub type NudgeResult<T> = Result<T, NudgeError>;

/// Main error type for all nudge operations.
#[derive(Error, Debug)]
pub enum NudgeError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Conversation, condition or notification not found.
    #[error("Not found: {message}")]
    NotFound { message: String, code: ErrorCode },

    /// Condition limit for a scope was reached.
    #[error("Condition limit reached: {message}")]
    ConditionLimit {
        message: String,
        code: ErrorCode,
        limit: usize,
    },

    /// Upstream credential is missing or unusable.
    #[error("Authentication error: {message}")]
    Authentication { message: String, code: ErrorCode },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Classification call failed.
    #[error("Classifier error: {message}")]
    Classifier {
        message: String,
        code: ErrorCode,
        status: Option<u16>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// The engine task is gone.
    #[error("Engine unavailable: {0}")]
    EngineClosed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Authentication (AUTH_xxx)
    AuthMissingCredentials,
    AuthInvalidKey,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValOutOfRange,

    // Lookup (NF_xxx)
    NotFoundConversation,
    NotFoundCondition,
    NotFoundNotification,

    // Conditions (COND_xxx)
    CondLimitReached,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Classifier (CLS_xxx)
    ClsRequestFailed,
    ClsBadStatus,
    ClsInvalidResponse,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidLine,

    // Engine
    EngineClosed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthMissingCredentials => "AUTH_001",
            ErrorCode::AuthInvalidKey => "AUTH_002",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValOutOfRange => "VAL_003",
            ErrorCode::NotFoundConversation => "NF_001",
            ErrorCode::NotFoundCondition => "NF_002",
            ErrorCode::NotFoundNotification => "NF_003",
            ErrorCode::CondLimitReached => "COND_001",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::ClsRequestFailed => "CLS_001",
            ErrorCode::ClsBadStatus => "CLS_002",
            ErrorCode::ClsInvalidResponse => "CLS_003",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidLine => "PARSE_002",
            ErrorCode::EngineClosed => "ENG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl NudgeError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error for a missing request field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.clone());
        Self::Validation {
            message: format!("'{}' is required", field),
            code: ErrorCode::ValMissingField,
            details,
            suggestion: None,
        }
    }

    /// Create a validation error for a value outside its allowed range.
    pub fn out_of_range(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValOutOfRange,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a conversation-not-found error.
    pub fn conversation_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("Conversation '{}' not found", id),
            code: ErrorCode::NotFoundConversation,
        }
    }

    /// Create a condition-not-found error.
    pub fn condition_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("Condition '{}' not found", id),
            code: ErrorCode::NotFoundCondition,
        }
    }

    /// Create a notification-not-found error.
    pub fn notification_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("Notification '{}' is not visible", id),
            code: ErrorCode::NotFoundNotification,
        }
    }

    /// Create a condition limit error.
    pub fn condition_limit(limit: usize) -> Self {
        Self::ConditionLimit {
            message: format!("At most {} conditions are allowed per scope", limit),
            code: ErrorCode::CondLimitReached,
            limit,
        }
    }

    /// Create a missing credential error.
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthMissingCredentials,
        }
    }

    /// Create an LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// Create a classifier transport error.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
            code: ErrorCode::ClsRequestFailed,
            status: None,
        }
    }

    /// Create a classifier error for a non-success HTTP status.
    pub fn classifier_status(status: u16, body: impl Into<String>) -> Self {
        Self::Classifier {
            message: format!("HTTP {}: {}", status, body.into()),
            code: ErrorCode::ClsBadStatus,
            status: Some(status),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::ConditionLimit { code, .. } => *code,
            Self::Authentication { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::Classifier { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::EngineClosed(_) => ErrorCode::EngineClosed,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::ConditionLimit { .. } => Some("Remove an existing condition before adding a new one"),
            Self::Authentication { .. } => Some("Set GEMINI_API_KEY (or ANTHROPIC_API_KEY) for the classifier"),
            Self::Llm { .. } => Some("Please check your LLM provider configuration"),
            Self::Classifier { .. } => Some("Please check that the classification endpoint is reachable"),
            _ => None,
        }
    }

    /// Convert from an HTTP status code returned by the classification endpoint.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                details: HashMap::new(),
                suggestion: Some("Please check your request parameters".to_string()),
            },
            401 | 403 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthInvalidKey,
            },
            _ => Self::classifier_status(status, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = NudgeError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_missing_field_records_field_name() {
        let err = NudgeError::missing_field("message");
        assert_eq!(err.code(), ErrorCode::ValMissingField);
        match err {
            NudgeError::Validation { details, .. } => {
                assert_eq!(details.get("field").map(String::as_str), Some("message"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_condition_limit_has_suggestion() {
        let err = NudgeError::condition_limit(20);
        assert_eq!(err.code(), ErrorCode::CondLimitReached);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_from_http_status() {
        assert_eq!(
            NudgeError::from_http_status(400, "bad").code(),
            ErrorCode::ValInvalidInput
        );
        assert_eq!(
            NudgeError::from_http_status(403, "nope").code(),
            ErrorCode::AuthInvalidKey
        );
        let err = NudgeError::from_http_status(500, "boom");
        assert_eq!(err.code(), ErrorCode::ClsBadStatus);
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::AuthMissingCredentials.as_str(), "AUTH_001");
        assert_eq!(ErrorCode::CondLimitReached.as_str(), "COND_001");
    }
}
