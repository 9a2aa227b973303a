//! Classifier client configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Request form used against the classification endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ClassifierMode {
    /// One request carrying every condition.
    #[default]
    Batch,
    /// One request per condition.
    Legacy,
}

/// Configuration for [`HttpClassifier`](crate::HttpClassifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierClientConfig {
    /// Full URL of the check-notification route.
    pub endpoint: String,
    pub mode: ClassifierMode,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for ClassifierClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/check-notification".to_string(),
            mode: ClassifierMode::Batch,
            timeout_ms: 10_000,
        }
    }
}

impl ClassifierClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ClassifierMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Defaults overridden by environment variables:
    ///
    /// - `NUDGE_CLASSIFIER_URL`
    /// - `NUDGE_CLASSIFIER_MODE` (`batch` or `legacy`)
    /// - `NUDGE_CLASSIFIER_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("NUDGE_CLASSIFIER_URL") {
            config.endpoint = url;
        }
        if let Some(mode) = lookup("NUDGE_CLASSIFIER_MODE") {
            match ClassifierMode::from_str(&mode) {
                Ok(mode) => config.mode = mode,
                Err(_) => tracing::warn!(value = %mode, "Ignoring NUDGE_CLASSIFIER_MODE"),
            }
        }
        if let Some(timeout) = lookup("NUDGE_CLASSIFIER_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.timeout_ms = timeout;
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierClientConfig::default();
        assert_eq!(config.mode, ClassifierMode::Batch);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClassifierClientConfig::from_lookup(|var| match var {
            "NUDGE_CLASSIFIER_URL" => Some("http://classifier:8080/api/check-notification".into()),
            "NUDGE_CLASSIFIER_MODE" => Some("Legacy".into()),
            "NUDGE_CLASSIFIER_TIMEOUT_MS" => Some("2500".into()),
            _ => None,
        });
        assert_eq!(config.endpoint, "http://classifier:8080/api/check-notification");
        assert_eq!(config.mode, ClassifierMode::Legacy);
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let config = ClassifierClientConfig::from_lookup(|var| match var {
            "NUDGE_CLASSIFIER_MODE" => Some("streaming".into()),
            "NUDGE_CLASSIFIER_TIMEOUT_MS" => Some("soon".into()),
            _ => None,
        });
        assert_eq!(config, ClassifierClientConfig::default());
    }
}
