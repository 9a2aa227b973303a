//! Configuration system for nudge.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display, EnumString};

use crate::error::{NudgeError, NudgeResult};
use crate::types::Sensitivity;

/// LLM provider type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl LlmProvider {
    /// Provider named by `NUDGE_LLM_PROVIDER`, if set and recognised.
    pub fn from_env() -> Option<Self> {
        std::env::var("NUDGE_LLM_PROVIDER")
            .ok()
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Placeholder replaced with the joined topic list in [`EngineConfig::topic_template`].
pub const TOPICS_PLACEHOLDER: &str = "{topics}";

/// Evaluation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a notification stays visible before auto-dismiss.
    pub dismiss_after_ms: u64,
    /// Maximum conditions per scope (conversation or global).
    pub max_conditions: usize,
    /// Maximum conditions sent in one classifier call.
    pub max_batch_conditions: usize,
    /// Sensitivity for scopes that were never configured.
    pub default_sensitivity: Sensitivity,
    /// Separator used when folding unread messages into one text.
    pub message_separator: String,
    /// Separator used when listing matched topics.
    pub topic_separator: String,
    /// Template for condition-match notifications; must contain `{topics}`.
    pub topic_template: String,
    /// Capacity of the engine command channel.
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 4000,
            max_conditions: 20,
            max_batch_conditions: 20,
            default_sensitivity: Sensitivity::default(),
            message_separator: " ".to_string(),
            topic_separator: ", ".to_string(),
            topic_template: "{topics} 관련 메시지가 도착했어요".to_string(),
            command_buffer: 256,
        }
    }
}

impl EngineConfig {
    /// Default location of the config file (`~/.nudge/config.toml`).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".nudge"))
            .unwrap_or_else(|| PathBuf::from(".nudge"))
            .join("config.toml")
    }

    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> NudgeResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| NudgeError::config(e.to_string()))?,
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| NudgeError::config(e.to_string()))?
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| NudgeError::config(e.to_string()))?
            }
            _ => {
                return Err(NudgeError::config(
                    "Unsupported config file format. Use .toml, .json, or .yaml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the defaults.
    ///
    /// Reads:
    /// - `NUDGE_DISMISS_AFTER_MS`
    /// - `NUDGE_MAX_CONDITIONS`
    /// - `NUDGE_MAX_BATCH_CONDITIONS`
    /// - `NUDGE_DEFAULT_SENSITIVITY`
    /// - `NUDGE_TOPIC_TEMPLATE`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = env_parse("NUDGE_DISMISS_AFTER_MS") {
            self.dismiss_after_ms = ms;
        }
        if let Some(max) = env_parse("NUDGE_MAX_CONDITIONS") {
            self.max_conditions = max;
        }
        if let Some(max) = env_parse("NUDGE_MAX_BATCH_CONDITIONS") {
            self.max_batch_conditions = max;
        }
        if let Some(value) = env_parse::<i64>("NUDGE_DEFAULT_SENSITIVITY") {
            match Sensitivity::new(value) {
                Ok(s) => self.default_sensitivity = s,
                Err(e) => tracing::warn!(error = %e, "Ignoring NUDGE_DEFAULT_SENSITIVITY"),
            }
        }
        if let Ok(template) = std::env::var("NUDGE_TOPIC_TEMPLATE") {
            if template.contains(TOPICS_PLACEHOLDER) {
                self.topic_template = template;
            }
        }
        self
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> NudgeResult<()> {
        if self.max_conditions == 0 || self.max_batch_conditions == 0 {
            return Err(NudgeError::config("Condition limits must be at least 1"));
        }
        if !self.topic_template.contains(TOPICS_PLACEHOLDER) {
            return Err(NudgeError::config(format!(
                "topic_template must contain {}",
                TOPICS_PLACEHOLDER
            )));
        }
        if self.command_buffer == 0 {
            return Err(NudgeError::config("command_buffer must be at least 1"));
        }
        Ok(())
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for EngineConfig.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the auto-dismiss delay.
    pub fn dismiss_after(mut self, duration: Duration) -> Self {
        self.config.dismiss_after_ms = duration.as_millis() as u64;
        self
    }

    /// Set the per-scope condition limit.
    pub fn max_conditions(mut self, max: usize) -> Self {
        self.config.max_conditions = max;
        self
    }

    /// Set the per-call batch limit.
    pub fn max_batch_conditions(mut self, max: usize) -> Self {
        self.config.max_batch_conditions = max;
        self
    }

    /// Set the default sensitivity.
    pub fn default_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.config.default_sensitivity = sensitivity;
        self
    }

    /// Set the topic notification template.
    pub fn topic_template(mut self, template: impl Into<String>) -> Self {
        self.config.topic_template = template.into();
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> NudgeResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.dismiss_after(), Duration::from_secs(4));
        assert_eq!(config.max_conditions, 20);
        assert_eq!(config.default_sensitivity.value(), 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::builder()
            .dismiss_after(Duration::from_millis(1500))
            .max_conditions(5)
            .build()
            .unwrap();
        assert_eq!(config.dismiss_after_ms, 1500);
        assert_eq!(config.max_conditions, 5);
    }

    #[test]
    fn test_builder_rejects_template_without_placeholder() {
        let result = EngineConfig::builder().topic_template("no topics here").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "dismiss_after_ms = 2500\ndefault_sensitivity = 70").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dismiss_after_ms, 2500);
        assert_eq!(config.default_sensitivity.value(), 70);
        // Unspecified fields fall back to defaults
        assert_eq!(config.max_batch_conditions, 20);
    }

    #[test]
    fn test_from_json_file_rejects_bad_sensitivity() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"default_sensitivity": 150}}"#).unwrap();
        assert!(EngineConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "max_conditions: 3").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_conditions, 3);
    }

    #[test]
    fn test_llm_provider_parsing() {
        assert_eq!("Gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert_eq!("anthropic".parse::<LlmProvider>().unwrap(), LlmProvider::Anthropic);
        assert!("openai".parse::<LlmProvider>().is_err());
        assert_eq!(LlmProvider::default().to_string(), "gemini");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(EngineConfig::from_file(file.path()).is_err());
    }
}
