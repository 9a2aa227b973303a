//! Sensitivity: how loosely a condition is considered matched.
//!
//! The canonical representation is numeric, 0..=100, higher meaning more
//! permissive. The categorical `low`/`medium`/`high` form only exists at the
//! legacy wire boundary and is converted once through [`SensitivityLevel`].

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

use crate::error::{NudgeError, NudgeResult};

/// Upper bound of the sensitivity scale.
pub const MAX_SENSITIVITY: u8 = 100;

/// Sensitivity used when a scope has not been configured.
pub const DEFAULT_SENSITIVITY: u8 = 50;

/// Numeric sensitivity in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Sensitivity(u8);

impl Sensitivity {
    /// Create a sensitivity, rejecting values outside [0, 100].
    pub fn new(value: i64) -> NudgeResult<Self> {
        if (0..=i64::from(MAX_SENSITIVITY)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(NudgeError::out_of_range(
                format!("Sensitivity {} is outside 0..=100", value),
                "Use a value between 0 (strict) and 100 (permissive)",
            ))
        }
    }

    /// Create a sensitivity, clamping into [0, 100].
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(MAX_SENSITIVITY)) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Probability cutoff: `100 - sensitivity`.
    pub fn threshold(&self) -> u8 {
        MAX_SENSITIVITY - self.0
    }

    /// Strictness band given to the classifier as guidance.
    pub fn strictness(&self) -> Strictness {
        match self.0 {
            67..=100 => Strictness::Permissive,
            34..=66 => Strictness::Normal,
            _ => Strictness::Strict,
        }
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(DEFAULT_SENSITIVITY)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<i64> for Sensitivity {
    type Error = NudgeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sensitivity> for u8 {
    fn from(s: Sensitivity) -> Self {
        s.0
    }
}

impl From<SensitivityLevel> for Sensitivity {
    fn from(level: SensitivityLevel) -> Self {
        match level {
            SensitivityLevel::Low => Self(25),
            SensitivityLevel::Medium => Self(50),
            SensitivityLevel::High => Self(75),
        }
    }
}

/// Categorical sensitivity accepted by the legacy single-condition form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
}

/// Strictness instruction derived from a sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Normal,
    Permissive,
}

impl Strictness {
    /// Natural-language instruction embedded in classifier prompts.
    pub fn guidance(&self) -> &'static str {
        match self {
            Strictness::Strict => {
                "Be strict: only match when the message clearly and directly concerns the condition."
            }
            Strictness::Normal => {
                "Use normal judgement: match when the message is reasonably related to the condition."
            }
            Strictness::Permissive => {
                "Be permissive: match even when the message is only loosely or indirectly related to the condition."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Sensitivity::new(-1).is_err());
        assert!(Sensitivity::new(101).is_err());
        assert_eq!(Sensitivity::new(0).unwrap().value(), 0);
        assert_eq!(Sensitivity::new(100).unwrap().value(), 100);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Sensitivity::clamped(-20).value(), 0);
        assert_eq!(Sensitivity::clamped(250).value(), 100);
        assert_eq!(Sensitivity::clamped(42).value(), 42);
    }

    #[test]
    fn test_threshold() {
        assert_eq!(Sensitivity::clamped(60).threshold(), 40);
        assert_eq!(Sensitivity::clamped(100).threshold(), 0);
        assert_eq!(Sensitivity::clamped(0).threshold(), 100);
    }

    #[test]
    fn test_strictness_bands() {
        assert_eq!(Sensitivity::clamped(0).strictness(), Strictness::Strict);
        assert_eq!(Sensitivity::clamped(33).strictness(), Strictness::Strict);
        assert_eq!(Sensitivity::clamped(34).strictness(), Strictness::Normal);
        assert_eq!(Sensitivity::clamped(66).strictness(), Strictness::Normal);
        assert_eq!(Sensitivity::clamped(67).strictness(), Strictness::Permissive);
    }

    #[test]
    fn test_level_conversion_is_consistent_with_bands() {
        let low: Sensitivity = SensitivityLevel::Low.into();
        let medium: Sensitivity = SensitivityLevel::Medium.into();
        let high: Sensitivity = SensitivityLevel::High.into();
        assert_eq!(low.strictness(), Strictness::Strict);
        assert_eq!(medium.strictness(), Strictness::Normal);
        assert_eq!(high.strictness(), Strictness::Permissive);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(SensitivityLevel::from_str("HIGH").unwrap(), SensitivityLevel::High);
        assert_eq!(SensitivityLevel::Medium.to_string(), "medium");
        assert!(SensitivityLevel::from_str("extreme").is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: Sensitivity = serde_json::from_str("70").unwrap();
        assert_eq!(ok.value(), 70);
        assert!(serde_json::from_str::<Sensitivity>("120").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "70");
    }
}
