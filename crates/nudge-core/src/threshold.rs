//! Threshold evaluation of classifier scores.

use crate::types::{ConditionScore, Sensitivity};

/// Whether a probability clears the threshold of a raw sensitivity value.
///
/// Both inputs are clamped into [0, 100]; the boundary is inclusive.
pub fn matches(probability: i64, sensitivity: i64) -> bool {
    let probability = probability.clamp(0, 100);
    let threshold = i64::from(Sensitivity::clamped(sensitivity).threshold());
    probability >= threshold
}

/// Evaluate a classifier score against a scope sensitivity.
///
/// Verdicts ignore the sensitivity; it was already given to the classifier as guidance.
/// A missing score never matches, even at sensitivity 100.
pub fn is_match(score: ConditionScore, sensitivity: Sensitivity) -> bool {
    match score {
        ConditionScore::Probability(p) => p >= sensitivity.threshold(),
        ConditionScore::Verdict(v) => v,
        ConditionScore::Missing => false,
    }
}
