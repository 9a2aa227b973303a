//! Prompt templates for condition classification.

use crate::types::{ClassificationRequest, Sensitivity};

/// System prompt shared by both classification forms.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You decide whether a chat message matches notification conditions a user has set.
A condition is a short natural-language description of a topic the user wants to be alerted about.
Judge the message by meaning, not by keyword overlap. Never explain your answer."#;

/// Prompt for the batch probability form.
///
/// The model must answer with exactly one `<probability>|<topic>` line per
/// condition, in the order listed.
pub fn batch_prompt(request: &ClassificationRequest) -> String {
    let mut conditions = String::new();
    for (i, query) in request.conditions.iter().enumerate() {
        conditions.push_str(&format!(
            "{}. \"{}\" (sensitivity {}/100: {})\n",
            i + 1,
            query.condition,
            query.sensitivity.value(),
            query.sensitivity.strictness().guidance()
        ));
    }

    format!(
        r#"Message:
"{message}"

Conditions:
{conditions}
For each condition, estimate the probability (0-100) that the message matches it.
Also give the topic: the shortest phrase from the message that made it match, or nothing if it does not match.

Answer with exactly {count} lines, one per condition, in the same order, formatted as:
<probability>|<topic>

Example for two conditions:
95|해외여행
10|"#,
        message = request.text,
        conditions = conditions,
        count = request.len()
    )
}

/// Prompt for the single-condition verdict form.
pub fn verdict_prompt(message: &str, condition: &str, sensitivity: Sensitivity) -> String {
    format!(
        r#"Notification condition: "{condition}"
Received message: "{message}"

{guidance}

Does the message match the notification condition?
Answer "YES|<topic>" where <topic> is the shortest phrase from the message that matched, or "NO"."#,
        condition = condition,
        message = message,
        guidance = sensitivity.strictness().guidance()
    )
}
