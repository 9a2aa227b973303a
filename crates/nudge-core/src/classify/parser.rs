//! Tolerant parsing of classifier output.
//!
//! Malformed output never fails: a missing line or an unparseable
//! probability becomes [`ConditionScore::Missing`], which never matches.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ConditionScore;

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[a-zA-Z0-9]*\n?([\s\S]*?)\n?```$").unwrap());

static PROBABILITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.\d+)?\s*%?$").unwrap());

/// Strip a surrounding markdown code fence, if any.
pub fn remove_code_blocks(content: &str) -> &str {
    let content = content.trim();
    CODE_BLOCK
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
}

/// Parse a `<probability>|<topic>` body into exactly `expected` entries.
///
/// Lines are positional: a blank line in the middle still consumes a slot.
/// Missing lines pad with `(Missing, "")`, extra lines are ignored.
pub fn parse_probability_lines(body: &str, expected: usize) -> Vec<(ConditionScore, String)> {
    let mut lines = remove_code_blocks(body).lines();
    (0..expected)
        .map(|_| match lines.next() {
            Some(line) => parse_probability_line(line),
            None => (ConditionScore::no_match(), String::new()),
        })
        .collect()
}

fn parse_probability_line(line: &str) -> (ConditionScore, String) {
    let (head, topic) = match line.split_once('|') {
        Some((head, topic)) => (head, topic.trim()),
        None => (line, ""),
    };
    let score = PROBABILITY
        .captures(head.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|p| ConditionScore::Probability(p.min(100) as u8))
        .unwrap_or(ConditionScore::Missing);
    (score, topic.to_string())
}

/// Parse a `YES|<topic>` / `NO` verdict.
///
/// Anything without `YES` before the first `|` is a negative verdict.
pub fn parse_verdict_line(text: &str) -> (ConditionScore, String) {
    let text = remove_code_blocks(text);
    let (head, topic) = match text.split_once('|') {
        Some((head, topic)) => (head, topic.trim()),
        None => (text, ""),
    };
    if head.trim().to_uppercase().contains("YES") {
        (ConditionScore::Verdict(true), topic.to_string())
    } else {
        (ConditionScore::Verdict(false), String::new())
    }
}
