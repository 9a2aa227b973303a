//! Message aggregation: fold the unread window into one evaluation text.

use crate::types::InboundMessage;

/// Join the text of every unread message, oldest first.
///
/// Blank messages are skipped so they do not produce doubled separators.
pub fn aggregate_unread<'a, I>(messages: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a InboundMessage>,
{
    messages
        .into_iter()
        .filter(|m| !m.read)
        .map(|m| m.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_unread_in_order() {
        let messages = vec![
            InboundMessage::new("이번 주말에"),
            InboundMessage::new("제주도 갈래?"),
        ];
        assert_eq!(aggregate_unread(&messages, " "), "이번 주말에 제주도 갈래?");
    }

    #[test]
    fn test_skips_read_and_blank_messages() {
        let mut old = InboundMessage::new("어제 얘기");
        old.read = true;
        let messages = vec![old, InboundMessage::new("   "), InboundMessage::new("맛집 추천")];
        assert_eq!(aggregate_unread(&messages, " "), "맛집 추천");
    }

    #[test]
    fn test_empty_window() {
        let messages: Vec<InboundMessage> = Vec::new();
        assert!(aggregate_unread(&messages, " ").is_empty());
    }
}
