//! Text rendering of banners and events.

use nudge_core::{DismissReason, EvaluationOutcome, Notification, NotificationEvent, NotificationKind};

/// Banner line with emphasized topics wrapped in `*`.
pub fn banner(notification: &Notification) -> String {
    let body: String = notification
        .segments()
        .iter()
        .map(|segment| {
            if segment.emphasized {
                format!("*{}*", segment.text)
            } else {
                segment.text.to_string()
            }
        })
        .collect();
    let icon = match notification.kind {
        NotificationKind::NewMessage => "💬",
        NotificationKind::ConditionMatch => "🔔",
    };
    format!("{} {}: {}", icon, notification.source_name, body)
}

/// Line to print for an engine event, if any.
pub fn event_line(event: &NotificationEvent) -> Option<String> {
    match event {
        NotificationEvent::Shown { notification } => Some(banner(notification)),
        NotificationEvent::Dismissed { reason, .. } => {
            let why = match reason {
                DismissReason::Timeout => "timed out",
                DismissReason::Activated => "opened",
                DismissReason::Dismissed => "dismissed",
                DismissReason::PowerOff => return None,
            };
            Some(format!("   (banner {})", why))
        }
        NotificationEvent::Evaluated {
            conversation_id,
            outcome,
        } => match outcome {
            EvaluationOutcome::Failed { error } => {
                Some(format!("   (classification for {} failed: {})", conversation_id, error))
            }
            EvaluationOutcome::AlreadyNotified => {
                Some(format!("   (topics already notified in {})", conversation_id))
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::ConversationId;

    #[test]
    fn test_banner_emphasizes_topics() {
        let notification = Notification::condition_match(
            ConversationId::new("main"),
            "상대방",
            "여행, 맛집 관련 메시지가 도착했어요",
            "여행, 맛집",
        );
        assert_eq!(
            banner(&notification),
            "🔔 상대방: *여행, 맛집* 관련 메시지가 도착했어요"
        );
    }

    #[test]
    fn test_plain_banner() {
        let notification =
            Notification::new_message(ConversationId::new("group1"), "가족방", "저녁 뭐 먹어?");
        assert_eq!(banner(&notification), "💬 가족방: 저녁 뭐 먹어?");
    }

    #[test]
    fn test_quiet_events() {
        let event = NotificationEvent::Evaluated {
            conversation_id: ConversationId::new("main"),
            outcome: EvaluationOutcome::NoMatch,
        };
        assert!(event_line(&event).is_none());
    }
}
