//! Notification lifecycle events
//!
//! This module provides:
//! - Event types emitted when notifications are shown or dismissed, and when
//!   a classification result is applied
//! - Event bus for internal pub/sub (display layers subscribe here)

mod bus;
mod event;

pub use bus::{EventBus, EventSubscriber};
pub use event::{DismissReason, EvaluationOutcome, NotificationEvent};
