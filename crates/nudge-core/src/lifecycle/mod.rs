//! Notification lifecycle: the visible set and its dismiss timers.

mod manager;
mod registry;

pub use manager::LifecycleManager;
pub use registry::{ActiveNotification, NotificationRegistry};
