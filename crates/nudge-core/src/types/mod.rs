//! Core types for nudge.

mod chat;
mod classification;
mod condition;
mod ids;
mod message;
mod notification;
mod sensitivity;

pub use chat::*;
pub use classification::*;
pub use condition::*;
pub use ids::*;
pub use message::*;
pub use notification::*;
pub use sensitivity::*;
