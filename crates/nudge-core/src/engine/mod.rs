//! The orchestrator: a single-owner actor wiring store, classifier, composer
//! and lifecycle together.
//!
//! All state lives in one task. Classifier calls run in their own tasks and
//! report back through a channel; each carries a cancellation token keyed by
//! conversation so that opening the conversation discards stale results.

mod actor;
mod command;
mod handle;
mod state;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::NudgeResult;
use crate::events::EventBus;
use crate::traits::Classifier;

pub use handle::EngineHandle;
pub use state::{ClassificationDispatch, ConversationSnapshot, ReceiveOutcome};

/// Entry point for starting the engine.
pub struct NotificationEngine;

impl NotificationEngine {
    /// Spawn the engine actor on the current tokio runtime.
    ///
    /// Fails without spawning anything if the configuration is invalid.
    pub fn spawn(
        config: EngineConfig,
        classifier: Arc<dyn Classifier>,
    ) -> NudgeResult<(EngineHandle, JoinHandle<()>)> {
        Self::spawn_with_bus(config, classifier, EventBus::new())
    }

    /// Spawn the engine publishing on an existing event bus.
    pub fn spawn_with_bus(
        config: EngineConfig,
        classifier: Arc<dyn Classifier>,
        bus: EventBus,
    ) -> NudgeResult<(EngineHandle, JoinHandle<()>)> {
        config.validate()?;
        let (tx, rx) = mpsc::channel(config.command_buffer);
        let (actor, inbox) = actor::EngineActor::new(config, classifier, bus.clone(), rx);
        let task = tokio::spawn(actor.run(inbox));
        Ok((EngineHandle::new(tx, bus), task))
    }
}
