//! Cloneable handle for sending commands to the engine actor.

use tokio::sync::{mpsc, oneshot};

use crate::engine::command::Command;
use crate::engine::{ClassificationDispatch, ConversationSnapshot, ReceiveOutcome};
use crate::error::{NudgeError, NudgeResult};
use crate::events::{EventBus, EventSubscriber};
use crate::types::{
    Condition, ConditionId, ConditionScope, ConversationId, Notification, NotificationId,
    Sensitivity,
};

/// Client side of the notification engine.
///
/// Every method is a request/response round trip through the actor, so calls
/// made from one task are applied in order.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    bus: EventBus,
}

impl EngineHandle {
    pub(crate) fn new(tx: mpsc::Sender<Command>, bus: EventBus) -> Self {
        Self { tx, bus }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> NudgeResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| engine_closed())?;
        rx.await.map_err(|_| engine_closed())
    }

    /// Register a conversation, or rename it if it already exists.
    pub async fn register_conversation(
        &self,
        id: impl Into<ConversationId>,
        name: impl Into<String>,
    ) -> NudgeResult<()> {
        let (id, name) = (id.into(), name.into());
        self.request(|reply| Command::RegisterConversation { id, name, reply })
            .await
    }

    /// Deliver an inbound message to a conversation.
    pub async fn receive_message(
        &self,
        id: impl Into<ConversationId>,
        text: impl Into<String>,
    ) -> NudgeResult<ReceiveOutcome> {
        let (id, text) = (id.into(), text.into());
        self.request(|reply| Command::ReceiveMessage { id, text, reply })
            .await?
    }

    /// Open (read) a conversation. Returns how many messages were marked read.
    ///
    /// Clears the conversation's notified topics, discards in-flight
    /// classifications for it and dismisses its visible notifications.
    pub async fn open_conversation(&self, id: impl Into<ConversationId>) -> NudgeResult<usize> {
        let id = id.into();
        self.request(|reply| Command::OpenConversation { id, reply })
            .await?
    }

    /// Classify the conversation's unread window again.
    ///
    /// Skipped with [`ClassificationDispatch::Duplicate`] while a call for the
    /// same text is still in flight.
    pub async fn reevaluate_conversation(
        &self,
        id: impl Into<ConversationId>,
    ) -> NudgeResult<ClassificationDispatch> {
        let id = id.into();
        self.request(|reply| Command::Reevaluate { id, reply })
            .await?
    }

    /// Activate a visible notification: dismiss it and open its conversation.
    pub async fn activate_notification(&self, id: NotificationId) -> NudgeResult<ConversationId> {
        self.request(|reply| Command::ActivateNotification { id, reply })
            .await?
    }

    /// Dismiss a visible notification, cancelling its timer.
    pub async fn dismiss_notification(&self, id: NotificationId) -> NudgeResult<()> {
        self.request(|reply| Command::DismissNotification { id, reply })
            .await?
    }

    /// Turn the display surface off, clearing every notification and timer.
    /// Returns how many notifications were cleared.
    pub async fn power_off(&self) -> NudgeResult<usize> {
        self.request(|reply| Command::PowerOff { reply }).await
    }

    /// Turn the display surface on. Returns false if it already was.
    pub async fn power_on(&self) -> NudgeResult<bool> {
        self.request(|reply| Command::PowerOn { reply }).await
    }

    pub async fn add_condition(
        &self,
        scope: ConditionScope,
        text: impl Into<String>,
    ) -> NudgeResult<Condition> {
        let text = text.into();
        self.request(|reply| Command::AddCondition { scope, text, reply })
            .await?
    }

    pub async fn remove_condition(
        &self,
        scope: ConditionScope,
        id: ConditionId,
    ) -> NudgeResult<Condition> {
        self.request(|reply| Command::RemoveCondition { scope, id, reply })
            .await?
    }

    /// Edit a condition. The edited condition gets a new id and moves to the end.
    pub async fn replace_condition(
        &self,
        scope: ConditionScope,
        id: ConditionId,
        text: impl Into<String>,
    ) -> NudgeResult<Condition> {
        let text = text.into();
        self.request(|reply| Command::ReplaceCondition {
            scope,
            id,
            text,
            reply,
        })
        .await?
    }

    pub async fn list_conditions(&self, scope: ConditionScope) -> NudgeResult<Vec<Condition>> {
        self.request(|reply| Command::ListConditions { scope, reply })
            .await?
    }

    /// Set the sensitivity of a scope; values outside [0, 100] are rejected.
    pub async fn set_sensitivity(
        &self,
        scope: ConditionScope,
        value: i64,
    ) -> NudgeResult<Sensitivity> {
        self.request(|reply| Command::SetSensitivity {
            scope,
            value,
            reply,
        })
        .await?
    }

    pub async fn set_general_enabled(
        &self,
        id: impl Into<ConversationId>,
        enabled: bool,
    ) -> NudgeResult<()> {
        let id = id.into();
        self.request(|reply| Command::SetGeneralEnabled { id, enabled, reply })
            .await?
    }

    pub async fn set_condition_matching(
        &self,
        scope: ConditionScope,
        enabled: bool,
    ) -> NudgeResult<()> {
        self.request(|reply| Command::SetConditionMatching {
            scope,
            enabled,
            reply,
        })
        .await?
    }

    pub async fn conversation_snapshot(
        &self,
        id: impl Into<ConversationId>,
    ) -> NudgeResult<ConversationSnapshot> {
        let id = id.into();
        self.request(|reply| Command::Snapshot { id, reply }).await?
    }

    /// Visible notifications, oldest first.
    pub async fn active_notifications(&self) -> NudgeResult<Vec<Notification>> {
        self.request(|reply| Command::ActiveNotifications { reply })
            .await
    }

    /// Subscribe to lifecycle and evaluation events.
    pub fn subscribe(&self) -> EventSubscriber {
        self.bus.subscribe()
    }

    /// Stop the engine, tearing down all notifications and timers.
    pub async fn shutdown(&self) -> NudgeResult<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}

fn engine_closed() -> NudgeError {
    NudgeError::EngineClosed("Notification engine is not running".to_string())
}
