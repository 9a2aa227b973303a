//! Messages delivered to the engine actor.

use tokio::sync::oneshot;

use crate::engine::{ClassificationDispatch, ConversationSnapshot, ReceiveOutcome};
use crate::error::NudgeResult;
use crate::types::{
    ClassificationResult, Condition, ConditionId, ConditionScope,
    ConversationId, Notification, NotificationId, Sensitivity,
};

type Reply<T> = oneshot::Sender<T>;

/// Requests issued through [`EngineHandle`](crate::engine::EngineHandle).
pub(crate) enum Command {
    RegisterConversation {
        id: ConversationId,
        name: String,
        reply: Reply<()>,
    },
    ReceiveMessage {
        id: ConversationId,
        text: String,
        reply: Reply<NudgeResult<ReceiveOutcome>>,
    },
    OpenConversation {
        id: ConversationId,
        reply: Reply<NudgeResult<usize>>,
    },
    Reevaluate {
        id: ConversationId,
        reply: Reply<NudgeResult<ClassificationDispatch>>,
    },
    ActivateNotification {
        id: NotificationId,
        reply: Reply<NudgeResult<ConversationId>>,
    },
    DismissNotification {
        id: NotificationId,
        reply: Reply<NudgeResult<()>>,
    },
    PowerOff {
        reply: Reply<usize>,
    },
    PowerOn {
        reply: Reply<bool>,
    },
    AddCondition {
        scope: ConditionScope,
        text: String,
        reply: Reply<NudgeResult<Condition>>,
    },
    RemoveCondition {
        scope: ConditionScope,
        id: ConditionId,
        reply: Reply<NudgeResult<Condition>>,
    },
    ReplaceCondition {
        scope: ConditionScope,
        id: ConditionId,
        text: String,
        reply: Reply<NudgeResult<Condition>>,
    },
    ListConditions {
        scope: ConditionScope,
        reply: Reply<NudgeResult<Vec<Condition>>>,
    },
    SetSensitivity {
        scope: ConditionScope,
        value: i64,
        reply: Reply<NudgeResult<Sensitivity>>,
    },
    SetGeneralEnabled {
        id: ConversationId,
        enabled: bool,
        reply: Reply<NudgeResult<()>>,
    },
    SetConditionMatching {
        scope: ConditionScope,
        enabled: bool,
        reply: Reply<NudgeResult<()>>,
    },
    Snapshot {
        id: ConversationId,
        reply: Reply<NudgeResult<ConversationSnapshot>>,
    },
    ActiveNotifications {
        reply: Reply<Vec<Notification>>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// A finished classifier call, posted back by its task.
///
/// A classifier task that panics still produces a completion, with an error outcome.
pub(crate) struct Completion {
    pub seq: u64,
    pub outcome: NudgeResult<Vec<ClassificationResult>>,
}
