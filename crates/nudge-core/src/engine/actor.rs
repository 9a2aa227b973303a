//! The engine actor: a single task that owns all evaluation state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregator::aggregate_unread;
use crate::compose::{dedupe_topics, matched_topics, Composer};
use crate::config::EngineConfig;
use crate::engine::command::{Command, Completion};
use crate::engine::state::{ConversationState, InFlight};
use crate::engine::{ClassificationDispatch, ConversationSnapshot, ReceiveOutcome};
use crate::error::{NudgeError, NudgeResult};
use crate::events::{DismissReason, EvaluationOutcome, EventBus, NotificationEvent};
use crate::lifecycle::LifecycleManager;
use crate::store::ConditionStore;
use crate::traits::Classifier;
use crate::types::{
    align_results, ClassificationRequest, ClassificationResult, ConditionScope, ConversationId,
    InboundMessage, Notification, NotificationId,
};

pub(crate) struct EngineActor {
    config: EngineConfig,
    classifier: Arc<dyn Classifier>,
    store: ConditionStore,
    conversations: HashMap<ConversationId, ConversationState>,
    in_flight: HashMap<u64, InFlight>,
    next_seq: u64,
    lifecycle: LifecycleManager,
    composer: Composer,
    bus: EventBus,
    surface_on: bool,
    completion_tx: mpsc::UnboundedSender<Completion>,
}

/// Receivers the actor loop selects over.
pub(crate) struct Inbox {
    pub commands: mpsc::Receiver<Command>,
    pub expiries: mpsc::UnboundedReceiver<NotificationId>,
    pub completions: mpsc::UnboundedReceiver<Completion>,
}

impl EngineActor {
    pub fn new(
        config: EngineConfig,
        classifier: Arc<dyn Classifier>,
        bus: EventBus,
        commands: mpsc::Receiver<Command>,
    ) -> (Self, Inbox) {
        let (lifecycle, expiries) = LifecycleManager::new(config.dismiss_after(), bus.clone());
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let actor = Self {
            store: ConditionStore::new(config.max_conditions, config.default_sensitivity),
            composer: Composer::from_config(&config),
            config,
            classifier,
            conversations: HashMap::new(),
            in_flight: HashMap::new(),
            next_seq: 0,
            lifecycle,
            bus,
            surface_on: false,
            completion_tx,
        };
        let inbox = Inbox {
            commands,
            expiries,
            completions,
        };
        (actor, inbox)
    }

    /// Process events until shutdown or until every handle is dropped.
    pub async fn run(mut self, mut inbox: Inbox) {
        info!(classifier = self.classifier.name(), "Notification engine started");
        loop {
            tokio::select! {
                biased;
                Some(id) = inbox.expiries.recv() => {
                    if !self.lifecycle.expire(&id) {
                        debug!(notification_id = %id, "Ignoring timer for dismissed notification");
                    }
                }
                Some(completion) = inbox.completions.recv() => {
                    self.apply_completion(completion);
                }
                command = inbox.commands.recv() => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            break;
                        }
                    }
                    None => {
                        self.teardown();
                        break;
                    }
                }
            }
        }
        info!("Notification engine stopped");
    }

    /// Apply one command. Returns false once the engine should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::RegisterConversation { id, name, reply } => {
                self.register_conversation(id, name);
                let _ = reply.send(());
            }
            Command::ReceiveMessage { id, text, reply } => {
                let _ = reply.send(self.receive_message(id, &text));
            }
            Command::OpenConversation { id, reply } => {
                let _ = reply.send(self.open_conversation(&id));
            }
            Command::Reevaluate { id, reply } => {
                let _ = reply.send(self.reevaluate(&id));
            }
            Command::ActivateNotification { id, reply } => {
                let _ = reply.send(self.activate_notification(&id));
            }
            Command::DismissNotification { id, reply } => {
                let result = self
                    .lifecycle
                    .dismiss(&id, DismissReason::Dismissed)
                    .map(|_| ())
                    .ok_or_else(|| NudgeError::notification_not_found(id));
                let _ = reply.send(result);
            }
            Command::PowerOff { reply } => {
                self.surface_on = false;
                let cleared = self.lifecycle.clear(DismissReason::PowerOff);
                debug!(cleared, "Display surface off");
                let _ = reply.send(cleared);
            }
            Command::PowerOn { reply } => {
                let was_off = !self.surface_on;
                self.surface_on = true;
                debug!("Display surface on");
                let _ = reply.send(was_off);
            }
            Command::AddCondition { scope, text, reply } => {
                let result = self
                    .check_scope(&scope)
                    .and_then(|_| self.store.add_condition(&scope, &text));
                let _ = reply.send(result);
            }
            Command::RemoveCondition { scope, id, reply } => {
                let result = self
                    .check_scope(&scope)
                    .and_then(|_| self.store.remove_condition(&scope, &id));
                let _ = reply.send(result);
            }
            Command::ReplaceCondition {
                scope,
                id,
                text,
                reply,
            } => {
                let result = self
                    .check_scope(&scope)
                    .and_then(|_| self.store.replace_condition(&scope, &id, &text));
                let _ = reply.send(result);
            }
            Command::ListConditions { scope, reply } => {
                let result = self
                    .check_scope(&scope)
                    .map(|_| self.store.conditions(&scope).to_vec());
                let _ = reply.send(result);
            }
            Command::SetSensitivity {
                scope,
                value,
                reply,
            } => {
                let result = self
                    .check_scope(&scope)
                    .and_then(|_| self.store.set_sensitivity(&scope, value));
                let _ = reply.send(result);
            }
            Command::SetGeneralEnabled { id, enabled, reply } => {
                let result = self
                    .check_scope(&ConditionScope::Conversation(id.clone()))
                    .map(|_| self.store.set_general_enabled(&id, enabled));
                let _ = reply.send(result);
            }
            Command::SetConditionMatching {
                scope,
                enabled,
                reply,
            } => {
                let result = self
                    .check_scope(&scope)
                    .map(|_| self.store.set_condition_matching(&scope, enabled));
                let _ = reply.send(result);
            }
            Command::Snapshot { id, reply } => {
                let _ = reply.send(self.snapshot(&id));
            }
            Command::ActiveNotifications { reply } => {
                let _ = reply.send(self.lifecycle.active());
            }
            Command::Shutdown { reply } => {
                self.teardown();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn register_conversation(&mut self, id: ConversationId, name: String) {
        match self.conversations.get_mut(&id) {
            Some(existing) => existing.name = name,
            None => {
                self.store.ensure_conversation(&id);
                debug!(conversation_id = %id, name = %name, "Conversation registered");
                self.conversations.insert(id, ConversationState::new(name));
            }
        }
    }

    fn check_scope(&self, scope: &ConditionScope) -> NudgeResult<()> {
        match scope {
            ConditionScope::Global => Ok(()),
            ConditionScope::Conversation(id) if self.conversations.contains_key(id) => Ok(()),
            ConditionScope::Conversation(id) => Err(NudgeError::conversation_not_found(id)),
        }
    }

    fn receive_message(&mut self, id: ConversationId, text: &str) -> NudgeResult<ReceiveOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NudgeError::validation("Message text must not be empty"));
        }
        let conversation = self
            .conversations
            .get_mut(&id)
            .ok_or_else(|| NudgeError::conversation_not_found(&id))?;

        let message = InboundMessage::new(text);
        let message_id = message.id;
        conversation.push(message);
        let aggregated = aggregate_unread(conversation.unread(), &self.config.message_separator);
        let source_name = conversation.name.clone();
        debug!(
            conversation_id = %id,
            unread = conversation.unread_count(),
            "Message received"
        );

        let general_enabled = self
            .store
            .conversation(&id)
            .map(|c| c.general_enabled)
            .unwrap_or(true);
        let general_notification = if general_enabled {
            let notification = Notification::new_message(id.clone(), source_name, text);
            let notification_id = notification.id;
            self.lifecycle.show(notification);
            Some(notification_id)
        } else {
            None
        };

        let classification = self.dispatch_classification(&id, aggregated);

        Ok(ReceiveOutcome {
            message_id,
            general_notification,
            classification,
        })
    }

    /// Classify the current unread window again, e.g. after a failed call.
    fn reevaluate(&mut self, id: &ConversationId) -> NudgeResult<ClassificationDispatch> {
        let conversation = self
            .conversations
            .get(id)
            .ok_or_else(|| NudgeError::conversation_not_found(id))?;
        let aggregated = aggregate_unread(conversation.unread(), &self.config.message_separator);
        if aggregated.is_empty() {
            return Ok(ClassificationDispatch::NothingUnread);
        }
        Ok(self.dispatch_classification(id, aggregated))
    }

    fn dispatch_classification(
        &mut self,
        id: &ConversationId,
        text: String,
    ) -> ClassificationDispatch {
        let mut batch = self.store.condition_batch(id);
        if batch.is_empty() {
            return ClassificationDispatch::NoConditions;
        }

        let limit = self.config.max_batch_conditions;
        if batch.len() > limit {
            warn!(
                conversation_id = %id,
                dropped = batch.len() - limit,
                limit,
                "Condition batch truncated"
            );
            batch.truncate(limit);
        }

        let duplicate = self.in_flight.values().any(|flight| {
            &flight.conversation_id == id
                && flight.request.text == text
                && !flight.token.is_cancelled()
        });
        if duplicate {
            debug!(conversation_id = %id, "Identical classification already in flight");
            return ClassificationDispatch::Duplicate;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let request = ClassificationRequest::new(text, batch);
        debug!(conversation_id = %id, seq, conditions = request.len(), "Classification dispatched");

        let classifier = Arc::clone(&self.classifier);
        let completion_tx = self.completion_tx.clone();
        let call_request = request.clone();
        let call = tokio::spawn(async move { classifier.classify(&call_request).await });
        tokio::spawn(async move {
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(e) => Err(NudgeError::classifier(format!("Classifier task failed: {}", e))),
            };
            let _ = completion_tx.send(Completion { seq, outcome });
        });

        self.in_flight.insert(
            seq,
            InFlight {
                conversation_id: id.clone(),
                request,
                token: CancellationToken::new(),
            },
        );

        ClassificationDispatch::Started
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Some(flight) = self.in_flight.remove(&completion.seq) else {
            return;
        };
        let conversation_id = flight.conversation_id;
        let outcome = if flight.token.is_cancelled() {
            debug!(conversation_id = %conversation_id, "Discarding result for read conversation");
            EvaluationOutcome::Discarded
        } else {
            self.evaluate(&conversation_id, flight.request, completion.outcome)
        };
        self.bus.emit(NotificationEvent::Evaluated {
            conversation_id,
            outcome,
        });
    }

    fn evaluate(
        &mut self,
        id: &ConversationId,
        request: ClassificationRequest,
        outcome: NudgeResult<Vec<ClassificationResult>>,
    ) -> EvaluationOutcome {
        let results = match outcome {
            Ok(results) if results.is_empty() => return EvaluationOutcome::NoMatch,
            Ok(results) => align_results(&request, results),
            Err(e) => {
                warn!(
                    conversation_id = %id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "Classification failed, treating as no match"
                );
                return EvaluationOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let matches = matched_topics(&request, &results);
        if matches.is_empty() {
            return EvaluationOutcome::NoMatch;
        }

        let config = self.store.ensure_conversation(id);
        let topics = dedupe_topics(&matches, config.notified_topics_mut());
        if topics.is_empty() {
            debug!(conversation_id = %id, "All matched topics already notified");
            return EvaluationOutcome::AlreadyNotified;
        }

        let source_name = self
            .conversations
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string());
        match self.composer.compose(id.clone(), &source_name, &topics) {
            Some(notification) => {
                let notification_id = notification.id;
                self.lifecycle.show(notification);
                EvaluationOutcome::Notified {
                    notification_id,
                    topics,
                }
            }
            None => EvaluationOutcome::NoMatch,
        }
    }

    fn open_conversation(&mut self, id: &ConversationId) -> NudgeResult<usize> {
        let conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| NudgeError::conversation_not_found(id))?;
        let marked = conversation.mark_all_read();
        self.store.clear_notified_topics(id);

        let mut cancelled = 0;
        for flight in self
            .in_flight
            .values()
            .filter(|flight| &flight.conversation_id == id)
        {
            flight.token.cancel();
            cancelled += 1;
        }

        self.lifecycle
            .dismiss_conversation(id, DismissReason::Dismissed);
        debug!(conversation_id = %id, marked, cancelled, "Conversation opened");
        Ok(marked)
    }

    fn activate_notification(&mut self, id: &NotificationId) -> NudgeResult<ConversationId> {
        let notification = self
            .lifecycle
            .dismiss(id, DismissReason::Activated)
            .ok_or_else(|| NudgeError::notification_not_found(id))?;
        self.open_conversation(&notification.conversation_id)?;
        Ok(notification.conversation_id)
    }

    fn snapshot(&self, id: &ConversationId) -> NudgeResult<ConversationSnapshot> {
        let conversation = self
            .conversations
            .get(id)
            .ok_or_else(|| NudgeError::conversation_not_found(id))?;
        let config = self
            .store
            .conversation(id)
            .ok_or_else(|| NudgeError::internal(format!("Missing config for conversation {}", id)))?;

        Ok(ConversationSnapshot {
            id: id.clone(),
            name: conversation.name.clone(),
            unread_count: conversation.unread_count(),
            last_message: conversation.last_message().map(str::to_string),
            general_enabled: config.general_enabled,
            condition_matching_enabled: config.condition_matching_enabled,
            sensitivity: config.sensitivity,
            conditions: config.conditions().to_vec(),
            notified_topics: config.notified_topics().iter().cloned().collect(),
            classifications_in_flight: self
                .in_flight
                .values()
                .filter(|flight| &flight.conversation_id == id)
                .count(),
        })
    }

    fn teardown(&mut self) {
        for flight in self.in_flight.values() {
            flight.token.cancel();
        }
        self.lifecycle.clear(DismissReason::PowerOff);
        self.surface_on = false;
    }
}
