//! Chat orchestration
//!
//! [`ChatOrchestrator`] owns the conversation log, the history index, the
//! input buffer and the busy flag. `submit` appends the user's message,
//! resolves an answer and appends the bot's reply; every state change is
//! published as a [`ChatSnapshot`] on a watch channel for the renderer.
//!
//! # Concurrency
//!
//! At most one submission is in flight. A `submit` made while busy is
//! rejected, not queued. `new_chat` bumps a generation counter; a submission
//! that completes after a newer generation started drops its reply instead of
//! writing it into the fresh conversation, and still releases the busy flag.
//! A submission dropped before its answer arrives releases the flag too.

use crate::config::{Config, HistoryDate};
use crate::conversation::{Clock, ConversationStore, Message, Sender, SystemClock};
use crate::error::Result;
use crate::history::{HistoryIndex, HistorySummary};
use crate::knowledge::KnowledgeBase;
use crate::prediction::{self, PredictionClient};
use crate::resolver::{AnswerResolver, AnswerSource};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// Bot reply shown when an answer could not be obtained
pub const FALLBACK_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Observable chat state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    /// Conversation, oldest first
    pub messages: Vec<Message>,
    /// History entries, newest first
    pub history: Vec<HistorySummary>,
    /// Whether a submission is in flight
    pub busy: bool,
    /// Current input buffer
    pub input: String,
}

/// Why a submission was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing but whitespace
    Empty,
    /// Another submission is in flight
    Busy,
}

/// What happened to a submission
///
/// Purely informational; the state change itself is observed through the
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed
    Rejected(RejectReason),
    /// A bot reply was appended
    Answered(AnswerSource),
    /// The fallback apology was appended
    Failed,
    /// A new chat started while waiting; the reply was dropped
    Discarded,
}

#[derive(Debug)]
struct ChatState {
    store: ConversationStore,
    history: HistoryIndex,
    busy: bool,
    input: String,
    generation: u64,
}

impl ChatState {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.store.messages().to_vec(),
            history: self.history.entries().to_vec(),
            busy: self.busy,
            input: self.input.clone(),
        }
    }

    fn append(&mut self, sender: Sender, text: &str, clock: &dyn Clock) {
        let now = clock.now();
        self.store.push(sender, text, now);
        self.history.update(self.store.messages(), now);
    }
}

/// Releases the busy flag if a submission is dropped before it completes
struct BusyGuard<'a> {
    orchestrator: &'a ChatOrchestrator,
    armed: bool,
}

impl<'a> BusyGuard<'a> {
    fn new(orchestrator: &'a ChatOrchestrator) -> Self {
        Self {
            orchestrator,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!("Submission cancelled while waiting for an answer");
        let mut state = self.orchestrator.lock();
        state.busy = false;
        self.orchestrator.publish(&state);
    }
}

/// Drives one chat session
pub struct ChatOrchestrator {
    resolver: Arc<AnswerResolver>,
    clock: Arc<dyn Clock>,
    state: Mutex<ChatState>,
    updates: watch::Sender<ChatSnapshot>,
}

impl ChatOrchestrator {
    /// Create an orchestrator around a resolver
    ///
    /// Uses the system clock and files history under the conversation's
    /// start date.
    pub fn new(resolver: Arc<AnswerResolver>) -> Self {
        let state = ChatState {
            store: ConversationStore::new(),
            history: HistoryIndex::new(HistoryDate::default()),
            busy: false,
            input: String::new(),
            generation: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Self {
            resolver,
            clock: Arc::new(SystemClock),
            state: Mutex::new(state),
            updates,
        }
    }

    /// Build the knowledge table, prediction client and resolver from config
    ///
    /// # Errors
    ///
    /// Returns error if the knowledge table cannot be loaded or the HTTP
    /// client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let knowledge = KnowledgeBase::from_config(&config.knowledge)?;
        let client = prediction::create_client(&config.prediction)?;
        Ok(Self::with_parts(knowledge, client, config))
    }

    /// Like [`ChatOrchestrator::from_config`] but with a caller-supplied client
    pub fn with_parts(
        knowledge: KnowledgeBase,
        client: Arc<dyn PredictionClient>,
        config: &Config,
    ) -> Self {
        tracing::debug!(
            answers = knowledge.len(),
            mode = ?knowledge.match_mode(),
            "Local answer table ready"
        );
        let resolver = AnswerResolver::new(Arc::new(knowledge), client)
            .with_local_delay(Duration::from_millis(config.chat.local_answer_delay_ms));
        Self::new(Arc::new(resolver)).with_history_date(config.chat.history_date)
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Choose which day history entries are filed under
    ///
    /// Only meaningful before the first message.
    pub fn with_history_date(self, policy: HistoryDate) -> Self {
        {
            let mut state = self.lock();
            state.history = HistoryIndex::new(policy);
        }
        self
    }

    /// Submit a question
    ///
    /// Blank input and submissions made while busy are ignored. Otherwise the
    /// user message is appended right away, the input buffer is cleared and
    /// the orchestrator stays busy until a reply (or the fallback apology) is
    /// appended. Failures never propagate to the caller.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let question = question.trim();

        let generation = {
            let mut state = self.lock();
            if question.is_empty() {
                tracing::debug!("Ignoring empty submission");
                return SubmitOutcome::Rejected(RejectReason::Empty);
            }
            if state.busy {
                tracing::debug!("Ignoring submission while busy");
                return SubmitOutcome::Rejected(RejectReason::Busy);
            }

            state.append(Sender::User, question, self.clock.as_ref());
            state.input.clear();
            state.busy = true;
            self.publish(&state);
            state.generation
        };

        let mut busy = BusyGuard::new(self);

        let result = self.resolver.resolve(question).await;

        let mut state = self.lock();
        busy.disarm();
        if state.generation != generation {
            tracing::warn!("Dropping reply for a conversation that was replaced");
            state.busy = false;
            self.publish(&state);
            return SubmitOutcome::Discarded;
        }

        let outcome = match result {
            Ok(resolution) => {
                state.append(Sender::Bot, &resolution.answer, self.clock.as_ref());
                SubmitOutcome::Answered(resolution.source)
            }
            Err(e) => {
                tracing::error!("Error sending message: {:#}", e);
                state.append(Sender::Bot, FALLBACK_TEXT, self.clock.as_ref());
                SubmitOutcome::Failed
            }
        };
        state.busy = false;
        self.publish(&state);
        outcome
    }

    /// Submit whatever is in the input buffer
    pub async fn send_input(&self) -> SubmitOutcome {
        let input = self.input();
        self.submit(&input).await
    }

    /// Start over with an empty conversation and history
    ///
    /// Leaves the busy flag alone; a reply still in flight is dropped when it
    /// arrives.
    pub fn new_chat(&self) {
        let mut state = self.lock();
        state.store.clear();
        state.history.clear();
        state.generation += 1;
        tracing::debug!(generation = state.generation, "Started new chat");
        self.publish(&state);
    }

    /// Replace the input buffer
    pub fn set_input(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.input = text.into();
        self.publish(&state);
    }

    /// Current input buffer
    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    /// Whether a submission is in flight
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Copy of the conversation
    pub fn messages(&self) -> Vec<Message> {
        self.lock().store.messages().to_vec()
    }

    /// Copy of the history entries
    pub fn history(&self) -> Vec<HistorySummary> {
        self.lock().history.entries().to_vec()
    }

    /// Copy of the whole state
    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock().snapshot()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.updates.subscribe()
    }

    /// The resolver in use
    pub fn resolver(&self) -> &AnswerResolver {
        &self.resolver
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &ChatState) {
        self.updates.send_replace(state.snapshot());
    }
}
