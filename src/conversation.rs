//! Conversation log for a chat session
//!
//! Messages are appended in the order they are exchanged and are never edited
//! or removed individually; the whole log is cleared when a new chat starts.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Display format for message and history timestamps
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Calendar day format used by history entries
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current local time
///
/// The orchestrator and history index read the clock through this trait so
/// tests can pin or advance time.
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to
///
/// # Examples
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use shamba::conversation::{Clock, ManualClock};
///
/// let start = NaiveDate::from_ymd_opt(2026, 3, 1)
///     .unwrap()
///     .and_hms_opt(23, 59, 0)
///     .unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(Duration::minutes(2));
/// assert_eq!(clock.now().date(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, to: NaiveDateTime) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Format a time for display next to a message
pub fn format_time(at: NaiveDateTime) -> String {
    at.format(TIME_FORMAT).to_string()
}

/// Format a calendar day as `YYYY-MM-DD`
pub fn format_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing questions
    User,
    /// The assistant
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Session-unique, monotonically increasing id
    pub id: u64,
    /// Message body
    pub text: String,
    /// Author
    pub sender: Sender,
    /// Display-formatted time the message was created
    pub timestamp: String,
    /// Local time the message was created
    pub created_at: NaiveDateTime,
}

impl Message {
    /// Whether this message was typed by the user
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Ordered, append-only message log
///
/// Ids keep increasing across [`ConversationStore::clear`] so that no two
/// messages in one session ever share an id.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use shamba::conversation::{ConversationStore, Sender};
///
/// let at = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap().and_hms_opt(9, 30, 0).unwrap();
/// let mut store = ConversationStore::new();
/// store.push(Sender::User, "When should I water maize?", at);
/// store.push(Sender::Bot, "Early morning.", at);
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.messages()[0].timestamp, "09:30:00");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a message and returns a reference to it
    pub fn push(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        at: NaiveDateTime,
    ) -> &Message {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        self.messages.push(Message {
            id,
            text: text.into(),
            sender,
            timestamp: format_time(at),
            created_at: at,
        });

        &self.messages[self.messages.len() - 1]
    }

    /// All messages in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The first message the user sent, if any
    pub fn first_user_message(&self) -> Option<&Message> {
        first_user_message(&self.messages)
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Find the first user-sent message in a slice
pub fn first_user_message(messages: &[Message]) -> Option<&Message> {
    messages.iter().find(|m| m.is_user())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut store = ConversationStore::new();
        let a = store.push(Sender::User, "a", at(8, 0, 0)).id;
        let b = store.push(Sender::Bot, "b", at(8, 0, 1)).id;
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_ids_survive_clear() {
        let mut store = ConversationStore::new();
        store.push(Sender::User, "a", at(8, 0, 0));
        store.push(Sender::Bot, "b", at(8, 0, 0));
        store.clear();
        assert!(store.is_empty());

        let id = store.push(Sender::User, "c", at(8, 1, 0)).id;
        assert_eq!(id, 3);
    }

    #[test]
    fn test_default_store_starts_at_one() {
        let mut store = ConversationStore::default();
        assert_eq!(store.push(Sender::User, "x", at(1, 2, 3)).id, 1);
    }

    #[test]
    fn test_timestamp_format() {
        let mut store = ConversationStore::new();
        let msg = store.push(Sender::User, "x", at(14, 5, 9));
        assert_eq!(msg.timestamp, "14:05:09");
    }

    #[test]
    fn test_first_user_message_skips_bot() {
        let mut store = ConversationStore::new();
        store.push(Sender::Bot, "Welcome", at(7, 0, 0));
        store.push(Sender::User, "Drip or sprinkler?", at(7, 0, 5));
        store.push(Sender::User, "For beans", at(7, 0, 9));

        assert_eq!(
            store.first_user_message().map(|m| m.text.as_str()),
            Some("Drip or sprinkler?")
        );
    }

    #[test]
    fn test_first_user_message_none() {
        let mut store = ConversationStore::new();
        store.push(Sender::Bot, "Welcome", at(7, 0, 0));
        assert!(store.first_user_message().is_none());
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new(at(23, 59, 59));
        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(format_date(clock.now().date()), "2026-10-19");

        clock.set(at(6, 0, 0));
        assert_eq!(format_time(clock.now()), "06:00:00");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        assert_eq!(Sender::User.to_string(), "user");
    }
}
