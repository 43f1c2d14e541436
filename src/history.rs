//! Conversation summaries for the history panel
//!
//! The index keeps one [`HistorySummary`] per (date, topic) pair, newest
//! first. It is refreshed from the conversation log after every change; an
//! existing entry is updated in place so its position in the list is stable.

use crate::config::HistoryDate;
use crate::conversation::{first_user_message, format_date, format_time, Message};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum topic length in characters before truncation
pub const TOPIC_MAX_CHARS: usize = 35;

/// Appended to a topic that was truncated
pub const ELLIPSIS: &str = "...";

/// Minimum number of messages before a conversation is listed
pub const MIN_MESSAGES: usize = 2;

/// Derive a topic label from the first user message
///
/// Text longer than [`TOPIC_MAX_CHARS`] characters is cut at that many
/// characters and [`ELLIPSIS`] is appended. Counting is by `char`, so a
/// multi-byte character is never split.
///
/// # Examples
///
/// ```
/// use shamba::history::derive_topic;
///
/// assert_eq!(derive_topic("Drip lines"), "Drip lines");
/// assert_eq!(
///     derive_topic("How often should I irrigate young mango trees in the dry season?"),
///     "How often should I irrigate young m..."
/// );
/// ```
pub fn derive_topic(text: &str) -> String {
    match text.char_indices().nth(TOPIC_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// One row of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Unique id (`chat_<uuid>`)
    pub id: String,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Truncated first user message
    pub topic: String,
    /// Full first user message
    pub preview: String,
    /// Number of messages in the conversation when last updated
    pub message_count: usize,
    /// Display-formatted time of the last update
    pub last_active: String,
}

/// What an [`HistoryIndex::update`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChange {
    /// Fewer than two messages, or no user message yet
    Skipped,
    /// A new entry was prepended
    Created,
    /// An existing entry was refreshed in place
    Updated,
}

/// Deduplicated, most-recent-first list of conversation summaries
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    entries: Vec<HistorySummary>,
    date_policy: HistoryDate,
}

impl HistoryIndex {
    /// Creates an empty index
    pub fn new(date_policy: HistoryDate) -> Self {
        Self {
            entries: Vec::new(),
            date_policy,
        }
    }

    /// Refresh the index from the current conversation
    ///
    /// # Arguments
    ///
    /// * `messages` - The whole conversation, in order
    /// * `now` - Current local time
    ///
    /// # Returns
    ///
    /// Returns what happened to the index
    pub fn update(&mut self, messages: &[Message], now: NaiveDateTime) -> HistoryChange {
        if messages.len() < MIN_MESSAGES {
            return HistoryChange::Skipped;
        }

        let Some(first) = first_user_message(messages) else {
            return HistoryChange::Skipped;
        };

        let topic = derive_topic(&first.text);
        let day = match self.date_policy {
            HistoryDate::ConversationStart => first.created_at.date(),
            HistoryDate::UpdateTime => now.date(),
        };
        let date = format_date(day);
        let last_active = format_time(now);

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.topic == topic && e.date == date)
        {
            entry.message_count = messages.len();
            entry.last_active = last_active;
            tracing::debug!(topic = %topic, count = messages.len(), "History entry updated");
            return HistoryChange::Updated;
        }

        tracing::debug!(topic = %topic, date = %date, "History entry created");
        self.entries.insert(
            0,
            HistorySummary {
                id: format!("chat_{}", Uuid::new_v4().simple()),
                date,
                topic,
                preview: first.text.clone(),
                message_count: messages.len(),
                last_active,
            },
        );
        HistoryChange::Created
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[HistorySummary] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
