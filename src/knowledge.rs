//! Local question/answer table
//!
//! Questions found here are answered without touching the network. The table
//! is seeded with a small irrigation FAQ and can be extended from a YAML or
//! JSON file of `{question, answer}` entries.
//!
//! Matching is deterministic. In [`MatchMode::Exact`] the stored question and
//! the asked question must be identical strings. In [`MatchMode::Normalized`]
//! both sides are trimmed, every run of whitespace becomes one space and the
//! text is lowercased before comparison.

use crate::config::{KnowledgeConfig, MatchMode};
use crate::error::{Result, ShambaError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A single question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Question as it would be typed
    pub question: String,
    /// Canned answer
    pub answer: String,
}

impl KnowledgeEntry {
    /// Convenience constructor
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// File layout accepted by [`KnowledgeBase::load_file`]
///
/// Either a bare list of entries or a map with an `entries` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KnowledgeFile {
    List(Vec<KnowledgeEntry>),
    Wrapped { entries: Vec<KnowledgeEntry> },
}

impl KnowledgeFile {
    fn into_entries(self) -> Vec<KnowledgeEntry> {
        match self {
            Self::List(entries) | Self::Wrapped { entries } => entries,
        }
    }
}

/// Built-in irrigation FAQ
pub fn builtin_entries() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new("What pressure for tomatoes?", "2-3 bar"),
        KnowledgeEntry::new(
            "What pressure for drip irrigation?",
            "Most drip systems run best at 1-2 bar (15-30 psi). Fit a pressure regulator if your supply is higher.",
        ),
        KnowledgeEntry::new(
            "What pressure for sprinklers?",
            "Rotary sprinklers typically need 2.5-4 bar; spray heads work at around 2 bar.",
        ),
        KnowledgeEntry::new(
            "How much water does maize need?",
            "Maize needs roughly 500-800 mm of water over the season, peaking at tasseling and silking.",
        ),
        KnowledgeEntry::new(
            "When is the best time to irrigate?",
            "Early morning. Evaporation is low and leaves dry quickly, which limits fungal disease.",
        ),
        KnowledgeEntry::new(
            "How often should I water vegetables?",
            "Give vegetables about 25 mm per week, split into 2-3 deep waterings rather than daily sprinkles.",
        ),
        KnowledgeEntry::new(
            "What is micro-irrigation?",
            "Micro-irrigation delivers water at low pressure through drippers, micro-sprinklers or bubblers placed near the roots.",
        ),
    ]
}

/// Question to answer lookup table
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, String>,
    mode: MatchMode,
}

impl KnowledgeBase {
    /// Creates an empty table
    pub fn new(mode: MatchMode) -> Self {
        Self {
            entries: HashMap::new(),
            mode,
        }
    }

    /// Creates a table holding the given entries
    ///
    /// Later entries replace earlier ones with the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use shamba::config::MatchMode;
    /// use shamba::knowledge::{KnowledgeBase, KnowledgeEntry};
    ///
    /// let kb = KnowledgeBase::from_entries(
    ///     MatchMode::Normalized,
    ///     vec![KnowledgeEntry::new("What pressure for tomatoes?", "2-3 bar")],
    /// );
    /// assert_eq!(kb.lookup("  what PRESSURE for   tomatoes? "), Some("2-3 bar"));
    /// ```
    pub fn from_entries(mode: MatchMode, entries: impl IntoIterator<Item = KnowledgeEntry>) -> Self {
        let mut kb = Self::new(mode);
        for entry in entries {
            kb.insert(entry);
        }
        kb
    }

    /// Build the table described by the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured table file cannot be loaded
    pub fn from_config(config: &KnowledgeConfig) -> Result<Self> {
        let mut kb = Self::new(config.match_mode);

        if config.include_builtin {
            for entry in builtin_entries() {
                kb.insert(entry);
            }
        }

        if let Some(path) = &config.table_path {
            let added = kb.load_file(path)?;
            tracing::info!("Loaded {} answers from {}", added, path.display());
        }

        Ok(kb)
    }

    /// Merge entries from a YAML (`.yaml`/`.yml`) or JSON file
    ///
    /// # Returns
    ///
    /// Returns the number of entries read
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable, unparsable, or contains an
    /// entry with an empty question or answer
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ShambaError::Knowledge(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let file: KnowledgeFile = if is_json {
            serde_json::from_str(&contents).map_err(|e| {
                ShambaError::Knowledge(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                ShambaError::Knowledge(format!("Failed to parse {}: {}", path.display(), e))
            })?
        };

        let entries = file.into_entries();
        for (i, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(ShambaError::Knowledge(format!(
                    "Entry {} in {} has an empty question",
                    i + 1,
                    path.display()
                ))
                .into());
            }
            if entry.answer.trim().is_empty() {
                return Err(ShambaError::Knowledge(format!(
                    "Entry {} ({}) in {} has an empty answer",
                    i + 1,
                    entry.question,
                    path.display()
                ))
                .into());
            }
        }

        let count = entries.len();
        for entry in entries {
            self.insert(entry);
        }
        Ok(count)
    }

    /// Add or replace one entry
    pub fn insert(&mut self, entry: KnowledgeEntry) {
        let key = self.key(&entry.question);
        self.entries.insert(key, entry.answer);
    }

    /// Look up the canned answer for a question
    pub fn lookup(&self, question: &str) -> Option<&str> {
        self.entries.get(&self.key(question)).map(String::as_str)
    }

    /// Matching policy in use
    pub fn match_mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of distinct questions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(&self, question: &str) -> String {
        match self.mode {
            MatchMode::Exact => question.to_string(),
            MatchMode::Normalized => normalize(question),
        }
    }
}

/// Trim, collapse whitespace runs to one space, lowercase
pub fn normalize(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  What\tPressure \n for  TOMATOES? "), "what pressure for tomatoes?");
    }

    #[test]
    fn test_builtin_contains_tomato_pressure() {
        let kb = KnowledgeBase::from_config(&KnowledgeConfig::default()).unwrap();
        assert_eq!(kb.lookup("What pressure for tomatoes?"), Some("2-3 bar"));
        assert_eq!(kb.len(), builtin_entries().len());
    }

    #[test]
    fn test_every_builtin_question_matches_verbatim_in_both_modes() {
        for mode in [MatchMode::Exact, MatchMode::Normalized] {
            let kb = KnowledgeBase::from_entries(mode, builtin_entries());
            for entry in builtin_entries() {
                assert_eq!(kb.lookup(&entry.question), Some(entry.answer.as_str()));
            }
        }
    }

    #[test]
    fn test_exact_mode_is_case_sensitive() {
        let kb = KnowledgeBase::from_entries(MatchMode::Exact, builtin_entries());
        assert!(kb.lookup("what pressure for tomatoes?").is_none());
        assert!(kb.lookup("What pressure for tomatoes? ").is_none());
    }

    #[test]
    fn test_normalized_mode_ignores_case_and_spacing() {
        let kb = KnowledgeBase::from_entries(MatchMode::Normalized, builtin_entries());
        assert_eq!(kb.lookup("WHAT  pressure for tomatoes?"), Some("2-3 bar"));
    }

    #[test]
    fn test_unknown_question_misses() {
        let kb = KnowledgeBase::from_entries(MatchMode::Normalized, builtin_entries());
        assert!(kb.lookup("Can I irrigate with seawater?").is_none());
    }

    #[test]
    fn test_load_yaml_list_overrides_builtin() {
        let file = write_temp(
            ".yaml",
            "- question: What pressure for tomatoes?\n  answer: 1.5 bar on drip\n- question: Best mulch?\n  answer: Straw\n",
        );

        let config = KnowledgeConfig {
            table_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let kb = KnowledgeBase::from_config(&config).unwrap();
        assert_eq!(kb.lookup("What pressure for tomatoes?"), Some("1.5 bar on drip"));
        assert_eq!(kb.lookup("best mulch?"), Some("Straw"));
    }

    #[test]
    fn test_load_json_wrapped() {
        let file = write_temp(
            ".json",
            r#"{"entries": [{"question": "Drip emitter flow?", "answer": "2-4 L/h"}]}"#,
        );

        let mut kb = KnowledgeBase::new(MatchMode::Exact);
        assert_eq!(kb.load_file(file.path()).unwrap(), 1);
        assert_eq!(kb.lookup("Drip emitter flow?"), Some("2-4 L/h"));
    }

    #[test]
    fn test_load_rejects_empty_answer() {
        let file = write_temp(".yaml", "- question: Empty?\n  answer: \"  \"\n");
        let mut kb = KnowledgeBase::new(MatchMode::Normalized);
        let err = kb.load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty answer"));
        assert!(kb.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let mut kb = KnowledgeBase::default();
        let err = kb.load_file(Path::new("/nonexistent/faq.yaml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShambaError>(),
            Some(ShambaError::Knowledge(_))
        ));
    }

    #[test]
    fn test_without_builtin_table_is_empty() {
        let config = KnowledgeConfig {
            include_builtin: false,
            ..Default::default()
        };
        assert!(KnowledgeBase::from_config(&config).unwrap().is_empty());
    }
}
