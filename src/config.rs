//! Configuration management for Shamba
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, ShambaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for Shamba
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote prediction endpoint settings
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Local question/answer table settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    /// Chat behaviour settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Session token settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Prediction endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Full URL of the prediction endpoint (POST target)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/predict".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// How questions are compared against the local table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Byte-for-byte comparison
    Exact,
    /// Trim, collapse whitespace runs to a single space, lowercase
    #[default]
    Normalized,
}

impl MatchMode {
    /// Parse a match mode from a string ("exact" or "normalized")
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" | "normalised" => Ok(Self::Normalized),
            other => Err(format!("Unknown match mode: {}", other)),
        }
    }
}

/// Local knowledge table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Optional YAML or JSON file with extra question/answer pairs
    #[serde(default)]
    pub table_path: Option<PathBuf>,

    /// Question matching policy
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Seed the table with the built-in irrigation FAQ
    #[serde(default = "default_include_builtin")]
    pub include_builtin: bool,
}

fn default_include_builtin() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            match_mode: MatchMode::default(),
            include_builtin: default_include_builtin(),
        }
    }
}

/// Which calendar day a history entry is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryDate {
    /// The day the conversation's first user message was sent
    #[default]
    ConversationStart,
    /// The day the history index was last updated; a conversation running
    /// past midnight gets a second entry
    UpdateTime,
}

/// Chat behaviour configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Artificial latency applied to answers from the local table (milliseconds)
    #[serde(default)]
    pub local_answer_delay_ms: u64,

    /// Calendar day used when filing history entries
    #[serde(default)]
    pub history_date: HistoryDate,
}

/// Storage backend for the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// JSON file in the user data directory
    #[default]
    File,
    /// OS native credential store
    Keyring,
    /// Process memory only; nothing survives a restart
    Memory,
}

impl SessionBackend {
    /// Parse a backend name ("file", "keyring" or "memory")
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Unknown session backend: {}", other)),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token storage backend
    #[serde(default)]
    pub backend: SessionBackend,

    /// Token file location for the file backend (defaults to the data dir)
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Simulated login latency (milliseconds)
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,
}

fn default_login_delay() -> u64 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            token_path: None,
            login_delay_ms: default_login_delay(),
        }
    }
}

const MAX_DELAY_MS: u64 = 60_000;
const MAX_TIMEOUT_SECONDS: u64 = 600;

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ShambaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ShambaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("SHAMBA_PREDICTION_ENDPOINT") {
            tracing::debug!(endpoint = %endpoint, "Env override: SHAMBA_PREDICTION_ENDPOINT");
            self.prediction.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("SHAMBA_PREDICTION_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.prediction.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SHAMBA_PREDICTION_TIMEOUT: {}", timeout);
            }
        }

        if let Ok(table) = std::env::var("SHAMBA_KNOWLEDGE_TABLE") {
            tracing::debug!(table = %table, "Env override: SHAMBA_KNOWLEDGE_TABLE");
            self.knowledge.table_path = Some(PathBuf::from(table));
        }

        if let Ok(mode) = std::env::var("SHAMBA_MATCH_MODE") {
            match MatchMode::parse_str(&mode) {
                Ok(v) => self.knowledge.match_mode = v,
                Err(e) => tracing::warn!("Invalid SHAMBA_MATCH_MODE: {}", e),
            }
        }

        if let Ok(delay) = std::env::var("SHAMBA_LOCAL_ANSWER_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.chat.local_answer_delay_ms = value;
            } else {
                tracing::warn!("Invalid SHAMBA_LOCAL_ANSWER_DELAY_MS: {}", delay);
            }
        }

        if let Ok(backend) = std::env::var("SHAMBA_SESSION_BACKEND") {
            match SessionBackend::parse_str(&backend) {
                Ok(v) => self.session.backend = v,
                Err(e) => tracing::warn!("Invalid SHAMBA_SESSION_BACKEND: {}", e),
            }
        }

        if let Ok(token_path) = std::env::var("SHAMBA_SESSION_FILE") {
            self.session.token_path = Some(PathBuf::from(token_path));
        }

        if let Ok(delay) = std::env::var("SHAMBA_LOGIN_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.session.login_delay_ms = value;
            } else {
                tracing::warn!("Invalid SHAMBA_LOGIN_DELAY_MS: {}", delay);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(endpoint) = &cli.endpoint {
            self.prediction.endpoint = endpoint.clone();
        }

        if let Some(table) = &cli.knowledge {
            self.knowledge.table_path = Some(table.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.prediction.endpoint).map_err(|e| {
            ShambaError::Config(format!(
                "prediction.endpoint is not a valid URL ({}): {}",
                self.prediction.endpoint, e
            ))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ShambaError::Config(format!(
                "prediction.endpoint must use http or https, got {}",
                endpoint.scheme()
            ))
            .into());
        }

        if self.prediction.timeout_seconds == 0 {
            return Err(ShambaError::Config(
                "prediction.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.prediction.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ShambaError::Config(format!(
                "prediction.timeout_seconds must be less than or equal to {}",
                MAX_TIMEOUT_SECONDS
            ))
            .into());
        }

        if self.chat.local_answer_delay_ms > MAX_DELAY_MS {
            return Err(ShambaError::Config(format!(
                "chat.local_answer_delay_ms must be less than or equal to {}",
                MAX_DELAY_MS
            ))
            .into());
        }

        if self.session.login_delay_ms > MAX_DELAY_MS {
            return Err(ShambaError::Config(format!(
                "session.login_delay_ms must be less than or equal to {}",
                MAX_DELAY_MS
            ))
            .into());
        }

        if !self.knowledge.include_builtin && self.knowledge.table_path.is_none() {
            tracing::warn!("Local answer table is empty; every question goes to the endpoint");
        }

        Ok(())
    }
}
