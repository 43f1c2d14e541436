//! Shamba - irrigation advice chat client library
//!
//! This library provides the pieces behind the `shamba` CLI: a local
//! question/answer table, a remote prediction client, the chat orchestrator
//! with its per-day history index, and a stub session gate.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `knowledge`: Local question/answer table and question matching
//! - `prediction`: Remote prediction client abstraction and HTTP implementation
//! - `resolver`: Local-first, remote-second answer resolution
//! - `conversation`: Messages, clocks and the conversation log
//! - `history`: One summary per day and topic
//! - `orchestrator`: Submission flow, busy flag and new-chat handling
//! - `session`: Login state and token storage
//! - `display`: Terminal rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use shamba::{ChatOrchestrator, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let chat = ChatOrchestrator::from_config(&config)?;
//!     chat.submit("What pressure for tomatoes?").await;
//!     for message in chat.messages() {
//!         println!("{}", message.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod display;
pub mod error;
pub mod history;
pub mod knowledge;
pub mod orchestrator;
pub mod prediction;
pub mod resolver;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{Message, Sender};
pub use error::{Result, ShambaError};
pub use history::{HistoryIndex, HistorySummary};
pub use knowledge::KnowledgeBase;
pub use orchestrator::{ChatOrchestrator, ChatSnapshot, SubmitOutcome, FALLBACK_TEXT};
pub use prediction::{HttpPredictionClient, PredictionClient, NO_RESPONSE_TEXT};
pub use resolver::{AnswerResolver, AnswerSource};
pub use session::SessionGate;
