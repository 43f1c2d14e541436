//! Command-line interface definition for Shamba
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting, one-shot questions and session management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shamba - irrigation advice in your terminal
///
/// Ask about water pressure, scheduling and crop-specific irrigation.
/// Known questions are answered from a local table; everything else is
/// forwarded to the prediction service.
#[derive(Parser, Debug, Clone)]
#[command(name = "shamba")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the prediction endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Load additional question/answer pairs from a YAML or JSON file
    #[arg(long)]
    pub knowledge: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Shamba
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Log in and store a session token
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and remove the stored session token
    Logout,

    /// Show session and endpoint status
    Status,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            endpoint: None,
            knowledge: None,
            command: Commands::Status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.endpoint.is_none());
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["shamba", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_cli_parse_ask_joins_words() {
        let cli =
            Cli::try_parse_from(["shamba", "ask", "What", "pressure", "for", "tomatoes?"]).unwrap();
        if let Commands::Ask { question } = cli.command {
            assert_eq!(question.join(" "), "What pressure for tomatoes?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_question() {
        assert!(Cli::try_parse_from(["shamba", "ask"]).is_err());
    }

    #[test]
    fn test_cli_parse_login() {
        let cli =
            Cli::try_parse_from(["shamba", "login", "--username", "wanjiru", "-p", "secret"])
                .unwrap();
        if let Commands::Login { username, password } = cli.command {
            assert_eq!(username, "wanjiru");
            assert_eq!(password, Some("secret".to_string()));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "shamba",
            "--endpoint",
            "http://10.0.0.2:8000/predict",
            "--knowledge",
            "faq.yaml",
            "-v",
            "status",
        ])
        .unwrap();
        assert_eq!(
            cli.endpoint,
            Some("http://10.0.0.2:8000/predict".to_string())
        );
        assert_eq!(cli.knowledge, Some(PathBuf::from("faq.yaml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_logout() {
        let cli = Cli::try_parse_from(["shamba", "logout"]).unwrap();
        assert!(matches!(cli.command, Commands::Logout));
    }
}
