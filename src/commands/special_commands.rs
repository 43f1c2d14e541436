//! Special commands parser for interactive chat
//!
//! Lines starting with `/` (plus the bare words `exit` and `quit`) control
//! the session instead of being sent as questions. Commands are
//! case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command does not take arguments
    #[error("{command} does not take arguments (got: {arg})")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the conversation and history
    NewChat,
    /// Show the history panel
    History,
    /// Show what the assistant can help with
    Info,
    /// Show session status
    ShowStatus,
    /// Show help
    Help,
    /// Log out and leave the session
    Logout,
    /// Leave the session
    Exit,
    /// Not a special command; send as a question
    None,
}

/// Parse a line of user input into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/command`,
/// or `CommandError::UnexpectedArgument` when a command is given arguments
///
/// # Examples
///
/// ```
/// use shamba::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(parse_special_command("Drip or sprinkler?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/plant").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    let parsed = match command {
        "/new" | "/clear" => SpecialCommand::NewChat,
        "/history" => SpecialCommand::History,
        "/info" => SpecialCommand::Info,
        "/status" => SpecialCommand::ShowStatus,
        "/help" | "/?" => SpecialCommand::Help,
        "/logout" => SpecialCommand::Logout,
        "exit" | "quit" | "/exit" | "/quit" => SpecialCommand::Exit,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnexpectedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        });
    }

    Ok(parsed)
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /new            - Start a new chat (clears conversation and history)
  /clear          - Same as /new
  /history        - Show recent conversations
  /info           - Show what Shamba can help with
  /status         - Show session and endpoint status
  /logout         - Log out and leave the chat
  /help, /?       - Show this help message
  exit, quit      - Leave the chat

Anything else is sent to Shamba as a question. Known questions are
answered instantly from the local table; others go to the prediction service.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_chat_aliases() {
        assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
        assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::NewChat);
    }

    #[test]
    fn test_parse_panels() {
        assert_eq!(parse_special_command("/history").unwrap(), SpecialCommand::History);
        assert_eq!(parse_special_command("/info").unwrap(), SpecialCommand::Info);
        assert_eq!(parse_special_command("/status").unwrap(), SpecialCommand::ShowStatus);
    }

    #[test]
    fn test_parse_help_shorthand() {
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_variants() {
        for input in ["exit", "quit", "/exit", "/quit", "EXIT"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_parse_logout() {
        assert_eq!(parse_special_command("/Logout").unwrap(), SpecialCommand::Logout);
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(parse_special_command("  /new  ").unwrap(), SpecialCommand::NewChat);
    }

    #[test]
    fn test_parse_regular_text_returns_none() {
        assert_eq!(
            parse_special_command("What pressure for tomatoes?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit strategy for floods").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_special_command("/water now").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/water".to_string()));
        assert!(err.to_string().contains("/help"));
    }

    #[test]
    fn test_parse_unexpected_argument() {
        let err = parse_special_command("/history all").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnexpectedArgument {
                command: "/history".to_string(),
                arg: "all".to_string(),
            }
        );
    }
}
