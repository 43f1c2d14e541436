/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`   - Interactive chat session
- `ask`    - Answer a single question
- `auth`   - Log in and out
- `status` - Show session and endpoint status

The handlers stay thin: state lives in the orchestrator and the session gate,
rendering lives in `display`.
*/

use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::display::{
    print_history, print_info, print_typing, print_welcome_banner, TranscriptPrinter,
};
use crate::error::{Result, ShambaError};
use crate::orchestrator::{ChatOrchestrator, ChatSnapshot, RejectReason, SubmitOutcome};
use crate::session::SessionGate;
use colored::Colorize;
use tokio::sync::watch;

// Special commands parser for the chat prompt
pub mod special_commands;

/// Submit `question` and print the transcript as it changes
///
/// The user's message and the typing indicator are printed as soon as the
/// orchestrator publishes them; the reply is printed when it lands.
pub(crate) async fn submit_and_render(
    orchestrator: &ChatOrchestrator,
    updates: &mut watch::Receiver<ChatSnapshot>,
    printer: &mut TranscriptPrinter,
    question: &str,
) -> SubmitOutcome {
    let submission = orchestrator.submit(question);
    tokio::pin!(submission);

    let mut typing_shown = false;
    let outcome = loop {
        tokio::select! {
            outcome = &mut submission => break outcome,
            changed = updates.changed() => {
                if changed.is_err() {
                    break (&mut submission).await;
                }
                let snapshot = updates.borrow_and_update().clone();
                printer.print(&snapshot);
                if snapshot.busy && !typing_shown {
                    print_typing();
                    typing_shown = true;
                }
            }
        }
    };

    let snapshot = updates.borrow_and_update().clone();
    printer.print(&snapshot);
    outcome
}

// Chat command handler
pub mod chat {
    //! Interactive chat session.
    //!
    //! Requires a logged-in session, builds a `ChatOrchestrator` from config
    //! and runs a readline loop that submits each line as a question.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    const PROMPT: &str = "shamba> ";

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a saved session, or an error if the
    /// answer table or prediction client cannot be built
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let mut gate = SessionGate::from_config(&config.session)?;
        gate.require_login()?;

        let orchestrator = ChatOrchestrator::from_config(&config)?;
        let mut updates = orchestrator.subscribe();
        let mut printer = TranscriptPrinter::new();

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&orchestrator.resolver().endpoint());

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::NewChat) => {
                            orchestrator.new_chat();
                            println!("{}\n", "Started a new chat".green());
                            continue;
                        }
                        Ok(SpecialCommand::History) => {
                            print_history(&orchestrator.history());
                            continue;
                        }
                        Ok(SpecialCommand::Info) => {
                            print_info();
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            status::print_status_display(&config, &gate, &orchestrator);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Logout) => {
                            gate.logout()?;
                            println!("Logged out");
                            break;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    let outcome =
                        submit_and_render(&orchestrator, &mut updates, &mut printer, trimmed)
                            .await;
                    tracing::debug!(?outcome, "Submission finished");
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

// One-shot question handler
pub mod ask {
    //! Answer a single question and exit.

    use super::*;

    /// Ask one question and print the exchange
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `question` - The question text
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a saved session, or `RemoteUnavailable`
    /// when no answer could be obtained
    pub async fn run_ask(config: Config, question: String) -> Result<()> {
        let gate = SessionGate::from_config(&config.session)?;
        gate.require_login()?;

        let orchestrator = ChatOrchestrator::from_config(&config)?;
        let answer = ask_with(&orchestrator, &question).await?;
        println!("{}", answer);
        Ok(())
    }

    /// Submit one question and return the reply text
    ///
    /// # Errors
    ///
    /// Returns `Config` for a blank question and `RemoteUnavailable` when
    /// the orchestrator fell back to its apology
    pub async fn ask_with(orchestrator: &ChatOrchestrator, question: &str) -> Result<String> {
        let outcome = orchestrator.submit(question).await;
        tracing::debug!(?outcome, "Question resolved");

        match outcome {
            SubmitOutcome::Rejected(RejectReason::Empty) => {
                Err(ShambaError::Config("Question must not be empty".to_string()).into())
            }
            SubmitOutcome::Answered(_) => orchestrator
                .messages()
                .last()
                .map(|m| m.text.clone())
                .ok_or_else(|| ShambaError::RemoteUnavailable("no reply recorded".to_string()).into()),
            other => Err(ShambaError::RemoteUnavailable(format!(
                "could not get an answer from {} ({:?})",
                orchestrator.resolver().endpoint(),
                other
            ))
            .into()),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::error::is_remote_unavailable;
        use crate::knowledge::{builtin_entries, KnowledgeBase};
        use crate::config::MatchMode;
        use crate::prediction::fake::{Reply, ScriptedClient};
        use std::sync::Arc;

        fn orchestrator(client: ScriptedClient) -> ChatOrchestrator {
            ChatOrchestrator::with_parts(
                KnowledgeBase::from_entries(MatchMode::Normalized, builtin_entries()),
                Arc::new(client),
                &Config::default(),
            )
        }

        #[tokio::test]
        async fn test_ask_local_answer() {
            let orch = orchestrator(ScriptedClient::new());
            let answer = ask_with(&orch, "What pressure for tomatoes?").await.unwrap();
            assert_eq!(answer, "2-3 bar");
        }

        #[tokio::test]
        async fn test_ask_remote_answer() {
            let orch = orchestrator(ScriptedClient::new().then(Reply::Answer("Mulch".to_string())));
            let answer = ask_with(&orch, "How to keep soil moist?").await.unwrap();
            assert_eq!(answer, "Mulch");
        }

        #[tokio::test]
        async fn test_ask_blank_question() {
            let orch = orchestrator(ScriptedClient::new());
            assert!(ask_with(&orch, "   ").await.is_err());
        }

        #[tokio::test]
        async fn test_ask_remote_failure() {
            let orch = orchestrator(ScriptedClient::new().then(Reply::Fail("down".to_string())));
            let err = ask_with(&orch, "Unknown?").await.unwrap_err();
            assert!(is_remote_unavailable(&err));
        }

        #[tokio::test]
        async fn test_run_ask_requires_login() {
            let mut config = Config::default();
            config.session.backend = crate::config::SessionBackend::Memory;
            let err = run_ask(config, "Hi".to_string()).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ShambaError>(),
                Some(ShambaError::NotLoggedIn)
            ));
        }
    }
}

// Login / logout handlers
pub mod auth {
    //! Stub authentication.
    //!
    //! Any non-blank username and password produce the demo session token.

    use super::*;
    use rustyline::DefaultEditor;

    /// Log in and persist the session token
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `username` - Username
    /// * `password` - Password; prompted for when `None`
    pub async fn login(config: Config, username: String, password: Option<String>) -> Result<()> {
        let mut gate = SessionGate::from_config(&config.session)?;

        let password = match password {
            Some(p) => p,
            None => prompt_password()?,
        };

        println!("Signing in...");
        gate.login(&username, &password).await?;
        println!("{}", format!("Logged in as {}", username.trim()).green());
        Ok(())
    }

    /// Log out and remove the saved session token
    pub fn logout(config: Config) -> Result<()> {
        let mut gate = SessionGate::from_config(&config.session)?;
        if !gate.is_logged_in() {
            println!("Not logged in");
            return Ok(());
        }
        gate.logout()?;
        println!("Logged out");
        Ok(())
    }

    fn prompt_password() -> Result<String> {
        let mut rl = DefaultEditor::new()?;
        Ok(rl.readline("Password: ")?)
    }

}

// Status handler
pub mod status {
    //! Session and endpoint status.

    use super::*;
    use crate::knowledge::KnowledgeBase;

    /// Print status without starting a chat
    pub fn show_status(config: Config) -> Result<()> {
        let gate = SessionGate::from_config(&config.session)?;
        let knowledge = KnowledgeBase::from_config(&config.knowledge)?;

        print_banner();
        print_session_line(&gate);
        println!("Endpoint:          {}", config.prediction.endpoint.cyan());
        println!("Known Answers:     {}", knowledge.len());
        println!("Match Mode:        {:?}", knowledge.match_mode());
        println!("Session Storage:   {:?}", config.session.backend);
        println!();
        Ok(())
    }

    /// Print status from inside a chat session
    pub(crate) fn print_status_display(
        config: &Config,
        gate: &SessionGate,
        orchestrator: &ChatOrchestrator,
    ) {
        let snapshot = orchestrator.snapshot();
        let knowledge = orchestrator.resolver().knowledge();

        print_banner();
        print_session_line(gate);
        println!(
            "Endpoint:          {}",
            orchestrator.resolver().endpoint().cyan()
        );
        println!("Known Answers:     {}", knowledge.len());
        println!("Match Mode:        {:?}", knowledge.match_mode());
        println!("Session Storage:   {:?}", config.session.backend);
        println!("Conversation Size: {} messages", snapshot.messages.len());
        println!("History Entries:   {}", snapshot.history.len());
        println!();
    }

    fn print_banner() {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Shamba Session Status                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
    }

    fn print_session_line(gate: &SessionGate) {
        if gate.is_logged_in() {
            println!("Session:           {}", "logged in".green());
        } else {
            println!("Session:           {}", "logged out".yellow());
        }
    }

}
