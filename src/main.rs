//! Shamba - irrigation advice chat client
//!
#![doc = "Main entry point for the Shamba CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shamba::cli::{Cli, Commands};
use shamba::commands;
use shamba::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            tracing::debug!("Asking: {}", question);
            commands::ask::run_ask(config, question).await?;
            Ok(())
        }
        Commands::Login { username, password } => {
            commands::auth::login(config, username, password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(config)?;
            Ok(())
        }
        Commands::Status => {
            commands::status::show_status(config)?;
            Ok(())
        }
    }
}

/// Initialize tracing, writing to stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "shamba=debug" } else { "shamba=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
