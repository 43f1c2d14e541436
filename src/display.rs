//! Terminal rendering
//!
//! Turns [`ChatSnapshot`]s into colored transcript lines and renders the
//! history and information panels.

use crate::conversation::{Message, Sender};
use crate::history::HistorySummary;
use crate::orchestrator::ChatSnapshot;
use colored::Colorize;
use prettytable::{format, Table};

/// One entry of the information panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoTopic {
    /// Heading
    pub title: &'static str,
    /// One-line description
    pub description: &'static str,
}

/// What the assistant can help with
pub const INFO_TOPICS: [InfoTopic; 4] = [
    InfoTopic {
        title: "Pressure Control",
        description: "Learn optimal water pressure for different irrigation systems and crops",
    },
    InfoTopic {
        title: "Water Management",
        description: "Efficient water usage techniques and scheduling for better yields",
    },
    InfoTopic {
        title: "Crop-Specific Care",
        description: "Tailored irrigation advice for tomatoes, maize, vegetables, and more",
    },
    InfoTopic {
        title: "System Setup",
        description: "Complete guidance on drip, sprinkler, and micro-irrigation systems",
    },
];

/// Format one message as a transcript line
pub fn format_message(message: &Message) -> String {
    match message.sender {
        Sender::User => format!(
            "{} {} {}",
            "You".green().bold(),
            format!("[{}]", message.timestamp).dimmed(),
            message.text
        ),
        Sender::Bot => format!(
            "{} {} {}",
            "Shamba".cyan().bold(),
            format!("[{}]", message.timestamp).dimmed(),
            message.text
        ),
    }
}

/// Prints each message once, as snapshots arrive
///
/// Message ids increase for the whole session, so anything with an id above
/// the last printed one is new, including after a new chat.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    last_id: u64,
}

impl TranscriptPrinter {
    /// Create a printer that has printed nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in `snapshot` not yet printed
    pub fn pending<'a>(&mut self, snapshot: &'a ChatSnapshot) -> Vec<&'a Message> {
        let fresh: Vec<&Message> = snapshot
            .messages
            .iter()
            .filter(|m| m.id > self.last_id)
            .collect();
        if let Some(last) = fresh.last() {
            self.last_id = last.id;
        }
        fresh
    }

    /// Print messages not yet printed
    pub fn print(&mut self, snapshot: &ChatSnapshot) {
        for message in self.pending(snapshot) {
            println!("{}", format_message(message));
        }
    }
}

/// Build the history table
pub fn history_table(entries: &[HistorySummary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Topic".bold(),
        "Date".bold(),
        "Messages".bold(),
        "Last Active".bold()
    ]);

    for entry in entries {
        table.add_row(prettytable::row![
            entry.topic,
            entry.date.green(),
            entry.message_count,
            entry.last_active
        ]);
    }

    table
}

/// Print the history panel
pub fn print_history(entries: &[HistorySummary]) {
    println!("\n{}", "Recent Conversations".bold());
    if entries.is_empty() {
        println!("{}", "No conversations yet".yellow());
        println!("{}\n", "Start chatting to see your history here".dimmed());
        return;
    }

    history_table(entries).printstd();
    println!();
}

/// Print the information panel
pub fn print_info() {
    println!("\n{}", "What I Can Help You With".bold());
    println!(
        "Get expert advice on irrigation systems, water management, and crop-specific requirements.\n"
    );
    for topic in INFO_TOPICS.iter() {
        println!("  {}  {}", topic.title.green().bold(), topic.description);
    }
    println!();
}

/// Print the banner shown when a chat session starts
pub fn print_welcome_banner(endpoint: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║             Shamba Irrigation - Ready to help                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Ask about irrigation pressure, crop requirements...");
    println!("Endpoint: {}", endpoint.cyan());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Print the "bot is typing" indicator
pub fn print_typing() {
    println!("{}", "Shamba is typing...".dimmed().italic());
}
