use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use pocketchat_chat::{history, ConversationStore};

use crate::app::AppConfig;
use crate::storage::FileStore;

/// CLI arguments for pocketchat
#[derive(Parser, Debug)]
#[command(name = "pocketchat")]
#[command(about = "PocketChat - a pocket chat companion that keeps your conversations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding storage.json (default: ~/.pocketchat)
    #[arg(long, env = "POCKETCHAT_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Delay before the assistant replies, in milliseconds
    #[arg(long, env = "POCKETCHAT_REPLY_DELAY_MS", value_name = "MS")]
    pub reply_delay_ms: Option<u64>,

    /// Path to a TOML config file
    #[arg(long, env = "POCKETCHAT_CONFIG", value_name = "PATH")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List saved conversations, newest first
    History,
    /// Delete every saved conversation
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Commands {
    pub fn execute(&self, app: &AppConfig) -> Result<String> {
        let store = FileStore::open(&app.data_dir)
            .with_context(|| format!("Failed to open data directory {}", app.data_dir.display()))?;
        let conversations = ConversationStore::new(store, &app.chat);

        match self {
            Commands::History => {
                let saved = conversations.load();
                if saved.is_empty() {
                    return Ok("No saved conversations".to_string());
                }
                let lines: Vec<String> = history::render(&saved)
                    .iter()
                    .zip(saved.iter().rev())
                    .enumerate()
                    .map(|(i, (entry, conversation))| {
                        format!(
                            "{:>3}. {} {}",
                            i + 1,
                            entry.title,
                            format!("({} messages, id {})", conversation.message_count(), entry.id)
                                .bright_black()
                        )
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            Commands::Clear { yes } => {
                if !yes && !confirm_on_stdin(pocketchat_chat::session::CLEAR_PROMPT)? {
                    return Ok("Nothing deleted".to_string());
                }
                conversations
                    .clear()
                    .context("Failed to delete saved conversations")?;
                Ok("Deleted all saved conversations".to_string())
            }
        }
    }
}

fn confirm_on_stdin(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

/// Whether a confirmation answer accepts the action
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["pocketchat", "clear", "--yes"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Clear { yes: true }));

        let cli = Cli::try_parse_from(["pocketchat", "history"]).unwrap();
        assert_eq!(cli.command, Some(Commands::History));
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["pocketchat", "--data-dir", "/tmp/pc", "--reply-delay-ms", "20"])
            .unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/pc"));
        assert_eq!(cli.reply_delay_ms, Some(20));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
