//! Terminal client for the deep research relay
//!
//! # Usage
//!
//! ```bash
//! # Run a search and record it in the local history
//! research search "Quantum computing"
//!
//! # Print the pre-rendered HTML instead of markdown
//! research search --html "Quantum computing"
//!
//! # Browse and replay past searches
//! research history list
//! research history show 1718000000000-k3j9x0a1b
//!
//! # Forget everything
//! research history clear --yes
//! ```

mod client;
mod commands;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::RelayClient;
use research_core::history::{FileStorage, HistoryStore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "research")]
#[command(about = "Run deep research queries and browse past results", long_about = None)]
struct Cli {
    /// Relay base URL
    #[arg(long, env = "RESEARCH_RELAY_URL", default_value = "http://127.0.0.1:5000")]
    relay_url: String,

    /// Directory holding the search history
    #[arg(long, env = "RESEARCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a research query
    Search {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print HTML instead of markdown
        #[arg(long)]
        html: bool,
    },
    /// Inspect or clear the search history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List past searches, most recent first
    List,
    /// Show the stored results of a past search
    Show {
        /// Entry id as printed by `history list`
        id: String,
        /// Print HTML instead of markdown
        #[arg(long)]
        html: bool,
    },
    /// Delete the whole history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("deep-research"))
        .unwrap_or_else(|| PathBuf::from(".deep-research"))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let mut history = HistoryStore::open(FileStorage::new(&data_dir));

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Search { query, html } => {
            let client = RelayClient::new(cli.relay_url);
            commands::search(&client, &mut history, &query.join(" "), html, &mut out).await?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List => commands::list(&history, Utc::now(), &mut out)?,
            HistoryCommands::Show { id, html } => commands::show(&history, &id, html, &mut out)?,
            HistoryCommands::Clear { yes } => commands::clear(
                &mut history,
                |count| {
                    if yes {
                        return Ok(true);
                    }
                    confirm(&format!("Clear {} saved searches?", count))
                },
                &mut out,
            )?,
        },
    }

    Ok(())
}
