// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Syndica - social platform synchronization and inbox automation.
//!
//! Binary entry point: loads configuration, then dispatches to the
//! subcommand implementations.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;
mod status;

/// Syndica - social platform synchronization and inbox automation.
#[derive(Parser, Debug)]
#[command(name = "syndica", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run all sync jobs on their configured cadences until interrupted.
    Serve,
    /// Run one named job once and exit.
    Run {
        /// One of: token-check, message-fetch, post-insights, account-insights.
        job: String,
    },
    /// Summarize the local database: accounts, inbox, snapshots.
    Status {
        /// Emit machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match syndica_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            syndica_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Run { job }) => serve::run_once(config, &job).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("syndica: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
