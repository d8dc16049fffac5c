//! CLI entry point for the portfolio rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rebalance_cli::config::Config;
use rebalance_cli::error::Error;
use rebalance_cli::execution::{self, RunOptions};
use rebalance_cli::index;

#[derive(Parser)]
#[command(name = "rebalance")]
#[command(about = "Portfolio rebalancing engine for locally-simulated brokerage accounts")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan and execute a rebalance toward the given index.
    Run {
        /// Path to an index file (.csv or .json)
        index: PathBuf,

        /// Show the plan without submitting orders
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt (for automation/cron)
        #[arg(long)]
        force: bool,
    },

    /// Show current holdings across every configured account
    Positions,

    /// Compare current holdings to an index without executing
    Status {
        /// Path to an index file (.csv or .json)
        index: PathBuf,
    },

    /// Re-run reconciliation against an index
    Reconcile {
        /// Path to an index file (.csv or .json)
        index: PathBuf,
    },
}

fn load_index_or_exit(path: &PathBuf) -> rebalance_core::IdealPortfolio {
    match index::load_index(path) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error loading index: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Run { index, dry_run, force } => {
            let ideal = load_index_or_exit(&index);
            let opts = RunOptions {
                dry_run,
                force,
                index_file: index.display().to_string(),
            };
            execution::run(&config, &ideal, &opts)
        }
        Command::Positions => execution::show_positions(&config),
        Command::Status { index } => {
            let ideal = load_index_or_exit(&index);
            execution::check_status(&config, &ideal)
        }
        Command::Reconcile { index } => {
            let ideal = load_index_or_exit(&index);
            execution::run_reconcile(&config, &ideal)
        }
    };

    if let Err(e) = result {
        match &e {
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
