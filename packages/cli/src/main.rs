mod commands;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, new, replay, CheckArgs, NewArgs, ReplayArgs};
use sitecraft_editor::EditorConfig;

/// Sitecraft CLI - create, check and edit site documents
#[derive(Parser, Debug)]
#[command(name = "sitecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a blank document with a single home page
    New(NewArgs),

    /// Load documents and verify their structural invariants
    Check(CheckArgs),

    /// Apply a JSON command script to a document through its history
    Replay(ReplayArgs),
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = EditorConfig::load(&cwd)?;

    match cli.command {
        Command::New(args) => new(args, &config),
        Command::Check(args) => check(args),
        Command::Replay(args) => replay(args, &config),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
