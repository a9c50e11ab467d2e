//! Enigma CLI - run a Judge/Detective interrogation between two models
//!
//! # Usage
//!
//! ```bash
//! # Gemini judges, a local llama3 investigates
//! enigma play --judge-model gemini-pro --detective-model llama3
//!
//! # Unattended run with a move limit
//! enigma play --no-pause --max-moves 30
//!
//! # Show configured providers
//! enigma info
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod presenter;

use commands::{info, play};

/// Enigma - two language models, one mystery
///
/// A Judge model holds a hidden story and answers yes/no questions.
/// A Detective model asks them until it can name the solution.
#[derive(Parser)]
#[command(
    name = "enigma",
    version,
    about = "Enigma - Judge/Detective interrogation between language models",
    long_about = "Enigma pits two language models against a lateral-thinking puzzle.\n\n\
                  The Judge knows the story; the Detective asks yes/no questions\n\
                  and wins by proposing the solution with the SOLUCIÓN: keyword."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game
    #[command(name = "play")]
    Play(play::PlayArgs),

    /// Show provider configuration
    #[command(name = "info")]
    Info(info::InfoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup tracing based on verbosity
    setup_logging(cli.verbose);

    // Execute command
    match cli.command {
        Commands::Play(args) => play::run(args, cli.verbose).await,
        Commands::Info(args) => info::run(args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
