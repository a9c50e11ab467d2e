//! Info command - Show provider configuration
//!
//! Usage:
//! ```bash
//! enigma info
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use enigma_game::{AFFIRMATIVE_VERDICT, SOLUTION_KEYWORD};
use enigma_llm::{LlmConfig, ProviderKind};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs;

struct FamilyRow {
    name: &'static str,
    models: &'static str,
    kind: ProviderKind,
    credential: &'static str,
}

const FAMILIES: &[FamilyRow] = &[
    FamilyRow {
        name: "gemini",
        models: "gemini*",
        kind: ProviderKind::StatefulSession,
        credential: "GEMINI_API_KEY",
    },
    FamilyRow {
        name: "anthropic",
        models: "claude*",
        kind: ProviderKind::SingleTurn,
        credential: "ANTHROPIC_API_KEY",
    },
    FamilyRow {
        name: "ollama",
        models: "llama*, mistral*, qwen*, phi*, gemma*",
        kind: ProviderKind::StatelessReplay,
        credential: "OLLAMA_BASE_URL",
    },
    FamilyRow {
        name: "mock",
        models: "mock*",
        kind: ProviderKind::StatelessReplay,
        credential: "-",
    },
];

/// Run the info command
pub fn run(_args: InfoArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let config = LlmConfig::from_env().context("Invalid provider configuration")?;

    println!("{}", "Enigma - Judge/Detective interrogation".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version Information:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!();

    println!("{}", "Providers:".bold());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Family").fg(Color::Cyan),
            Cell::new("Models").fg(Color::Cyan),
            Cell::new("Kind").fg(Color::Cyan),
            Cell::new("Configured by").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
        ]);

    for family in FAMILIES {
        let status = if config.is_configured(family.name) {
            Cell::new("ready").fg(Color::Green)
        } else {
            Cell::new("missing key").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(family.name).fg(Color::Green),
            Cell::new(family.models),
            Cell::new(family.kind.as_str()).fg(Color::Yellow),
            Cell::new(family.credential),
            status,
        ]);
    }
    println!("{table}");
    println!(
        "  {} {}",
        "Ready:".dimmed(),
        config.available_providers().join(", ").green()
    );
    println!();

    println!("{}", "Configuration:".bold());
    println!("  {} {}", "Ollama URL:".dimmed(), config.ollama_url.green());
    println!(
        "  {} {}s",
        "Call timeout:".dimmed(),
        config.call_timeout_secs.to_string().green()
    );
    println!();

    println!("{}", "Protocol:".bold());
    println!("  {} {}", "Solution keyword:".dimmed(), SOLUTION_KEYWORD.green());
    println!("  {} {}", "Affirmative verdict:".dimmed(), AFFIRMATIVE_VERDICT.green());
    println!();

    Ok(())
}
