//! Play command - run one game between two models
//!
//! Usage:
//! ```bash
//! enigma play --judge-model gemini-pro --detective-model llama3
//! enigma play --prompts-dir ./prompts --no-pause --max-moves 40
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use enigma_game::{Detective, GameConfig, GameLoop, Judge, Scenario};
use enigma_llm::{global_metrics, resolve_backend, GenerationParams, LlmConfig, ProviderAdapter};

use crate::presenter::ConsolePresenter;
use crate::{print_info, print_warning};

/// Answers are one or two words
const JUDGE_MAX_TOKENS: u32 = 100;
const DETECTIVE_MAX_TOKENS: u32 = 200;

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Model backing the Judge
    #[arg(long, env = "ENIGMA_JUDGE_MODEL", default_value = "gemini-pro")]
    judge_model: String,

    /// Model backing the Detective
    #[arg(long, env = "ENIGMA_DETECTIVE_MODEL", default_value = "llama3")]
    detective_model: String,

    /// Directory holding judge_prompt.md and detective_prompt.md
    #[arg(long, env = "ENIGMA_PROMPTS_DIR", default_value = "prompts", value_name = "DIR")]
    prompts_dir: PathBuf,

    /// Do not wait for Enter after each message
    #[arg(long)]
    no_pause: bool,

    /// Stop after this many Detective moves
    #[arg(long, value_name = "N")]
    max_moves: Option<u32>,

    /// Announce the opening without adding it to either transcript
    #[arg(long)]
    no_share_opening: bool,
}

/// Run the play command
pub async fn run(args: PlayArgs, verbosity: u8) -> Result<()> {
    let config = LlmConfig::from_env().context("Invalid provider configuration")?;

    let judge_prompt = read_prompt(&args.prompts_dir, "judge_prompt.md").await?;
    let detective_prompt = read_prompt(&args.prompts_dir, "detective_prompt.md").await?;
    let scenario = Scenario::from_judge_prompt(judge_prompt)
        .context("Judge prompt does not announce an opening")?;

    let judge_adapter = adapter_for(&args.judge_model, &config, JUDGE_MAX_TOKENS)?;
    let detective_adapter = adapter_for(&args.detective_model, &config, DETECTIVE_MAX_TOKENS)?;

    println!("{}", "🕵 Enigma".bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    print_info(&format!(
        "Juez: {} ({})",
        args.judge_model.green(),
        judge_adapter.kind()
    ));
    print_info(&format!(
        "Detective: {} ({})",
        args.detective_model.green(),
        detective_adapter.kind()
    ));
    println!();

    let game_config = GameConfig {
        max_moves: args.max_moves,
        share_opening: !args.no_share_opening,
    };
    let presenter = ConsolePresenter::new(&args.judge_model, &args.detective_model, !args.no_pause);
    let mut game = GameLoop::new(
        Judge::new(scenario, judge_adapter),
        Detective::new(detective_prompt, detective_adapter),
        game_config,
        presenter,
    );

    let outcome = game.run().await.context("Game aborted")?;
    tracing::info!(reason = ?outcome.reason, moves = outcome.moves, "Game finished");

    if outcome.winner.is_none() {
        print_warning(&format!("Sin ganador tras {} movimientos", outcome.moves));
    }
    if verbosity >= 1 {
        let snapshot = global_metrics().snapshot();
        println!();
        println!("{}", "Backend metrics:".bold());
        print!("{}", snapshot.to_prometheus());
    }

    Ok(())
}

async fn read_prompt(dir: &Path, file: &str) -> Result<String> {
    let path = dir.join(file);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read prompt file: {}", path.display()))
}

fn adapter_for(model: &str, config: &LlmConfig, max_tokens: u32) -> Result<ProviderAdapter> {
    let backend = resolve_backend(model, config, GenerationParams::with_max_tokens(max_tokens))
        .with_context(|| format!("Cannot use model {}", model))?;
    Ok(ProviderAdapter::for_backend(backend).with_timeout(config.call_timeout()))
}
