//! Console presentation of a running game

use async_trait::async_trait;
use colored::Colorize;
use enigma_core::Role;
use enigma_game::{GameOutcome, Presenter, TerminationReason, REJECTION_LINE};
use tokio::io::{AsyncBufReadExt, BufReader};

const PAUSE_PROMPT: &str = "[PULSA INTRO PARA CONTINUAR]";

/// Prints each utterance with a colored speaker label, optionally waiting for Enter
pub struct ConsolePresenter {
    judge_label: String,
    detective_label: String,
    pause: bool,
}

impl ConsolePresenter {
    pub fn new(judge_model: &str, detective_model: &str, pause: bool) -> Self {
        Self {
            judge_label: format!("IA 1 ({})", judge_model),
            detective_label: format!("IA 2 ({})", detective_model),
            pause,
        }
    }

    fn label(&self, speaker: Role) -> colored::ColoredString {
        match speaker {
            Role::Judge => self.judge_label.as_str().cyan().bold(),
            Role::Detective => self.detective_label.as_str().magenta().bold(),
        }
    }

    async fn wait_for_enter(&self) {
        if !self.pause {
            return;
        }
        println!("{}", PAUSE_PROMPT.dimmed());
        let mut line = String::new();
        if let Err(e) = BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            tracing::warn!(error = %e, "Could not read from stdin; continuing");
        }
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn present(&mut self, speaker: Role, text: &str) {
        println!("{}: {}", self.label(speaker), text);
        self.wait_for_enter().await;
    }

    async fn solution_rejected(&mut self) {
        println!("{}: {}", self.label(Role::Judge), REJECTION_LINE.red());
        self.wait_for_enter().await;
    }

    async fn finished(&mut self, outcome: &GameOutcome) {
        println!();
        match outcome.reason {
            TerminationReason::Solved => {
                println!("{}", "¡La IA Detective ha resuelto el misterio!".green().bold());
            }
            TerminationReason::ProtocolViolation => {
                println!(
                    "{}",
                    "¡La IA Juez ha terminado el juego inesperadamente!".yellow().bold()
                );
            }
            TerminationReason::MoveLimitReached => {
                println!(
                    "{}",
                    format!(
                        "Límite de {} movimientos alcanzado sin resolver el misterio.",
                        outcome.moves
                    )
                    .yellow()
                    .bold()
                );
            }
        }
    }
}
