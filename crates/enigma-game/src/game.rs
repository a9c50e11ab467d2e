//! Turn-based game loop
//!
//! ```text
//! AwaitingDetectiveMove -> AwaitingJudgeReply -> AwaitingDetectiveMove
//!                                             \-> Terminated
//! ```
//!
//! Every call is awaited before the next one starts; the loop is the only
//! place that writes into an agent's transcript on behalf of the other agent.

use async_trait::async_trait;
use enigma_core::Role;
use serde::{Deserialize, Serialize};

use crate::detective::Detective;
use crate::error::GameError;
use crate::judge::Judge;
use crate::protocol::{is_solution_proposal, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Correct solution confirmed by the Judge
    Solved,
    /// Judge affirmed something that was not a solution proposal
    ProtocolViolation,
    /// Configured move limit reached
    MoveLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingDetectiveMove,
    AwaitingJudgeReply,
    Terminated(TerminationReason),
}

/// Progress of one game run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    phase: Phase,
    winner: Option<Role>,
    last_detective_move: Option<String>,
    moves: u32,
}

impl GameState {
    fn new() -> Self {
        Self {
            phase: Phase::AwaitingDetectiveMove,
            winner: None,
            last_detective_move: None,
            moves: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set only when the Detective solves the case
    pub fn winner(&self) -> Option<Role> {
        self.winner
    }

    pub fn last_detective_move(&self) -> Option<&str> {
        self.last_detective_move.as_deref()
    }

    /// Detective moves made so far
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        match self.phase {
            Phase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Stop after this many Detective moves
    pub max_moves: Option<u32>,
    /// Record the opening as the Judge's first utterance
    pub share_opening: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_moves: None,
            share_opening: true,
        }
    }
}

/// Final result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub reason: TerminationReason,
    pub winner: Option<Role>,
    pub moves: u32,
}

/// Receives each utterance as the game advances
#[async_trait]
pub trait Presenter: Send {
    /// Called after every transition with the speaking role and its text
    async fn present(&mut self, speaker: Role, text: &str);

    /// Called after the Judge turns down a solution
    async fn solution_rejected(&mut self) {}

    async fn finished(&mut self, _outcome: &GameOutcome) {}
}

/// Presenter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

#[async_trait]
impl Presenter for NullPresenter {
    async fn present(&mut self, _speaker: Role, _text: &str) {}
}

/// Drives a Judge and a Detective through one game
pub struct GameLoop<P: Presenter> {
    judge: Judge,
    detective: Detective,
    config: GameConfig,
    presenter: P,
    state: GameState,
    opened: bool,
}

impl<P: Presenter> GameLoop<P> {
    pub fn new(judge: Judge, detective: Detective, config: GameConfig, presenter: P) -> Self {
        Self {
            judge,
            detective,
            config,
            presenter,
            state: GameState::new(),
            opened: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn judge(&self) -> &Judge {
        &self.judge
    }

    pub fn detective(&self) -> &Detective {
        &self.detective
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Announce the opening. Runs once; later calls do nothing.
    pub async fn open(&mut self) {
        if self.opened {
            return;
        }
        self.opened = true;

        let opening = self.judge.opening().to_string();
        if self.config.share_opening {
            self.judge.agent_mut().record_own(&opening);
            self.detective.agent_mut().record_incoming(&opening);
        }
        self.presenter.present(Role::Judge, &opening).await;
        tracing::info!(share_opening = self.config.share_opening, "Opening announced");
    }

    /// Advance by one transition, announcing the opening first if needed
    pub async fn step(&mut self) -> Result<Phase, GameError> {
        self.open().await;
        match self.state.phase {
            Phase::AwaitingDetectiveMove => self.detective_turn().await?,
            Phase::AwaitingJudgeReply => self.judge_turn().await?,
            Phase::Terminated(_) => return Err(GameError::AlreadyTerminated),
        }
        Ok(self.state.phase)
    }

    /// Play until the game terminates or a call fails
    pub async fn run(&mut self) -> Result<GameOutcome, GameError> {
        loop {
            if let Phase::Terminated(reason) = self.step().await? {
                let outcome = GameOutcome {
                    reason,
                    winner: self.state.winner,
                    moves: self.state.moves,
                };
                self.presenter.finished(&outcome).await;
                self.judge.agent_mut().close().await;
                self.detective.agent_mut().close().await;
                return Ok(outcome);
            }
        }
    }

    async fn detective_turn(&mut self) -> Result<(), GameError> {
        if let Some(limit) = self.config.max_moves {
            if self.state.moves >= limit {
                self.terminate(TerminationReason::MoveLimitReached);
                return Ok(());
            }
        }

        let next = self.detective.next_move(self.judge.transcript()).await?;
        self.judge.agent_mut().record_incoming(&next);
        self.state.moves += 1;
        tracing::info!(
            moves = self.state.moves,
            solution = is_solution_proposal(&next),
            "Detective moved"
        );

        self.presenter.present(Role::Detective, &next).await;
        self.state.last_detective_move = Some(next);
        self.state.phase = Phase::AwaitingJudgeReply;
        Ok(())
    }

    async fn judge_turn(&mut self) -> Result<(), GameError> {
        let proposal = self
            .state
            .last_detective_move
            .clone()
            .ok_or(GameError::NoPendingMove)?;
        let is_solution = is_solution_proposal(&proposal);

        let (reply, verdict) = if is_solution {
            self.judge
                .verify(self.detective.transcript(), &proposal)
                .await?
        } else {
            let reply = self
                .judge
                .answer(self.detective.transcript(), &proposal)
                .await?;
            let verdict = Verdict::classify(&reply);
            (reply, verdict)
        };
        self.detective.agent_mut().record_incoming(&reply);
        self.presenter.present(Role::Judge, &reply).await;

        match (is_solution, verdict) {
            (true, Verdict::Correct) => {
                self.state.winner = Some(Role::Detective);
                self.terminate(TerminationReason::Solved);
            }
            (true, Verdict::Incorrect) => {
                self.presenter.solution_rejected().await;
                self.state.phase = Phase::AwaitingDetectiveMove;
            }
            (false, Verdict::Correct) => {
                tracing::warn!("Judge affirmed a move that was not a solution");
                self.terminate(TerminationReason::ProtocolViolation);
            }
            (false, Verdict::Incorrect) => {
                self.state.phase = Phase::AwaitingDetectiveMove;
            }
        }
        Ok(())
    }

    fn terminate(&mut self, reason: TerminationReason) {
        tracing::info!(
            reason = ?reason,
            winner = ?self.state.winner,
            moves = self.state.moves,
            "Game terminated"
        );
        self.state.phase = Phase::Terminated(reason);
    }
}
