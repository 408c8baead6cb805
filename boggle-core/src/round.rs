use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use boggle_types::{Board, GameError, RoundPhase, RoundScores};

/// One player's word list for a round. At most one per (round, player);
/// a retry after a network blip is rejected rather than overwriting.
#[derive(Debug, Clone)]
pub struct Submission {
    pub player_id: Uuid,
    /// Normalized and deduplicated at acceptance time.
    pub words: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Mirrors the round's scoring tri-state: not yet triggered, computation
/// running (possibly on another task), or results installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringState {
    NotStarted,
    InProgress,
    Complete,
}

/// One timed grid-search game. The board is fully determined by the seed,
/// so it can be re-derived instead of trusted from a client. Immutable
/// once scored except through the manual-approval rescore, which replaces
/// the whole `scores` value.
#[derive(Debug, Clone)]
pub struct Round {
    pub round_no: u32,
    pub seed: u64,
    pub board: Board,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub scoring: ScoringState,
    pub submissions: HashMap<Uuid, Submission>,
    pub scores: Option<RoundScores>,
}

impl Round {
    pub fn new(
        round_no: u32,
        seed: u64,
        board: Board,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            round_no,
            seed,
            board,
            start,
            end: start + duration,
            scoring: ScoringState::NotStarted,
            submissions: HashMap::new(),
            scores: None,
        }
    }

    /// Lazily derived phase. Deadlines are wall-clock; nothing fires a
    /// timer, the phase simply reads differently once `now` passes them.
    /// `all_submitted` moves a round into scoring before its deadline.
    pub fn phase_at(&self, now: DateTime<Utc>, all_submitted: bool) -> RoundPhase {
        if now < self.start {
            return RoundPhase::PreStart;
        }
        match self.scoring {
            ScoringState::Complete => RoundPhase::Scored,
            ScoringState::InProgress => RoundPhase::Scoring,
            ScoringState::NotStarted => {
                if now < self.end && !all_submitted {
                    RoundPhase::Playing
                } else {
                    RoundPhase::Scoring
                }
            }
        }
    }

    /// Submission deadline: the round end plus a grace period covering
    /// client latency. Anything later is a hard reject.
    pub fn deadline(&self, grace: Duration) -> DateTime<Utc> {
        self.end + grace
    }

    pub fn accept_submission(
        &mut self,
        player_id: Uuid,
        submitted_round_no: u32,
        words: Vec<String>,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<(), GameError> {
        if submitted_round_no != self.round_no {
            return Err(GameError::WrongRound {
                submitted: submitted_round_no,
                current: self.round_no,
            });
        }
        if now < self.start {
            return Err(GameError::RoundNotStarted);
        }
        if self.scoring != ScoringState::NotStarted || now > self.deadline(grace) {
            return Err(GameError::RoundOver);
        }
        if self.submissions.contains_key(&player_id) {
            return Err(GameError::AlreadySubmitted);
        }
        self.submissions.insert(
            player_id,
            Submission {
                player_id,
                words,
                submitted_at: now,
            },
        );
        Ok(())
    }

    pub fn has_submitted(&self, player_id: Uuid) -> bool {
        self.submissions.contains_key(&player_id)
    }
}
