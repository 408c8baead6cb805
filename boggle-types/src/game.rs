use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::board::Path;
use crate::player::Player;

/// Lifecycle phase of the current round, as seen by polling clients.
///
/// `Initial` and `Scored` are the only phases from which the manager may
/// start the next round; advancing from `PreStart` or `Playing` is an
/// interruption that abandons the round in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoundPhase {
    /// No round has been announced yet.
    Initial,
    /// A round is announced, waiting for the countdown to elapse.
    PreStart,
    /// The round timer is running and submissions are accepted.
    Playing,
    /// The deadline passed; classification and scoring are under way.
    Scoring,
    /// Scores are available.
    Scored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScoringMode {
    /// Duplicates score zero; the sole longest-word player doubles those words.
    Strict,
    /// Duplicates score base value, unique words double, longest triples.
    Mild,
}

/// One scored word instance, carrying the classification flags it was
/// scored from. The score is fully determined by the flags plus the
/// round-level aggregates, so recomputation always reproduces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoredWord {
    pub word: String,
    pub score: u32,
    pub dictionary_valid: bool,
    pub in_grid: bool,
    pub duplicate: bool,
    pub manually_approved: bool,
    pub longest_bonus: bool,
    /// Present iff `in_grid`; one example trace for UI highlighting.
    pub path: Option<Path>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerScore {
    pub player: Player,
    pub words: Vec<ScoredWord>,
    pub round_total: u32,
}

/// Complete scoring outcome for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundScores {
    pub round_no: u32,
    pub players: Vec<PlayerScore>,
}

impl RoundScores {
    pub fn total_for(&self, player_id: uuid::Uuid) -> u32 {
        self.players
            .iter()
            .find(|ps| ps.player.id == player_id)
            .map(|ps| ps.round_total)
            .unwrap_or(0)
    }
}
