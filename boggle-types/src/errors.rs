use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Protocol-level rejections. These are returned synchronously with a
/// descriptive reason and never leave session state half-updated.
/// Validation non-findings (word not in dictionary, not on the board) are
/// not errors; they surface as flags on the scored words.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("wrong round {submitted}, currently round {current}")]
    WrongRound { submitted: u32, current: u32 },
    #[error("round not started")]
    RoundNotStarted,
    #[error("round already ended")]
    RoundOver,
    #[error("you can only submit once per round")]
    AlreadySubmitted,
    #[error("cannot advance round without players")]
    CannotAdvanceWithoutPlayers,
    #[error("round cannot be advanced mid-scoring")]
    ScoringInProgress,
    #[error("countdown must be between 0 and {max} seconds")]
    InvalidCountdown { max: i64 },
    #[error("no scored round {round_no} to approve words in")]
    NoSuchRound { round_no: u32 },
    #[error("session has ended")]
    SessionEnded,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("bad token")]
    BadToken,
    #[error("the dictionary {name} is not available")]
    UnknownDictionary { name: String },
}

impl GameError {
    /// HTTP status the server maps this rejection to.
    pub fn status_code(&self) -> u16 {
        match self {
            GameError::BadToken => 403,
            GameError::UnknownDictionary { .. } => 404,
            GameError::SessionEnded | GameError::UnknownPlayer => 410,
            _ => 409,
        }
    }
}
