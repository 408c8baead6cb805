use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::board::Board;
use crate::game::{RoundPhase, RoundScores, ScoringMode};
use crate::player::Player;

/// Keeps an explicit JSON `null` distinguishable from an absent field:
/// a present `null` deserializes to `Some(None)` while a missing field
/// falls back to the `default` of outer `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionRequest {
    /// Dictionary to validate against. Omitted: pick the only one available
    /// if unambiguous. Explicit `null`: play without a dictionary.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub dictionary: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_mode: Option<ScoringMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub mgmt_token: Uuid,
    pub join_token: Uuid,
    pub dictionary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinResponse {
    pub player_id: Uuid,
    pub player_token: Uuid,
    pub name: String,
}

/// Word submission for the round a player believes is current. A mismatched
/// round number is rejected so a stale client never lands words in the
/// wrong round.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitRequest {
    pub round_no: u32,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdvanceRequest {
    /// Seconds until the new round starts; server default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdvanceResponse {
    pub round_no: u32,
    pub round_start: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApproveWordsRequest {
    pub round_no: u32,
    pub words: Vec<String>,
}

/// Snapshot returned to every poll. Fields are revealed as the round
/// progresses: the board once `Playing`, scores once `Scored`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatePoll {
    pub status: RoundPhase,
    pub created: String,
    pub players: Vec<Player>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_no: Option<u32>,
    /// RFC 3339 timestamps; clients derive remaining time as deadline - now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<RoundScores>,
    /// Per-player totals summed over all scored rounds of the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_totals: Option<Vec<(Uuid, u32)>>,
}
