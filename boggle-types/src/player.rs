use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// A roster entry. Players join once and are never removed for the life of
/// the session; rejoining reuses the same identity via the player token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
}
