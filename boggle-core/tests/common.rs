use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use boggle_core::{DiceConfig, Dictionary, Session, SessionConfig};
use boggle_types::Board;

/// Builds a board from rows of space-separated tiles.
pub fn board_from_rows(rows: &[&str]) -> Board {
    Board::new(
        rows.iter()
            .map(|row| row.split_whitespace().map(str::to_string).collect())
            .collect(),
    )
}

/// A dictionary with a known set of words.
pub fn test_dictionary() -> Arc<Dictionary> {
    let word_list = "tale\nlate\nteal\nrole\nroles\nrope\nalto\nlore\noral\nstole";
    Arc::new(Dictionary::from_word_list(word_list))
}

/// Single-faced dice so every rolled board is all A tiles regardless of
/// seed or shuffle order.
pub fn flat_dice() -> Arc<DiceConfig> {
    Arc::new(DiceConfig {
        name: "flat".to_string(),
        dice: vec![vec!["A".to_string()]; 16],
    })
}

pub fn create_session(dictionary: Option<Arc<Dictionary>>) -> (Session, DateTime<Utc>) {
    let now = Utc::now();
    let session = Session::new(
        SessionConfig::default(),
        flat_dice(),
        dictionary.map(|dict| ("test".to_string(), dict)),
        now,
    );
    (session, now)
}

pub fn no_approvals() -> HashSet<String> {
    HashSet::new()
}

pub fn submission(player_id: Uuid, words: &[&str]) -> (Uuid, Vec<String>) {
    (player_id, words.iter().map(|w| w.to_string()).collect())
}
