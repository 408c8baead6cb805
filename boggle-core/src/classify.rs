use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use boggle_types::{Board, Path};

use crate::dictionary::Dictionary;
use crate::pathfinder::find_path;

/// Canonical form used for every comparison: path lookup, dictionary
/// membership, duplicate detection, and manual approval.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One classified word instance. Flags only; scores are derived later by
/// the aggregator so that recomputation is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub path: Option<Path>,
    pub in_grid: bool,
    pub dictionary_valid: bool,
    pub duplicate: bool,
    pub manually_approved: bool,
}

/// Classify every submitted token of a round.
///
/// A word is `duplicate` when its normalized text appears in at least two
/// distinct players' submissions of this round; the grid path plays no
/// part in that. `dictionary_valid` is the oracle's verdict, forced true
/// by a manual approval or by the absence of a dictionary. Classification
/// is a pure function of its inputs: rerunning it with the same
/// submissions and the same dictionary state yields identical flags.
pub fn classify_round(
    board: &Board,
    submissions: &[(Uuid, Vec<String>)],
    dictionary: Option<&Dictionary>,
    approved: &HashSet<String>,
) -> Vec<(Uuid, Vec<WordRecord>)> {
    // count distinct submitters per normalized word
    let mut submitters: HashMap<String, HashSet<Uuid>> = HashMap::new();
    for (player_id, words) in submissions {
        for raw in words {
            submitters
                .entry(normalize_word(raw))
                .or_default()
                .insert(*player_id);
        }
    }

    submissions
        .iter()
        .map(|(player_id, words)| {
            let mut seen = HashSet::new();
            let records = words
                .iter()
                .map(|raw| normalize_word(raw))
                .filter(|word| seen.insert(word.clone()))
                .map(|word| {
                    let path = find_path(board, &word);
                    let in_grid = path.is_some();
                    let manually_approved = approved.contains(&word);
                    let dictionary_valid = manually_approved
                        || dictionary.is_none_or(|dict| dict.contains(&word));
                    let duplicate = submitters
                        .get(&word)
                        .is_some_and(|players| players.len() >= 2);
                    WordRecord {
                        word,
                        path,
                        in_grid,
                        dictionary_valid,
                        duplicate,
                        manually_approved,
                    }
                })
                .collect();
            (*player_id, records)
        })
        .collect()
}
