use std::collections::HashMap;

use uuid::Uuid;

use boggle_types::{Player, PlayerScore, RoundScores, ScoredWord, ScoringMode};

use crate::classify::WordRecord;

/// Monotonic step function from word length to base value, kept as an
/// ordered table of (minimum length, value) pairs. Lengths below the first
/// entry clamp to the first value, lengths above the last to the last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    entries: Vec<(u32, u32)>,
}

impl ScoreTable {
    pub fn new(mut entries: Vec<(u32, u32)>) -> Self {
        entries.sort_by_key(|&(len, _)| len);
        Self { entries }
    }

    /// The classic table: 1 point up to 4 letters, 2 for 5, 3 for 6,
    /// 5 for 7, 11 for 8 and beyond.
    pub fn standard() -> Self {
        Self::new(vec![(4, 1), (5, 2), (6, 3), (7, 5), (8, 11)])
    }

    pub fn value_for(&self, length: u32) -> u32 {
        let mut value = self.entries.first().map(|&(_, v)| v).unwrap_or(0);
        for &(min_len, v) in &self.entries {
            if length >= min_len {
                value = v;
            }
        }
        value
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn word_length(record: &WordRecord) -> u32 {
    record.word.chars().count() as u32
}

/// Counts toward the longest-word bonus: findable, dictionary-approved,
/// and not shared with another player.
fn is_bonus_eligible(record: &WordRecord) -> bool {
    record.dictionary_valid && record.in_grid && !record.duplicate
}

/// Convert a round's classified words into per-word scores and per-player
/// totals. Pure function of (classification, mode, table); recomputation
/// after a manual approval reruns this from scratch rather than patching
/// scores in place.
///
/// Strict mode: duplicates score zero; if exactly one player holds the
/// round-maximum valid word length, that player's words of that length
/// score double base value (a tie awards no bonus to anyone).
///
/// Mild mode: duplicates score base value, unique valid words double, and
/// the sole round-maximum holder's words of that length score triple. The
/// multipliers do not stack: the triple supersedes the unique doubling,
/// and duplicates never receive the round-maximum bonus.
pub fn score_round(
    round_no: u32,
    classified: &[(Player, Vec<WordRecord>)],
    mode: ScoringMode,
    table: &ScoreTable,
) -> RoundScores {
    // per-player maximum over bonus-eligible words, then the round maximum
    let player_max: HashMap<Uuid, u32> = classified
        .iter()
        .filter_map(|(player, words)| {
            words
                .iter()
                .filter(|record| is_bonus_eligible(record))
                .map(word_length)
                .max()
                .map(|len| (player.id, len))
        })
        .collect();
    let round_max = player_max.values().copied().max();
    let bonus_holder = round_max.and_then(|max| {
        let mut holders = player_max
            .iter()
            .filter(|&(_, &len)| len == max)
            .map(|(&id, _)| id);
        match (holders.next(), holders.next()) {
            (Some(sole), None) => Some(sole),
            _ => None,
        }
    });

    let players = classified
        .iter()
        .map(|(player, words)| {
            let scored: Vec<ScoredWord> = words
                .iter()
                .map(|record| {
                    let longest_bonus = is_bonus_eligible(record)
                        && bonus_holder == Some(player.id)
                        && Some(word_length(record)) == round_max;
                    let score = word_score(record, mode, table, longest_bonus);
                    ScoredWord {
                        word: record.word.clone(),
                        score,
                        dictionary_valid: record.dictionary_valid,
                        in_grid: record.in_grid,
                        duplicate: record.duplicate,
                        manually_approved: record.manually_approved,
                        longest_bonus,
                        path: record.path.clone(),
                    }
                })
                .collect();
            let round_total = scored.iter().map(|word| word.score).sum();
            PlayerScore {
                player: player.clone(),
                words: scored,
                round_total,
            }
        })
        .collect();

    RoundScores { round_no, players }
}

fn word_score(
    record: &WordRecord,
    mode: ScoringMode,
    table: &ScoreTable,
    longest_bonus: bool,
) -> u32 {
    if !record.dictionary_valid || !record.in_grid {
        return 0;
    }
    let base = table.value_for(word_length(record));
    match mode {
        ScoringMode::Strict => {
            if record.duplicate {
                0
            } else if longest_bonus {
                base * 2
            } else {
                base
            }
        }
        ScoringMode::Mild => {
            if record.duplicate {
                base
            } else if longest_bonus {
                base * 3
            } else {
                base * 2
            }
        }
    }
}
