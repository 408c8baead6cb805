use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single cell coordinate on the board, addressed as (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Two cells are adjacent when they differ by at most one in each
    /// coordinate and are not the same cell (8-directional).
    pub fn is_adjacent(&self, other: &Position) -> bool {
        let row_diff = (self.row as i64 - other.row as i64).abs();
        let col_diff = (self.col as i64 - other.col as i64).abs();
        row_diff <= 1 && col_diff <= 1 && (row_diff + col_diff > 0)
    }
}

/// An ordered trace of cells spelling out a word.
pub type Path = Vec<Position>;

/// The letter grid for one round. Each tile carries one or two uppercase
/// letters; a digraph tile such as "QU" matches two consecutive letters
/// of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub tiles: Vec<Vec<String>>,
}

impl Board {
    pub fn new(tiles: Vec<Vec<String>>) -> Self {
        let rows = tiles.len();
        let cols = tiles.first().map(|row| row.len()).unwrap_or(0);
        Self { rows, cols, tiles }
    }

    pub fn tile(&self, pos: Position) -> &str {
        &self.tiles[pos.row][pos.col]
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position { row, col }))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.tiles {
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
