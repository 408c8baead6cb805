use boggle_types::{Board, Path, Position};

/// Words outside these bounds are never searched; they classify as not
/// in the grid.
pub const MIN_WORD_LENGTH: usize = 3;
pub const MAX_WORD_LENGTH: usize = 20;

const DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Trace `word` on the board as a simple path of 8-adjacent cells, no cell
/// used twice, tile letters concatenating to exactly the word. Digraph
/// tiles ("QU") consume two letters. Returns the first path found; `None`
/// when the word cannot be traced, which is a normal outcome.
///
/// Existence is deterministic for a given board and word; the concrete
/// path is merely one example, used for UI highlighting.
pub fn find_path(board: &Board, word: &str) -> Option<Path> {
    let letters: Vec<char> = word.chars().collect();
    if letters.len() < MIN_WORD_LENGTH || letters.len() > MAX_WORD_LENGTH {
        return None;
    }

    let mut visited = vec![vec![false; board.cols]; board.rows];
    let mut path = Vec::new();
    for start in board.positions() {
        if extend(board, &letters, start, 0, &mut visited, &mut path) {
            return Some(path);
        }
    }
    None
}

/// Depth-first extension: claim `pos` if its tile matches the next letters
/// of the word, then branch to unvisited neighbors. Prunes on the prefix
/// mismatch before any recursion, which keeps 6x6 boards and 20-letter
/// words tractable.
fn extend(
    board: &Board,
    letters: &[char],
    pos: Position,
    consumed: usize,
    visited: &mut Vec<Vec<bool>>,
    path: &mut Path,
) -> bool {
    let tile = board.tile(pos);
    let tile_len = tile.chars().count();
    if consumed + tile_len > letters.len() {
        return false;
    }
    if !tile
        .chars()
        .eq(letters[consumed..consumed + tile_len].iter().copied())
    {
        return false;
    }

    visited[pos.row][pos.col] = true;
    path.push(pos);
    let consumed = consumed + tile_len;

    if consumed == letters.len() {
        return true;
    }

    for (dr, dc) in DIRECTIONS {
        let row = pos.row as i64 + dr;
        let col = pos.col as i64 + dc;
        if row < 0 || col < 0 {
            continue;
        }
        let next = Position::new(row as usize, col as usize);
        if board.contains(next)
            && !visited[next.row][next.col]
            && extend(board, letters, next, consumed, visited, path)
        {
            return true;
        }
    }

    visited[pos.row][pos.col] = false;
    path.pop();
    false
}
