/// Pure minesweeper rules.
///
/// Every public function takes the current `Minesweeper` and returns a new
/// one, like the space games' compute modules.

use rand::Rng;

use super::grid::Grid;

pub const GRID_SIZE: usize = 20;
pub const BOMB_COUNT: usize = 10;
pub const BOMB_MARK_REWARD: i32 = 50;
pub const BOMB_MARK_PENALTY: i32 = -20;
pub const REVEAL_REWARD: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Exploded,
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Minesweeper {
    pub grid: Grid,
    pub score: i32,
    pub status: Status,
    /// Keyboard cursor as `(row, col)`.
    pub cursor: (usize, usize),
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_game(rng: &mut impl Rng) -> Minesweeper {
    from_grid(Grid::random(GRID_SIZE, BOMB_COUNT, rng))
}

pub fn from_grid(grid: Grid) -> Minesweeper {
    let centre = grid.size / 2;
    Minesweeper { grid, score: 0, status: Status::Playing, cursor: (centre, centre) }
}

// ── Moves ────────────────────────────────────────────────────────────────────

/// Reveal a cell. A mine ends the game and uncovers every mine; anything
/// else flood-fills through zero-count cells, scoring each newly revealed
/// cell once. Flagged and already revealed cells are never touched.
pub fn reveal(state: &Minesweeper, row: usize, col: usize) -> Minesweeper {
    if state.status != Status::Playing {
        return state.clone();
    }
    let Some(cell) = state.grid.get(row, col) else {
        return state.clone();
    };
    if cell.flagged || cell.revealed {
        return state.clone();
    }

    let mut next = state.clone();
    if cell.mine {
        for r in 0..next.grid.size {
            for c in 0..next.grid.size {
                if let Some(cell) = next.grid.get_mut(r, c) {
                    if cell.mine {
                        cell.revealed = true;
                    }
                }
            }
        }
        next.status = Status::Exploded;
        tracing::info!(row, col, score = next.score, "stepped on a mine");
        return next;
    }

    let mut stack = vec![(row, col)];
    while let Some((r, c)) = stack.pop() {
        let Some(cell) = next.grid.get_mut(r, c) else { continue };
        if cell.revealed || cell.flagged || cell.mine {
            continue;
        }
        cell.revealed = true;
        next.score += REVEAL_REWARD;
        if cell.adjacent == 0 {
            stack.extend(next.grid.neighbors(r, c));
        }
    }

    if is_cleared(&next.grid) {
        next.status = Status::Cleared;
        tracing::info!(score = next.score, "field cleared");
    }
    next
}

/// Place or remove a flag. Flagging a mine earns the reward, flagging a safe
/// cell costs the penalty; removing the flag undoes exactly that delta.
pub fn toggle_flag(state: &Minesweeper, row: usize, col: usize) -> Minesweeper {
    if state.status != Status::Playing {
        return state.clone();
    }
    let mut next = state.clone();
    let Some(cell) = next.grid.get_mut(row, col) else {
        return next;
    };
    if cell.revealed {
        return next;
    }
    let delta = if cell.mine { BOMB_MARK_REWARD } else { BOMB_MARK_PENALTY };
    cell.flagged = !cell.flagged;
    next.score += if cell.flagged { delta } else { -delta };
    next
}

pub fn move_cursor(state: &Minesweeper, d_row: i32, d_col: i32) -> Minesweeper {
    let last = state.grid.size.saturating_sub(1) as i32;
    let (row, col) = state.cursor;
    let row = (row as i32 + d_row).clamp(0, last) as usize;
    let col = (col as i32 + d_col).clamp(0, last) as usize;
    Minesweeper { cursor: (row, col), ..state.clone() }
}

fn is_cleared(grid: &Grid) -> bool {
    grid.cells().all(|c| c.mine || c.revealed)
}

// ── Sprite selection ─────────────────────────────────────────────────────────

/// Position in the glyph sheet for the cell at `(row, col)`.
pub fn sheet_position(state: &Minesweeper, row: usize, col: usize) -> (usize, usize) {
    const EMPTY: (usize, usize) = (0, 2);
    const CLOSED: (usize, usize) = (1, 2);
    const BOMB: (usize, usize) = (2, 2);
    const FLAG: (usize, usize) = (3, 2);

    let Some(cell) = state.grid.get(row, col) else {
        return CLOSED;
    };
    if cell.flagged {
        FLAG
    } else if cell.mine && cell.revealed {
        BOMB
    } else if cell.revealed && cell.adjacent == 0 {
        EMPTY
    } else if cell.revealed {
        let i = cell.adjacent as usize - 1;
        (i % 4, i / 4)
    } else {
        CLOSED
    }
}
