//! The mine field: cell data, mine placement and neighbour counts.

use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub mine: bool,
    /// Mines among the 8 neighbours (0 for mines themselves).
    pub adjacent: u8,
    pub revealed: bool,
    pub flagged: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub size: usize,
    cells: Vec<Cell>,
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Grid {
    /// Square grid with `bombs` mines on distinct random cells.
    pub fn random(size: usize, bombs: usize, rng: &mut impl Rng) -> Grid {
        let bombs = bombs.min(size * size);
        let mut grid = Grid { size, cells: vec![Cell::default(); size * size] };
        let mut placed = 0;
        while placed < bombs {
            let row = rng.gen_range(0..size);
            let col = rng.gen_range(0..size);
            let cell = &mut grid.cells[row * size + col];
            if !cell.mine {
                cell.mine = true;
                placed += 1;
            }
        }
        grid.count_adjacent();
        grid
    }

    /// Grid with mines exactly at the given `(row, col)` positions.
    pub fn with_mines(size: usize, mines: &[(usize, usize)]) -> Grid {
        let mut grid = Grid { size, cells: vec![Cell::default(); size * size] };
        for &(row, col) in mines {
            if row < size && col < size {
                grid.cells[row * size + col].mine = true;
            }
        }
        grid.count_adjacent();
        grid
    }

    fn count_adjacent(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.cells[row * self.size + col].mine {
                    continue;
                }
                let count = self.neighbors(row, col).filter(|&(r, c)| self.cells[r * self.size + c].mine).count();
                self.cells[row * self.size + col].adjacent = count as u8;
            }
        }
    }

    /// In-bounds neighbours of `(row, col)`.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let size = self.size as i32;
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let r = row as i32 + dr;
            let c = col as i32 + dc;
            (r >= 0 && r < size && c >= 0 && c < size).then_some((r as usize, c as usize))
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get_mut(row * self.size + col)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|c| c.mine).count()
    }
}
