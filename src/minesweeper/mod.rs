pub mod compute;
pub mod display;
pub mod grid;
pub mod score;

pub use compute::{Minesweeper, Status};
pub use grid::{Cell, Grid};
pub use score::ScoreKeeper;
