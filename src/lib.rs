pub mod assets;
pub mod ataque;
pub mod audio;
pub mod config;
pub mod error;
pub mod escape;
pub mod geometry;
pub mod logging;
pub mod minesweeper;
pub mod render;
pub mod save;
pub mod terminal;

pub use error::{GameError, Result};
