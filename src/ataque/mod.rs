pub mod compute;
pub mod display;
pub mod entities;
pub mod menu;
pub mod save;

pub use entities::{AtaqueState, GameEvent, GameStatus, TickInput};
pub use save::AtaqueSave;
