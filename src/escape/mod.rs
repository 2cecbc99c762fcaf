pub mod compute;
pub mod display;

pub use compute::{EscapeInput, EscapeState, Status};
