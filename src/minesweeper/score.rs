//! Best-score bookkeeping across consecutive minefields.

use crate::save::{SaveManager, ScoreRecord};

use super::Minesweeper;

/// Negative running scores are saved as zero.
pub fn final_score(state: &Minesweeper) -> u32 {
    state.score.max(0) as u32
}

/// Saves each minefield's score once, whether it exploded, was cleared,
/// restarted or quit.
pub struct ScoreKeeper<'a> {
    saves: &'a SaveManager<ScoreRecord>,
    best: u32,
    recorded: bool,
}

impl<'a> ScoreKeeper<'a> {
    pub fn new(saves: &'a SaveManager<ScoreRecord>) -> Self {
        ScoreKeeper { saves, best: saves.highscore(), recorded: false }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Save `state` unless this field was already recorded. Returns the best score.
    pub fn record(&mut self, state: &Minesweeper) -> u32 {
        if !self.recorded {
            self.best = self.saves.save(ScoreRecord { score: final_score(state), highscore: self.best });
            self.recorded = true;
        }
        self.best
    }

    /// Start bookkeeping for a fresh field.
    pub fn next_field(&mut self) {
        self.recorded = false;
    }
}
