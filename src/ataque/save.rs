//! The Space Ataque save record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audio::SoundSettings;
use crate::config::Difficulty;
use crate::save::SaveRecord;

/// Player centre in field cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Flat record; every key is optional on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtaqueSave {
    pub difficulty: Difficulty,
    pub score: u32,
    pub lives: i32,
    pub phase: u32,
    pub player: Option<Position>,
    pub items_collected: u32,
    pub boss_defeated: bool,
    pub highscore: u32,
    /// Kept as raw JSON: old files may hold percentages instead of 0..1.
    pub volumes: Option<Value>,
    pub sound_enabled: Option<Value>,
}

impl Default for AtaqueSave {
    fn default() -> Self {
        AtaqueSave {
            difficulty: Difficulty::default(),
            score: 0,
            lives: 3,
            phase: 0,
            player: None,
            items_collected: 0,
            boss_defeated: false,
            highscore: 0,
            volumes: None,
            sound_enabled: None,
        }
    }
}

impl AtaqueSave {
    pub fn with_sound(mut self, settings: &SoundSettings) -> Self {
        self.volumes = serde_json::to_value(settings.volumes).ok();
        self.sound_enabled = serde_json::to_value(settings.enabled).ok();
        self
    }

    /// Apply the stored audio preferences on top of `settings`.
    pub fn apply_sound(&self, settings: &mut SoundSettings) {
        settings.merge_saved(self.volumes.as_ref(), self.sound_enabled.as_ref());
    }
}

impl SaveRecord for AtaqueSave {
    fn score(&self) -> u32 {
        self.score
    }

    fn highscore(&self) -> u32 {
        self.highscore
    }

    fn set_highscore(&mut self, highscore: u32) {
        self.highscore = highscore;
    }
}
