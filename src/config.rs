//! Compile-time configuration shared by the games: frame timing, the
//! difficulty table and the on-disk locations for saves, logs and assets.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed tick of every game loop (≈30 FPS).
pub const FRAME: Duration = Duration::from_millis(33);
pub const FPS: u32 = 30;

/// Cells per frame travelled by one speed unit. Speeds in the games are
/// small integers ("speed units") scaled by this.
pub const SPEED_UNIT: f32 = 0.06;

/// Converts a duration in milliseconds to whole frames (rounded up).
pub const fn frames_from_ms(ms: u32) -> u32 {
    (ms * FPS).div_ceil(1000)
}

// ── Difficulty ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig { enemies: 3, speed_min: 2, speed_max: 4, lives: 20 },
            Difficulty::Normal => DifficultyConfig { enemies: 6, speed_min: 3, speed_max: 6, lives: 10 },
            Difficulty::Hard => DifficultyConfig { enemies: 10, speed_min: 4, speed_max: 8, lives: 5 },
        }
    }
}

/// Enemy count, speed band (in speed units) and starting lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyConfig {
    pub enemies: u32,
    pub speed_min: u32,
    pub speed_max: u32,
    pub lives: i32,
}

impl DifficultyConfig {
    /// Each phase adds two enemies and raises both speed bounds by one.
    pub fn scale_for_phase(&self, phase: u32) -> DifficultyConfig {
        DifficultyConfig {
            enemies: self.enemies + 2 * phase,
            speed_min: self.speed_min + phase,
            speed_max: self.speed_max + phase,
            lives: self.lives,
        }
    }
}

// ── Locations ─────────────────────────────────────────────────────────────────

/// `$HOME/.terminal_arcade`, or `./.terminal_arcade` when HOME is unset.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".terminal_arcade")
}

pub fn save_path(game: &str) -> PathBuf {
    data_dir().join(format!("{game}.json"))
}

pub fn log_path(game: &str) -> PathBuf {
    data_dir().join(format!("{game}.log"))
}

/// Asset root: `./assets` when run from a checkout, otherwise the directory
/// shipped next to the crate manifest.
pub fn asset_dir() -> PathBuf {
    let local = PathBuf::from("assets");
    if local.is_dir() {
        local
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
    }
}
