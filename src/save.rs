//! JSON save files: one flat object per game, written wholesale.
//!
//! Loading never aborts a game. A missing file is "no save", and a malformed
//! one is logged and treated the same way.

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A record that carries a score and the best score seen so far.
pub trait SaveRecord: Serialize + DeserializeOwned {
    fn score(&self) -> u32;
    fn highscore(&self) -> u32;
    fn set_highscore(&mut self, highscore: u32);
}

/// Record used by games that only remember their best score.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub highscore: u32,
}

impl SaveRecord for ScoreRecord {
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

pub struct SaveManager<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: SaveRecord> SaveManager<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SaveManager { path: path.into(), _record: PhantomData }
    }

    /// `Ok(None)` when no save file exists yet.
    pub fn try_load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Like [`try_load`](Self::try_load) but errors are logged and become `None`.
    pub fn load(&self) -> Option<T> {
        match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not load save file");
                None
            }
        }
    }

    pub fn highscore(&self) -> u32 {
        self.load().map(|r| r.highscore()).unwrap_or(0)
    }

    /// Write the record with its highscore raised to at least its score and
    /// return the resulting highscore. On failure the previous highscore is
    /// returned and the error is logged.
    pub fn save(&self, mut record: T) -> u32 {
        let highscore = self.highscore().max(record.score()).max(record.highscore());
        record.set_highscore(highscore);
        match self.write(&record) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), highscore, "game saved");
                highscore
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "could not write save file");
                self.highscore()
            }
        }
    }

    /// Temp file + rename so a crash never leaves a half-written save.
    fn write(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(record)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
