use std::fs;

use serde_json::json;
use tempfile::tempdir;

use terminal_arcade::ataque::save::{AtaqueSave, Position};
use terminal_arcade::audio::{Channel, SoundSettings};
use terminal_arcade::config::Difficulty;
use terminal_arcade::save::{SaveManager, ScoreRecord};
use terminal_arcade::GameError;

// ── SaveManager ───────────────────────────────────────────────────────────────

#[test]
fn missing_file_is_no_save() {
    let dir = tempdir().unwrap();
    let saves: SaveManager<ScoreRecord> = SaveManager::new(dir.path().join("none.json"));
    assert!(saves.try_load().unwrap().is_none());
    assert!(saves.load().is_none());
    assert_eq!(saves.highscore(), 0);
}

#[test]
fn save_raises_highscore_to_score() {
    let dir = tempdir().unwrap();
    let saves: SaveManager<ScoreRecord> = SaveManager::new(dir.path().join("escape.json"));
    let best = saves.save(ScoreRecord { score: 10, highscore: 0 });
    assert_eq!(best, 10);
    assert_eq!(saves.load(), Some(ScoreRecord { score: 10, highscore: 10 }));
}

#[test]
fn lower_score_keeps_previous_highscore() {
    let dir = tempdir().unwrap();
    let saves: SaveManager<ScoreRecord> = SaveManager::new(dir.path().join("escape.json"));
    saves.save(ScoreRecord { score: 40, highscore: 0 });
    let best = saves.save(ScoreRecord { score: 7, highscore: 0 });
    assert_eq!(best, 40);
    let record = saves.load().unwrap();
    assert_eq!(record.score, 7);
    assert_eq!(record.highscore, 40);
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("save.json");
    let saves: SaveManager<ScoreRecord> = SaveManager::new(&path);
    saves.save(ScoreRecord { score: 3, highscore: 0 });
    assert!(path.is_file());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn malformed_file_is_an_error_but_loads_as_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let saves: SaveManager<ScoreRecord> = SaveManager::new(&path);
    assert!(matches!(saves.try_load(), Err(GameError::Json(_))));
    assert!(saves.load().is_none());
    assert_eq!(saves.highscore(), 0);
}

#[test]
fn malformed_file_is_replaced_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[]").unwrap();
    let saves: SaveManager<ScoreRecord> = SaveManager::new(&path);
    assert_eq!(saves.save(ScoreRecord { score: 5, highscore: 0 }), 5);
    assert_eq!(saves.highscore(), 5);
}

// ── AtaqueSave ────────────────────────────────────────────────────────────────

fn sample_save() -> AtaqueSave {
    AtaqueSave {
        difficulty: Difficulty::Hard,
        score: 120,
        lives: 2,
        phase: 1,
        player: Some(Position { x: 12.5, y: 30.0 }),
        items_collected: 4,
        boss_defeated: false,
        ..AtaqueSave::default()
    }
}

#[test]
fn ataque_save_survives_disk() {
    let dir = tempdir().unwrap();
    let saves: SaveManager<AtaqueSave> = SaveManager::new(dir.path().join("ataque.json"));
    let best = saves.save(sample_save());
    assert_eq!(best, 120);

    let loaded = saves.load().unwrap();
    assert_eq!(loaded, AtaqueSave { highscore: 120, ..sample_save() });
}

#[test]
fn difficulty_is_stored_by_name() {
    let value = serde_json::to_value(sample_save()).unwrap();
    assert_eq!(value["difficulty"], json!("Hard"));
    assert_eq!(value["player"], json!({ "x": 12.5, "y": 30.0 }));
}

#[test]
fn missing_keys_take_defaults() {
    let loaded: AtaqueSave = serde_json::from_value(json!({ "score": 5 })).unwrap();
    assert_eq!(loaded.score, 5);
    assert_eq!(loaded.lives, 3);
    assert_eq!(loaded.phase, 0);
    assert_eq!(loaded.difficulty, Difficulty::Normal);
    assert!(loaded.player.is_none());
    assert!(loaded.volumes.is_none());
}

#[test]
fn sound_settings_round_trip_through_save() {
    let mut settings = SoundSettings::default();
    settings.step_volume(Channel::Music, 40);
    settings.toggle(Channel::Shoot);

    let record = sample_save().with_sound(&settings);
    let text = serde_json::to_string(&record).unwrap();
    let back: AtaqueSave = serde_json::from_str(&text).unwrap();

    let mut restored = SoundSettings::default();
    back.apply_sound(&mut restored);
    assert_eq!(restored, settings);
}

#[test]
fn percentage_volumes_are_accepted_and_bad_ones_skipped() {
    let record: AtaqueSave = serde_json::from_value(json!({
        "volumes": { "point": 50, "music": 0.8, "hit": 300, "bogus": 1 },
        "sound_enabled": { "shoot": false, "hit": "yes" }
    }))
    .unwrap();

    let mut settings = SoundSettings::default();
    record.apply_sound(&mut settings);
    assert_eq!(settings.percent(Channel::Point), 50);
    assert_eq!(settings.percent(Channel::Music), 80);
    assert_eq!(settings.percent(Channel::Hit), 30);
    assert!(!settings.enabled.shoot);
    assert!(settings.enabled.hit);
}
