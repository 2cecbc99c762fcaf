//! All Space Ataque entity types. Pure data, no logic.

use crate::config::Difficulty;
use crate::geometry::Rect;

// ── Sizes (cells) ────────────────────────────────────────────────────────────

pub const PLAYER_SIZE: (f32, f32) = (7.0, 3.0);
pub const ENEMY_SIZE: (f32, f32) = (7.0, 3.0);
pub const ITEM_SIZE: (f32, f32) = (3.0, 2.0);
pub const BULLET_SIZE: (f32, f32) = (1.0, 1.0);
pub const BOSS_SIZE: (f32, f32) = (21.0, 6.0);

// ── Status ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Paused,
    PhaseVictory,
    GameOver,
    Victory,
}

// ── Players ──────────────────────────────────────────────────────────────────

/// Which keys steer a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Controls {
    /// Single player: arrows and WASD both work.
    Both,
    Arrows,
    Wasd,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    pub controls: Controls,
    /// Moving up this frame; drawn with the thrust sprite.
    pub thrusting: bool,
    /// Frames until the next shot is allowed.
    pub fire_cooldown: u32,
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Enemy look. Phase 1 and 2 have one kind each; later phases mix two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Scout,
    Raider,
    Brute,
    Stinger,
}

impl EnemyKind {
    pub fn for_phase(phase: u32) -> &'static [EnemyKind] {
        match phase {
            0 => &[EnemyKind::Scout],
            1 => &[EnemyKind::Raider],
            _ => &[EnemyKind::Brute, EnemyKind::Stinger],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    /// Fall speed in speed units.
    pub speed: u32,
    pub kind: EnemyKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub rect: Rect,
}

// ── Pickups ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// Counts toward the phase's item goal.
    Star,
    /// Grants temporary invulnerability.
    Shield,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub rect: Rect,
    pub speed: u32,
    pub kind: ItemKind,
}

/// Orbiting particles drawn around the shielded player.
#[derive(Clone, Debug, PartialEq)]
pub struct ShieldAura {
    /// Index into `players`.
    pub owner: usize,
    /// Rotation in degrees.
    pub angle: f32,
}

// ── Boss ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossMood {
    Sleep,
    Normal,
    Rage,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub rect: Rect,
    /// Health in percent, 100 down to 0.
    pub hp: f32,
    /// The boss teleports when `hp` drops to this value.
    pub next_move_threshold: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub center: (f32, f32),
    pub kind: EnemyKind,
    /// Frames since spawn.
    pub age: u32,
}

// ── Events ───────────────────────────────────────────────────────────────────

/// Things that happened during a tick. The binary turns them into sounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Shot,
    EnemyDestroyed,
    PlayerHit,
    StarCollected,
    ShieldCollected,
    BossSpawned,
    BossDefeated,
    PhaseCleared,
    PhaseStarted,
    GameOver,
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Held directions and fire for one player during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    pub players: [PlayerInput; 2],
    /// Latest mouse position in field coordinates; moves player 1.
    pub pointer: Option<(f32, f32)>,
}

// ── Game state ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct AtaqueState {
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub multiplayer: bool,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub items: Vec<Item>,
    pub explosions: Vec<Explosion>,
    pub boss: Option<Boss>,
    pub boss_defeated: bool,
    pub shield: Option<ShieldAura>,
    pub score: u32,
    pub lives: i32,
    /// 0-based; shown to the player as `phase + 1`.
    pub phase: u32,
    pub items_collected: u32,
    pub next_item_score: Option<u32>,
    pub next_shield_score: u32,
    /// Frames of invulnerability left.
    pub invulnerable: u32,
    /// Frames left on the phase-victory screen.
    pub phase_victory_timer: u32,
    pub width: f32,
    pub height: f32,
    pub frame: u64,
    pub events: Vec<GameEvent>,
}
