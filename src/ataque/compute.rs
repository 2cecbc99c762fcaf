/// Pure game-logic functions for Space Ataque.
///
/// Every public function takes an immutable reference to the current
/// `AtaqueState` (and, where needed, an RNG handle) and returns a brand-new
/// `AtaqueState`. Side effects are limited to the injected RNG; sounds are
/// requested through `state.events`.

use rand::seq::SliceRandom;
use rand::Rng;

use super::entities::{
    AtaqueState, Boss, BossMood, Bullet, Controls, Enemy, EnemyKind, Explosion, GameEvent,
    GameStatus, Item, ItemKind, Player, PlayerInput, ShieldAura, TickInput, BOSS_SIZE,
    BULLET_SIZE, ENEMY_SIZE, ITEM_SIZE, PLAYER_SIZE,
};
use super::save::{AtaqueSave, Position};
use crate::config::{frames_from_ms, Difficulty, DifficultyConfig, SPEED_UNIT};
use crate::geometry::Rect;

// ── Tuning ───────────────────────────────────────────────────────────────────

pub const FIRE_COOLDOWN: u32 = frames_from_ms(200);
pub const SHIELD_DURATION: u32 = frames_from_ms(5000);
pub const PHASE_VICTORY_FRAMES: u32 = frames_from_ms(2000);
pub const EXPLOSION_FRAMES: u32 = frames_from_ms(500);

/// Bullet rise speed in speed units.
pub const BULLET_SPEED: u32 = 12;
pub const PLAYER_SPEED_X: f32 = 1.0;
pub const PLAYER_SPEED_Y: f32 = 0.5;

pub const BOSS_START_HP: f32 = 100.0;
pub const BOSS_DAMAGE: f32 = 0.3;
pub const BOSS_FIRST_MOVE: f32 = 90.0;
pub const BOSS_MOVE_STEP: f32 = 10.0;
pub const BOSS_REWARD: u32 = 5;

pub const ITEM_INTERVAL: u32 = 20;
pub const SHIELD_INTERVAL: u32 = 33;

/// Aura rotation in degrees per frame (120°/s).
const AURA_SPIN: f32 = 4.0;

// ── Phase rules ──────────────────────────────────────────────────────────────

pub fn phase_target(phase: u32) -> u32 {
    match phase {
        0 => 100,
        1 => 250,
        _ => 350,
    }
}

pub fn required_items(phase: u32) -> u32 {
    if phase >= 1 {
        3
    } else {
        0
    }
}

pub fn boss_required(phase: u32) -> bool {
    phase >= 2
}

pub fn items_enabled(phase: u32) -> bool {
    phase >= 1
}

/// Fall speed of stars and shields in speed units.
pub fn item_speed(phase: u32) -> u32 {
    if phase == 1 {
        7
    } else {
        8
    }
}

pub fn has_phase_victory(state: &AtaqueState) -> bool {
    state.score >= phase_target(state.phase)
        && state.items_collected >= required_items(state.phase)
        && (!boss_required(state.phase) || state.boss_defeated)
}

/// Smallest multiple of `step` strictly greater than `value`.
pub fn next_multiple_above(value: u32, step: u32) -> u32 {
    (value / step + 1) * step
}

/// Score after an enemy rams a player.
pub fn collision_penalty(score: u32) -> u32 {
    match score {
        0 => 0,
        1..=49 => score.saturating_sub(2),
        _ => score.saturating_sub(5),
    }
}

pub fn boss_mood(hp: f32) -> BossMood {
    if hp <= 50.0 {
        BossMood::Rage
    } else if hp <= 90.0 {
        BossMood::Normal
    } else {
        BossMood::Sleep
    }
}

fn item_schedule(phase: u32, score: u32) -> Option<u32> {
    items_enabled(phase).then(|| next_multiple_above(score, ITEM_INTERVAL))
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Columns a sprite of width `sprite_w` must not start in while the boss is
/// up: the boss span padded by half the sprite width on each side.
pub fn boss_forbidden_range(boss: Option<&Boss>, width: f32, sprite_w: f32) -> Option<(i32, i32)> {
    let boss = boss?;
    let pad = (sprite_w / 2.0).floor() as i32;
    let left = (boss.rect.left().floor() as i32 - pad).max(0);
    let right = (boss.rect.right().ceil() as i32 + pad).min(width as i32 - 1);
    (left < right).then_some((left, right))
}

/// Random left edge for a falling sprite that keeps clear of the boss column
/// when possible.
pub fn rand_x_avoiding_boss(boss: Option<&Boss>, width: f32, sprite_w: f32, rng: &mut impl Rng) -> f32 {
    let x_max = (width - sprite_w).max(0.0) as i32;
    let Some((lx, rx)) = boss_forbidden_range(boss, width, sprite_w) else {
        return rng.gen_range(0..=x_max) as f32;
    };
    let left_end = (lx - sprite_w as i32).max(0);
    let right_start = (rx + 1).min(x_max);
    let mut intervals = Vec::with_capacity(2);
    if left_end > 0 {
        intervals.push((0, left_end));
    }
    if right_start < x_max {
        intervals.push((right_start, x_max));
    }
    match intervals.choose(rng) {
        Some(&(lo, hi)) => rng.gen_range(lo..=hi.max(lo)) as f32,
        None => rng.gen_range(0..=x_max) as f32,
    }
}

/// How far above the field a new sprite may start.
#[derive(Clone, Copy)]
enum SpawnDepth {
    /// Phase start: spread over most of a screen height.
    Initial,
    /// Replacement: just above the top edge.
    Respawn,
}

fn drop_height(depth: SpawnDepth, field_h: f32, sprite_h: f32, rng: &mut impl Rng) -> f32 {
    let spread = match depth {
        SpawnDepth::Initial => field_h * 5.0 / 6.0,
        SpawnDepth::Respawn => field_h / 6.0,
    };
    -sprite_h - rng.gen_range(0..=spread.max(1.0) as u32) as f32
}

fn new_enemy(state: &AtaqueState, band: &DifficultyConfig, depth: SpawnDepth, rng: &mut impl Rng) -> Enemy {
    let (w, h) = ENEMY_SIZE;
    let x = rand_x_avoiding_boss(state.boss.as_ref(), state.width, w, rng);
    let y = drop_height(depth, state.height, h, rng);
    let speed = rng.gen_range(band.speed_min..=band.speed_max);
    let kind = EnemyKind::for_phase(state.phase).choose(rng).copied().unwrap_or(EnemyKind::Scout);
    Enemy { rect: Rect::new(x, y, w, h), speed, kind }
}

fn respawn_enemy(enemy: &mut Enemy, boss: Option<&Boss>, width: f32, height: f32, rng: &mut impl Rng) {
    enemy.rect.x = rand_x_avoiding_boss(boss, width, enemy.rect.w, rng);
    enemy.rect.y = drop_height(SpawnDepth::Respawn, height, enemy.rect.h, rng);
}

fn spawn_enemies(state: &mut AtaqueState, rng: &mut impl Rng) {
    let band = state.difficulty.config().scale_for_phase(state.phase);
    for _ in 0..band.enemies {
        let enemy = new_enemy(state, &band, SpawnDepth::Initial, rng);
        state.enemies.push(enemy);
    }
}

fn new_item(state: &AtaqueState, kind: ItemKind, rng: &mut impl Rng) -> Item {
    let (w, h) = ITEM_SIZE;
    let max_x = (state.width - w).max(0.0) as u32;
    let x = rng.gen_range(0..=max_x) as f32;
    let lift = rng.gen_range(0..=(state.height / 3.0).max(1.0) as u32) as f32;
    Item { rect: Rect::new(x, -h - lift, w, h), speed: item_speed(state.phase), kind }
}

fn new_boss(width: f32) -> Boss {
    let (w, h) = BOSS_SIZE;
    Boss {
        rect: Rect::new(((width - w) / 2.0).max(0.0).floor(), 0.0, w, h),
        hp: BOSS_START_HP,
        next_move_threshold: BOSS_FIRST_MOVE,
    }
}

fn move_boss_random_top(boss: &mut Boss, width: f32, height: f32, rng: &mut impl Rng) {
    let max_x = (width - boss.rect.w).max(0.0) as u32;
    let max_y = (height / 4.0).max(0.0) as u32;
    boss.rect.x = rng.gen_range(0..=max_x) as f32;
    boss.rect.y = rng.gen_range(0..=max_y) as f32;
}

// ── Players ──────────────────────────────────────────────────────────────────

/// Starting centres: one ship at the bottom centre, or two at 1/3 and 2/3.
pub fn start_positions(width: f32, height: f32, multiplayer: bool) -> Vec<(f32, f32)> {
    let cy = height - PLAYER_SIZE.1 / 2.0 - 1.0;
    if multiplayer {
        vec![(width / 3.0, cy), (width * 2.0 / 3.0, cy)]
    } else {
        vec![(width / 2.0, cy)]
    }
}

fn start_players(width: f32, height: f32, multiplayer: bool) -> Vec<Player> {
    let controls: &[Controls] = if multiplayer { &[Controls::Arrows, Controls::Wasd] } else { &[Controls::Both] };
    let cooldown = if multiplayer { FIRE_COOLDOWN } else { 0 };
    start_positions(width, height, multiplayer)
        .into_iter()
        .zip(controls)
        .map(|((cx, cy), &controls)| {
            let mut rect = Rect::centered(cx, cy, PLAYER_SIZE.0, PLAYER_SIZE.1);
            rect.clamp_within(width, height);
            Player { rect, controls, thrusting: false, fire_cooldown: cooldown }
        })
        .collect()
}

fn move_player(player: &mut Player, keys: PlayerInput, width: f32, height: f32) {
    if keys.left {
        player.rect.x -= PLAYER_SPEED_X;
    }
    if keys.right {
        player.rect.x += PLAYER_SPEED_X;
    }
    player.thrusting = keys.up;
    if keys.up {
        player.rect.y -= PLAYER_SPEED_Y;
    }
    if keys.down {
        player.rect.y += PLAYER_SPEED_Y;
    }
    player.rect.clamp_within(width, height);
}

/// Centre the ship on a pointer position, kept fully inside the field.
pub fn move_to_position(player: &Player, x: f32, y: f32, width: f32, height: f32) -> Player {
    let mut rect = player.rect;
    rect.set_center(x, y);
    rect.clamp_within(width, height);
    Player { rect, ..player.clone() }
}

fn bullet_from(player: &Player) -> Bullet {
    let (cx, _) = player.rect.center();
    let (w, h) = BULLET_SIZE;
    Bullet { rect: Rect::new(cx - w / 2.0, player.rect.top() - h, w, h) }
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn base_state(difficulty: Difficulty, multiplayer: bool, width: f32, height: f32) -> AtaqueState {
    AtaqueState {
        status: GameStatus::Playing,
        difficulty,
        multiplayer,
        players: start_players(width, height, multiplayer),
        enemies: Vec::new(),
        bullets: Vec::new(),
        items: Vec::new(),
        explosions: Vec::new(),
        boss: None,
        boss_defeated: false,
        shield: None,
        score: 0,
        lives: difficulty.config().lives,
        phase: 0,
        items_collected: 0,
        next_item_score: item_schedule(0, 0),
        next_shield_score: next_multiple_above(0, SHIELD_INTERVAL),
        invulnerable: 0,
        phase_victory_timer: 0,
        width,
        height,
        frame: 0,
        events: Vec::new(),
    }
}

pub fn new_game(difficulty: Difficulty, multiplayer: bool, width: f32, height: f32, rng: &mut impl Rng) -> AtaqueState {
    let mut state = base_state(difficulty, multiplayer, width, height);
    spawn_enemies(&mut state, rng);
    tracing::info!(difficulty = difficulty.label(), multiplayer, "new game");
    state
}

/// Rebuild a single-player game from a save. A boss fight is never restored
/// mid-way; enemies are recreated for the saved phase.
pub fn load_game(record: &AtaqueSave, width: f32, height: f32, rng: &mut impl Rng) -> AtaqueState {
    let mut state = base_state(record.difficulty, false, width, height);
    state.score = record.score;
    state.lives = record.lives;
    state.phase = record.phase;
    state.items_collected = record.items_collected;
    state.boss_defeated = record.boss_defeated;
    state.next_item_score = item_schedule(record.phase, record.score);
    state.next_shield_score = next_multiple_above(record.score, SHIELD_INTERVAL);
    if let (Some(pos), Some(player)) = (record.player, state.players.first_mut()) {
        player.rect.set_center(pos.x, pos.y);
        player.rect.clamp_within(width, height);
    }
    spawn_enemies(&mut state, rng);
    tracing::info!(phase = state.phase, score = state.score, lives = state.lives, "loaded saved game");
    state
}

pub fn to_save_record(state: &AtaqueState) -> AtaqueSave {
    AtaqueSave {
        difficulty: state.difficulty,
        score: state.score,
        lives: state.lives,
        phase: state.phase,
        player: state.players.first().map(|p| {
            let (x, y) = p.rect.center();
            Position { x, y }
        }),
        items_collected: state.items_collected,
        boss_defeated: state.boss_defeated,
        ..AtaqueSave::default()
    }
}

// ── Status transitions ───────────────────────────────────────────────────────

pub fn pause(state: &AtaqueState) -> AtaqueState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    AtaqueState { status: GameStatus::Paused, events: Vec::new(), ..state.clone() }
}

pub fn resume(state: &AtaqueState) -> AtaqueState {
    if state.status != GameStatus::Paused {
        return state.clone();
    }
    AtaqueState { status: GameStatus::Playing, events: Vec::new(), ..state.clone() }
}

/// Next phase: goals, entities, schedules and cooldowns all start over and
/// the enemy band is rescaled.
pub fn advance_phase(state: &AtaqueState, rng: &mut impl Rng) -> AtaqueState {
    let mut next = state.clone();
    next.phase += 1;
    next.items_collected = 0;
    next.boss_defeated = false;
    next.boss = None;
    next.shield = None;
    next.enemies.clear();
    next.items.clear();
    next.bullets.clear();
    next.explosions.clear();
    next.next_item_score = item_schedule(next.phase, next.score);
    next.next_shield_score = next_multiple_above(next.score, SHIELD_INTERVAL);
    next.invulnerable = 0;
    next.phase_victory_timer = 0;

    let positions = start_positions(next.width, next.height, next.multiplayer);
    for (player, (cx, cy)) in next.players.iter_mut().zip(positions) {
        player.rect.set_center(cx, cy);
        player.rect.clamp_within(next.width, next.height);
        player.fire_cooldown = 0;
        player.thrusting = false;
    }

    spawn_enemies(&mut next, rng);
    next.status = GameStatus::Playing;
    next.events.push(GameEvent::PhaseStarted);
    tracing::info!(phase = next.phase + 1, enemies = next.enemies.len(), "phase started");
    next
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame. Only `Playing` and `PhaseVictory`
/// move; every other status is returned unchanged.
pub fn tick(state: &AtaqueState, input: &TickInput, rng: &mut impl Rng) -> AtaqueState {
    match state.status {
        GameStatus::Playing => play_frame(state, input, rng),
        GameStatus::PhaseVictory => {
            let remaining = state.phase_victory_timer.saturating_sub(1);
            if remaining == 0 {
                advance_phase(state, rng)
            } else {
                AtaqueState { phase_victory_timer: remaining, events: Vec::new(), ..state.clone() }
            }
        }
        _ => AtaqueState { events: Vec::new(), ..state.clone() },
    }
}

fn play_frame(state: &AtaqueState, input: &TickInput, rng: &mut impl Rng) -> AtaqueState {
    let mut next = state.clone();
    next.events.clear();
    next.frame += 1;
    let (width, height) = (next.width, next.height);
    let band = next.difficulty.config().scale_for_phase(next.phase);

    // ── 1. Move players ──────────────────────────────────────────────────────
    for (i, player) in next.players.iter_mut().enumerate() {
        let keys = input.players.get(i).copied().unwrap_or_default();
        move_player(player, keys, width, height);
    }
    if let (Some((px, py)), Some(first)) = (input.pointer, next.players.first_mut()) {
        *first = move_to_position(first, px, py, width, height);
    }

    // ── 2. Fire ──────────────────────────────────────────────────────────────
    let auto_fire = next.multiplayer;
    let mut shots = Vec::new();
    for (i, player) in next.players.iter_mut().enumerate() {
        player.fire_cooldown = player.fire_cooldown.saturating_sub(1);
        let wants = auto_fire || input.players.get(i).is_some_and(|k| k.fire);
        if wants && player.fire_cooldown == 0 {
            shots.push(bullet_from(player));
            player.fire_cooldown = FIRE_COOLDOWN;
        }
    }
    for bullet in shots {
        next.bullets.push(bullet);
        next.events.push(GameEvent::Shot);
    }

    // ── 3. Advance entities ──────────────────────────────────────────────────
    let boss = next.boss.clone();
    for enemy in next.enemies.iter_mut() {
        enemy.rect.y += enemy.speed as f32 * SPEED_UNIT;
        if enemy.rect.top() > height {
            respawn_enemy(enemy, boss.as_ref(), width, height, rng);
        }
    }
    for item in next.items.iter_mut() {
        item.rect.y += item.speed as f32 * SPEED_UNIT;
    }
    next.items.retain(|item| item.rect.top() <= height);
    for bullet in next.bullets.iter_mut() {
        bullet.rect.y -= BULLET_SPEED as f32 * SPEED_UNIT;
    }
    next.bullets.retain(|b| b.rect.bottom() >= 0.0);
    for explosion in next.explosions.iter_mut() {
        explosion.age += 1;
    }
    next.explosions.retain(|e| e.age < EXPLOSION_FRAMES);

    // ── 4. Boss arrival ──────────────────────────────────────────────────────
    if boss_required(next.phase)
        && next.boss.is_none()
        && !next.boss_defeated
        && next.score >= phase_target(next.phase)
        && next.items_collected >= required_items(next.phase)
    {
        next.boss = Some(new_boss(width));
        next.events.push(GameEvent::BossSpawned);
        tracing::info!(phase = next.phase + 1, "boss spawned");
    }

    // ── 5. Shield aura ───────────────────────────────────────────────────────
    next.invulnerable = next.invulnerable.saturating_sub(1);
    if next.invulnerable == 0 {
        next.shield = None;
    } else if let Some(aura) = next.shield.as_mut() {
        aura.angle = (aura.angle + AURA_SPIN) % 360.0;
    }

    // ── 6. Player–enemy collisions ───────────────────────────────────────────
    let invulnerable = next.invulnerable > 0;
    let boss = next.boss.clone();
    for pi in 0..next.players.len() {
        let ship = next.players[pi].rect;
        let mut rammed = false;
        for enemy in next.enemies.iter_mut() {
            if !enemy.rect.intersects(&ship) {
                continue;
            }
            rammed = true;
            if !invulnerable {
                next.lives -= 1;
                next.score = collision_penalty(next.score);
                next.events.push(GameEvent::PlayerHit);
            }
            respawn_enemy(enemy, boss.as_ref(), width, height, rng);
            enemy.speed = rng.gen_range(band.speed_min..=band.speed_max);
        }
        if rammed && next.lives <= 0 && !invulnerable {
            next.status = GameStatus::GameOver;
            next.events.push(GameEvent::GameOver);
            tracing::info!(score = next.score, phase = next.phase + 1, "game over");
            return next;
        }
    }

    // ── 7. Bullet–enemy collisions ───────────────────────────────────────────
    let mut destroyed = Vec::new();
    let mut surviving = Vec::with_capacity(next.bullets.len());
    for bullet in std::mem::take(&mut next.bullets) {
        let (hit, alive): (Vec<Enemy>, Vec<Enemy>) =
            std::mem::take(&mut next.enemies).into_iter().partition(|e| e.rect.intersects(&bullet.rect));
        next.enemies = alive;
        if hit.is_empty() {
            surviving.push(bullet);
        } else {
            destroyed.extend(hit);
        }
    }
    next.bullets = surviving;
    for enemy in destroyed {
        next.explosions.push(Explosion { center: enemy.rect.center(), kind: enemy.kind, age: 0 });
        next.score += 1;
        next.events.push(GameEvent::EnemyDestroyed);
        let replacement = new_enemy(&next, &band, SpawnDepth::Respawn, rng);
        next.enemies.push(replacement);
    }

    // ── 8. Bullet–boss collisions ────────────────────────────────────────────
    if let Some(mut boss) = next.boss.take() {
        let before = next.bullets.len();
        next.bullets.retain(|b| !b.rect.intersects(&boss.rect));
        let hits = before - next.bullets.len();
        if hits > 0 {
            boss.hp = (boss.hp - BOSS_DAMAGE * hits as f32).max(0.0);
            while boss.hp <= boss.next_move_threshold {
                move_boss_random_top(&mut boss, width, height, rng);
                boss.next_move_threshold -= BOSS_MOVE_STEP;
                if boss.next_move_threshold < 0.0 {
                    break;
                }
            }
            if boss.hp <= 0.0 {
                next.boss_defeated = true;
                next.score += BOSS_REWARD;
                next.status = GameStatus::Victory;
                next.events.push(GameEvent::BossDefeated);
                tracing::info!(score = next.score, "boss defeated");
                return next;
            }
        }
        next.boss = Some(boss);
    }

    // ── 9. Pickups ───────────────────────────────────────────────────────────
    for pi in 0..next.players.len() {
        let ship = next.players[pi].rect;
        let (taken, falling): (Vec<Item>, Vec<Item>) =
            std::mem::take(&mut next.items).into_iter().partition(|it| it.rect.intersects(&ship));
        next.items = falling;
        for item in taken {
            match item.kind {
                ItemKind::Star => {
                    next.items_collected += 1;
                    next.events.push(GameEvent::StarCollected);
                }
                ItemKind::Shield => {
                    next.invulnerable = SHIELD_DURATION;
                    next.shield = Some(ShieldAura { owner: pi, angle: 0.0 });
                    next.events.push(GameEvent::ShieldCollected);
                }
            }
        }
    }

    // ── 10. Spawn schedules ──────────────────────────────────────────────────
    let score = next.score;
    if items_enabled(next.phase) {
        let due = *next.next_item_score.get_or_insert_with(|| next_multiple_above(score, ITEM_INTERVAL));
        if score >= due {
            if !next.items.iter().any(|i| i.kind == ItemKind::Star) {
                let star = new_item(&next, ItemKind::Star, rng);
                next.items.push(star);
            }
            next.next_item_score = Some(due + ITEM_INTERVAL);
        }
    }
    if score >= next.next_shield_score {
        if !next.items.iter().any(|i| i.kind == ItemKind::Shield) {
            let shield = new_item(&next, ItemKind::Shield, rng);
            next.items.push(shield);
        }
        next.next_shield_score += SHIELD_INTERVAL;
    }

    // ── 11. Phase victory ────────────────────────────────────────────────────
    if has_phase_victory(&next) {
        next.status = GameStatus::PhaseVictory;
        next.phase_victory_timer = PHASE_VICTORY_FRAMES;
        next.events.push(GameEvent::PhaseCleared);
        tracing::info!(phase = next.phase + 1, score = next.score, "phase cleared");
    }

    next
}
