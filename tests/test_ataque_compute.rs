use terminal_arcade::ataque::compute::*;
use terminal_arcade::ataque::entities::*;
use terminal_arcade::ataque::save::{AtaqueSave, Position};
use terminal_arcade::config::Difficulty;
use terminal_arcade::geometry::Rect;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

const W: f32 = 60.0;
const H: f32 = 20.0;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Single-player Normal game on a 60×20 field with no enemies, so each test
/// places exactly the entities it needs.
fn make_state() -> AtaqueState {
    let mut s = new_game(Difficulty::Normal, false, W, H, &mut seeded_rng());
    s.enemies.clear();
    s
}

fn idle() -> TickInput {
    TickInput::default()
}

fn enemy_at(x: f32, y: f32) -> Enemy {
    Enemy { rect: Rect::new(x, y, ENEMY_SIZE.0, ENEMY_SIZE.1), speed: 3, kind: EnemyKind::Scout }
}

fn bullet_at(x: f32, y: f32) -> Bullet {
    Bullet { rect: Rect::new(x, y, BULLET_SIZE.0, BULLET_SIZE.1) }
}

fn item_at(x: f32, y: f32, kind: ItemKind) -> Item {
    Item { rect: Rect::new(x, y, ITEM_SIZE.0, ITEM_SIZE.1), speed: 7, kind }
}

fn boss_at(x: f32, hp: f32) -> Boss {
    Boss { rect: Rect::new(x, 0.0, BOSS_SIZE.0, BOSS_SIZE.1), hp, next_move_threshold: BOSS_FIRST_MOVE }
}

/// Enemy sitting on top of player 1.
fn ramming_enemy(s: &AtaqueState) -> Enemy {
    let ship = s.players[0].rect;
    enemy_at(ship.x, ship.y)
}

// ── new_game ──────────────────────────────────────────────────────────────────

#[test]
fn new_game_uses_difficulty_table() {
    let mut rng = seeded_rng();
    let easy = new_game(Difficulty::Easy, false, W, H, &mut rng);
    assert_eq!(easy.lives, 20);
    assert_eq!(easy.enemies.len(), 3);

    let hard = new_game(Difficulty::Hard, false, W, H, &mut rng);
    assert_eq!(hard.lives, 5);
    assert_eq!(hard.enemies.len(), 10);
    assert!(hard.enemies.iter().all(|e| (4..=8).contains(&e.speed)));
}

#[test]
fn new_game_starts_fresh() {
    let s = new_game(Difficulty::Normal, false, W, H, &mut seeded_rng());
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.score, 0);
    assert_eq!(s.phase, 0);
    assert_eq!(s.items_collected, 0);
    assert!(s.boss.is_none());
    assert_eq!(s.next_item_score, None);
    assert_eq!(s.next_shield_score, SHIELD_INTERVAL);
    assert!(s.enemies.iter().all(|e| e.rect.bottom() <= 0.0));
    assert!(s.enemies.iter().all(|e| e.kind == EnemyKind::Scout));
}

#[test]
fn single_player_starts_bottom_centre() {
    let s = make_state();
    assert_eq!(s.players.len(), 1);
    let p = &s.players[0];
    assert_eq!(p.controls, Controls::Both);
    assert_eq!(p.fire_cooldown, 0);
    assert_eq!(p.rect.center(), (30.0, 17.5));
}

#[test]
fn multiplayer_places_two_ships() {
    let s = new_game(Difficulty::Normal, true, W, H, &mut seeded_rng());
    assert_eq!(s.players.len(), 2);
    assert_eq!(s.players[0].rect.center(), (20.0, 17.5));
    assert_eq!(s.players[1].rect.center(), (40.0, 17.5));
    assert_eq!(s.players[0].controls, Controls::Arrows);
    assert_eq!(s.players[1].controls, Controls::Wasd);
    assert!(s.players.iter().all(|p| p.fire_cooldown == FIRE_COOLDOWN));
}

// ── Difficulty scaling ────────────────────────────────────────────────────────

#[test]
fn phase_scaling_adds_enemies_and_speed() {
    let band = Difficulty::Normal.config().scale_for_phase(2);
    assert_eq!(band.enemies, 10);
    assert_eq!((band.speed_min, band.speed_max), (5, 8));
    assert_eq!(band.lives, 10);
}

#[test]
fn enemy_kinds_follow_phase() {
    assert_eq!(EnemyKind::for_phase(0), &[EnemyKind::Scout]);
    assert_eq!(EnemyKind::for_phase(1), &[EnemyKind::Raider]);
    assert_eq!(EnemyKind::for_phase(4), &[EnemyKind::Brute, EnemyKind::Stinger]);
}

// ── Phase rules ───────────────────────────────────────────────────────────────

#[test]
fn phase_goals() {
    assert_eq!(phase_target(0), 100);
    assert_eq!(phase_target(1), 250);
    assert_eq!(phase_target(2), 350);
    assert_eq!(phase_target(7), 350);
    assert_eq!(required_items(0), 0);
    assert_eq!(required_items(1), 3);
    assert!(!boss_required(1));
    assert!(boss_required(2));
}

#[test]
fn phase_victory_needs_score() {
    let mut s = make_state();
    s.score = 99;
    assert!(!has_phase_victory(&s));
    s.score = 100;
    assert!(has_phase_victory(&s));
}

#[test]
fn phase_victory_needs_items_after_first_phase() {
    let mut s = make_state();
    s.phase = 1;
    s.score = 250;
    s.items_collected = 2;
    assert!(!has_phase_victory(&s));
    s.items_collected = 3;
    assert!(has_phase_victory(&s));
}

#[test]
fn phase_victory_needs_boss_from_phase_three() {
    let mut s = make_state();
    s.phase = 2;
    s.score = 400;
    s.items_collected = 3;
    assert!(!has_phase_victory(&s));
    s.boss_defeated = true;
    assert!(has_phase_victory(&s));
}

#[test]
fn tick_enters_phase_victory() {
    let mut s = make_state();
    s.score = 100;
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.status, GameStatus::PhaseVictory);
    assert_eq!(s2.phase_victory_timer, PHASE_VICTORY_FRAMES);
    assert!(s2.events.contains(&GameEvent::PhaseCleared));
}

#[test]
fn phase_victory_counts_down_then_advances() {
    let mut s = make_state();
    s.score = 100;
    s.status = GameStatus::PhaseVictory;
    s.phase_victory_timer = 2;
    let mut rng = seeded_rng();

    let s2 = tick(&s, &idle(), &mut rng);
    assert_eq!(s2.status, GameStatus::PhaseVictory);
    assert_eq!(s2.phase_victory_timer, 1);
    assert_eq!(s2.phase, 0);

    let s3 = tick(&s2, &idle(), &mut rng);
    assert_eq!(s3.status, GameStatus::Playing);
    assert_eq!(s3.phase, 1);
    assert!(s3.events.contains(&GameEvent::PhaseStarted));
}

// ── advance_phase ─────────────────────────────────────────────────────────────

#[test]
fn advance_phase_resets_goals_and_entities() {
    let mut s = make_state();
    s.score = 105;
    s.items_collected = 2;
    s.bullets.push(bullet_at(5.0, 5.0));
    s.items.push(item_at(5.0, 5.0, ItemKind::Star));
    s.players[0].rect.x = 0.0;
    s.players[0].fire_cooldown = 3;

    let s2 = advance_phase(&s, &mut seeded_rng());
    assert_eq!(s2.phase, 1);
    assert_eq!(s2.items_collected, 0);
    assert!(s2.bullets.is_empty());
    assert!(s2.items.is_empty());
    assert!(s2.boss.is_none());
    assert_eq!(s2.enemies.len(), 8);
    assert!(s2.enemies.iter().all(|e| e.kind == EnemyKind::Raider));
    assert!(s2.enemies.iter().all(|e| (4..=7).contains(&e.speed)));
    assert_eq!(s2.next_item_score, Some(120));
    assert_eq!(s2.next_shield_score, 132);
    assert_eq!(s2.players[0].rect.center(), (30.0, 17.5));
    assert_eq!(s2.players[0].fire_cooldown, 0);
    assert_eq!(s2.score, 105);
}

#[test]
fn advance_phase_recentres_both_players() {
    let mut s = new_game(Difficulty::Easy, true, W, H, &mut seeded_rng());
    s.players[0].rect.x = 0.0;
    s.players[1].rect.x = 50.0;
    let s2 = advance_phase(&s, &mut seeded_rng());
    assert_eq!(s2.players[0].rect.center(), (20.0, 17.5));
    assert_eq!(s2.players[1].rect.center(), (40.0, 17.5));
}

// ── Helpers ───────────────────────────────────────────────────────────────────

#[test]
fn next_multiple_is_strictly_above() {
    assert_eq!(next_multiple_above(0, 20), 20);
    assert_eq!(next_multiple_above(19, 20), 20);
    assert_eq!(next_multiple_above(20, 20), 40);
    assert_eq!(next_multiple_above(100, 33), 132);
}

#[test]
fn collision_penalty_tiers() {
    assert_eq!(collision_penalty(0), 0);
    assert_eq!(collision_penalty(1), 0);
    assert_eq!(collision_penalty(30), 28);
    assert_eq!(collision_penalty(49), 47);
    assert_eq!(collision_penalty(50), 45);
    assert_eq!(collision_penalty(200), 195);
}

#[test]
fn boss_mood_thresholds() {
    assert_eq!(boss_mood(100.0), BossMood::Sleep);
    assert_eq!(boss_mood(90.1), BossMood::Sleep);
    assert_eq!(boss_mood(90.0), BossMood::Normal);
    assert_eq!(boss_mood(50.1), BossMood::Normal);
    assert_eq!(boss_mood(50.0), BossMood::Rage);
    assert_eq!(boss_mood(0.0), BossMood::Rage);
}

// ── Movement and fire ─────────────────────────────────────────────────────────

#[test]
fn held_keys_move_player() {
    let s = make_state();
    let mut input = idle();
    input.players[0] = PlayerInput { left: true, up: true, ..PlayerInput::default() };
    let s2 = tick(&s, &input, &mut seeded_rng());
    let p = &s2.players[0];
    assert_eq!(p.rect.x, 26.5 - PLAYER_SPEED_X);
    assert_eq!(p.rect.y, 16.0 - PLAYER_SPEED_Y);
    assert!(p.thrusting);
}

#[test]
fn player_stays_inside_field() {
    let mut s = make_state();
    s.players[0].rect.x = 0.2;
    s.players[0].rect.y = 17.0;
    let mut input = idle();
    input.players[0] = PlayerInput { left: true, down: true, ..PlayerInput::default() };
    let s2 = tick(&s, &input, &mut seeded_rng());
    assert_eq!(s2.players[0].rect.x, 0.0);
    assert_eq!(s2.players[0].rect.bottom(), H);
}

#[test]
fn pointer_moves_first_player() {
    let s = make_state();
    let input = TickInput { pointer: Some((10.0, 8.0)), ..idle() };
    let s2 = tick(&s, &input, &mut seeded_rng());
    assert_eq!(s2.players[0].rect.center(), (10.0, 8.0));

    let corner = TickInput { pointer: Some((-5.0, -5.0)), ..idle() };
    let s3 = tick(&s, &corner, &mut seeded_rng());
    assert_eq!((s3.players[0].rect.x, s3.players[0].rect.y), (0.0, 0.0));
}

#[test]
fn fire_respects_cooldown() {
    let mut s = make_state();
    let mut input = idle();
    input.players[0].fire = true;
    let mut rng = seeded_rng();
    let mut shots = Vec::new();
    for _ in 0..(FIRE_COOLDOWN + 1) {
        s = tick(&s, &input, &mut rng);
        shots.push(s.events.iter().filter(|e| **e == GameEvent::Shot).count());
    }
    // fires on the first frame, then again once the cooldown has run out
    assert_eq!(shots[0], 1);
    assert!(shots[1..FIRE_COOLDOWN as usize].iter().all(|&n| n == 0));
    assert_eq!(shots[FIRE_COOLDOWN as usize], 1);
    assert_eq!(s.bullets.len(), 2);
}

#[test]
fn bullet_spawns_above_ship_centre() {
    let s = make_state();
    let mut input = idle();
    input.players[0].fire = true;
    let s2 = tick(&s, &input, &mut seeded_rng());
    let b = &s2.bullets[0];
    assert_relative_eq!(b.rect.center().0, 30.0);
    assert!(b.rect.bottom() <= s2.players[0].rect.top());
}

#[test]
fn multiplayer_fires_automatically() {
    let mut s = new_game(Difficulty::Normal, true, W, H, &mut seeded_rng());
    s.enemies.clear();
    let mut rng = seeded_rng();
    for _ in 0..FIRE_COOLDOWN {
        s = tick(&s, &idle(), &mut rng);
    }
    assert_eq!(s.bullets.len(), 2);
    assert_eq!(s.events.iter().filter(|e| **e == GameEvent::Shot).count(), 2);
}

// ── Entities advance ──────────────────────────────────────────────────────────

#[test]
fn enemy_past_bottom_respawns_above() {
    let mut s = make_state();
    s.enemies.push(enemy_at(5.0, H));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
    assert!(s2.enemies[0].rect.bottom() <= 0.0);
}

#[test]
fn items_and_bullets_leave_the_field() {
    let mut s = make_state();
    s.items.push(item_at(5.0, H, ItemKind::Star));
    s.bullets.push(bullet_at(5.0, -0.5));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert!(s2.items.is_empty());
    assert!(s2.bullets.is_empty());
}

#[test]
fn explosions_age_out() {
    let mut s = make_state();
    s.explosions.push(Explosion { center: (5.0, 5.0), kind: EnemyKind::Scout, age: EXPLOSION_FRAMES - 2 });
    let mut rng = seeded_rng();
    let s2 = tick(&s, &idle(), &mut rng);
    assert_eq!(s2.explosions.len(), 1);
    let s3 = tick(&s2, &idle(), &mut rng);
    assert!(s3.explosions.is_empty());
}

// ── Collisions ────────────────────────────────────────────────────────────────

#[test]
fn ramming_costs_life_and_score() {
    let mut s = make_state();
    s.score = 60;
    s.enemies.push(ramming_enemy(&s));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.lives, s.lives - 1);
    assert_eq!(s2.score, 55);
    assert!(s2.events.contains(&GameEvent::PlayerHit));
    assert!(s2.enemies[0].rect.bottom() <= 0.0);
    assert!((3..=6).contains(&s2.enemies[0].speed));
}

#[test]
fn shield_blocks_damage() {
    let mut s = make_state();
    s.score = 60;
    s.invulnerable = 10;
    s.enemies.push(ramming_enemy(&s));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.lives, s.lives);
    assert_eq!(s2.score, 60);
    assert!(!s2.events.contains(&GameEvent::PlayerHit));
    assert!(s2.enemies[0].rect.bottom() <= 0.0);
}

#[test]
fn last_life_ends_game() {
    let mut s = make_state();
    s.lives = 1;
    s.enemies.push(ramming_enemy(&s));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.lives, 0);
    assert_eq!(s2.status, GameStatus::GameOver);
    assert!(s2.events.contains(&GameEvent::GameOver));

    // frozen afterwards
    let s3 = tick(&s2, &idle(), &mut seeded_rng());
    assert_eq!(s3.status, GameStatus::GameOver);
    assert!(s3.events.is_empty());
}

#[test]
fn bullet_destroys_enemy() {
    let mut s = make_state();
    s.enemies.push(enemy_at(10.0, 5.0));
    s.bullets.push(bullet_at(12.0, 7.0));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.score, 1);
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.explosions.len(), 1);
    assert_eq!(s2.explosions[0].kind, EnemyKind::Scout);
    // a replacement keeps the count
    assert_eq!(s2.enemies.len(), 1);
    assert!(s2.enemies[0].rect.bottom() <= 0.0);
    assert!(s2.events.contains(&GameEvent::EnemyDestroyed));
}

// ── Boss ──────────────────────────────────────────────────────────────────────

fn boss_phase() -> AtaqueState {
    let mut s = make_state();
    s.phase = 2;
    s.score = 350;
    s.items_collected = 3;
    s
}

#[test]
fn boss_spawns_when_goals_met() {
    let s = boss_phase();
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    let boss = s2.boss.as_ref().map(|b| (b.hp, b.rect.x, b.rect.y));
    assert_eq!(boss, Some((BOSS_START_HP, 19.0, 0.0)));
    assert!(s2.events.contains(&GameEvent::BossSpawned));
    assert_eq!(s2.status, GameStatus::Playing);
}

#[test]
fn boss_not_spawned_before_phase_three() {
    let mut s = boss_phase();
    s.phase = 1;
    s.score = 200;
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert!(s2.boss.is_none());
}

#[test]
fn bullets_damage_boss() {
    let mut s = boss_phase();
    s.boss = Some(boss_at(19.0, BOSS_START_HP));
    s.bullets.push(bullet_at(25.0, 3.0));
    s.bullets.push(bullet_at(30.0, 3.0));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    let boss = s2.boss.clone().expect("boss still up");
    assert_relative_eq!(boss.hp, 100.0 - 2.0 * BOSS_DAMAGE, epsilon = 1e-4);
    assert_eq!(boss.next_move_threshold, BOSS_FIRST_MOVE);
    assert!(s2.bullets.is_empty());
}

#[test]
fn boss_teleports_at_each_threshold() {
    let mut s = boss_phase();
    s.boss = Some(boss_at(19.0, 90.1));
    s.bullets.push(bullet_at(25.0, 3.0));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    let boss = s2.boss.clone().expect("boss still up");
    assert_eq!(boss.next_move_threshold, BOSS_FIRST_MOVE - BOSS_MOVE_STEP);
    assert!(boss.rect.x >= 0.0 && boss.rect.right() <= W);
    assert!(boss.rect.y >= 0.0 && boss.rect.y <= H / 4.0);
}

#[test]
fn defeating_boss_is_victory() {
    let mut s = boss_phase();
    s.boss = Some(boss_at(19.0, 0.2));
    s.bullets.push(bullet_at(25.0, 3.0));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.status, GameStatus::Victory);
    assert!(s2.boss_defeated);
    assert_eq!(s2.score, 350 + BOSS_REWARD);
    assert!(s2.events.contains(&GameEvent::BossDefeated));
}

#[test]
fn forbidden_range_pads_boss_span() {
    let boss = boss_at(19.0, 100.0);
    assert_eq!(boss_forbidden_range(Some(&boss), W, ENEMY_SIZE.0), Some((16, 43)));
    assert_eq!(boss_forbidden_range(None, W, ENEMY_SIZE.0), None);
}

#[test]
fn spawns_avoid_boss_column() {
    let boss = boss_at(19.0, 100.0);
    let mut rng = seeded_rng();
    for _ in 0..500 {
        let x = rand_x_avoiding_boss(Some(&boss), W, ENEMY_SIZE.0, &mut rng);
        assert!(x >= 0.0 && x + ENEMY_SIZE.0 <= W);
        assert!(x + ENEMY_SIZE.0 <= 16.0 || x >= 44.0, "x = {x}");
    }
}

#[test]
fn spawn_falls_back_when_boss_fills_field() {
    let boss = Boss { rect: Rect::new(0.0, 0.0, W, 6.0), hp: 100.0, next_move_threshold: 90.0 };
    let x = rand_x_avoiding_boss(Some(&boss), W, ENEMY_SIZE.0, &mut seeded_rng());
    assert!(x >= 0.0 && x + ENEMY_SIZE.0 <= W);
}

// ── Items ─────────────────────────────────────────────────────────────────────

#[test]
fn star_pickup_counts() {
    let mut s = make_state();
    s.phase = 1;
    let ship = s.players[0].rect;
    s.items.push(item_at(ship.x + 2.0, ship.y, ItemKind::Star));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.items_collected, 1);
    assert!(s2.items.iter().all(|i| i.kind != ItemKind::Star));
    assert!(s2.events.contains(&GameEvent::StarCollected));
}

#[test]
fn shield_pickup_starts_invulnerability() {
    let mut s = make_state();
    let ship = s.players[0].rect;
    s.items.push(item_at(ship.x + 2.0, ship.y, ItemKind::Shield));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.invulnerable, SHIELD_DURATION);
    assert_eq!(s2.shield.as_ref().map(|a| a.owner), Some(0));
    assert!(s2.events.contains(&GameEvent::ShieldCollected));
}

#[test]
fn shield_aura_spins_then_expires() {
    let mut s = make_state();
    s.invulnerable = 5;
    s.shield = Some(ShieldAura { owner: 0, angle: 0.0 });
    let mut rng = seeded_rng();
    let s2 = tick(&s, &idle(), &mut rng);
    assert!(s2.shield.as_ref().is_some_and(|a| a.angle > 0.0));

    let mut s3 = s2;
    for _ in 0..4 {
        s3 = tick(&s3, &idle(), &mut rng);
    }
    assert_eq!(s3.invulnerable, 0);
    assert!(s3.shield.is_none());
}

#[test]
fn item_schedule_spawns_star_and_shield() {
    let mut s = make_state();
    s.phase = 1;
    s.score = 40;
    s.next_item_score = Some(40);
    s.next_shield_score = 33;
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.items.iter().filter(|i| i.kind == ItemKind::Star).count(), 1);
    assert_eq!(s2.items.iter().filter(|i| i.kind == ItemKind::Shield).count(), 1);
    assert_eq!(s2.next_item_score, Some(60));
    assert_eq!(s2.next_shield_score, 66);
    assert!(s2.items.iter().all(|i| i.rect.bottom() <= 0.0));
}

#[test]
fn schedule_never_stacks_falling_stars() {
    let mut s = make_state();
    s.phase = 1;
    s.score = 40;
    s.next_item_score = Some(40);
    s.items.push(item_at(1.0, 1.0, ItemKind::Star));
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert_eq!(s2.items.iter().filter(|i| i.kind == ItemKind::Star).count(), 1);
    assert_eq!(s2.next_item_score, Some(60));
}

#[test]
fn first_phase_has_no_stars() {
    let mut s = make_state();
    s.score = 40;
    s.next_shield_score = 1_000;
    let s2 = tick(&s, &idle(), &mut seeded_rng());
    assert!(s2.items.is_empty());
    assert_eq!(s2.next_item_score, None);
}

// ── Pause ─────────────────────────────────────────────────────────────────────

#[test]
fn pause_freezes_until_resumed() {
    let mut s = make_state();
    s.enemies.push(enemy_at(5.0, 5.0));
    let paused = pause(&s);
    assert_eq!(paused.status, GameStatus::Paused);
    let still = tick(&paused, &idle(), &mut seeded_rng());
    assert_eq!(still.enemies, paused.enemies);
    assert_eq!(resume(&still).status, GameStatus::Playing);
}

#[test]
fn pause_ignored_when_not_playing() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    assert_eq!(pause(&s).status, GameStatus::GameOver);
    assert_eq!(resume(&s).status, GameStatus::GameOver);
}

// ── Save records ──────────────────────────────────────────────────────────────

#[test]
fn load_game_restores_progress() {
    let record = AtaqueSave {
        difficulty: Difficulty::Hard,
        score: 270,
        lives: 4,
        phase: 1,
        player: Some(Position { x: 12.0, y: 10.0 }),
        items_collected: 2,
        boss_defeated: false,
        ..AtaqueSave::default()
    };
    let s = load_game(&record, W, H, &mut seeded_rng());
    assert_eq!(s.difficulty, Difficulty::Hard);
    assert_eq!((s.score, s.lives, s.phase, s.items_collected), (270, 4, 1, 2));
    assert!(!s.multiplayer);
    assert_eq!(s.players[0].rect.center(), (12.0, 10.0));
    assert_eq!(s.enemies.len(), 12);
    assert!(s.boss.is_none());
    assert_eq!(s.next_item_score, Some(280));
    assert_eq!(s.next_shield_score, 297);
}

#[test]
fn load_game_clamps_player() {
    let record = AtaqueSave { player: Some(Position { x: 500.0, y: 500.0 }), ..AtaqueSave::default() };
    let s = load_game(&record, W, H, &mut seeded_rng());
    assert_eq!(s.players[0].rect.right(), W);
    assert_eq!(s.players[0].rect.bottom(), H);
}

#[test]
fn save_record_round_trips_progress() {
    let mut s = make_state();
    s.score = 123;
    s.lives = 7;
    s.phase = 2;
    s.items_collected = 1;
    s.players[0].rect.set_center(15.0, 9.5);

    let record = to_save_record(&s);
    assert_eq!(record.player, Some(Position { x: 15.0, y: 9.5 }));
    let back = load_game(&record, W, H, &mut seeded_rng());
    assert_eq!((back.score, back.lives, back.phase, back.items_collected), (123, 7, 2, 1));
    assert_eq!(back.players[0].rect.center(), (15.0, 9.5));
    assert_eq!(back.difficulty, Difficulty::Normal);
}
