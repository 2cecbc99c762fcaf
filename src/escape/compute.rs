/// Space Escape rules: dodge the falling meteors.
///
/// Same shape as the other compute modules: functions take the current
/// state and return the next one, with randomness injected.

use rand::Rng;

use crate::config::SPEED_UNIT;
use crate::geometry::Rect;

pub const PLAYER_SIZE: (f32, f32) = (6.0, 2.0);
pub const METEOR_SIZE: (f32, f32) = (3.0, 2.0);
pub const METEOR_COUNT: usize = 5;
pub const START_LIVES: i32 = 3;
/// Horizontal cells per frame while a direction is held.
pub const PLAYER_SPEED: f32 = 1.5;
/// Fall speed in speed units.
pub const METEOR_SPEED: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Meteor {
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EscapeState {
    pub player: Rect,
    pub meteors: Vec<Meteor>,
    pub score: u32,
    pub lives: i32,
    pub status: Status,
    pub width: f32,
    pub height: f32,
    pub frame: u64,
}

/// Held keys for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapeInput {
    pub left: bool,
    pub right: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn init_state(width: f32, height: f32, rng: &mut impl Rng) -> EscapeState {
    let (pw, ph) = PLAYER_SIZE;
    let player = Rect::new((width - pw) / 2.0, height - ph - 1.0, pw, ph);
    let meteors = (0..METEOR_COUNT)
        .map(|_| Meteor { rect: spawn_rect(width, height * 5.0 / 6.0, rng) })
        .collect();
    EscapeState {
        player,
        meteors,
        score: 0,
        lives: START_LIVES,
        status: Status::Playing,
        width,
        height,
        frame: 0,
    }
}

/// A meteor rect above the field, at most `spread` rows higher than the
/// minimum offset.
fn spawn_rect(width: f32, spread: f32, rng: &mut impl Rng) -> Rect {
    let (mw, mh) = METEOR_SIZE;
    let max_x = (width - mw).max(0.0) as u32;
    let x = rng.gen_range(0..=max_x) as f32;
    let lift = rng.gen_range(0..=spread.max(1.0) as u32) as f32;
    Rect::new(x, -mh - lift, mw, mh)
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

pub fn tick(state: &EscapeState, input: EscapeInput, rng: &mut impl Rng) -> EscapeState {
    if state.status != Status::Playing {
        return state.clone();
    }
    let mut next = state.clone();
    next.frame += 1;

    if input.left {
        next.player.x -= PLAYER_SPEED;
    }
    if input.right {
        next.player.x += PLAYER_SPEED;
    }
    next.player.clamp_within(next.width, next.height);

    let fall = METEOR_SPEED as f32 * SPEED_UNIT;
    let respawn_spread = next.height / 6.0;
    for i in 0..next.meteors.len() {
        next.meteors[i].rect.y += fall;
        if next.meteors[i].rect.top() > next.height {
            next.meteors[i].rect = spawn_rect(next.width, respawn_spread, rng);
            next.score += 1;
        }
        if next.meteors[i].rect.intersects(&next.player) {
            next.lives -= 1;
            next.meteors[i].rect = spawn_rect(next.width, respawn_spread, rng);
            tracing::debug!(lives = next.lives, "meteor hit");
            if next.lives <= 0 {
                next.status = Status::GameOver;
                tracing::info!(score = next.score, "escape run over");
                break;
            }
        }
    }
    next
}
