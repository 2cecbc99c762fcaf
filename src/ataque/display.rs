//! Rendering layer for Space Ataque. All terminal I/O lives here.
//!
//! Each function receives a writer and an immutable view of the state; no
//! game logic runs here.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use super::compute::{boss_mood, boss_required, phase_target, required_items, EXPLOSION_FRAMES};
use super::entities::{AtaqueState, BossMood, EnemyKind, ItemKind, BOSS_SIZE, ENEMY_SIZE, ITEM_SIZE, PLAYER_SIZE};
use super::menu::{settings_line, MainItem, Menu, Notice, PauseItem};
use crate::assets::{ResourceManager, Sprite};
use crate::audio::{Channel, SoundSettings};
use crate::config::{Difficulty, FPS};
use crate::render::{clear_box, draw_border, draw_centered, draw_sprite, draw_text, Layout, Viewport};

pub const HUD_ROWS: u16 = 2;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::White;
const C_TITLE: Color = Color::Yellow;
const C_SELECTED: Color = Color::Yellow;
const C_OPTION: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;
const C_PLAYER: Color = Color::White;
const C_BULLET: Color = Color::Yellow;
const C_STAR: Color = Color::Yellow;
const C_SHIELD: Color = Color::Blue;
const C_AURA: Color = Color::Cyan;
const C_BOSS: Color = Color::DarkMagenta;
const C_GAME_OVER: Color = Color::DarkRed;

const AURA_PARTICLES: usize = 12;
/// Built-in explosion when no frames were loaded.
const FALLBACK_BLAST: [&str; 4] = ["*", "✷", "✺", "·"];

// ── Sprites ───────────────────────────────────────────────────────────────────

pub struct AtaqueSprites {
    pub player: Sprite,
    pub player_up: Sprite,
    pub enemies: HashMap<EnemyKind, Sprite>,
    pub explosions: HashMap<EnemyKind, Vec<Sprite>>,
    pub star: Sprite,
    pub shield: Sprite,
    pub boss_sleep: Sprite,
    pub boss_normal: Sprite,
    pub boss_rage: Sprite,
}

fn enemy_stem(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Scout => "scout",
        EnemyKind::Raider => "raider",
        EnemyKind::Brute => "brute",
        EnemyKind::Stinger => "stinger",
    }
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Scout => Color::Green,
        EnemyKind::Raider => Color::Magenta,
        EnemyKind::Brute => Color::Red,
        EnemyKind::Stinger => Color::DarkYellow,
    }
}

impl AtaqueSprites {
    pub fn load(res: &mut ResourceManager) -> Self {
        let cells = |(w, h): (f32, f32)| (w as u16, h as u16);
        let kinds = [EnemyKind::Scout, EnemyKind::Raider, EnemyKind::Brute, EnemyKind::Stinger];

        let generic_blast = res.load_frames("explosion", "ataque/explosion", (4, 1), cells(ENEMY_SIZE), Color::DarkYellow);
        let mut enemies = HashMap::new();
        let mut explosions = HashMap::new();
        for kind in kinds {
            let stem = enemy_stem(kind);
            let sprite = res.load_image(&format!("enemy_{stem}"), &format!("ataque/enemy_{stem}"), cells(ENEMY_SIZE), enemy_color(kind));
            enemies.insert(kind, sprite);
            let frames = res.load_frames(
                &format!("explosion_{stem}"),
                &format!("ataque/explosion_{stem}"),
                (4, 1),
                cells(ENEMY_SIZE),
                enemy_color(kind),
            );
            explosions.insert(kind, if frames.is_empty() { generic_blast.clone() } else { frames });
        }

        AtaqueSprites {
            player: res.load_image("player", "ataque/player", cells(PLAYER_SIZE), C_PLAYER),
            player_up: res.load_image("player_up", "ataque/player_up", cells(PLAYER_SIZE), C_PLAYER),
            enemies,
            explosions,
            star: res.load_image("star", "ataque/star", cells(ITEM_SIZE), C_STAR),
            shield: res.load_image("shield", "ataque/shield", cells(ITEM_SIZE), C_SHIELD),
            boss_sleep: res.load_image("boss_sleep", "ataque/boss_sleep", cells(BOSS_SIZE), C_BOSS),
            boss_normal: res.load_image("boss_normal", "ataque/boss_normal", cells(BOSS_SIZE), C_BOSS),
            boss_rage: res.load_image("boss_rage", "ataque/boss_rage", cells(BOSS_SIZE), Color::Red),
        }
    }

    fn boss(&self, mood: BossMood) -> &Sprite {
        match mood {
            BossMood::Sleep => &self.boss_sleep,
            BossMood::Normal => &self.boss_normal,
            BossMood::Rage => &self.boss_rage,
        }
    }
}

// ── Gameplay frame ────────────────────────────────────────────────────────────

/// What to draw on top of the field.
pub enum Overlay<'a> {
    None,
    Pause(&'a Menu<PauseItem>),
    PhaseVictory,
    GameOver { highscore: u32 },
    Victory { highscore: u32 },
}

/// Render one complete gameplay frame plus an optional overlay.
pub fn render<W: Write>(
    out: &mut W,
    state: &AtaqueState,
    sprites: &AtaqueSprites,
    layout: Layout,
    overlay: Overlay<'_>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (top, bottom) = layout.border_rows();
    draw_border(out, layout.width, top, bottom, C_BORDER)?;
    draw_hud(out, state)?;

    let clip = layout.viewport();
    draw_field(out, state, sprites, layout, clip)?;

    let hint = if state.multiplayer {
        "P1: arrows   P2: WASD   auto-fire   ESC: pause"
    } else {
        "Arrows/WASD/mouse: move   SPACE: shoot   ESC: pause"
    };
    draw_text(out, 1, layout.hint_row(), hint, C_HINT)?;

    match overlay {
        Overlay::None => {}
        Overlay::Pause(menu) => draw_pause(out, layout, menu)?,
        Overlay::PhaseVictory => draw_phase_victory(out, state, layout)?,
        Overlay::GameOver { highscore } => draw_final(out, state, layout, "GAME OVER", None, C_GAME_OVER, highscore)?,
        Overlay::Victory { highscore } => draw_final(
            out,
            state,
            layout,
            "VICTORY!",
            Some("You defeated the final boss!"),
            C_TITLE,
            highscore,
        )?,
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, layout.hint_row()))?;
    out.flush()?;
    Ok(())
}

// ── HUD (rows 0-1) ────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &AtaqueState) -> std::io::Result<()> {
    let line1 = format!("Score: {}   Lives: {}   Phase: {}", state.score, state.lives, state.phase + 1);
    draw_text(out, 1, 0, &line1, C_HUD)?;

    let mut goals = vec![format!("Goal: {}/{} pts", state.score, phase_target(state.phase))];
    let items = required_items(state.phase);
    if items > 0 {
        goals.push(format!("Items: {}/{}", state.items_collected, items));
    }
    if boss_required(state.phase) {
        goals.push(format!("Boss: {}", if state.boss_defeated { "Defeated" } else { "No" }));
    }
    draw_text(out, 1, 1, &goals.join("  •  "), C_HUD)?;

    if state.invulnerable > 0 {
        let secs = state.invulnerable.div_ceil(FPS);
        draw_text(out, 46, 0, &format!("Shield: {secs}s"), C_AURA)?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_field<W: Write>(
    out: &mut W,
    state: &AtaqueState,
    sprites: &AtaqueSprites,
    layout: Layout,
    clip: Viewport,
) -> std::io::Result<()> {
    for item in &state.items {
        let sprite = match item.kind {
            ItemKind::Star => &sprites.star,
            ItemKind::Shield => &sprites.shield,
        };
        let (col, row) = layout.to_screen(item.rect.x, item.rect.y);
        draw_sprite(out, sprite, col, row, clip)?;
    }

    for enemy in &state.enemies {
        if let Some(sprite) = sprites.enemies.get(&enemy.kind) {
            let (col, row) = layout.to_screen(enemy.rect.x, enemy.rect.y);
            draw_sprite(out, sprite, col, row, clip)?;
        }
    }

    if let Some(boss) = &state.boss {
        let (col, row) = layout.to_screen(boss.rect.x, boss.rect.y);
        draw_sprite(out, sprites.boss(boss_mood(boss.hp)), col, row, clip)?;
        draw_boss_health(out, boss.hp, col, row, boss.rect.w as usize, clip)?;
    }

    out.queue(style::SetForegroundColor(C_BULLET))?;
    for bullet in &state.bullets {
        let (col, row) = layout.to_screen(bullet.rect.x, bullet.rect.y);
        if clip.contains(col, row) {
            out.queue(cursor::MoveTo(col as u16, row as u16))?;
            out.queue(Print("│"))?;
        }
    }

    for (i, player) in state.players.iter().enumerate() {
        let sprite = if player.thrusting { &sprites.player_up } else { &sprites.player };
        let (col, row) = layout.to_screen(player.rect.x, player.rect.y);
        draw_sprite(out, sprite, col, row, clip)?;
        if state.multiplayer {
            let tag = format!("P{}", i + 1);
            let below = row + player.rect.h as i32;
            if clip.contains(col, below) {
                draw_text(out, col as u16, below as u16, &tag, C_HINT)?;
            }
        }
    }

    if let Some(aura) = &state.shield {
        if let Some(owner) = state.players.get(aura.owner) {
            let (cx, cy) = owner.rect.center();
            let rx = owner.rect.w.max(owner.rect.h * 2.0) * 0.65;
            let ry = rx / 2.0;
            out.queue(style::SetForegroundColor(C_AURA))?;
            for i in 0..AURA_PARTICLES {
                let angle = (aura.angle + i as f32 * 360.0 / AURA_PARTICLES as f32).to_radians();
                let (col, row) = layout.to_screen(cx + rx * angle.cos(), cy + ry * angle.sin());
                if clip.contains(col, row) {
                    out.queue(cursor::MoveTo(col as u16, row as u16))?;
                    out.queue(Print("•"))?;
                }
            }
        }
    }

    for explosion in &state.explosions {
        let frames = sprites.explosions.get(&explosion.kind).map(Vec::as_slice).unwrap_or(&[]);
        if frames.is_empty() {
            let idx = (explosion.age as usize * FALLBACK_BLAST.len()) / EXPLOSION_FRAMES as usize;
            let glyph = FALLBACK_BLAST[idx.min(FALLBACK_BLAST.len() - 1)];
            let (col, row) = layout.to_screen(explosion.center.0, explosion.center.1);
            if clip.contains(col, row) {
                out.queue(cursor::MoveTo(col as u16, row as u16))?;
                out.queue(style::SetForegroundColor(Color::DarkYellow))?;
                out.queue(Print(glyph))?;
            }
        } else {
            let idx = (explosion.age as usize * frames.len()) / EXPLOSION_FRAMES as usize;
            let frame = &frames[idx.min(frames.len() - 1)];
            let x = explosion.center.0 - frame.width as f32 / 2.0;
            let y = explosion.center.1 - frame.height as f32 / 2.0;
            let (col, row) = layout.to_screen(x, y);
            draw_sprite(out, frame, col, row, clip)?;
        }
    }
    Ok(())
}

fn draw_boss_health<W: Write>(out: &mut W, hp: f32, col: i32, row: i32, width: usize, clip: Viewport) -> std::io::Result<()> {
    let bar_row = row - 1;
    if bar_row < clip.top || col < clip.left {
        return Ok(());
    }
    let pct = hp.clamp(0.0, 100.0);
    let filled = ((width as f32) * pct / 100.0).round() as usize;
    let color = if pct > 50.0 {
        Color::Green
    } else if pct > 20.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    out.queue(cursor::MoveTo(col as u16, bar_row as u16))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("█".repeat(filled)))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("░".repeat(width.saturating_sub(filled))))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!(" {pct:.0}%")))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn overlay_box<W: Write>(out: &mut W, layout: Layout, top: u16, rows: u16) -> std::io::Result<()> {
    let box_w = 50.min(layout.width.saturating_sub(4));
    clear_box(out, (layout.width - box_w) / 2, top, box_w, rows)
}

fn draw_options<W: Write, T: Copy + PartialEq>(
    out: &mut W,
    width: u16,
    top: u16,
    menu: &Menu<T>,
    label: impl Fn(T) -> String,
) -> std::io::Result<()> {
    for (i, &item) in menu.items().iter().enumerate() {
        let (text, color) = if i == menu.index() {
            (format!("> {} <", label(item)), C_SELECTED)
        } else {
            (label(item), C_OPTION)
        };
        draw_centered(out, width, top + i as u16, &text, color)?;
    }
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, layout: Layout, menu: &Menu<PauseItem>) -> std::io::Result<()> {
    let top = (layout.height / 2).saturating_sub(4);
    overlay_box(out, layout, top, 8)?;
    draw_centered(out, layout.width, top, "GAME PAUSED", C_TITLE)?;
    draw_options(out, layout.width, top + 2, menu, |item| item.label().to_string())?;
    draw_centered(out, layout.width, top + 6, "ESC to continue • ENTER to select", C_HINT)
}

fn draw_phase_victory<W: Write>(out: &mut W, state: &AtaqueState, layout: Layout) -> std::io::Result<()> {
    let top = (layout.height / 2).saturating_sub(2);
    overlay_box(out, layout, top, 5)?;
    let secs = state.phase_victory_timer.div_ceil(FPS);
    draw_centered(out, layout.width, top, "Phase cleared!", C_TITLE)?;
    draw_centered(out, layout.width, top + 2, &format!("Phase {} complete!", state.phase + 1), C_OPTION)?;
    draw_centered(out, layout.width, top + 3, &format!("Next phase in {secs}s..."), C_OPTION)
}

fn draw_final<W: Write>(
    out: &mut W,
    state: &AtaqueState,
    layout: Layout,
    title: &str,
    subtitle: Option<&str>,
    color: Color,
    highscore: u32,
) -> std::io::Result<()> {
    let top = (layout.height / 2).saturating_sub(5);
    overlay_box(out, layout, top, 10)?;
    draw_centered(out, layout.width, top, title, color)?;
    if let Some(subtitle) = subtitle {
        draw_centered(out, layout.width, top + 1, subtitle, C_OPTION)?;
    }
    let lines = [
        format!("Phase: {}", state.phase + 1),
        format!("Difficulty: {}", state.difficulty.label()),
        format!("Score: {}", state.score),
        format!("Highscore: {highscore}"),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_centered(out, layout.width, top + 3 + i as u16, line, C_OPTION)?;
    }
    draw_centered(out, layout.width, top + 8, "Press any key to return to the menu", C_HINT)
}

// ── Menu screens ──────────────────────────────────────────────────────────────

fn begin_screen<W: Write>(out: &mut W, width: u16, title: &str) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    draw_centered(out, width, 2, title, C_TITLE)
}

fn end_screen<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.flush()
}

pub fn render_main_menu<W: Write>(
    out: &mut W,
    layout: Layout,
    menu: &Menu<MainItem>,
    highscore: u32,
    difficulty: Difficulty,
    notice: &Notice,
) -> std::io::Result<()> {
    begin_screen(out, layout.width, "★  SPACE  ATAQUE  ★")?;
    draw_centered(out, layout.width, 4, &format!("Highscore: {highscore}"), C_OPTION)?;
    draw_options(out, layout.width, 7, menu, |item| item.label().to_string())?;
    let below = 7 + menu.items().len() as u16 + 1;
    draw_centered(out, layout.width, below, &format!("Difficulty: {}", difficulty.label()), C_OPTION)?;
    if let Some(text) = notice.text() {
        draw_centered(out, layout.width, below + 2, text, Color::Red)?;
    }
    draw_centered(out, layout.width, layout.hint_row(), "↑/↓ select • ENTER confirm • ESC quit", C_HINT)?;
    end_screen(out)
}

pub fn render_difficulty_menu<W: Write>(out: &mut W, layout: Layout, menu: &Menu<Difficulty>) -> std::io::Result<()> {
    begin_screen(out, layout.width, "Choose difficulty")?;
    draw_options(out, layout.width, 6, menu, |d| {
        let c = d.config();
        format!("{:<7} {} enemies, {} lives", d.label(), c.enemies, c.lives)
    })?;
    draw_centered(out, layout.width, 11, "ENTER to confirm • ESC to go back", C_HINT)?;
    end_screen(out)
}

pub fn render_settings_menu<W: Write>(
    out: &mut W,
    layout: Layout,
    menu: &Menu<Channel>,
    settings: &SoundSettings,
) -> std::io::Result<()> {
    begin_screen(out, layout.width, "Audio settings")?;
    draw_options(out, layout.width, 6, menu, |channel| settings_line(settings, channel))?;
    draw_centered(
        out,
        layout.width,
        12,
        "↑/↓ select • ←/→ volume • ENTER/SPACE on/off • ESC back",
        C_HINT,
    )?;
    end_screen(out)
}
