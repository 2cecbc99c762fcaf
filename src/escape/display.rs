/// Space Escape rendering: border, HUD, sprites and the end screen.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color},
    terminal,
    QueueableCommand,
};

use super::compute::{EscapeState, Status, METEOR_SIZE, PLAYER_SIZE};
use crate::assets::{ResourceManager, Sprite};
use crate::render::{clear_box, draw_border, draw_lines, draw_sprite, draw_text, Layout};

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::White;
const C_PLAYER: Color = Color::Blue;
const C_METEOR: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

pub const HUD_ROWS: u16 = 1;

pub struct EscapeSprites {
    pub player: Sprite,
    pub meteor: Sprite,
}

impl EscapeSprites {
    pub fn load(res: &mut ResourceManager) -> Self {
        let size = |(w, h): (f32, f32)| (w as u16, h as u16);
        EscapeSprites {
            player: res.load_image("player", "escape/player", size(PLAYER_SIZE), C_PLAYER),
            meteor: res.load_image("meteor", "escape/meteor", size(METEOR_SIZE), C_METEOR),
        }
    }
}

pub fn render<W: Write>(out: &mut W, state: &EscapeState, sprites: &EscapeSprites, layout: Layout, best: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (top, bottom) = layout.border_rows();
    draw_border(out, layout.width, top, bottom, C_BORDER)?;
    draw_text(out, 1, 0, &format!("Score: {}   Lives: {}", state.score, state.lives), C_HUD)?;

    let clip = layout.viewport();
    for meteor in &state.meteors {
        let (col, row) = layout.to_screen(meteor.rect.x, meteor.rect.y);
        draw_sprite(out, &sprites.meteor, col, row, clip)?;
    }
    let (col, row) = layout.to_screen(state.player.x, state.player.y);
    draw_sprite(out, &sprites.player, col, row, clip)?;

    draw_text(out, 1, layout.hint_row(), "← → / A D : Move   Q : Quit", C_HINT)?;

    if state.status == Status::GameOver {
        draw_game_over(out, state, layout, best)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, layout.hint_row()))?;
    out.flush()?;
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, state: &EscapeState, layout: Layout, best: u32) -> std::io::Result<()> {
    let mid = layout.height / 2;
    let box_w = 44.min(layout.width.saturating_sub(4));
    clear_box(out, (layout.width - box_w) / 2, mid.saturating_sub(2), box_w, 5)?;
    let lines = [
        ("GAME OVER".to_string(), Color::Red),
        (format!("Final score: {}", state.score), Color::White),
        (format!("Best: {}", best.max(state.score)), Color::Yellow),
        ("Press any key to exit".to_string(), C_HINT),
    ];
    draw_lines(out, layout.width, mid.saturating_sub(2), &lines)
}
