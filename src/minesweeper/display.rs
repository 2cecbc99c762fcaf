/// Minesweeper rendering. Cells are drawn from the glyph sheet, two terminal
/// columns per cell, below a one-row HUD.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal,
    QueueableCommand,
};

use super::compute::{sheet_position, Minesweeper, Status};
use crate::assets::GlyphSheet;
use crate::render::{draw_centered, draw_text};

/// Screen row of the first grid row.
pub const GRID_TOP: u16 = 1;
/// Terminal columns per grid cell.
pub const CELL_WIDTH: u16 = 2;

const C_HUD: Color = Color::Yellow;
const C_CLOSED: Color = Color::Grey;
const C_EMPTY: Color = Color::DarkGrey;
const C_BOMB: Color = Color::Red;
const C_FLAG: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Grid cell under a screen position, if any.
pub fn cell_at(column: u16, row: u16, size: usize) -> Option<(usize, usize)> {
    let r = row.checked_sub(GRID_TOP)? as usize;
    let c = (column / CELL_WIDTH) as usize;
    (r < size && c < size).then_some((r, c))
}

pub fn render<W: Write>(out: &mut W, state: &Minesweeper, sheet: &GlyphSheet, best: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_text(out, 0, 0, &format!("Score: {:>5}", state.score), C_HUD)?;
    draw_text(out, 16, 0, &format!("Best: {best}"), C_HINT)?;

    let size = state.grid.size;
    for row in 0..size {
        for col in 0..size {
            let (x, y) = sheet_position(state, row, col);
            let glyph = sheet.get(x, y).unwrap_or("?");
            let color = glyph_color(x, y);
            out.queue(cursor::MoveTo(col as u16 * CELL_WIDTH, GRID_TOP + row as u16))?;
            out.queue(style::SetForegroundColor(color))?;
            if state.cursor == (row, col) && state.status == Status::Playing {
                out.queue(style::SetAttribute(Attribute::Reverse))?;
                out.queue(Print(glyph))?;
                out.queue(style::SetAttribute(Attribute::NoReverse))?;
            } else {
                out.queue(Print(glyph))?;
            }
        }
    }

    let below = GRID_TOP + size as u16 + 1;
    let width = size as u16 * CELL_WIDTH;
    match state.status {
        Status::Playing => {
            draw_text(out, 0, below, "click/space: reveal  right-click/f: flag  q: quit", C_HINT)?;
        }
        Status::Exploded => {
            draw_centered(out, width, below, "BOOM! r: new game  q: quit", C_BOMB)?;
        }
        Status::Cleared => {
            draw_centered(out, width, below, "Field cleared! r: new game  q: quit", Color::Green)?;
        }
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, below + 1))?;
    out.flush()?;
    Ok(())
}

/// Numbers get the classic colours; the bottom row holds the special cells.
fn glyph_color(x: usize, y: usize) -> Color {
    match (x, y) {
        (0, 2) => C_EMPTY,
        (1, 2) => C_CLOSED,
        (2, 2) => C_BOMB,
        (3, 2) => C_FLAG,
        _ => match y * 4 + x + 1 {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Red,
            4 => Color::DarkBlue,
            5 => Color::DarkRed,
            6 => Color::Cyan,
            7 => Color::White,
            _ => Color::Grey,
        },
    }
}
