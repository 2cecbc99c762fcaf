//! Drawing helpers shared by the games' display modules.
//!
//! Everything here only queues crossterm commands; the caller flushes once
//! per frame.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};

use crate::assets::Sprite;

/// Visible region in screen cells: columns `left..right`, rows `top..bottom`.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Viewport {
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.left && col < self.right && row >= self.top && row < self.bottom
    }
}

/// Screen layout of a space game: HUD rows on top, then a bordered field,
/// then one hint row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub hud_rows: u16,
}

impl Layout {
    pub fn new(width: u16, height: u16, hud_rows: u16) -> Self {
        Layout { width, height, hud_rows }
    }

    /// Interior of the border in cells.
    pub fn field_size(&self) -> (f32, f32) {
        let w = self.width.saturating_sub(2).max(1);
        let h = self.height.saturating_sub(self.hud_rows + 3).max(1);
        (w as f32, h as f32)
    }

    /// Screen cell of field coordinate (0, 0).
    pub fn origin(&self) -> (i32, i32) {
        (1, self.hud_rows as i32 + 1)
    }

    pub fn border_rows(&self) -> (u16, u16) {
        (self.hud_rows, self.height.saturating_sub(2))
    }

    pub fn hint_row(&self) -> u16 {
        self.height.saturating_sub(1)
    }

    pub fn viewport(&self) -> Viewport {
        let (col, row) = self.origin();
        let (w, h) = self.field_size();
        Viewport { left: col, top: row, right: col + w as i32, bottom: row + h as i32 }
    }

    /// Screen cell for a field position.
    pub fn to_screen(&self, x: f32, y: f32) -> (i32, i32) {
        let (col, row) = self.origin();
        (col + x.round() as i32, row + y.round() as i32)
    }

    /// Field position for a screen cell (used for the mouse pointer).
    pub fn to_field(&self, column: u16, row: u16) -> (f32, f32) {
        let (col0, row0) = self.origin();
        (column as f32 - col0 as f32, row as f32 - row0 as f32)
    }
}

/// Draw `sprite` with its top-left at screen cell `(col, row)`, skipping
/// transparent cells and anything outside `clip`.
pub fn draw_sprite<W: Write>(out: &mut W, sprite: &Sprite, col: i32, row: i32, clip: Viewport) -> std::io::Result<()> {
    for dy in 0..sprite.height {
        let y = row + dy as i32;
        for dx in 0..sprite.width {
            let x = col + dx as i32;
            if !clip.contains(x, y) {
                continue;
            }
            let Some(cell) = sprite.cell(dx, dy) else { continue };
            out.queue(cursor::MoveTo(x as u16, y as u16))?;
            out.queue(style::SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            if let Some(bg) = cell.bg {
                out.queue(style::SetBackgroundColor(bg))?;
            }
            out.queue(Print(cell.glyph))?;
            if cell.bg.is_some() {
                out.queue(style::SetBackgroundColor(Color::Reset))?;
            }
        }
    }
    Ok(())
}

/// Print `text` centred on `row` of a `width`-column screen.
pub fn draw_centered<W: Write>(out: &mut W, width: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

pub fn draw_text<W: Write>(out: &mut W, col: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

/// Box outline from row `top` to row `bottom` (inclusive) across the full
/// `width`.
pub fn draw_border<W: Write>(out: &mut W, width: u16, top: u16, bottom: u16, color: Color) -> std::io::Result<()> {
    let w = width as usize;
    out.queue(style::SetForegroundColor(color))?;

    out.queue(cursor::MoveTo(0, top))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in top + 1..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

/// Blank a rectangle so overlay text sits on a clean background.
pub fn clear_box<W: Write>(out: &mut W, col: u16, row: u16, width: u16, height: u16) -> std::io::Result<()> {
    let blank = " ".repeat(width as usize);
    out.queue(style::ResetColor)?;
    for r in row..row + height {
        out.queue(cursor::MoveTo(col, r))?;
        out.queue(Print(&blank))?;
    }
    Ok(())
}

/// Centred vertical list of `(text, colour)` lines starting at `top`.
pub fn draw_lines<W: Write>(out: &mut W, width: u16, top: u16, lines: &[(String, Color)]) -> std::io::Result<()> {
    for (i, (text, color)) in lines.iter().enumerate() {
        draw_centered(out, width, top + i as u16, text, *color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sits_inside_border() {
        let layout = Layout::new(80, 24, 2);
        assert_eq!(layout.field_size(), (78.0, 19.0));
        assert_eq!(layout.origin(), (1, 3));
        assert_eq!(layout.border_rows(), (2, 22));
        assert_eq!(layout.hint_row(), 23);
    }

    #[test]
    fn screen_and_field_coordinates_invert() {
        let layout = Layout::new(80, 24, 2);
        assert_eq!(layout.to_screen(10.0, 4.0), (11, 7));
        assert_eq!(layout.to_field(11, 7), (10.0, 4.0));
    }

    #[test]
    fn viewport_clips_to_field() {
        let view = Layout::new(80, 24, 2).viewport();
        assert!(view.contains(1, 3));
        assert!(view.contains(78, 21));
        assert!(!view.contains(0, 3));
        assert!(!view.contains(79, 22));
    }

    #[test]
    fn tiny_terminal_keeps_one_cell() {
        assert_eq!(Layout::new(1, 2, 2).field_size(), (1.0, 1.0));
    }
}
