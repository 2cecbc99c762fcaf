//! Asset loading with graceful fallback.
//!
//! Logical keys map to files under the asset root. Images are tried as
//! `.png`/`.jpg` (decoded with `image` and downscaled to half-block cells)
//! and then as `.txt` glyph art. Anything missing becomes a solid-colour
//! placeholder of the requested size so the game keeps running.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crossterm::style::Color;
use image::imageops::FilterType;
use image::{GenericImageView, RgbaImage};

use crate::audio::AudioEngine;
use crate::error::{GameError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const ART_EXTENSIONS: &[&str] = &["txt"];
pub const SOUND_EXTENSIONS: &[&str] = &["wav", "ogg", "mp3"];

/// Alpha below this is treated as transparent when converting images.
const ALPHA_CUTOFF: u8 = 128;

/// Separator line between frames in a glyph-art animation file.
const FRAME_SEPARATOR: &str = "---";

// ── Sprites ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteCell {
    pub glyph: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

/// A rectangular block of terminal cells. `None` cells are transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub width: u16,
    pub height: u16,
    cells: Vec<Option<SpriteCell>>,
    placeholder: bool,
}

impl Sprite {
    /// Solid block used when an image cannot be loaded.
    pub fn solid(width: u16, height: u16, color: Color) -> Sprite {
        let cell = SpriteCell { glyph: '█', fg: Some(color), bg: None };
        Sprite {
            width,
            height,
            cells: vec![Some(cell); width as usize * height as usize],
            placeholder: true,
        }
    }

    /// Parse glyph art. Lines starting with `#` are headers; `# color: <c>`
    /// sets the foreground. Spaces are transparent.
    pub fn from_glyph_art(text: &str, default_color: Color) -> Sprite {
        let mut color = default_color;
        let mut rows: Vec<Vec<char>> = Vec::new();
        for line in text.lines() {
            if let Some(header) = line.strip_prefix('#') {
                if let Some(value) = header.trim().strip_prefix("color:") {
                    color = parse_color(value.trim()).unwrap_or(default_color);
                }
                continue;
            }
            rows.push(line.trim_end().chars().collect());
        }
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in &rows {
            for col in 0..width {
                let cell = match row.get(col) {
                    Some(' ') | None => None,
                    Some(&glyph) => Some(SpriteCell { glyph, fg: Some(color), bg: None }),
                };
                cells.push(cell);
            }
        }
        Sprite { width: width as u16, height: rows.len() as u16, cells, placeholder: false }
    }

    /// Convert an RGBA image whose height is twice the cell height: every
    /// terminal cell shows two vertical pixels with a half-block glyph.
    pub fn from_image(img: &RgbaImage) -> Sprite {
        let width = img.width();
        let height = img.height() / 2;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                let top = pixel_color(img, col, row * 2);
                let bottom = pixel_color(img, col, row * 2 + 1);
                let cell = match (top, bottom) {
                    (None, None) => None,
                    (Some(t), b) => Some(SpriteCell { glyph: '▀', fg: Some(t), bg: b }),
                    (None, Some(b)) => Some(SpriteCell { glyph: '▄', fg: Some(b), bg: None }),
                };
                cells.push(cell);
            }
        }
        Sprite { width: width as u16, height: height as u16, cells, placeholder: false }
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&SpriteCell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row as usize * self.width as usize + col as usize].as_ref()
    }

    /// True for sprites produced by [`Sprite::solid`] after a failed load.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

fn pixel_color(img: &RgbaImage, x: u32, y: u32) -> Option<Color> {
    if y >= img.height() {
        return None;
    }
    let [r, g, b, a] = img.get_pixel(x, y).0;
    (a >= ALPHA_CUTOFF).then_some(Color::Rgb { r, g, b })
}

/// Accepts `#rrggbb` or any colour name crossterm understands.
pub fn parse_color(value: &str) -> Option<Color> {
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? });
    }
    Color::try_from(value).ok()
}

// ── Glyph sheet ───────────────────────────────────────────────────────────────

/// A fixed grid of glyph tokens addressed like a sprite sheet: `(x, y)` is
/// column `x` of row `y`. The token `_` stands for a blank cell.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphSheet {
    pub columns: usize,
    pub rows: usize,
    tokens: Vec<String>,
}

impl GlyphSheet {
    pub fn parse(text: &str, path: &Path) -> Result<GlyphSheet> {
        let mut tokens = Vec::new();
        let mut columns = 0;
        let mut rows = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row: Vec<String> = line
                .split_whitespace()
                .map(|t| if t == "_" { " ".to_string() } else { t.to_string() })
                .collect();
            if rows == 0 {
                columns = row.len();
            } else if row.len() != columns {
                return Err(GameError::MalformedAsset {
                    path: path.to_path_buf(),
                    reason: format!("row {} has {} cells, expected {}", rows + 1, row.len(), columns),
                });
            }
            tokens.extend(row);
            rows += 1;
        }
        if rows == 0 {
            return Err(GameError::MalformedAsset {
                path: path.to_path_buf(),
                reason: "sheet is empty".to_string(),
            });
        }
        Ok(GlyphSheet { columns, rows, tokens })
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&str> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        self.tokens.get(y * self.columns + x).map(String::as_str)
    }
}

// ── Resource manager ──────────────────────────────────────────────────────────

/// Caches sprites by logical key and resolves asset paths.
pub struct ResourceManager {
    root: PathBuf,
    images: HashMap<String, Sprite>,
    frames: HashMap<String, Vec<Sprite>>,
}

impl ResourceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ResourceManager { root: root.into(), images: HashMap::new(), frames: HashMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing `<root>/<stem>.<ext>` for the given extensions.
    pub fn resolve(&self, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
        let base = if Path::new(stem).is_absolute() {
            PathBuf::from(stem)
        } else {
            self.root.join(stem)
        };
        extensions
            .iter()
            .map(|ext| base.with_extension(ext))
            .find(|p| p.is_file())
    }

    /// Load (or fetch from cache) the sprite for `key`. Never fails: a
    /// missing or broken file yields a `size` block of `fallback` colour.
    pub fn load_image(&mut self, key: &str, stem: &str, size: (u16, u16), fallback: Color) -> Sprite {
        if let Some(sprite) = self.images.get(key) {
            return sprite.clone();
        }
        let sprite = match self.try_load_image(stem, size, fallback) {
            Ok(sprite) => sprite,
            Err(e) => {
                tracing::warn!(%key, error = %e, "using placeholder sprite");
                Sprite::solid(size.0, size.1, fallback)
            }
        };
        self.images.insert(key.to_string(), sprite.clone());
        sprite
    }

    fn try_load_image(&self, stem: &str, size: (u16, u16), color: Color) -> Result<Sprite> {
        if let Some(path) = self.resolve(stem, IMAGE_EXTENSIONS) {
            let img = image::open(&path)?
                .resize_exact(size.0 as u32, size.1 as u32 * 2, FilterType::Nearest)
                .to_rgba8();
            tracing::debug!(path = %path.display(), "decoded image sprite");
            return Ok(Sprite::from_image(&img));
        }
        if let Some(path) = self.resolve(stem, ART_EXTENSIONS) {
            let text = fs::read_to_string(&path)?;
            return Ok(Sprite::from_glyph_art(&text, color));
        }
        Err(GameError::MissingAsset(self.root.join(stem)))
    }

    /// Load an animation. Glyph-art files hold frames separated by `---`
    /// lines; image sheets are cut into a `grid` of equally sized frames.
    /// Returns an empty list when nothing usable exists.
    pub fn load_frames(&mut self, key: &str, stem: &str, grid: (u32, u32), size: (u16, u16), color: Color) -> Vec<Sprite> {
        if let Some(frames) = self.frames.get(key) {
            return frames.clone();
        }
        let frames = match self.try_load_frames(stem, grid, size, color) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(%key, error = %e, "no explosion frames, using built-in effect");
                Vec::new()
            }
        };
        self.frames.insert(key.to_string(), frames.clone());
        frames
    }

    fn try_load_frames(&self, stem: &str, grid: (u32, u32), size: (u16, u16), color: Color) -> Result<Vec<Sprite>> {
        if let Some(path) = self.resolve(stem, IMAGE_EXTENSIONS) {
            let sheet = image::open(&path)?;
            let (cols, rows) = grid;
            let cell_w = sheet.width() / cols.max(1);
            let cell_h = sheet.height() / rows.max(1);
            let mut frames = Vec::with_capacity((cols * rows) as usize);
            for r in 0..rows {
                for c in 0..cols {
                    let frame = sheet
                        .crop_imm(c * cell_w, r * cell_h, cell_w, cell_h)
                        .resize_exact(size.0 as u32, size.1 as u32 * 2, FilterType::Nearest)
                        .to_rgba8();
                    frames.push(Sprite::from_image(&frame));
                }
            }
            return Ok(frames);
        }
        if let Some(path) = self.resolve(stem, ART_EXTENSIONS) {
            let text = fs::read_to_string(&path)?;
            return Ok(split_frames(&text)
                .into_iter()
                .map(|chunk| Sprite::from_glyph_art(&chunk, color))
                .filter(|s| s.width > 0)
                .collect());
        }
        Err(GameError::MissingAsset(self.root.join(stem)))
    }

    /// Core sprite sheets are not optional: the error is returned as-is.
    pub fn load_glyph_sheet(&self, stem: &str) -> Result<GlyphSheet> {
        let path = self
            .resolve(stem, ART_EXTENSIONS)
            .ok_or_else(|| GameError::MissingAsset(self.root.join(stem)))?;
        let text = fs::read_to_string(&path)?;
        GlyphSheet::parse(&text, &path)
    }

    /// Register a sound with the audio engine. Missing files are not an
    /// error; the key simply plays nothing.
    pub fn load_sound(&self, audio: &mut AudioEngine, key: &str, stem: &str) -> bool {
        match self.resolve(stem, SOUND_EXTENSIONS) {
            Some(path) => match audio.load(key, &path) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "sound failed to load, continuing silently");
                    false
                }
            },
            None => {
                tracing::info!(%key, %stem, "sound file not found, continuing silently");
                false
            }
        }
    }
}

fn split_frames(text: &str) -> Vec<String> {
    let mut frames = vec![String::new()];
    for line in text.lines() {
        if line.trim() == FRAME_SEPARATOR {
            frames.push(String::new());
        } else if let Some(current) = frames.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    frames
}
