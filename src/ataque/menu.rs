//! Menu state machines. Navigation is pure so it can be tested without a
//! terminal; the binary only draws them and reacts to the outcomes.

use crossterm::event::KeyCode;

use crate::audio::{Channel, SoundSettings};
use crate::config::{Difficulty, FPS};

/// Volume change per Left/Right press, in percent.
pub const VOLUME_STEP: i32 = 5;
/// How long the "no saved game" notice stays up.
pub const NOTICE_FRAMES: u32 = 2 * FPS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
    Other,
}

impl MenuKey {
    pub fn from_code(code: KeyCode) -> MenuKey {
        match code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => MenuKey::Up,
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => MenuKey::Down,
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => MenuKey::Left,
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => MenuKey::Right,
            KeyCode::Enter | KeyCode::Char(' ') => MenuKey::Confirm,
            KeyCode::Esc => MenuKey::Back,
            _ => MenuKey::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOutcome<T> {
    Stay,
    Chosen(T),
    Back,
}

/// A vertical list with a wrapping selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Menu<T> {
    items: Vec<T>,
    selected: usize,
}

impl<T: Copy + PartialEq> Menu<T> {
    pub fn new(items: Vec<T>) -> Self {
        Menu { items, selected: 0 }
    }

    /// Start with `item` highlighted (first entry if absent).
    pub fn with_selected(items: Vec<T>, item: T) -> Self {
        let selected = items.iter().position(|&i| i == item).unwrap_or(0);
        Menu { items, selected }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<T> {
        self.items.get(self.selected).copied()
    }

    pub fn handle(&mut self, key: MenuKey) -> MenuOutcome<T> {
        let len = self.items.len();
        if len == 0 {
            return MenuOutcome::Back;
        }
        match key {
            MenuKey::Up => self.selected = (self.selected + len - 1) % len,
            MenuKey::Down => self.selected = (self.selected + 1) % len,
            MenuKey::Confirm => return self.selected().map_or(MenuOutcome::Back, MenuOutcome::Chosen),
            MenuKey::Back => return MenuOutcome::Back,
            _ => {}
        }
        MenuOutcome::Stay
    }
}

// ── Main menu ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainItem {
    NewGame,
    Multiplayer,
    LoadGame,
    ChooseDifficulty,
    Settings,
    Quit,
}

impl MainItem {
    pub const ALL: [MainItem; 6] = [
        MainItem::NewGame,
        MainItem::Multiplayer,
        MainItem::LoadGame,
        MainItem::ChooseDifficulty,
        MainItem::Settings,
        MainItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MainItem::NewGame => "New game",
            MainItem::Multiplayer => "Multiplayer",
            MainItem::LoadGame => "Load saved game",
            MainItem::ChooseDifficulty => "Choose difficulty",
            MainItem::Settings => "Settings",
            MainItem::Quit => "Quit",
        }
    }
}

pub fn main_menu() -> Menu<MainItem> {
    Menu::new(MainItem::ALL.to_vec())
}

pub fn difficulty_menu(current: Difficulty) -> Menu<Difficulty> {
    Menu::with_selected(Difficulty::ALL.to_vec(), current)
}

// ── Pause menu ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseItem {
    Continue,
    SaveToMenu,
    SaveAndQuit,
}

impl PauseItem {
    pub fn label(self) -> &'static str {
        match self {
            PauseItem::Continue => "Continue",
            PauseItem::SaveToMenu => "Save and return to menu",
            PauseItem::SaveAndQuit => "Save and quit",
        }
    }
}

pub fn pause_menu() -> Menu<PauseItem> {
    Menu::new(vec![PauseItem::Continue, PauseItem::SaveToMenu, PauseItem::SaveAndQuit])
}

// ── Settings menu ────────────────────────────────────────────────────────────

pub fn settings_menu() -> Menu<Channel> {
    Menu::new(Channel::ALL.to_vec())
}

/// Left/Right step the highlighted volume, Enter toggles it. Returns
/// `true` once the menu should close.
pub fn settings_key(menu: &mut Menu<Channel>, key: MenuKey, settings: &mut SoundSettings) -> bool {
    let Some(channel) = menu.selected() else { return true };
    match key {
        MenuKey::Left => settings.step_volume(channel, -VOLUME_STEP),
        MenuKey::Right => settings.step_volume(channel, VOLUME_STEP),
        MenuKey::Confirm => settings.toggle(channel),
        MenuKey::Back => return true,
        other => {
            menu.handle(other);
        }
    }
    false
}

pub fn settings_line(settings: &SoundSettings, channel: Channel) -> String {
    let status = if settings.enabled.get(channel) { "On" } else { "Off" };
    format!("{}: {}%  ({})", channel.label(), settings.percent(channel), status)
}

// ── Notices ──────────────────────────────────────────────────────────────────

/// Short-lived message under the main menu.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notice {
    text: Option<String>,
    frames_left: u32,
}

impl Notice {
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.frames_left = NOTICE_FRAMES;
    }

    pub fn tick(&mut self) {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            self.text = None;
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
