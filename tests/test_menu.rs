use crossterm::event::KeyCode;

use terminal_arcade::ataque::menu::*;
use terminal_arcade::audio::{Channel, SoundSettings};
use terminal_arcade::config::Difficulty;

#[test]
fn key_codes_map_to_menu_keys() {
    assert_eq!(MenuKey::from_code(KeyCode::Up), MenuKey::Up);
    assert_eq!(MenuKey::from_code(KeyCode::Char('S')), MenuKey::Down);
    assert_eq!(MenuKey::from_code(KeyCode::Char('a')), MenuKey::Left);
    assert_eq!(MenuKey::from_code(KeyCode::Enter), MenuKey::Confirm);
    assert_eq!(MenuKey::from_code(KeyCode::Char(' ')), MenuKey::Confirm);
    assert_eq!(MenuKey::from_code(KeyCode::Esc), MenuKey::Back);
    assert_eq!(MenuKey::from_code(KeyCode::Char('x')), MenuKey::Other);
}

// ── Navigation ────────────────────────────────────────────────────────────────

#[test]
fn selection_wraps_both_ways() {
    let mut menu = main_menu();
    assert_eq!(menu.selected(), Some(MainItem::NewGame));
    assert_eq!(menu.handle(MenuKey::Up), MenuOutcome::Stay);
    assert_eq!(menu.selected(), Some(MainItem::Quit));
    menu.handle(MenuKey::Down);
    assert_eq!(menu.selected(), Some(MainItem::NewGame));
}

#[test]
fn confirm_returns_highlighted_item() {
    let mut menu = main_menu();
    menu.handle(MenuKey::Down);
    menu.handle(MenuKey::Down);
    assert_eq!(menu.handle(MenuKey::Confirm), MenuOutcome::Chosen(MainItem::LoadGame));
}

#[test]
fn back_and_other_keys() {
    let mut menu = pause_menu();
    assert_eq!(menu.handle(MenuKey::Other), MenuOutcome::Stay);
    assert_eq!(menu.handle(MenuKey::Left), MenuOutcome::Stay);
    assert_eq!(menu.index(), 0);
    assert_eq!(menu.handle(MenuKey::Back), MenuOutcome::Back);
}

#[test]
fn empty_menu_backs_out() {
    let mut menu: Menu<PauseItem> = Menu::new(Vec::new());
    assert_eq!(menu.handle(MenuKey::Down), MenuOutcome::Back);
    assert!(menu.selected().is_none());
}

#[test]
fn difficulty_menu_starts_on_current() {
    let menu = difficulty_menu(Difficulty::Hard);
    assert_eq!(menu.selected(), Some(Difficulty::Hard));
    assert_eq!(menu.items().len(), 3);
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[test]
fn settings_keys_step_and_toggle() {
    let mut menu = settings_menu();
    let mut settings = SoundSettings::default();
    assert_eq!(menu.selected(), Some(Channel::Music));

    assert!(!settings_key(&mut menu, MenuKey::Right, &mut settings));
    assert_eq!(settings.percent(Channel::Music), 30 + VOLUME_STEP as u32);

    assert!(!settings_key(&mut menu, MenuKey::Down, &mut settings));
    assert_eq!(menu.selected(), Some(Channel::Point));
    settings_key(&mut menu, MenuKey::Left, &mut settings);
    assert_eq!(settings.percent(Channel::Point), 30 - VOLUME_STEP as u32);

    settings_key(&mut menu, MenuKey::Confirm, &mut settings);
    assert!(!settings.enabled.point);
    assert!(settings_line(&settings, Channel::Point).ends_with("(Off)"));

    assert!(settings_key(&mut menu, MenuKey::Back, &mut settings));
}

#[test]
fn settings_line_shows_percent() {
    let settings = SoundSettings::default();
    assert_eq!(settings_line(&settings, Channel::Shoot), "Shot sound: 20%  (On)");
}

// ── Notice ────────────────────────────────────────────────────────────────────

#[test]
fn notice_expires() {
    let mut notice = Notice::default();
    assert!(notice.text().is_none());
    notice.show("No saved game found.");
    for _ in 0..NOTICE_FRAMES - 1 {
        notice.tick();
    }
    assert_eq!(notice.text(), Some("No saved game found."));
    notice.tick();
    assert!(notice.text().is_none());
}
