use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Context;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use rand::rngs::ThreadRng;
use rand::thread_rng;

use terminal_arcade::assets::{ResourceManager, SOUND_EXTENSIONS};
use terminal_arcade::ataque::compute::{load_game, new_game, pause, resume, tick, to_save_record};
use terminal_arcade::ataque::display::{
    self, render_difficulty_menu, render_main_menu, render_settings_menu, AtaqueSprites, Overlay, HUD_ROWS,
};
use terminal_arcade::ataque::entities::{Controls, PlayerInput};
use terminal_arcade::ataque::menu::{
    difficulty_menu, main_menu, pause_menu, settings_key, settings_menu, MainItem, Menu, MenuKey, MenuOutcome,
    Notice, PauseItem,
};
use terminal_arcade::ataque::{AtaqueSave, AtaqueState, GameEvent, GameStatus, TickInput};
use terminal_arcade::audio::{AudioEngine, Cue, SoundSettings};
use terminal_arcade::config::{asset_dir, frames_from_ms, log_path, save_path, Difficulty};
use terminal_arcade::logging::init_tracing;
use terminal_arcade::render::Layout;
use terminal_arcade::save::SaveManager;
use terminal_arcade::terminal::{is_interrupt, spawn_input_thread, FrameClock, KeyTracker, TerminalSession};

const GAME: &str = "space_ataque";

/// How long the boss entrance theme may play.
const BOSS_THEME_FRAMES: u64 = frames_from_ms(5000) as u64;
/// The victory screen returns to the menu on its own after this long.
const VICTORY_FRAMES: u32 = frames_from_ms(5000);
/// Keys still held from play are ignored this long on the end screens.
const END_GRACE_FRAMES: u32 = frames_from_ms(500);
/// Lives at or below this keep the warning loop running.
const LOW_LIVES: i32 = 3;
/// Music and ducked cues while the next phase loads.
const PHASE_DUCK: f32 = 0.4;

const SOUND_CUES: [Cue; 11] = [
    Cue::Point,
    Cue::Hit,
    Cue::Shoot,
    Cue::LowLives,
    Cue::BossFinal,
    Cue::CollectStar,
    Cue::GameOver,
    Cue::LoadLevels,
    Cue::BossExplosion,
    Cue::PauseGame,
    Cue::SpaceBridge,
];

const LOOPS: [Cue; 5] = [Cue::LowLives, Cue::PauseGame, Cue::LoadLevels, Cue::SpaceBridge, Cue::BossFinal];

// ── Key bindings ──────────────────────────────────────────────────────────────

struct Bindings {
    left: &'static [KeyCode],
    right: &'static [KeyCode],
    up: &'static [KeyCode],
    down: &'static [KeyCode],
}

const ARROWS: Bindings = Bindings {
    left: &[KeyCode::Left],
    right: &[KeyCode::Right],
    up: &[KeyCode::Up],
    down: &[KeyCode::Down],
};

const WASD: Bindings = Bindings {
    left: &[KeyCode::Char('a')],
    right: &[KeyCode::Char('d')],
    up: &[KeyCode::Char('w')],
    down: &[KeyCode::Char('s')],
};

fn held(keys: &KeyTracker, bindings: &[&Bindings], frame: u64, pick: fn(&Bindings) -> &'static [KeyCode]) -> bool {
    bindings.iter().any(|b| keys.any_held(pick(b), frame))
}

fn player_input(keys: &KeyTracker, controls: Controls, frame: u64) -> PlayerInput {
    let bindings: &[&Bindings] = match controls {
        Controls::Both => &[&ARROWS, &WASD],
        Controls::Arrows => &[&ARROWS],
        Controls::Wasd => &[&WASD],
    };
    PlayerInput {
        left: held(keys, bindings, frame, |b| b.left),
        right: held(keys, bindings, frame, |b| b.right),
        up: held(keys, bindings, frame, |b| b.up),
        down: held(keys, bindings, frame, |b| b.down),
        fire: controls == Controls::Both && keys.is_held(KeyCode::Char(' '), frame),
    }
}

fn is_pause_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P'))
}

// ── Entry point ───────────────────────────────────────────────────────────────

enum Screen {
    MainMenu,
    Difficulty,
    Settings,
    Game(Box<AtaqueState>),
    Quit,
}

struct Arcade {
    session: TerminalSession,
    rx: mpsc::Receiver<Event>,
    sprites: AtaqueSprites,
    audio: AudioEngine,
    music: Option<PathBuf>,
    music_on: bool,
    saves: SaveManager<AtaqueSave>,
    difficulty: Difficulty,
    highscore: u32,
    notice: Notice,
    clock: FrameClock,
    rng: ThreadRng,
}

fn main() -> anyhow::Result<()> {
    init_tracing(&log_path(GAME));

    let saves: SaveManager<AtaqueSave> = SaveManager::new(save_path(GAME));
    let saved = saves.load();
    let mut settings = SoundSettings::default();
    if let Some(record) = &saved {
        record.apply_sound(&mut settings);
    }

    let mut resources = ResourceManager::new(asset_dir());
    let sprites = AtaqueSprites::load(&mut resources);
    let mut audio = AudioEngine::new(settings);
    for cue in SOUND_CUES {
        resources.load_sound(&mut audio, cue.key(), &format!("ataque/{}", cue.key()));
    }
    let music = resources.resolve("ataque/music", SOUND_EXTENSIONS);

    let session = TerminalSession::enter(true).context("cannot set up the terminal")?;
    let rx = spawn_input_thread();

    let mut arcade = Arcade {
        session,
        rx,
        sprites,
        audio,
        music,
        music_on: false,
        saves,
        difficulty: saved.as_ref().map(|r| r.difficulty).unwrap_or_default(),
        highscore: saved.map(|r| r.highscore).unwrap_or(0),
        notice: Notice::default(),
        clock: FrameClock::new(),
        rng: thread_rng(),
    };
    let result = arcade.run();
    arcade.silence();
    drop(arcade);
    result
}

impl Arcade {
    fn run(&mut self) -> anyhow::Result<()> {
        self.start_music();
        let mut screen = Screen::MainMenu;
        loop {
            screen = match screen {
                Screen::MainMenu => self.main_screen()?,
                Screen::Difficulty => self.difficulty_screen()?,
                Screen::Settings => self.settings_screen()?,
                Screen::Game(state) => self.play(*state)?,
                Screen::Quit => return Ok(()),
            };
        }
    }

    fn layout(&self) -> anyhow::Result<Layout> {
        let (width, height) = self.session.size()?;
        Ok(Layout::new(width, height, HUD_ROWS))
    }

    /// Key presses queued since the last frame; mouse and release events
    /// are dropped.
    fn pressed_keys(&self) -> Vec<KeyEvent> {
        self.rx
            .try_iter()
            .filter_map(|event| match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
                _ => None,
            })
            .collect()
    }

    fn start_music(&mut self) {
        if self.music_on {
            return;
        }
        if let Some(path) = &self.music {
            self.audio.play_music(path);
            self.music_on = true;
        }
    }

    fn stop_music(&mut self) {
        self.audio.stop_music();
        self.music_on = false;
    }

    fn silence(&mut self) {
        for cue in LOOPS {
            self.audio.stop(cue);
        }
        self.audio.set_duck(1.0);
    }

    fn save(&mut self, state: &AtaqueState) {
        let mut record = to_save_record(state).with_sound(self.audio.settings());
        record.highscore = self.highscore;
        self.highscore = self.saves.save(record);
    }

    // ── Menus ─────────────────────────────────────────────────────────────────

    fn main_screen(&mut self) -> anyhow::Result<Screen> {
        let mut menu = main_menu();
        loop {
            self.clock.begin();
            let layout = self.layout()?;
            for key in self.pressed_keys() {
                if is_interrupt(&key) {
                    return Ok(Screen::Quit);
                }
                match menu.handle(MenuKey::from_code(key.code)) {
                    MenuOutcome::Stay => {}
                    MenuOutcome::Back => return Ok(Screen::Quit),
                    MenuOutcome::Chosen(item) => {
                        if let Some(screen) = self.choose(item, layout) {
                            return Ok(screen);
                        }
                    }
                }
            }
            self.notice.tick();
            render_main_menu(self.session.out(), layout, &menu, self.highscore, self.difficulty, &self.notice)?;
            self.clock.end();
        }
    }

    fn choose(&mut self, item: MainItem, layout: Layout) -> Option<Screen> {
        let (width, height) = layout.field_size();
        match item {
            MainItem::NewGame | MainItem::Multiplayer => {
                let multiplayer = item == MainItem::Multiplayer;
                let state = new_game(self.difficulty, multiplayer, width, height, &mut self.rng);
                Some(self.begin(state))
            }
            MainItem::LoadGame => match self.saves.load() {
                Some(record) => {
                    self.audio.update_settings(|settings| record.apply_sound(settings));
                    self.difficulty = record.difficulty;
                    let state = load_game(&record, width, height, &mut self.rng);
                    Some(self.begin(state))
                }
                None => {
                    self.notice.show("No saved game found.");
                    None
                }
            },
            MainItem::ChooseDifficulty => Some(Screen::Difficulty),
            MainItem::Settings => Some(Screen::Settings),
            MainItem::Quit => Some(Screen::Quit),
        }
    }

    fn begin(&mut self, state: AtaqueState) -> Screen {
        self.start_music();
        Screen::Game(Box::new(state))
    }

    fn difficulty_screen(&mut self) -> anyhow::Result<Screen> {
        let mut menu = difficulty_menu(self.difficulty);
        self.audio.start_loop(Cue::SpaceBridge);
        let next = 'menu: loop {
            self.clock.begin();
            let layout = self.layout()?;
            for key in self.pressed_keys() {
                if is_interrupt(&key) {
                    break 'menu Screen::Quit;
                }
                match menu.handle(MenuKey::from_code(key.code)) {
                    MenuOutcome::Stay => {}
                    MenuOutcome::Back => break 'menu Screen::MainMenu,
                    MenuOutcome::Chosen(difficulty) => {
                        tracing::info!(difficulty = difficulty.label(), "difficulty changed");
                        self.difficulty = difficulty;
                        break 'menu Screen::MainMenu;
                    }
                }
            }
            render_difficulty_menu(self.session.out(), layout, &menu)?;
            self.clock.end();
        };
        self.audio.stop(Cue::SpaceBridge);
        Ok(next)
    }

    fn settings_screen(&mut self) -> anyhow::Result<Screen> {
        let mut menu = settings_menu();
        self.audio.start_loop(Cue::SpaceBridge);
        let next = 'menu: loop {
            self.clock.begin();
            let layout = self.layout()?;
            for key in self.pressed_keys() {
                if is_interrupt(&key) {
                    break 'menu Screen::Quit;
                }
                let mut close = false;
                self.audio
                    .update_settings(|settings| close = settings_key(&mut menu, MenuKey::from_code(key.code), settings));
                if close {
                    break 'menu Screen::MainMenu;
                }
            }
            render_settings_menu(self.session.out(), layout, &menu, self.audio.settings())?;
            self.clock.end();
        };
        self.audio.stop(Cue::SpaceBridge);
        Ok(next)
    }

    // ── Gameplay ──────────────────────────────────────────────────────────────

    fn play(&mut self, mut state: AtaqueState) -> anyhow::Result<Screen> {
        let layout = self.layout()?;
        let mut keys = KeyTracker::new();
        let mut pause = pause_menu();
        let mut boss_theme_started: Option<u64> = None;
        let mut end_frames = 0;

        loop {
            let frame = self.clock.begin();

            let mut pointer = None;
            for event in self.rx.try_iter().collect::<Vec<_>>() {
                match event {
                    Event::Key(key) => {
                        if !keys.record(&key, frame) {
                            continue;
                        }
                        if is_interrupt(&key) {
                            return Ok(Screen::Quit);
                        }
                        let ended = matches!(state.status, GameStatus::GameOver | GameStatus::Victory);
                        if ended && end_frames < END_GRACE_FRAMES {
                            continue;
                        }
                        if let Some(screen) = self.on_key(&mut state, &mut pause, key.code) {
                            return Ok(screen);
                        }
                    }
                    Event::Mouse(MouseEvent { kind, column, row, .. }) if !state.multiplayer => {
                        if matches!(kind, MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)) {
                            pointer = Some(layout.to_field(column, row));
                        }
                    }
                    _ => {}
                }
            }

            let mut input = TickInput { pointer, ..TickInput::default() };
            for (slot, player) in input.players.iter_mut().zip(&state.players) {
                *slot = player_input(&keys, player.controls, frame);
            }

            let before = state.status;
            state = tick(&state, &input, &mut self.rng);
            self.play_cues(&state, &mut boss_theme_started, frame);

            match (before, state.status) {
                (GameStatus::Playing, GameStatus::GameOver) => {
                    tracing::info!(score = state.score, phase = state.phase + 1, "game over");
                    self.save(&state);
                }
                (GameStatus::Playing, GameStatus::Victory) => {
                    tracing::info!(score = state.score, "final boss defeated");
                    self.silence();
                    self.stop_music();
                    self.save(&state);
                }
                _ => {}
            }

            if state.status == GameStatus::Playing && state.lives <= LOW_LIVES {
                self.audio.start_loop(Cue::LowLives);
            } else {
                self.audio.stop(Cue::LowLives);
            }
            if let Some(started) = boss_theme_started {
                if frame.saturating_sub(started) >= BOSS_THEME_FRAMES {
                    self.audio.stop(Cue::BossFinal);
                    boss_theme_started = None;
                }
            }
            if matches!(state.status, GameStatus::GameOver | GameStatus::Victory) {
                end_frames += 1;
                if state.status == GameStatus::Victory && end_frames >= VICTORY_FRAMES {
                    return Ok(Screen::MainMenu);
                }
            }

            let overlay = match state.status {
                GameStatus::Paused => Overlay::Pause(&pause),
                GameStatus::PhaseVictory => Overlay::PhaseVictory,
                GameStatus::GameOver => Overlay::GameOver { highscore: self.highscore },
                GameStatus::Victory => Overlay::Victory { highscore: self.highscore },
                GameStatus::Playing => Overlay::None,
            };
            display::render(self.session.out(), &state, &self.sprites, layout, overlay)?;
            self.clock.end();
        }
    }

    /// One-shot reactions to a fresh key press. Returns the next screen when
    /// the game should end.
    fn on_key(
        &mut self,
        state: &mut AtaqueState,
        menu: &mut Menu<PauseItem>,
        code: KeyCode,
    ) -> Option<Screen> {
        match state.status {
            GameStatus::Playing if is_pause_key(code) => {
                *state = pause(state);
                *menu = pause_menu();
                self.audio.stop(Cue::LowLives);
                self.audio.start_loop(Cue::PauseGame);
                None
            }
            GameStatus::Paused => {
                let choice = match menu.handle(MenuKey::from_code(code)) {
                    MenuOutcome::Stay => return None,
                    MenuOutcome::Back => PauseItem::Continue,
                    MenuOutcome::Chosen(item) => item,
                };
                self.audio.stop(Cue::PauseGame);
                match choice {
                    PauseItem::Continue => {
                        *state = resume(state);
                        None
                    }
                    PauseItem::SaveToMenu => {
                        self.save(state);
                        self.silence();
                        Some(Screen::MainMenu)
                    }
                    PauseItem::SaveAndQuit => {
                        self.save(state);
                        Some(Screen::Quit)
                    }
                }
            }
            GameStatus::GameOver | GameStatus::Victory => {
                self.silence();
                Some(Screen::MainMenu)
            }
            _ => None,
        }
    }

    fn play_cues(&mut self, state: &AtaqueState, boss_theme_started: &mut Option<u64>, frame: u64) {
        for event in &state.events {
            match event {
                GameEvent::Shot => self.audio.play(Cue::Shoot),
                GameEvent::EnemyDestroyed | GameEvent::ShieldCollected => self.audio.play(Cue::Point),
                GameEvent::PlayerHit => self.audio.play(Cue::Hit),
                GameEvent::StarCollected => self.audio.play(Cue::CollectStar),
                GameEvent::BossSpawned => {
                    self.audio.play_tracked(Cue::BossFinal);
                    *boss_theme_started = Some(frame);
                }
                GameEvent::BossDefeated => {
                    self.audio.stop(Cue::BossFinal);
                    *boss_theme_started = None;
                    self.audio.play(Cue::BossExplosion);
                }
                GameEvent::PhaseCleared => {
                    self.audio.stop(Cue::LowLives);
                    self.audio.set_duck(PHASE_DUCK);
                    self.audio.start_loop(Cue::LoadLevels);
                }
                GameEvent::PhaseStarted => {
                    self.audio.stop(Cue::LoadLevels);
                    self.audio.set_duck(1.0);
                }
                GameEvent::GameOver => {
                    self.silence();
                    self.stop_music();
                    *boss_theme_started = None;
                    self.audio.play(Cue::GameOver);
                }
            }
        }
    }
}
