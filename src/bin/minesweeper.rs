use std::sync::mpsc;

use anyhow::Context;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use rand::thread_rng;

use terminal_arcade::assets::{GlyphSheet, ResourceManager};
use terminal_arcade::audio::{AudioEngine, Cue, SoundSettings};
use terminal_arcade::config::{asset_dir, log_path, save_path};
use terminal_arcade::logging::init_tracing;
use terminal_arcade::minesweeper::compute::{move_cursor, new_game, reveal, toggle_flag};
use terminal_arcade::minesweeper::display::{self, cell_at};
use terminal_arcade::minesweeper::score::final_score;
use terminal_arcade::minesweeper::{Minesweeper, ScoreKeeper, Status};
use terminal_arcade::save::{SaveManager, ScoreRecord};
use terminal_arcade::terminal::{is_interrupt, spawn_input_thread, FrameClock, TerminalSession};

const GAME: &str = "minesweeper";

enum Action {
    Continue,
    Restart,
    Quit,
}

fn main() -> anyhow::Result<()> {
    init_tracing(&log_path(GAME));

    let mut resources = ResourceManager::new(asset_dir());
    let sheet = resources
        .load_glyph_sheet("minesweeper/cells")
        .with_context(|| format!("cannot load the cell sheet from {}", resources.root().display()))?;

    let mut audio = AudioEngine::new(SoundSettings::default());
    resources.load_sound(&mut audio, Cue::Explosion.key(), "minesweeper/explosion");

    let saves: SaveManager<ScoreRecord> = SaveManager::new(save_path(GAME));

    let mut session = TerminalSession::enter(true).context("cannot set up the terminal")?;
    let rx = spawn_input_thread();
    let result = run(&mut session, &rx, &sheet, &mut audio, &saves);
    drop(session);
    result
}

fn run(
    session: &mut TerminalSession,
    rx: &mpsc::Receiver<Event>,
    sheet: &GlyphSheet,
    audio: &mut AudioEngine,
    saves: &SaveManager<ScoreRecord>,
) -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let mut scores = ScoreKeeper::new(saves);
    let mut clock = FrameClock::new();

    loop {
        let mut state = new_game(&mut rng);
        scores.next_field();
        tracing::info!(mines = state.grid.mine_count(), "new minefield");

        let action = loop {
            clock.begin();
            let mut action = Action::Continue;
            while let Ok(event) = rx.try_recv() {
                let before = state.status;
                let (next, act) = handle_event(&state, event);
                state = next;
                if before == Status::Playing && state.status == Status::Exploded {
                    audio.play(Cue::Explosion);
                }
                if !matches!(act, Action::Continue) {
                    action = act;
                    break;
                }
            }

            if state.status != Status::Playing && !scores.is_recorded() {
                tracing::info!(status = ?state.status, score = state.score, "minefield finished");
                scores.record(&state);
            }
            if !matches!(action, Action::Continue) {
                break action;
            }

            display::render(session.out(), &state, sheet, scores.best().max(final_score(&state)))?;
            clock.end();
        };

        scores.record(&state);
        if matches!(action, Action::Quit) {
            return Ok(());
        }
    }
}

fn handle_event(state: &Minesweeper, event: Event) -> (Minesweeper, Action) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        Event::Mouse(MouseEvent { kind: MouseEventKind::Down(button), column, row, .. }) => {
            let Some((r, c)) = cell_at(column, row, state.grid.size) else {
                return (state.clone(), Action::Continue);
            };
            let next = match button {
                MouseButton::Left => reveal(state, r, c),
                MouseButton::Right => toggle_flag(state, r, c),
                MouseButton::Middle => state.clone(),
            };
            (next, Action::Continue)
        }
        _ => (state.clone(), Action::Continue),
    }
}

fn handle_key(state: &Minesweeper, key: KeyEvent) -> (Minesweeper, Action) {
    if is_interrupt(&key) {
        return (state.clone(), Action::Quit);
    }
    let (row, col) = state.cursor;
    let next = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return (state.clone(), Action::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => return (state.clone(), Action::Restart),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => move_cursor(state, -1, 0),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => move_cursor(state, 1, 0),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => move_cursor(state, 0, -1),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => move_cursor(state, 0, 1),
        KeyCode::Char(' ') | KeyCode::Enter => reveal(state, row, col),
        KeyCode::Char('f') | KeyCode::Char('F') => toggle_flag(state, row, col),
        _ => state.clone(),
    };
    (next, Action::Continue)
}
