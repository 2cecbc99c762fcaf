use std::sync::mpsc;

use anyhow::Context;
use crossterm::event::{Event, KeyCode};
use rand::thread_rng;

use terminal_arcade::assets::ResourceManager;
use terminal_arcade::config::{asset_dir, log_path, save_path};
use terminal_arcade::escape::compute::{init_state, tick};
use terminal_arcade::escape::display::{self, EscapeSprites, HUD_ROWS};
use terminal_arcade::escape::{EscapeInput, Status};
use terminal_arcade::logging::init_tracing;
use terminal_arcade::render::Layout;
use terminal_arcade::save::{SaveManager, ScoreRecord};
use terminal_arcade::terminal::{
    is_interrupt, spawn_input_thread, wait_for_key, FrameClock, KeyTracker, TerminalSession,
};

const GAME: &str = "space_escape";

const LEFT_KEYS: [KeyCode; 2] = [KeyCode::Left, KeyCode::Char('a')];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::Right, KeyCode::Char('d')];

fn main() -> anyhow::Result<()> {
    init_tracing(&log_path(GAME));

    let mut resources = ResourceManager::new(asset_dir());
    let sprites = EscapeSprites::load(&mut resources);
    let saves: SaveManager<ScoreRecord> = SaveManager::new(save_path(GAME));

    let mut session = TerminalSession::enter(false).context("cannot set up the terminal")?;
    let rx = spawn_input_thread();
    let result = run(&mut session, &rx, &sprites, &saves);
    drop(session);
    result
}

fn run(
    session: &mut TerminalSession,
    rx: &mpsc::Receiver<Event>,
    sprites: &EscapeSprites,
    saves: &SaveManager<ScoreRecord>,
) -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let best = saves.highscore();

    let (width, height) = session.size()?;
    let layout = Layout::new(width, height, HUD_ROWS);
    let (field_w, field_h) = layout.field_size();
    let mut state = init_state(field_w, field_h, &mut rng);

    let mut keys = KeyTracker::new();
    let mut clock = FrameClock::new();

    while state.status == Status::Playing {
        let frame = clock.begin();

        while let Ok(event) = rx.try_recv() {
            let Event::Key(key) = event else { continue };
            let fresh = keys.record(&key, frame);
            if !fresh {
                continue;
            }
            if is_interrupt(&key) || matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                tracing::info!(score = state.score, "player quit");
                saves.save(ScoreRecord { score: state.score, highscore: best });
                return Ok(());
            }
        }

        let input = EscapeInput {
            left: keys.any_held(&LEFT_KEYS, frame),
            right: keys.any_held(&RIGHT_KEYS, frame),
        };
        state = tick(&state, input, &mut rng);

        display::render(session.out(), &state, sprites, layout, best.max(state.score))?;
        clock.end();
    }

    let best = saves.save(ScoreRecord { score: state.score, highscore: best });
    display::render(session.out(), &state, sprites, layout, best)?;
    wait_for_key(rx, &mut keys, clock.frame, None);
    Ok(())
}
