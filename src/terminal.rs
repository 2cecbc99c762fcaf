//! Terminal plumbing shared by every game: raw-mode session, a dedicated
//! input thread, held-key tracking and the fixed frame clock.

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Stdout};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use crate::config::FRAME;

// ── Session ───────────────────────────────────────────────────────────────────

/// Raw mode + alternate screen for the lifetime of the value. Dropping it
/// always restores the terminal, including on early returns and errors.
pub struct TerminalSession {
    out: BufWriter<Stdout>,
    keyboard_enhanced: bool,
    mouse: bool,
}

impl TerminalSession {
    pub fn enter(mouse: bool) -> std::io::Result<Self> {
        let mut out = BufWriter::new(stdout());

        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;

        // Request key-release (and key-repeat) events from the terminal.
        // Kitty-protocol terminals support this; others fall back gracefully.
        let keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .is_ok();

        if mouse {
            out.execute(EnableMouseCapture)?;
        }

        tracing::debug!(keyboard_enhanced, mouse, "terminal session started");
        Ok(TerminalSession { out, keyboard_enhanced, mouse })
    }

    pub fn out(&mut self) -> &mut BufWriter<Stdout> {
        &mut self.out
    }

    pub fn size(&self) -> std::io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.mouse {
            let _ = self.out.execute(DisableMouseCapture);
        }
        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// ── Input thread ──────────────────────────────────────────────────────────────

/// Dedicate a thread to blocking event reads so the game loop only ever
/// drains a channel.
pub fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "terminal input failed");
                break;
            }
        }
    });
    rx
}

/// Ctrl-C always quits, even in raw mode.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Block until a fresh key press, or until `timeout` elapses.
///
/// `frame` is the frame the previous screen ended on. Events already queued
/// are folded into `keys` and never count, and a key still held from the
/// previous screen only counts once it has been released or gone quiet for
/// `HOLD_WINDOW` frames.
pub fn wait_for_key(
    rx: &mpsc::Receiver<Event>,
    keys: &mut KeyTracker,
    frame: u64,
    timeout: Option<Duration>,
) -> Option<KeyEvent> {
    for event in rx.try_iter() {
        if let Event::Key(key) = event {
            keys.record(&key, frame);
        }
    }

    let start = Instant::now();
    let deadline = timeout.map(|t| start + t);
    loop {
        let event = match deadline {
            Some(deadline) => {
                let left = deadline.checked_duration_since(Instant::now())?;
                rx.recv_timeout(left).ok()?
            }
            None => rx.recv().ok()?,
        };
        let Event::Key(key) = event else { continue };
        let elapsed = (start.elapsed().as_millis() / FRAME.as_millis()) as u64;
        if keys.record(&key, frame + elapsed) {
            return Some(key);
        }
    }
}

// ── Held keys ─────────────────────────────────────────────────────────────────

/// A key counts as "held" if its last press/repeat event arrived within this
/// many frames. Covers terminals that never send key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so 4 frames (≈133 ms) is always refreshed
/// before it expires.
pub const HOLD_WINDOW: u64 = 4;

/// Records the frame each key was last seen so several keys can be acted on
/// in the same frame (Space + arrows, or two players at once).
///
/// * Keyboard-enhancement terminals send `Release` and keys are dropped
///   immediately.
/// * Classic terminals only send `Press` (OS repeat shows up as repeated
///   presses); keys expire after `HOLD_WINDOW` frames of silence.
#[derive(Debug, Default)]
pub struct KeyTracker {
    key_frame: HashMap<KeyCode, u64>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from one key event. Returns `true` for a fresh press, which is
    /// when one-shot actions (pause, quit, menu moves) should fire. A press
    /// of a key that is still held is OS auto-repeat and is not fresh.
    pub fn record(&mut self, key: &KeyEvent, frame: u64) -> bool {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Press => {
                let repeat = self.is_held(code, frame);
                self.key_frame.insert(code, frame);
                !repeat
            }
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, frame);
                false
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
                false
            }
        }
    }

    pub fn is_held(&self, key: KeyCode, frame: u64) -> bool {
        self.key_frame
            .get(&normalize(key))
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    pub fn any_held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|&k| self.is_held(k, frame))
    }

    pub fn clear(&mut self) {
        self.key_frame.clear();
    }
}

/// `A` and `a` are the same key for movement purposes.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

// ── Frame clock ───────────────────────────────────────────────────────────────

/// Caps a loop at the fixed frame rate by sleeping off the remainder.
pub struct FrameClock {
    frame_start: Instant,
    pub frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { frame_start: Instant::now(), frame: 0 }
    }

    /// Mark the start of a frame and return its number.
    pub fn begin(&mut self) -> u64 {
        self.frame_start = Instant::now();
        self.frame += 1;
        self.frame
    }

    pub fn end(&self) {
        let elapsed = self.frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

