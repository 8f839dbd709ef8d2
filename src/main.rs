mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use word_invaders::assets::{AssetLoader, GameAssets};
use word_invaders::audio::AudioManager;
use word_invaders::clock::GameClock;
use word_invaders::compute::{
    init_state, move_player_left, move_player_right, player_shoot, tick, toggle_pause,
};
use word_invaders::config::Args;
use word_invaders::entities::{GameState, GameStatus, SoundCue};
use word_invaders::words::WordBank;

use display::{Palette, Viewport};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between ship movements while a direction key is held.
const MOVE_COOLDOWN: u32 = 3;

/// Min frames between shots while Space is held.
const SHOOT_COOLDOWN: u32 = 15;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Everything a game needs besides the terminal.
struct Session {
    bank: WordBank,
    audio: AudioManager,
    palette: Palette,
    rng: StdRng,
    time_limit: u64,
    best_score: u32,
}

// ── Menu ──────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum MenuResult {
    Start,
    Quit,
}

fn menu_choice(code: KeyCode) -> Option<MenuResult> {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(MenuResult::Start),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(MenuResult::Quit),
        _ => None,
    }
}

/// Block until a menu key arrives.  A closed channel means input is gone.
fn wait_for_choice(rx: &mpsc::Receiver<Event>) -> MenuResult {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => {
                if let Some(choice) = menu_choice(code) {
                    return choice;
                }
            }
            Ok(_) => {}
            Err(_) => {
                log::warn!("input channel closed");
                return MenuResult::Quit;
            }
        }
    }
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &Session,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  WORD  INVADERS  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if session.best_score > 0 {
        let hs_str = format!("Best Score: {}", session.best_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    let how_to = [
        "A Chinese word drops in from the top.",
        "Its English translation and two decoys follow.",
        "Shoot the words before they land: +10 per hit.",
        "Let the correct translation fall, or a word hit you: -1 life.",
        "Catch falling power-ups: ◷ slow time, ★ double points, ♥ life.",
    ];
    for (i, line) in how_to.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(26), cy.saturating_sub(3) + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(*line))?;
    }

    let minutes = session.time_limit / 60;
    let seconds = session.time_limit % 60;
    out.queue(cursor::MoveTo(cx.saturating_sub(26), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!(
        "{} word pairs, {}:{:02} on the clock, 3 lives.",
        session.bank.len(),
        minutes,
        seconds
    )))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(26), cy + 5))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print("[ENTER] Start   [Q] Quit"))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(26), cy + 7))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   P : Pause   M : Mute"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    Ok(wait_for_choice(rx))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Voice the cues raised this frame.  Sounded explosions ring the bell.
fn play_cues<W: Write>(
    out: &mut W,
    state: &mut GameState,
    audio: &mut AudioManager,
) -> std::io::Result<()> {
    let mut bell = false;
    for cue in std::mem::take(&mut state.cues) {
        if audio.play(cue) && cue == SoundCue::Explosion {
            bell = true;
        }
    }
    if bell {
        out.queue(Print('\x07'))?;
        out.flush()?;
    }
    Ok(())
}

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame, keys still "fresh" (within
/// `HOLD_WINDOW` frames) apply their effects together, so Space and A/D can
/// be held at the same time.  Terminals with key-release reporting drop keys
/// on release; others let them expire.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut move_cooldown: u32 = 0;
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut clock = GameClock::start(Instant::now());

    session.audio.start_music();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            *state = toggle_pause(state);
                            match state.status {
                                GameStatus::Paused => clock.pause(Instant::now()),
                                GameStatus::Playing => clock.resume(Instant::now()),
                                GameStatus::GameOver(_) => {}
                            }
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => {
                            let muted = !session.audio.is_muted();
                            session.audio.set_muted(muted);
                            if !muted {
                                session.audio.start_music();
                            }
                            log::info!(
                                "muted: {}, music playing: {}",
                                muted,
                                session.audio.music_playing()
                            );
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if matches!(state.status, GameStatus::GameOver(_)) =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            let left = is_held(&key_frame, &KeyCode::Left, frame)
                || is_held(&key_frame, &KeyCode::Char('a'), frame)
                || is_held(&key_frame, &KeyCode::Char('A'), frame);
            let right = is_held(&key_frame, &KeyCode::Right, frame)
                || is_held(&key_frame, &KeyCode::Char('d'), frame)
                || is_held(&key_frame, &KeyCode::Char('D'), frame);
            let shoot = is_held(&key_frame, &KeyCode::Char(' '), frame);

            if move_cooldown == 0 {
                if left {
                    *state = move_player_left(state);
                    move_cooldown = MOVE_COOLDOWN;
                } else if right {
                    *state = move_player_right(state);
                    move_cooldown = MOVE_COOLDOWN;
                }
            }

            if shoot_cooldown == 0 && shoot {
                *state = player_shoot(state);
                shoot_cooldown = SHOOT_COOLDOWN;
            }

            *state = tick(state, &session.bank, clock.elapsed_at(Instant::now()), &mut session.rng);
        }

        move_cooldown = move_cooldown.saturating_sub(1);
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        let (cols, rows) = terminal::size()?;
        display::render(out, state, Viewport::new(cols, rows), &session.palette)?;
        play_cues(out, state, &mut session.audio)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        // stderr shares the screen with the game; keep it quiet
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"))
                .init();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let bank = match &args.words {
        Some(path) => WordBank::load(path)
            .with_context(|| format!("failed to load word list {}", path.display()))?,
        None => WordBank::builtin(),
    };

    // Assets are checked before the terminal is taken over so a failure
    // prints plainly and the process exits non-zero.
    let assets = if args.skip_assets {
        log::warn!("running without assets");
        None
    } else {
        let root = args.assets.clone().unwrap_or_else(AssetLoader::default_root);
        let loader = AssetLoader::new(root);
        match GameAssets::load_all(&loader) {
            Ok(assets) => Some(assets),
            Err(e) => {
                log::error!("{e}");
                let path = e.path().to_path_buf();
                return Err(e).with_context(|| {
                    format!(
                        "cannot use {} (use --skip-assets to play without assets)",
                        path.display()
                    )
                });
            }
        }
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session {
        bank,
        audio: AudioManager::new(assets.as_ref(), args.mute),
        palette: Palette::from_assets(assets.as_ref()),
        rng,
        time_limit: args.time_limit,
        best_score: 0,
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &mut session);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result?;
    Ok(())
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx, session)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let mut state = init_state(
                    &session.bank,
                    session.time_limit,
                    session.best_score,
                    &mut session.rng,
                );
                log::info!("new game, {}s on the clock", session.time_limit);
                let quit = game_loop(out, &mut state, session, rx)?;

                session.best_score = session.best_score.max(state.best_score);
                log::info!("game ended: score {}, best {}", state.score, session.best_score);

                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_keys_map_to_choices() {
        assert_eq!(menu_choice(KeyCode::Enter), Some(MenuResult::Start));
        assert_eq!(menu_choice(KeyCode::Char(' ')), Some(MenuResult::Start));
        assert_eq!(menu_choice(KeyCode::Esc), Some(MenuResult::Quit));
        assert_eq!(menu_choice(KeyCode::Char('x')), None);
    }

    #[test]
    fn menu_skips_other_events_until_a_choice() {
        let (tx, rx) = mpsc::channel();
        tx.send(Event::FocusGained).unwrap();
        tx.send(Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE))).unwrap();
        tx.send(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))).unwrap();
        assert_eq!(wait_for_choice(&rx), MenuResult::Start);
    }

    #[test]
    fn closed_input_channel_quits_the_menu() {
        let (tx, rx) = mpsc::channel::<Event>();
        drop(tx);
        assert_eq!(wait_for_choice(&rx), MenuResult::Quit);
    }
}
