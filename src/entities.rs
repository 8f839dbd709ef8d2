/// All game entity types — pure data, no logic.
///
/// Positions and sizes are in logical pixels of an 800×600 playfield; the
/// renderer scales them to the terminal.

use std::time::Duration;

// ── Playfield ─────────────────────────────────────────────────────────────────

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;

/// Logical size of one rendered glyph (one terminal cell).
pub const GLYPH_WIDTH: i32 = 10;
pub const GLYPH_HEIGHT: i32 = 20;

pub const PLAYER_WIDTH: i32 = 50;
pub const PLAYER_HEIGHT: i32 = 50;
pub const BULLET_WIDTH: i32 = 20;
pub const BULLET_HEIGHT: i32 = 40;

pub const INITIAL_LIVES: u32 = 3;
pub const POWER_UP_SIZE: i32 = 30;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

// ── Status & phases ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    TimeUp,
    NoLives,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    Paused,
    GameOver(EndReason),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// The Chinese prompt slides in from above.  `started_at` is game-clock
    /// time at phase entry; the dwell window counts from there.
    Prompt { started_at: Duration, y: i32 },
    /// Translation options are falling and can be shot.
    Falling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Swoosh played when a new prompt appears.
    Reveal,
    /// A bullet hit a word.
    Explosion,
    /// The player fired.
    Shoot,
    /// A power-up was collected or a new level reached.
    PowerUp,
}

// ── Round ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub index: usize,
    pub chinese: String,
    /// The correct translation of `chinese`.
    pub english: String,
    /// Exactly three unique words: `english` plus two distractors, shuffled.
    pub options: Vec<String>,
}

// ── Shootables & projectiles ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct FallingWord {
    pub text: String,
    pub x: i32,
    pub y: i32,
    /// Rendered text size; the padded box adds 40×20 around it.
    pub text_w: i32,
    pub text_h: i32,
    /// Pixels per frame.
    pub speed: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Words fall at half speed while active.
    SlowTime,
    /// Hits score twice while active.
    DoublePoints,
    /// One life back, never above `INITIAL_LIVES`.
    ExtraLife,
}

/// A power-up drifting down, collected by flying the ship into it.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub x: i32,
    pub y: i32,
    pub kind: PowerUpKind,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub lives: u32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub round: RoundState,
    pub phase: Phase,
    /// Words currently falling (only non-empty during `Phase::Falling`).
    pub words: Vec<FallingWord>,
    pub bullets: Vec<Bullet>,
    pub score: u32,
    /// Starts at 1; raises the points each hit is worth.
    pub level: u32,
    /// Best score of the session (updated live during play).
    pub best_score: u32,
    /// Words that dropped off the bottom unanswered.
    pub missed: u32,
    pub hits: u32,
    pub power_ups: Vec<PowerUp>,
    /// Timed effects and the frames each has left.
    pub active_power_ups: Vec<(PowerUpKind, u32)>,
    /// Game time of the last power-up spawn roll.
    pub last_power_up_roll: Duration,
    pub time_limit_secs: u64,
    pub remaining_secs: u64,
    pub status: GameStatus,
    pub frame: u64,
    /// Sound cues raised by the most recent update.
    pub cues: Vec<SoundCue>,
}
