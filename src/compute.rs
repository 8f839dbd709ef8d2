/// Pure game-logic functions.
///
/// Every state transition takes an immutable reference to the current
/// `GameState` (and, where needed, the word bank, the game clock reading and
/// an RNG handle) and returns a brand-new `GameState`.  Side effects are
/// limited to the injected RNG.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use unicode_width::UnicodeWidthStr;

use crate::entities::{
    Bullet, EndReason, FallingWord, GameState, GameStatus, Phase, Player, PowerUp, PowerUpKind,
    Rect, RoundState, SoundCue, BULLET_HEIGHT, BULLET_WIDTH, GLYPH_HEIGHT, GLYPH_WIDTH,
    INITIAL_LIVES, PLAYER_HEIGHT, PLAYER_WIDTH, POWER_UP_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::words::{WordBank, OPTIONS_PER_ROUND};

// ── Tuning ────────────────────────────────────────────────────────────────────

pub const HIT_SCORE: u32 = 10;

/// Padding added around a word's text to form its box.
pub const WORD_PAD_W: i32 = 40;
pub const WORD_PAD_H: i32 = 20;

pub const SPAWN_X_MIN: i32 = 50;
pub const SPAWN_X_MAX: i32 = SCREEN_WIDTH - 150;
pub const SPAWN_Y_MIN: i32 = -SCREEN_HEIGHT;
pub const SPAWN_Y_MAX: i32 = -50;
pub const FALL_SPEED_MIN: i32 = 1;
pub const FALL_SPEED_MAX: i32 = 3;

pub const PROMPT_START_Y: i32 = -100;
pub const PROMPT_TARGET_Y: i32 = SCREEN_HEIGHT / 2 - 50;
pub const PROMPT_SPEED: i32 = 5;
pub const PROMPT_DWELL: Duration = Duration::from_millis(4000);

pub const PLAYER_STEP: i32 = 20;
pub const PLAYER_Y: i32 = SCREEN_HEIGHT - PLAYER_HEIGHT - 20;
pub const BULLET_SPEED: i32 = 10;
pub const MAX_BULLETS: usize = 3;

/// Level `n` ends once the score reaches `LEVEL_SCORE_STEP * n`.
pub const LEVEL_SCORE_STEP: u32 = 1000;
/// Points grow by this factor per level above the first.
pub const LEVEL_POINTS_MULTIPLIER: f64 = 1.2;

pub const POWER_UP_ROLL_EVERY: Duration = Duration::from_secs(15);
pub const POWER_UP_CHANCE: f64 = 0.3;
pub const POWER_UP_FALL_SPEED: i32 = 2;
/// 10 s at 60 FPS.
pub const POWER_UP_FRAMES: u32 = 600;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Terminal cells a string occupies; CJK and full-width forms take two.
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Rendered size of a single line of text in logical pixels.
pub fn text_size(text: &str) -> (i32, i32) {
    (display_width(text) as i32 * GLYPH_WIDTH, GLYPH_HEIGHT)
}

pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// The padded frame drawn around a word; also its hit shape.
pub fn word_box(word: &FallingWord) -> Rect {
    Rect {
        x: word.x,
        y: word.y,
        w: word.text_w + WORD_PAD_W,
        h: word.text_h + WORD_PAD_H,
    }
}

pub fn bullet_rect(bullet: &Bullet) -> Rect {
    Rect { x: bullet.x, y: bullet.y, w: BULLET_WIDTH, h: BULLET_HEIGHT }
}

pub fn player_rect(player: &Player) -> Rect {
    Rect { x: player.x, y: player.y, w: PLAYER_WIDTH, h: PLAYER_HEIGHT }
}

pub fn power_up_rect(item: &PowerUp) -> Rect {
    Rect { x: item.x, y: item.y, w: POWER_UP_SIZE, h: POWER_UP_SIZE }
}

// ── Scoring & levels ──────────────────────────────────────────────────────────

/// Points for a hit worth `base` at `level`, floored.
pub fn points_for(base: u32, level: u32, double: bool) -> u32 {
    let base = if double { base * 2 } else { base };
    let scale = LEVEL_POINTS_MULTIPLIER.powi(level.saturating_sub(1) as i32);
    (base as f64 * scale).floor() as u32
}

/// At most one level per scoring event.
pub fn level_after(score: u32, level: u32) -> u32 {
    if score >= LEVEL_SCORE_STEP * level {
        level + 1
    } else {
        level
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

pub fn power_up_active(state: &GameState, kind: PowerUpKind) -> bool {
    state.active_power_ups.iter().any(|&(k, _)| k == kind)
}

pub fn spawn_power_up(rng: &mut impl Rng) -> PowerUp {
    let kind = match rng.gen_range(0..3) {
        0 => PowerUpKind::SlowTime,
        1 => PowerUpKind::DoublePoints,
        _ => PowerUpKind::ExtraLife,
    };
    PowerUp {
        x: rng.gen_range(50..=SCREEN_WIDTH - 50 - POWER_UP_SIZE),
        y: -POWER_UP_SIZE,
        kind,
    }
}

/// Timed kinds restart their full duration when collected again.  A life
/// lost earlier in the same frame is final.
fn collect_power_up(
    kind: PowerUpKind,
    lives: u32,
    active: &mut Vec<(PowerUpKind, u32)>,
) -> u32 {
    log::info!("collected {:?}", kind);
    match kind {
        PowerUpKind::ExtraLife if lives == 0 => 0,
        PowerUpKind::ExtraLife => (lives + 1).min(INITIAL_LIVES),
        timed => {
            active.retain(|&(k, _)| k != timed);
            active.push((timed, POWER_UP_FRAMES));
            lives
        }
    }
}

// ── Countdown ─────────────────────────────────────────────────────────────────

/// Whole seconds left, never negative.
pub fn remaining_seconds(elapsed: Duration, limit_secs: u64) -> u64 {
    limit_secs.saturating_sub(elapsed.as_secs())
}

pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ── Rounds & spawning ─────────────────────────────────────────────────────────

/// The correct translation for `round_index` plus distinct random
/// distractors, in random order.
pub fn pick_options(bank: &WordBank, round_index: usize, rng: &mut impl Rng) -> Vec<String> {
    let correct = bank.pair(round_index).english.as_str();
    let candidates = bank.distinct_english_except(correct);
    debug_assert!(candidates.len() >= OPTIONS_PER_ROUND - 1);

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, OPTIONS_PER_ROUND - 1)
        .map(|w| w.to_string())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

pub fn make_round(bank: &WordBank, round_index: usize, rng: &mut impl Rng) -> RoundState {
    let index = round_index % bank.len();
    let pair = bank.pair(index);
    RoundState {
        index,
        chinese: pair.chinese.clone(),
        english: pair.english.clone(),
        options: pick_options(bank, index, rng),
    }
}

/// A new word somewhere above the screen, so a round's words cascade in at
/// staggered times.
pub fn spawn_word(text: &str, rng: &mut impl Rng) -> FallingWord {
    let (text_w, text_h) = text_size(text);
    FallingWord {
        text: text.to_string(),
        x: rng.gen_range(SPAWN_X_MIN..=SPAWN_X_MAX),
        y: rng.gen_range(SPAWN_Y_MIN..=SPAWN_Y_MAX),
        text_w,
        text_h,
        speed: rng.gen_range(FALL_SPEED_MIN..=FALL_SPEED_MAX),
    }
}

// ── Constructors ──────────────────────────────────────────────────────────────

/// Build a fresh game on round 0.  `best_score` carries over between games.
pub fn init_state(
    bank: &WordBank,
    time_limit_secs: u64,
    best_score: u32,
    rng: &mut impl Rng,
) -> GameState {
    GameState {
        player: Player {
            x: (SCREEN_WIDTH - PLAYER_WIDTH) / 2,
            y: PLAYER_Y,
            lives: INITIAL_LIVES,
        },
        round: make_round(bank, 0, rng),
        phase: Phase::Prompt { started_at: Duration::ZERO, y: PROMPT_START_Y },
        words: Vec::new(),
        bullets: Vec::new(),
        score: 0,
        level: 1,
        best_score,
        missed: 0,
        hits: 0,
        power_ups: Vec::new(),
        active_power_ups: Vec::new(),
        last_power_up_roll: Duration::ZERO,
        time_limit_secs,
        remaining_secs: time_limit_secs,
        status: GameStatus::Playing,
        frame: 0,
        cues: vec![SoundCue::Reveal],
    }
}

/// Start round `round_index` (wrapping around the bank) at game time `now`:
/// new options, prompt animation from the top, reveal cue.
pub fn reset_round(
    state: &GameState,
    bank: &WordBank,
    round_index: usize,
    now: Duration,
    rng: &mut impl Rng,
) -> GameState {
    let round = make_round(bank, round_index, rng);
    log::debug!("round {}: {} -> {:?}", round.index, round.chinese, round.options);

    let mut cues = state.cues.clone();
    cues.push(SoundCue::Reveal);
    GameState {
        round,
        phase: Phase::Prompt { started_at: now, y: PROMPT_START_Y },
        words: Vec::new(),
        cues,
        ..state.clone()
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn move_player_left(state: &GameState) -> GameState {
    let new_x = (state.player.x - PLAYER_STEP).max(0);
    GameState {
        player: Player { x: new_x, ..state.player.clone() },
        ..state.clone()
    }
}

pub fn move_player_right(state: &GameState) -> GameState {
    let new_x = (state.player.x + PLAYER_STEP).min(SCREEN_WIDTH - PLAYER_WIDTH);
    GameState {
        player: Player { x: new_x, ..state.player.clone() },
        ..state.clone()
    }
}

/// Fire a bullet from the ship's nose — capped at `MAX_BULLETS` in flight.
pub fn player_shoot(state: &GameState) -> GameState {
    if state.status != GameStatus::Playing || state.bullets.len() >= MAX_BULLETS {
        return state.clone();
    }
    let mut bullets = state.bullets.clone();
    bullets.push(Bullet {
        x: state.player.x + PLAYER_WIDTH / 2 - BULLET_WIDTH / 2,
        y: state.player.y - BULLET_HEIGHT,
    });
    let mut cues = state.cues.clone();
    cues.push(SoundCue::Shoot);
    GameState { bullets, cues, ..state.clone() }
}

pub fn toggle_pause(state: &GameState) -> GameState {
    let status = match state.status {
        GameStatus::Playing => GameStatus::Paused,
        GameStatus::Paused => GameStatus::Playing,
        ref over => over.clone(),
    };
    GameState { status, ..state.clone() }
}

// ── Collision ─────────────────────────────────────────────────────────────────

/// All `(bullet_index, word_index)` hits this frame.  Each bullet and each
/// word appears at most once; the first overlapping word wins.
pub fn find_hits(bullets: &[Bullet], words: &[FallingWord]) -> Vec<(usize, usize)> {
    let mut hits: Vec<(usize, usize)> = Vec::new();
    for (bi, bullet) in bullets.iter().enumerate() {
        let br = bullet_rect(bullet);
        let target = (0..words.len()).find(|&wi| {
            !hits.iter().any(|&(_, w)| w == wi) && rects_overlap(&br, &word_box(&words[wi]))
        });
        if let Some(wi) = target {
            hits.push((bi, wi));
        }
    }
    hits
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by one frame at game time `elapsed`.  All
/// randomness comes through `rng` so callers control determinism.
pub fn tick(
    state: &GameState,
    bank: &WordBank,
    elapsed: Duration,
    rng: &mut impl Rng,
) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    let frame = state.frame + 1;
    let remaining_secs = remaining_seconds(elapsed, state.time_limit_secs);
    let mut cues = state.cues.clone();

    // ── 1. Move bullets ──────────────────────────────────────────────────────
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .filter_map(|b| {
            let new_y = b.y - BULLET_SPEED;
            if new_y + BULLET_HEIGHT < 0 {
                None
            } else {
                Some(Bullet { y: new_y, ..b.clone() })
            }
        })
        .collect();

    let mut lives = state.player.lives;
    let mut score = state.score;
    let mut level = state.level;
    let mut missed = state.missed;
    let mut hits = state.hits;
    let mut round_resolved = false;

    let slow = power_up_active(state, PowerUpKind::SlowTime);
    let double = power_up_active(state, PowerUpKind::DoublePoints);
    let ship = player_rect(&state.player);

    let (phase, words, bullets) = match state.phase {
        // ── 2a. Prompt: slide in, then release the options ───────────────────
        Phase::Prompt { started_at, y } => {
            let y = if y < PROMPT_TARGET_Y { y + PROMPT_SPEED } else { y };
            if elapsed.saturating_sub(started_at) > PROMPT_DWELL {
                let words: Vec<FallingWord> = state
                    .round
                    .options
                    .iter()
                    .map(|w| spawn_word(w, rng))
                    .collect();
                (Phase::Falling, words, bullets)
            } else {
                (Phase::Prompt { started_at, y }, Vec::new(), bullets)
            }
        }

        // ── 2b. Falling: move, drop misses and rams, resolve hits ────────────
        Phase::Falling => {
            let mut words: Vec<FallingWord> = Vec::with_capacity(state.words.len());
            for w in &state.words {
                // half speed: move on even frames only
                let step = if slow && frame % 2 == 1 { 0 } else { w.speed };
                let moved = FallingWord { y: w.y + step, ..w.clone() };
                if moved.y > SCREEN_HEIGHT {
                    missed += 1;
                    if moved.text == state.round.english {
                        lives = lives.saturating_sub(1);
                        log::info!("missed '{}', {} lives left", moved.text, lives);
                    }
                } else if rects_overlap(&ship, &word_box(&moved)) {
                    lives = lives.saturating_sub(1);
                    cues.push(SoundCue::Explosion);
                    log::info!("'{}' rammed the ship, {} lives left", moved.text, lives);
                } else {
                    words.push(moved);
                }
            }

            let hit_pairs = find_hits(&bullets, &words);
            for &(_, wi) in &hit_pairs {
                log::debug!("hit '{}'", words[wi].text);
                score += points_for(HIT_SCORE, level, double);
                hits += 1;
                cues.push(SoundCue::Explosion);
                let next_level = level_after(score, level);
                if next_level != level {
                    log::info!("level {} at score {}", next_level, score);
                    level = next_level;
                    cues.push(SoundCue::PowerUp);
                }
            }

            let words: Vec<FallingWord> = words
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !hit_pairs.iter().any(|&(_, w)| w == *i))
                .map(|(_, w)| w)
                .collect();
            let bullets: Vec<Bullet> = bullets
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !hit_pairs.iter().any(|&(b, _)| b == *i))
                .map(|(_, b)| b)
                .collect();

            round_resolved = words.is_empty();
            (Phase::Falling, words, bullets)
        }
    };

    // ── 3. Power-ups: expire, fall, collect, maybe spawn ─────────────────────
    let mut active_power_ups: Vec<(PowerUpKind, u32)> = state
        .active_power_ups
        .iter()
        .filter(|&&(_, left)| left > 1)
        .map(|&(k, left)| (k, left - 1))
        .collect();

    let mut power_ups: Vec<PowerUp> = Vec::with_capacity(state.power_ups.len() + 1);
    for item in &state.power_ups {
        let moved = PowerUp { y: item.y + POWER_UP_FALL_SPEED, ..item.clone() };
        if moved.y > SCREEN_HEIGHT {
            continue;
        }
        if rects_overlap(&ship, &power_up_rect(&moved)) {
            lives = collect_power_up(moved.kind, lives, &mut active_power_ups);
            cues.push(SoundCue::PowerUp);
        } else {
            power_ups.push(moved);
        }
    }

    let mut last_power_up_roll = state.last_power_up_roll;
    if elapsed.saturating_sub(last_power_up_roll) >= POWER_UP_ROLL_EVERY {
        last_power_up_roll = elapsed;
        if rng.gen_bool(POWER_UP_CHANCE) {
            let item = spawn_power_up(rng);
            log::debug!("power-up {:?} at x={}", item.kind, item.x);
            power_ups.push(item);
        }
    }

    // ── 4. End conditions ────────────────────────────────────────────────────
    let status = if remaining_secs == 0 {
        GameStatus::GameOver(EndReason::TimeUp)
    } else if lives == 0 {
        GameStatus::GameOver(EndReason::NoLives)
    } else {
        GameStatus::Playing
    };
    if let GameStatus::GameOver(reason) = &status {
        log::info!("game over ({:?}) with score {}", reason, score);
    }

    let next = GameState {
        player: Player { lives, ..state.player.clone() },
        phase,
        words,
        bullets,
        score,
        level,
        best_score: state.best_score.max(score),
        missed,
        hits,
        power_ups,
        active_power_ups,
        last_power_up_roll,
        remaining_secs,
        status,
        frame,
        cues,
        ..state.clone()
    };

    // ── 5. Next round once every option is resolved ──────────────────────────
    if round_resolved && next.status == GameStatus::Playing {
        reset_round(&next, bank, next.round.index + 1, elapsed, rng)
    } else {
        next
    }
}
