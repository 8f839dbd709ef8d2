/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands, scaling the logical 800×600 playfield onto
/// whatever terminal size is available.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use word_invaders::assets::{GameAssets, ImageAsset};
use word_invaders::compute::{display_width, format_countdown, word_box, WORD_PAD_H};
use word_invaders::entities::{
    Bullet, EndReason, FallingWord, GameState, GameStatus, Phase, PowerUp, PowerUpKind,
    BULLET_WIDTH, PLAYER_WIDTH, POWER_UP_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_TIMER: Color = Color::White;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_ROUND: Color = Color::Cyan;
const C_HUD_LEVEL: Color = Color::Green;
const C_BOX_BG: Color = Color::White;
const C_BOX_TEXT: Color = Color::Black;
const C_HINT: Color = Color::DarkGrey;
const C_BONUS_SLOW: Color = Color::Cyan;
const C_BONUS_DOUBLE: Color = Color::Yellow;
const C_BONUS_LIFE: Color = Color::Magenta;
const C_POWERUP_ACTIVE: Color = Color::Yellow;

/// Sprite colours, taken from the loaded images when there are any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Option<Color>,
    pub player: Color,
    pub bullet: Color,
    pub lives: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: None,
            player: Color::White,
            bullet: Color::Cyan,
            lives: Color::Red,
        }
    }
}

fn tint(image: &ImageAsset) -> Option<Color> {
    image.average_rgb().map(|(r, g, b)| Color::Rgb { r, g, b })
}

impl Palette {
    pub fn from_assets(assets: Option<&GameAssets>) -> Self {
        let fallback = Self::default();
        let Some(a) = assets else {
            return fallback;
        };
        Self {
            background: tint(&a.background),
            player: tint(&a.spaceship).unwrap_or(fallback.player),
            bullet: tint(&a.bullet).unwrap_or(fallback.bullet),
            lives: tint(&a.heart).unwrap_or(fallback.lives),
        }
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Terminal area the playfield is drawn into.
///
/// Row 0 is the HUD, rows 1 and `rows - 2` are the border, the last row is
/// the controls hint.  Everything in between is playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    fn play_cols(&self) -> i32 {
        self.cols.saturating_sub(2) as i32
    }

    fn play_rows(&self) -> i32 {
        self.rows.saturating_sub(4) as i32
    }

    /// Terminal cell for a logical point, or `None` when it is off the
    /// playfield.
    pub fn to_cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if !(0..SCREEN_WIDTH).contains(&x) || !(0..SCREEN_HEIGHT).contains(&y) {
            return None;
        }
        if self.play_cols() <= 0 || self.play_rows() <= 0 {
            return None;
        }
        let col = 1 + x * self.play_cols() / SCREEN_WIDTH;
        let row = 2 + y * self.play_rows() / SCREEN_HEIGHT;
        Some((col as u16, row as u16))
    }

    /// Logical width in cells, at least one.
    pub fn width_cells(&self, w: i32) -> usize {
        ((w * self.play_cols()) / SCREEN_WIDTH).max(1) as usize
    }

    /// Cells available from `col` up to the right border.
    fn room_from(&self, col: u16) -> usize {
        self.cols.saturating_sub(1).saturating_sub(col) as usize
    }
}

/// Truncate `text` to at most `cells` terminal cells.
pub fn fit(text: &str, cells: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = display_width(c.encode_utf8(&mut [0; 4]));
        if used + w > cells {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// Centre `text` in a field `cells` wide.
fn pad_centered(text: &str, cells: usize) -> String {
    let w = display_width(text);
    if w >= cells {
        return fit(text, cells);
    }
    let left = (cells - w) / 2;
    let right = cells - w - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
    palette: &Palette,
) -> std::io::Result<()> {
    // Clear paints with the current background colour
    match palette.background {
        Some(bg) => out.queue(style::SetBackgroundColor(bg))?,
        None => out.queue(style::ResetColor)?,
    };
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view, palette)?;

    match state.phase {
        Phase::Prompt { y, .. } => draw_prompt(out, state, y, view)?,
        Phase::Falling => {
            for word in &state.words {
                draw_word(out, word, view)?;
            }
        }
    }
    for item in &state.power_ups {
        draw_power_up(out, item, view)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, bullet, view, palette)?;
    }

    draw_player(out, state, view, palette)?;
    draw_controls_hint(out, view)?;

    match state.status {
        GameStatus::Paused => draw_paused(out, view)?,
        GameStatus::GameOver(reason) => draw_game_over(out, state, reason, view)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
    palette: &Palette,
) -> std::io::Result<()> {
    // Countdown and score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIMER))?;
    out.queue(Print(format_countdown(state.remaining_secs)))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("  Score: {:>5}", state.score)))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("  Lv {}", state.level)))?;
    for &(kind, frames) in &state.active_power_ups {
        out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
        out.queue(Print(format!("  {} {}s", power_up_label(kind), (frames + 59) / 60)))?;
    }

    // Round — centre
    let round_str = format!("[ ROUND {} ]", state.round.index + 1);
    let rx = (view.cols / 2).saturating_sub(round_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_ROUND))?;
    out.queue(Print(&round_str))?;

    // Lives — right
    let hearts: String = "♥".repeat(state.player.lives as usize);
    let lives_text = format!("Lives: {}", hearts);
    let lx = view
        .cols
        .saturating_sub(lives_text.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(palette.lives))?;
    out.queue(Print(&lives_text))?;

    Ok(())
}

// ── Prompt & words ────────────────────────────────────────────────────────────

fn draw_boxed<W: Write>(out: &mut W, col: u16, row: u16, text: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetBackgroundColor(C_BOX_BG))?;
    out.queue(style::SetForegroundColor(C_BOX_TEXT))?;
    out.queue(Print(text))?;
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_prompt<W: Write>(
    out: &mut W,
    state: &GameState,
    y: i32,
    view: Viewport,
) -> std::io::Result<()> {
    // Text sits 10 px below the box top, like the word boxes
    let text_y = y + WORD_PAD_H / 2;
    if text_y < 0 {
        return Ok(());
    }
    let label = format!("   {}   ", state.round.chinese);
    let cells = display_width(&label);
    let col = (view.cols / 2).saturating_sub(cells as u16 / 2);
    if let Some((_, row)) = view.to_cell(0, text_y) {
        draw_boxed(out, col, row, &label)?;
    }
    Ok(())
}

fn draw_word<W: Write>(out: &mut W, word: &FallingWord, view: Viewport) -> std::io::Result<()> {
    let frame = word_box(word);
    let text_y = word.y + WORD_PAD_H / 2;
    if let Some((col, row)) = view.to_cell(frame.x, text_y) {
        let cells = view.width_cells(frame.w).min(view.room_from(col));
        draw_boxed(out, col, row, &pad_centered(&word.text, cells))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    state: &GameState,
    view: Viewport,
    palette: &Palette,
) -> std::io::Result<()> {
    //   ▲       ← tip
    //  /|\      ← wings + fuselage
    let p = &state.player;
    let Some((col, row)) = view.to_cell(p.x + PLAYER_WIDTH / 2, p.y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(palette.player))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;

    let wing_row = row + 1;
    if wing_row < view.rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), wing_row))?;
        out.queue(Print("/|\\"))?;
    }
    Ok(())
}

fn draw_bullet<W: Write>(
    out: &mut W,
    bullet: &Bullet,
    view: Viewport,
    palette: &Palette,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_cell(bullet.x + BULLET_WIDTH / 2, bullet.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(palette.bullet))?;
        out.queue(Print("║"))?;
    }
    Ok(())
}

fn power_up_label(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::SlowTime => "SLOW",
        PowerUpKind::DoublePoints => "x2",
        PowerUpKind::ExtraLife => "+1",
    }
}

fn draw_power_up<W: Write>(out: &mut W, item: &PowerUp, view: Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(item.x + POWER_UP_SIZE / 2, item.y) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(col, row))?;
    match item.kind {
        PowerUpKind::SlowTime => {
            out.queue(style::SetForegroundColor(C_BONUS_SLOW))?;
            out.queue(Print("◷"))?;
        }
        PowerUpKind::DoublePoints => {
            out.queue(style::SetForegroundColor(C_BONUS_DOUBLE))?;
            out.queue(Print("★"))?;
        }
        PowerUpKind::ExtraLife => {
            out.queue(style::SetForegroundColor(C_BONUS_LIFE))?;
            out.queue(Print("♥"))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(fit(
        "← → / A D : Move   SPACE : Shoot   P : Pause   M : Mute   Q : Quit",
        view.cols.saturating_sub(2) as usize,
    )))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered_lines<W: Write>(
    out: &mut W,
    lines: &[(&str, Color)],
    view: Viewport,
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(display_width(msg) as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_paused<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Cyan),
        ("║      PAUSED      ║", Color::Cyan),
        ("╚══════════════════╝", Color::Cyan),
        ("P - Resume  Q - Quit", Color::White),
    ];
    draw_centered_lines(out, lines, view)
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    reason: EndReason,
    view: Viewport,
) -> std::io::Result<()> {
    let why = match reason {
        EndReason::TimeUp => "Time's up!",
        EndReason::NoLives => "Out of lives!",
    };
    let score_line = format!("Final Score: {}", state.score);
    let best_line = format!("Best Score: {}", state.best_score);
    let tally_line = format!(
        "Level: {}   Hits: {}   Missed: {}",
        state.level, state.hits, state.missed
    );
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (why, Color::White),
        (&score_line, Color::Yellow),
        (&best_line, Color::Yellow),
        (&tally_line, Color::DarkGrey),
        ("R - Play Again  Q - Quit", Color::White),
    ];
    draw_centered_lines(out, lines, view)
}
