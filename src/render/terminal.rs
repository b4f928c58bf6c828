//! Terminal presentation
//!
//! [`compose`] turns a [`Snapshot`] into a [`Canvas`] of coloured cells,
//! scaling world pixels onto whatever grid the terminal currently has.
//! [`TerminalOutput`] owns the terminal modes and flushes canvases to stdout.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use glam::Vec2;
use thiserror::Error;

use super::snapshot::{BulletView, Snapshot};
use crate::assets::Backdrop;
use crate::sim::{BulletOwner, GamePhase, Rgba};

/// Smallest grid the playfield is drawn on
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 12;

const SPACE_BACKGROUND: Rgba = Rgba::rgb(8, 8, 24);
const STAR: Rgba = Rgba::rgb(90, 90, 120);
const TEXT: Rgba = Rgba::rgb(255, 255, 255);
const PLACEHOLDER: Rgba = Rgba::rgb(128, 128, 128);
const WARNING: Rgba = Rgba::rgb(255, 0, 0);
const PLAYER_COLOR: Rgba = Rgba::rgb(120, 200, 255);
const ROCKET_COLOR: Rgba = Rgba::rgb(230, 90, 60);
const HP_FULL: Rgba = Rgba::rgb(60, 200, 90);
const HP_EMPTY: Rgba = Rgba::rgb(70, 70, 70);

/// Terminal output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Terminal not available")]
    NotAvailable,
}

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgba,
    pub bg: Rgba,
}

/// A grid of cells, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, bg: Rgba) -> Self {
        let blank = Cell { ch: ' ', fg: TEXT, bg };
        Self {
            cols,
            rows,
            cells: vec![blank; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.cols && y < self.rows {
            self.cells.get(y as usize * self.cols as usize + x as usize)
        } else {
            None
        }
    }

    /// Set a glyph, keeping the cell's background. Out of range is ignored.
    pub fn put(&mut self, x: u16, y: u16, ch: char, fg: Rgba) {
        if x < self.cols && y < self.rows {
            let cell = &mut self.cells[y as usize * self.cols as usize + x as usize];
            cell.ch = ch;
            cell.fg = fg;
        }
    }

    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Rgba) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x.saturating_add(i as u16), y, ch, fg);
        }
    }

    /// Centre `text` horizontally on row `y`
    pub fn put_centered(&mut self, y: u16, text: &str, fg: Rgba) {
        let len = text.chars().count() as u16;
        self.put_str(self.cols.saturating_sub(len) / 2, y, text, fg);
    }

    /// Contents of row `y` as a string, for tests and logging
    pub fn row_text(&self, y: u16) -> String {
        (0..self.cols)
            .filter_map(|x| self.get(x, y).map(|c| c.ch))
            .collect()
    }
}

/// World-to-cell mapping for one frame
#[derive(Debug, Clone, Copy)]
struct Viewport {
    scale: Vec2,
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn new(snap: &Snapshot, cols: u16, rows: u16) -> Self {
        Self {
            scale: Vec2::new(cols as f32 / snap.width.max(1.0), rows as f32 / snap.height.max(1.0)),
            cols,
            rows,
        }
    }

    fn cell(&self, world: Vec2) -> Option<(u16, u16)> {
        let p = world * self.scale;
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let (x, y) = (p.x as u16, p.y as u16);
        (x < self.cols && y < self.rows).then_some((x, y))
    }
}

/// Build the frame for `snap` on a `cols` x `rows` grid
pub fn compose(snap: &Snapshot, backdrop: &Backdrop, cols: u16, rows: u16) -> Canvas {
    let mut canvas = draw_backdrop(backdrop, cols, rows);
    if cols < MIN_COLS || rows < MIN_ROWS {
        canvas.put_str(0, 0, "Terminal too small", WARNING);
        return canvas;
    }

    let view = Viewport::new(snap, cols, rows);
    match snap.phase {
        GamePhase::Startup => draw_title(&mut canvas, snap),
        GamePhase::NameEntry => draw_name_entry(&mut canvas, snap),
        GamePhase::Playing => draw_playfield(&mut canvas, &view, snap),
        GamePhase::GameOver => {
            draw_playfield(&mut canvas, &view, snap);
            draw_game_over(&mut canvas, snap);
        }
        GamePhase::ConfirmQuit => {
            let prompt = if snap.previous_phase == GamePhase::Startup {
                "Quit Game? (Y/N)"
            } else {
                "Return to Home? (Y/N)"
            };
            canvas.put_centered(rows / 2, prompt, TEXT);
        }
    }
    canvas
}

fn draw_backdrop(backdrop: &Backdrop, cols: u16, rows: u16) -> Canvas {
    match backdrop {
        Backdrop::Solid(color) => Canvas::new(cols, rows, *color),
        Backdrop::Image(_) => {
            let mut canvas = Canvas::new(cols, rows, SPACE_BACKGROUND);
            for y in 0..rows {
                for x in 0..cols {
                    // Fixed scatter so stars stay put between frames
                    let h = (x as u32).wrapping_mul(73_856_093) ^ (y as u32).wrapping_mul(19_349_663);
                    if h % 61 == 0 {
                        canvas.put(x, y, '.', STAR);
                    }
                }
            }
            canvas
        }
    }
}

fn draw_title(canvas: &mut Canvas, snap: &Snapshot) {
    const INSTRUCTIONS: [&str; 8] = [
        "Instructions:",
        "A/D: Rotate Left/Right",
        "Space: Speed Up",
        "J: Shoot Small Bullet (Unlimited)",
        "K: Shoot Rockets (10, reloads every 10s)",
        "Enter: Start Game",
        "Q: Quit (Confirm with Y/N)",
        "Press Enter to Continue",
    ];

    let rows = canvas.rows();
    canvas.put_centered(rows / 6, "Rocket Man", TEXT);

    let top = (rows / 2).saturating_sub(INSTRUCTIONS.len() as u16 / 2);
    for (i, line) in INSTRUCTIONS.iter().enumerate() {
        canvas.put_centered(top + i as u16, line, TEXT);
    }

    let hs = &snap.high_score;
    let high_score = format!("High Score: {} - {}", hs.name, hs.score);
    canvas.put_centered(top + INSTRUCTIONS.len() as u16 + 1, &high_score, TEXT);
}

fn draw_name_entry(canvas: &mut Canvas, snap: &Snapshot) {
    let rows = canvas.rows();
    canvas.put_centered(rows / 3, "Enter Your Name:", TEXT);
    if snap.name_buffer.is_empty() {
        canvas.put_centered(rows / 2, "Type your name...", PLACEHOLDER);
    } else {
        canvas.put_centered(rows / 2, &snap.name_buffer, TEXT);
    }
    canvas.put_centered(rows * 2 / 3, "Press Enter to Confirm, Esc to Home", TEXT);
}

fn draw_playfield(canvas: &mut Canvas, view: &Viewport, snap: &Snapshot) {
    if snap.player.alive {
        if let Some((x, y)) = view.cell(snap.player.center) {
            canvas.put(x, y, heading_glyph(snap.player.angle), PLAYER_COLOR);
            draw_hp_bar(canvas, x, y.wrapping_add(1), snap.player.hp / snap.player.max_hp);
        }
    }

    for bullet in snap.bullets.iter().chain(&snap.rocket_bullets) {
        draw_bullet(canvas, view, bullet);
    }

    for rocket in &snap.rockets {
        if let Some((x, y)) = view.cell(rocket.center) {
            canvas.put(x, y, '▼', ROCKET_COLOR);
            if y > 0 {
                draw_hp_bar(canvas, x, y - 1, rocket.hp / rocket.max_hp);
            }
        }
    }

    for effect in &snap.effects {
        let fg = fade(effect.color, effect.alpha);
        for &(pos, size) in &effect.fragments {
            if let Some((x, y)) = view.cell(pos) {
                canvas.put(x, y, if size >= 6.0 { '*' } else { '·' }, fg);
            }
        }
    }

    draw_hud(canvas, snap);
}

fn draw_bullet(canvas: &mut Canvas, view: &Viewport, bullet: &BulletView) {
    if let Some((x, y)) = view.cell(bullet.center) {
        let glyph = match bullet.owner {
            BulletOwner::Player if bullet.size >= 20.0 => '●',
            BulletOwner::Player => '•',
            BulletOwner::Rocket => '∙',
        };
        canvas.put(x, y, glyph, bullet.color);
    }
}

/// Three-cell bar centred on `x`
fn draw_hp_bar(canvas: &mut Canvas, x: u16, y: u16, fraction: f32) {
    let filled = (fraction.clamp(0.0, 1.0) * 3.0).ceil() as u16;
    for i in 0..3u16 {
        let color = if i < filled { HP_FULL } else { HP_EMPTY };
        if let Some(cx) = (x + i).checked_sub(1) {
            canvas.put(cx, y, '━', color);
        }
    }
}

fn draw_hud(canvas: &mut Canvas, snap: &Snapshot) {
    canvas.put_str(1, 0, &format!("Player: {}", snap.player_name), TEXT);
    canvas.put_str(1, 1, &format!("Score: {}", snap.score), TEXT);
    canvas.put_str(1, 2, &format!("Rockets: {}/{}", snap.ammo_used, snap.ammo_limit), TEXT);
    canvas.put_str(1, 3, &format!("Time: {}", snap.clock), TEXT);
    if let Some(secs) = snap.reload_secs {
        canvas.put_str(1, 4, &format!("Large Bullet Reload: {secs}s"), WARNING);
    }
}

fn draw_game_over(canvas: &mut Canvas, snap: &Snapshot) {
    let mid = canvas.rows() / 2;
    canvas.put_centered(mid.saturating_sub(2), "GAME OVER", TEXT);
    let kills = format!("{}, you killed {} rockets!", snap.player_name, snap.score);
    canvas.put_centered(mid, &kills, TEXT);
    canvas.put_centered(mid + 2, "Press Enter or Q to Home", TEXT);
}

/// Arrow pointing along `angle` (degrees, clockwise, 0 = right)
fn heading_glyph(angle: f32) -> char {
    const ARROWS: [char; 8] = ['→', '↘', '↓', '↙', '←', '↖', '↑', '↗'];
    let octant = (angle.rem_euclid(360.0) / 45.0).round() as usize % 8;
    ARROWS[octant]
}

/// Premultiply by alpha; terminals have no blending. `alpha` already folds
/// in the color's own alpha channel.
fn fade(color: Rgba, alpha: f32) -> Rgba {
    let k = alpha.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * k).round() as u8;
    Rgba::rgb(scale(color.r), scale(color.g), scale(color.b))
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Owns the terminal while the game runs
pub struct TerminalOutput {
    alternate_screen: bool,
    cursor_hidden: bool,
    raw_mode: bool,
    keyboard_enhanced: bool,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            alternate_screen: false,
            cursor_hidden: false,
            raw_mode: false,
            keyboard_enhanced: false,
        }
    }

    /// Whether the terminal agreed to report key releases
    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    /// Enter raw mode and the alternate screen, and ask for key release events
    pub fn init(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        terminal::enable_raw_mode().map_err(|e| {
            log::error!("Raw mode unavailable: {e}");
            OutputError::NotAvailable
        })?;
        self.raw_mode = true;

        execute!(stdout, EnterAlternateScreen)?;
        self.alternate_screen = true;

        execute!(stdout, Hide)?;
        self.cursor_hidden = true;

        execute!(stdout, Clear(ClearType::All))?;

        // Terminals without the kitty protocol refuse this; key holds then
        // fall back to repeat timing
        self.keyboard_enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        log::info!("Terminal ready (key release events: {})", self.keyboard_enhanced);

        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        if self.keyboard_enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
            self.keyboard_enhanced = false;
        }

        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }

        if self.cursor_hidden {
            execute!(stdout, ResetColor, Show)?;
            self.cursor_hidden = false;
        }

        if self.alternate_screen {
            execute!(stdout, LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }

        Ok(())
    }

    /// Compose and draw one frame at the current terminal size
    pub fn render(&mut self, snap: &Snapshot, backdrop: &Backdrop) -> Result<(), OutputError> {
        let (cols, rows) = terminal::size()?;
        let canvas = compose(snap, backdrop, cols, rows);
        let mut stdout = io::stdout().lock();
        write_canvas(&mut stdout, &canvas)?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalOutput {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Queue every cell, switching colours only when they change
pub fn write_canvas<W: Write>(out: &mut W, canvas: &Canvas) -> io::Result<()> {
    let mut last: Option<(Rgba, Rgba)> = None;
    for y in 0..canvas.rows() {
        queue!(out, MoveTo(0, y))?;
        for x in 0..canvas.cols() {
            let Some(cell) = canvas.get(x, y) else { continue };
            if last != Some((cell.fg, cell.bg)) {
                queue!(out, SetForegroundColor(to_color(cell.fg)), SetBackgroundColor(to_color(cell.bg)))?;
                last = Some((cell.fg, cell.bg));
            }
            queue!(out, Print(cell.ch))?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}
