//! Software-rendered notebook page using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  MODE BANNER  (game, phase, countdown)          [creativity] [distr.] │
//! ├───────┬──────────────────────────────────────────────────────────────┤
//! │ ☆     │ ─────────────────────────────────────────────────────────── │
//! │ doodle│ ───────── strokes, open strokes, hand cursors ───────────── │
//! │ margin│ ─────────────────────────────────────────────────────────── │
//! │       │ [replay progress]                                            │
//! ├───────┴──────────────────────────────────────────────────────────────┤
//! │  status · key legend                          (hidden when presenting)│
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use anyhow::Context;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use notebook_core::{Command, GameType, InputCapability, Mode, Point, Snapshot, DOODLES};

use crate::ambient::{DoodleFades, ParticleField};
use crate::palette::{self, blend};
use crate::tracking::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BANNER_H:     usize = 48;
const STATUS_H:     usize = 36;
const MARGIN_X:     usize = 96;
const RULE_GAP:     usize = 32;
const DOODLE_GAP:   usize = 110;
const METER_W:      usize = 160;
const METER_H:      usize = 8;
const INK_WIDTH:    usize = 2;
const JITTER_PX:    f32   = 4.0;

const LEGEND: &str =
    "C=clear  V=hands  P=present  H=keys  1=play  2=replay  N=next  Tab=turn  W=wave  F=high5  J/K=write  Q=quit";

/// One-shot keys and the command each sends.
const COMMAND_KEYS: [(Key, Command); 8] = [
    (Key::C,    Command::ClearAll),
    (Key::V,    Command::ToggleVisualization),
    (Key::P,    Command::TogglePresentation),
    (Key::H,    Command::ToggleControls),
    (Key::Key1, Command::ForceGameSelection),
    (Key::Key2, Command::ForceReplay),
    (Key::N,    Command::AdvancePhase),
    (Key::Tab,  Command::PassTurn),
];

/// Keys that pose the simulated hands while held.
const HELD_KEYS: [(Key, SimKey); 4] = [
    (Key::W, SimKey::Wave),
    (Key::F, SimKey::HighFive),
    (Key::J, SimKey::WriteFirst),
    (Key::K, SimKey::WriteSecond),
];

// ════════════════════════════════════════════════════════════════════════════
// UiInput — what the window hands the app each frame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiInput {
    Command(Command),
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the pixel buffer and its drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf:    Vec<u32>,
    pub width:  usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![palette::PAPER; width * height], width, height }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn fill(&mut self, color: u32) { self.buf.fill(color); }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (x, y, w, h) = (x as isize, y as isize, w as isize, h as isize);
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn hline(&mut self, x0: usize, x1: usize, y: isize, color: u32) {
        for x in x0..x1 { self.set_pixel(x as isize, y, color); }
    }

    pub fn vline(&mut self, x: usize, y0: usize, y1: usize, color: u32) {
        for y in y0..y1 { self.set_pixel(x as isize, y as isize, color); }
    }

    /// Filled square of side `size` centred on `(x, y)`.
    pub fn dot(&mut self, x: f32, y: f32, size: usize, color: u32) {
        let half = size as isize / 2;
        let (cx, cy) = (x.round() as isize, y.round() as isize);
        for dy in 0..size.max(1) as isize {
            for dx in 0..size.max(1) as isize {
                self.set_pixel(cx - half + dx, cy - half + dy, color);
            }
        }
    }

    pub fn draw_line(&mut self, a: Point, b: Point, color: u32, thickness: usize) {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.dot(a.x + dx * t, a.y + dy * t, thickness, color);
        }
    }

    pub fn draw_polyline(&mut self, points: &[Point], color: u32, thickness: usize) {
        match points {
            [] => {}
            [only] => self.dot(only.x, only.y, thickness, color),
            _ => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0], pair[1], color, thickness);
                }
            }
        }
    }

    pub fn draw_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let steps = ((r * std::f32::consts::TAU).ceil() as usize).max(8);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.dot(cx + r * a.cos(), cy + r * a.sin(), 1, color);
        }
    }

    pub fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in 0..=r {
            let dx = r - dy;
            for (sx, sy) in [(cx + dx, cy + dy), (cx - dx, cy + dy), (cx + dx, cy - dy), (cx - dx, cy - dy)] {
                self.set_pixel(sx, sy, color);
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters, each pixel drawn `scale`² big.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.width { break; }
        }
    }
}

/// Pixel width of `text` at `scale`.
pub fn label_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

// ════════════════════════════════════════════════════════════════════════════
// Banner text
// ════════════════════════════════════════════════════════════════════════════

fn game_label(game: GameType) -> &'static str {
    match game {
        GameType::Tracing        => "TRACING",
        GameType::ContinuousLine => "CONTINUOUS LINE",
        GameType::BlindPortraits => "BLIND PORTRAITS",
    }
}

/// The mode line at the top of the page.
pub fn banner_text(view: &Snapshot<'_>) -> String {
    match view.mode {
        Mode::Freeplay => "FREEPLAY - WAVE BOTH HANDS TO PLAY".to_string(),
        Mode::GameSelection { chosen, .. } => {
            let secs = view.countdown_ms.unwrap_or(0).div_ceil(1000);
            format!("NEXT GAME: {} IN {}", game_label(*chosen), secs)
        }
        Mode::WaitingForHighFive { finished } => {
            format!("{} DONE - HIGH FIVE TO REPLAY", game_label(*finished))
        }
        Mode::Replay { .. } => {
            let pct = (view.replay_progress.unwrap_or(1.0) * 100.0).round() as u32;
            format!("REPLAY {}%", pct)
        }
        game_mode => {
            let game = game_mode.game().map_or("", game_label);
            let phase = game_mode.phase_name().to_uppercase();
            if game_mode.may_draw(view.active_player) {
                format!("{} - {} - PLAYER {} DRAWS", game, phase, view.active_player + 1)
            } else {
                format!("{} - {} - GET READY", game, phase)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    sim_tx:     Sender<SimInput>,
    held:       [bool; HELD_KEYS.len()],
    mouse_down: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Duet Notebook",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).context("opening the notebook window")?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            sim_tx,
            held: [false; HELD_KEYS.len()],
            mouse_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Held simulation keys go straight to the
    /// simulator; everything else is returned for the app.
    pub fn poll_input(&mut self) -> Vec<UiInput> {
        let mut out = Vec::new();
        if !self.window.is_open() {
            out.push(UiInput::Quit);
            return out;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Q) {
            let _ = self.sim_tx.send(SimInput::Quit);
            out.push(UiInput::Quit);
            return out;
        }
        for (key, command) in COMMAND_KEYS {
            if one_shot(key) {
                out.push(UiInput::Command(command));
            }
        }

        for (i, (key, sim)) in HELD_KEYS.into_iter().enumerate() {
            let down = self.window.is_key_down(key);
            if down != self.held[i] {
                self.held[i] = down;
                let msg = if down { SimInput::KeyDown(sim) } else { SimInput::KeyUp(sim) };
                let _ = self.sim_tx.send(msg);
            }
        }

        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.window.get_mouse_pos(MouseMode::Clamp);
        match (self.mouse_down, down, pos) {
            (false, true, Some((x, y))) => out.push(UiInput::PointerDown { x, y }),
            (true,  true, Some((x, y))) => out.push(UiInput::PointerMove { x, y }),
            (true, false, _)            => out.push(UiInput::PointerUp),
            _ => {}
        }
        self.mouse_down = down && (self.mouse_down || pos.is_some());

        out
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        view:      &Snapshot<'_>,
        particles: &ParticleField,
        fades:     &DoodleFades,
        status:    &str,
        now_ms:    u64,
    ) -> anyhow::Result<()> {
        let c = &mut self.canvas;
        let (w, h) = (c.width, c.height);
        let page_bottom = if view.flags.presentation { h } else { h.saturating_sub(STATUS_H) };

        // ── Paper, rules and margin ───────────────────────────────────────
        let paper = palette::paper_tint(view.mood.creativity);
        c.fill(paper);
        let phase = now_ms as f32 / 180.0;
        let mut y = BANNER_H + RULE_GAP;
        let mut i = 0;
        while y < page_bottom {
            let jitter = view.mood.distraction * JITTER_PX * (phase + i as f32 * 1.7).sin();
            c.hline(0, w, y as isize + jitter.round() as isize, palette::RULE);
            y += RULE_GAP;
            i += 1;
        }
        c.vline(MARGIN_X, BANNER_H, page_bottom, palette::MARGIN);
        c.vline(MARGIN_X + 3, BANNER_H, page_bottom, palette::MARGIN);

        // ── Margin doodles ────────────────────────────────────────────────
        for index in 0..DOODLES.len() {
            let opacity = fades.opacity(index);
            if opacity <= 0.0 { continue; }
            let cy = (BANNER_H + 60 + index * DOODLE_GAP) as f32;
            if cy as usize + 30 > page_bottom { break; }
            draw_doodle(c, index, (MARGIN_X / 2) as f32, cy, blend(paper, palette::DOODLE_INK, opacity));
        }

        // ── Ink ───────────────────────────────────────────────────────────
        for stroke in &view.strokes {
            c.draw_polyline(stroke.points(), stroke.color(), INK_WIDTH);
        }
        for open in view.open_strokes.iter().flatten() {
            c.draw_polyline(open.points(), open.color(), INK_WIDTH);
        }

        // ── Particles ─────────────────────────────────────────────────────
        for p in &particles.particles {
            let color = blend(paper, palette::particle_color(p.hue), p.life);
            c.dot(p.x, p.y, 3, color);
        }

        // ── Hands ─────────────────────────────────────────────────────────
        for hand in view.hands.iter().flatten() {
            let color = hand_color(view, hand.slot);
            if view.flags.visualization && !hand.landmarks.is_empty() {
                for lm in &hand.landmarks.points {
                    c.dot((1.0 - lm.x) * w as f32, lm.y * h as f32, 4, color);
                }
            } else {
                let (x, y) = (hand.position.x.round() as isize, hand.position.y.round() as isize);
                c.draw_diamond(x, y, 7, palette::GRAPHITE);
                if hand.writing {
                    c.dot(hand.position.x, hand.position.y, 5, color);
                }
            }
        }

        // ── Countdown numeral ─────────────────────────────────────────────
        if let (Mode::GameSelection { .. }, Some(ms)) = (view.mode, view.countdown_ms) {
            let digit = ms.div_ceil(1000).to_string();
            let scale = 24;
            let x = w.saturating_sub(label_width(&digit, scale)) / 2;
            c.draw_label(&digit, x, (h / 2).saturating_sub(60), scale, blend(paper, palette::BANNER_BG, 0.35));
        }

        // ── Replay progress ───────────────────────────────────────────────
        if let Some(progress) = view.replay_progress {
            let bar_y = page_bottom.saturating_sub(14);
            let span = w.saturating_sub(MARGIN_X + 24);
            c.draw_border(MARGIN_X + 12, bar_y, span, 8, palette::GRAPHITE);
            c.fill_rect(MARGIN_X + 12, bar_y, (span as f32 * progress) as usize, 8, palette::REPLAY_BAR);
        }

        // ── Banner and mood meters ────────────────────────────────────────
        c.fill_rect(0, 0, w, BANNER_H, palette::BANNER_BG);
        c.draw_label(&banner_text(view), 16, 16, 3, palette::BANNER_TEXT);
        let meters_x = w.saturating_sub(METER_W + 16);
        for (row, (value, color)) in [
            (view.mood.creativity,  palette::CREATIVITY),
            (view.mood.distraction, palette::DISTRACTION),
        ].into_iter().enumerate() {
            let my = 12 + row * (METER_H + 8);
            c.fill_rect(meters_x, my, METER_W, METER_H, palette::METER_BG);
            c.fill_rect(meters_x, my, (METER_W as f32 * value) as usize, METER_H, color);
        }

        // ── Status bar and legend ─────────────────────────────────────────
        if !view.flags.presentation {
            let sy = h.saturating_sub(STATUS_H);
            c.fill_rect(0, sy, w, STATUS_H, palette::STATUS_BG);
            c.draw_label(status, 10, sy + 6, 2, palette::GRAPHITE);
            if !view.flags.controls_hidden {
                c.draw_label(LEGEND, 10, sy + 24, 1, palette::GRAPHITE);
            }
            if view.capability == InputCapability::PointerOnly {
                let note = "TRACKING UNAVAILABLE - DRAW WITH THE MOUSE";
                c.draw_label(note, w.saturating_sub(label_width(note, 1) + 10), sy + 24, 1, palette::MARGIN);
            }
        }

        self.window
            .update_with_buffer(&c.buf, w, h)
            .context("presenting the frame")
    }
}

/// A hand's cursor color: its ink while a stroke is open, lighter graphite
/// the less it is allowed to draw.
fn hand_color(view: &Snapshot<'_>, slot: usize) -> u32 {
    match view.open_strokes.get(slot).copied().flatten() {
        Some(open) => open.color(),
        None if view.mode.may_draw(slot) => blend(palette::GRAPHITE, 0xFFFFFFFF, 0.2),
        None => blend(palette::GRAPHITE, 0xFFFFFFFF, 0.6),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Margin doodles
// ────────────────────────────────────────────────────────────────────────────

fn draw_doodle(c: &mut Canvas, index: usize, cx: f32, cy: f32, color: u32) {
    use std::f32::consts::{PI, TAU};
    let at = |r: f32, a: f32| Point::new(cx + r * a.cos(), cy + r * a.sin());

    match index {
        // star
        0 => {
            let tips: Vec<Point> = (0..5).map(|k| at(22.0, -PI / 2.0 + k as f32 * TAU / 5.0)).collect();
            for k in 0..5 {
                c.draw_line(tips[k], tips[(k + 2) % 5], color, 2);
            }
        }
        // spiral
        1 => {
            let points: Vec<Point> = (0..120)
                .map(|i| {
                    let a = i as f32 / 120.0 * 3.0 * TAU;
                    at(1.0 + a * 1.1, a)
                })
                .collect();
            c.draw_polyline(&points, color, 2);
        }
        // cloud
        2 => {
            for (dx, dy, r) in [(-14.0, 4.0, 10.0), (0.0, -4.0, 14.0), (15.0, 4.0, 10.0)] {
                c.draw_circle(cx + dx, cy + dy, r, color);
            }
            c.draw_line(Point::new(cx - 24.0, cy + 14.0), Point::new(cx + 25.0, cy + 14.0), color, 1);
        }
        // flower
        3 => {
            for k in 0..6 {
                let p = at(12.0, k as f32 * TAU / 6.0);
                c.draw_circle(p.x, p.y, 7.0, color);
            }
            c.draw_circle(cx, cy, 5.0, color);
            c.draw_line(Point::new(cx, cy + 19.0), Point::new(cx, cy + 34.0), color, 2);
        }
        // rocket
        _ => {
            c.draw_border(cx as usize - 7, cy as usize - 12, 14, 30, color);
            c.draw_line(Point::new(cx - 7.0, cy - 12.0), Point::new(cx, cy - 26.0), color, 2);
            c.draw_line(Point::new(cx + 7.0, cy - 12.0), Point::new(cx, cy - 26.0), color, 2);
            c.draw_line(Point::new(cx - 7.0, cy + 10.0), Point::new(cx - 14.0, cy + 20.0), color, 2);
            c.draw_line(Point::new(cx + 7.0, cy + 10.0), Point::new(cx + 14.0, cy + 20.0), color, 2);
            c.draw_circle(cx, cy - 2.0, 3.0, color);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_core::{Session, SessionConfig};

    fn session() -> Session {
        Session::with_seed(SessionConfig::default(), 3)
    }

    #[test]
    fn freeplay_banner_invites_a_wave() {
        let s = session();
        assert_eq!(banner_text(&s.snapshot()), "FREEPLAY - WAVE BOTH HANDS TO PLAY");
    }

    #[test]
    fn selection_banner_counts_down_whole_seconds() {
        let mut s = session();
        s.tick_hands(0, [None, None]);
        s.apply(Command::ForceGameSelection);
        s.tick_hands(500, [None, None]);
        let text = banner_text(&s.snapshot());
        assert!(text.starts_with("NEXT GAME: "), "{}", text);
        assert!(text.ends_with(" IN 3"), "{}", text);
    }

    #[test]
    fn game_banner_names_the_drawing_player() {
        let mut s = session();
        s.apply(Command::ForceGameSelection);
        s.tick_hands(3000, [None, None]);
        assert!(banner_text(&s.snapshot()).ends_with("GET READY"));
        s.apply(Command::AdvancePhase);
        let text = banner_text(&s.snapshot());
        assert!(text.ends_with(&format!("PLAYER {} DRAWS", s.game().active_player() + 1)), "{}", text);
    }

    #[test]
    fn label_scales_glyphs() {
        let mut c = Canvas::new(64, 32);
        c.draw_label("1", 0, 0, 2, 0xFF000000);
        // '1' row 0 is 0b010: the middle column, two pixels wide at scale 2
        assert_eq!(c.pixel(2, 0), Some(0xFF000000));
        assert_eq!(c.pixel(3, 1), Some(0xFF000000));
        assert_eq!(c.pixel(0, 0), Some(palette::PAPER));
        assert_eq!(label_width("12", 2), 16);
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut c = Canvas::new(32, 32);
        c.draw_line(Point::new(2.0, 2.0), Point::new(20.0, 11.0), 0xFF112233, 1);
        assert_eq!(c.pixel(2, 2), Some(0xFF112233));
        assert_eq!(c.pixel(20, 11), Some(0xFF112233));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(8, 8);
        c.draw_line(Point::new(-10.0, -10.0), Point::new(30.0, 30.0), 0xFF000000, 3);
        c.draw_border(4, 4, 20, 20, 0xFF000000);
        c.fill_rect(6, 6, 50, 50, 0xFF000000);
        assert_eq!(c.buf.len(), 64);
        assert_eq!(c.pixel(7, 7), Some(0xFF000000));
        assert_eq!(c.pixel(8, 0), None);
    }
}
