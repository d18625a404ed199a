//! Ambient mood — two scalars that make the page feel alive.
//!
//! * **Creativity** grows with drawing and filed strokes and never decays;
//!   crossing a doodle's threshold reveals that doodle in the margin.
//! * **Distraction** grows while anyone draws and drains after a quiet
//!   spell; the renderer uses it to jitter the paper.
//!
//! Both stay in `[0, 1]`.

use tracing::debug;

use crate::config::SessionConfig;
use crate::stroke::Point;

const DRAW_DISTRACTION:   f32 = 0.02;
const DRAW_CREATIVITY:    f32 = 0.002;
const FILED_CREATIVITY:   f32 = 0.05;
const IDLE_DISTRACTION:   f32 = 0.015;

// ════════════════════════════════════════════════════════════════════════════
// Doodles
// ════════════════════════════════════════════════════════════════════════════

/// A margin doodle and the creativity level (before scaling) it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Doodle {
    pub name:      &'static str,
    pub threshold: f32,
}

pub const DOODLE_COUNT: usize = 5;

pub static DOODLES: [Doodle; DOODLE_COUNT] = [
    Doodle { name: "star",   threshold: 0.2 },
    Doodle { name: "spiral", threshold: 0.4 },
    Doodle { name: "cloud",  threshold: 0.6 },
    Doodle { name: "flower", threshold: 0.8 },
    Doodle { name: "rocket", threshold: 1.0 },
];

// ════════════════════════════════════════════════════════════════════════════
// MoodState / MoodEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoodState {
    pub creativity:  f32,
    pub distraction: f32,
}

/// Cosmetic side effects for the renderer.  Not state.
#[derive(Clone, Debug, PartialEq)]
pub enum MoodEvent {
    /// Someone just started drawing: scatter `count` particles at `origin`.
    AmbientBurst { count: usize, origin: Point },
    /// A margin doodle emerged.
    DoodleRevealed { index: usize, name: &'static str },
}

// ════════════════════════════════════════════════════════════════════════════
// MoodModel
// ════════════════════════════════════════════════════════════════════════════

pub struct MoodModel {
    state:           MoodState,
    was_drawing:     bool,
    last_drawing_ms: Option<u64>,

    revealed:        [bool; DOODLE_COUNT],
    /// Creativity at the last doodle check, for edge detection.
    checked_level:   f32,

    threshold_scale: f32,
    burst_count:     usize,
    idle_delay_ms:   u64,
}

impl MoodModel {
    pub fn new(cfg: &SessionConfig) -> Self {
        MoodModel {
            state:           MoodState::default(),
            was_drawing:     false,
            last_drawing_ms: None,
            revealed:        [false; DOODLE_COUNT],
            checked_level:   0.0,
            threshold_scale: cfg.doodle_threshold_scale,
            burst_count:     cfg.ambient_burst_count,
            idle_delay_ms:   cfg.idle_decay_delay_ms,
        }
    }

    pub fn state(&self) -> MoodState { self.state }

    pub fn revealed(&self) -> impl Iterator<Item = &'static Doodle> + '_ {
        DOODLES.iter().zip(self.revealed.iter()).filter(|(_, r)| **r).map(|(d, _)| d)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    /// Once per tick.  `drawing_at` is where the first drawing hand is, or
    /// `None` if nobody drew this frame.
    pub fn update(&mut self, now: u64, drawing_at: Option<Point>) -> Vec<MoodEvent> {
        let mut events = Vec::new();

        match drawing_at {
            Some(origin) => {
                self.state.distraction = (self.state.distraction + DRAW_DISTRACTION).clamp(0.0, 1.0);
                self.state.creativity  = (self.state.creativity + DRAW_CREATIVITY).clamp(0.0, 1.0);
                if !self.was_drawing {
                    events.push(MoodEvent::AmbientBurst { count: self.burst_count, origin });
                }
                self.last_drawing_ms = Some(now);
            }
            None => {
                let idle = self
                    .last_drawing_ms
                    .map_or(true, |t| now.saturating_sub(t) > self.idle_delay_ms);
                if idle {
                    self.state.distraction = (self.state.distraction - IDLE_DISTRACTION).clamp(0.0, 1.0);
                }
            }
        }
        self.was_drawing = drawing_at.is_some();

        self.check_doodles(&mut events);
        events
    }

    /// A stroke was filed.
    pub fn on_stroke_filed(&mut self) -> Vec<MoodEvent> {
        self.state.creativity = (self.state.creativity + FILED_CREATIVITY).clamp(0.0, 1.0);
        let mut events = Vec::new();
        self.check_doodles(&mut events);
        events
    }

    /// Fresh page: creativity back to zero, doodles hidden.
    pub fn reset(&mut self) {
        self.state.creativity = 0.0;
        self.checked_level = 0.0;
        self.revealed = [false; DOODLE_COUNT];
    }

    /// Reveal doodles whose threshold was crossed upward since the last check.
    fn check_doodles(&mut self, events: &mut Vec<MoodEvent>) {
        let before = self.checked_level;
        let now = self.state.creativity;
        for (index, doodle) in DOODLES.iter().enumerate() {
            let threshold = doodle.threshold * self.threshold_scale;
            if !self.revealed[index] && before < threshold && now >= threshold {
                self.revealed[index] = true;
                debug!(doodle = doodle.name, creativity = now, "doodle revealed");
                events.push(MoodEvent::DoodleRevealed { index, name: doodle.name });
            }
        }
        self.checked_level = now;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
