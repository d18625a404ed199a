//! Strokes and the per-slot stroke recorder.
//!
//! An [`OpenStroke`] grows while its hand stays in writing pose and keeps
//! moving; the moment either stops (or the hand vanishes, or loses drawing
//! permission) it is sealed into an immutable [`Stroke`].  Sealed strokes
//! shorter than the minimum are accidental taps and are dropped.

use crate::classifier::{HandState, SLOTS};
use crate::config::SessionConfig;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// Canvas-space position in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Stroke / OpenStroke
// ════════════════════════════════════════════════════════════════════════════

/// A finished stroke.  Fields are private so nothing can mutate it after
/// sealing.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    color:  u32,
    slot:   usize,
}

impl Stroke {
    pub fn points(&self) -> &[Point] { &self.points }
    pub fn color(&self)  -> u32      { self.color }
    pub fn slot(&self)   -> usize    { self.slot }
    pub fn len(&self)    -> usize    { self.points.len() }
    pub fn is_empty(&self) -> bool   { self.points.is_empty() }
}

/// The stroke a hand is currently laying down.
#[derive(Clone, Debug)]
pub struct OpenStroke {
    points: Vec<Point>,
    color:  u32,
    slot:   usize,
}

impl OpenStroke {
    pub fn new(slot: usize, color: u32) -> Self {
        OpenStroke { points: Vec::new(), color, slot }
    }

    pub fn push(&mut self, p: Point) { self.points.push(p); }

    pub fn points(&self) -> &[Point] { &self.points }
    pub fn color(&self)  -> u32      { self.color }
    pub fn len(&self)    -> usize    { self.points.len() }
    pub fn is_empty(&self) -> bool   { self.points.is_empty() }

    pub fn seal(self) -> Stroke {
        Stroke { points: self.points, color: self.color, slot: self.slot }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StrokeRecorder
// ════════════════════════════════════════════════════════════════════════════

/// What one hand frame did to its slot.
#[derive(Clone, Debug, PartialEq)]
pub enum StrokeOutcome {
    /// Nothing open, nothing drawn.
    Idle,
    /// A point was appended (possibly starting a new stroke).
    Extended,
    /// A stroke was sealed and should be filed by the caller.
    Sealed(Stroke),
    /// A stroke was sealed but was too short to keep.
    Discarded { slot: usize, points: usize },
}

pub struct StrokeRecorder {
    open:          [Option<OpenStroke>; SLOTS],
    colors:        [u32; SLOTS],
    draw_velocity: f32,
    min_points:    usize,
}

impl StrokeRecorder {
    pub fn new(cfg: &SessionConfig) -> Self {
        StrokeRecorder {
            open:          [None, None],
            colors:        cfg.hand_colors,
            draw_velocity: cfg.draw_velocity,
            min_points:    cfg.min_stroke_points,
        }
    }

    /// Feed one frame for `slot`.  `hand` is `None` when the slot is empty
    /// this frame; `permitted` is the game gate for the slot.
    pub fn on_hand_frame(
        &mut self,
        slot:      usize,
        hand:      Option<&HandState>,
        permitted: bool,
    ) -> StrokeOutcome {
        if slot >= SLOTS {
            return StrokeOutcome::Idle;
        }

        match hand {
            Some(h) if permitted && h.is_drawing(self.draw_velocity) => {
                let color = self.colors[slot];
                self.open[slot]
                    .get_or_insert_with(|| OpenStroke::new(slot, color))
                    .push(h.position);
                StrokeOutcome::Extended
            }
            _ => self.seal(slot),
        }
    }

    fn seal(&mut self, slot: usize) -> StrokeOutcome {
        match self.open[slot].take() {
            None => StrokeOutcome::Idle,
            Some(open) if open.len() < self.min_points => {
                StrokeOutcome::Discarded { slot, points: open.len() }
            }
            Some(open) => StrokeOutcome::Sealed(open.seal()),
        }
    }

    /// Drop every open stroke without filing it.  Returns how many were open.
    pub fn discard_all(&mut self) -> usize {
        self.open.iter_mut().filter_map(Option::take).count()
    }

    pub fn open(&self, slot: usize) -> Option<&OpenStroke> {
        self.open.get(slot).and_then(Option::as_ref)
    }

    pub fn color(&self, slot: usize) -> u32 { self.colors[slot % SLOTS] }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkSet;

    fn hand(slot: usize, x: f32, y: f32, writing: bool, velocity: f32) -> HandState {
        HandState {
            slot,
            position: Point::new(x, y),
            landmarks: LandmarkSet::default(),
            writing,
            waving: false,
            velocity,
        }
    }

    fn recorder() -> StrokeRecorder {
        StrokeRecorder::new(&SessionConfig::default())
    }

    #[test]
    fn three_frames_then_release_seals() {
        let mut r = recorder();
        for i in 0..3 {
            let h = hand(0, 100.0 + i as f32, 100.0, true, 5.0);
            assert_eq!(r.on_hand_frame(0, Some(&h), true), StrokeOutcome::Extended);
        }
        let lifted = hand(0, 104.0, 100.0, false, 5.0);
        match r.on_hand_frame(0, Some(&lifted), true) {
            StrokeOutcome::Sealed(s) => {
                assert_eq!(s.len(), 3);
                assert_eq!(s.slot(), 0);
                assert_eq!(s.color(), SessionConfig::default().hand_colors[0]);
            }
            other => panic!("expected sealed stroke, got {:?}", other),
        }
        assert!(r.open(0).is_none());
    }

    #[test]
    fn short_stroke_discarded() {
        let mut r = recorder();
        r.on_hand_frame(1, Some(&hand(1, 0.0, 0.0, true, 9.0)), true);
        r.on_hand_frame(1, Some(&hand(1, 5.0, 0.0, true, 9.0)), true);
        assert_eq!(
            r.on_hand_frame(1, None, true),
            StrokeOutcome::Discarded { slot: 1, points: 2 }
        );
    }

    #[test]
    fn dropout_seals() {
        let mut r = recorder();
        for i in 0..4 {
            r.on_hand_frame(0, Some(&hand(0, i as f32 * 10.0, 0.0, true, 10.0)), true);
        }
        assert!(matches!(r.on_hand_frame(0, None, true), StrokeOutcome::Sealed(_)));
    }

    #[test]
    fn slow_hand_does_not_draw() {
        let mut r = recorder();
        let h = hand(0, 10.0, 10.0, true, 3.0);
        assert_eq!(r.on_hand_frame(0, Some(&h), true), StrokeOutcome::Idle);
        assert!(r.open(0).is_none());
    }

    #[test]
    fn gate_blocks_and_seals() {
        let mut r = recorder();
        let h = hand(0, 10.0, 10.0, true, 6.0);
        assert_eq!(r.on_hand_frame(0, Some(&h), false), StrokeOutcome::Idle);
        for _ in 0..3 { r.on_hand_frame(0, Some(&h), true); }
        assert!(matches!(r.on_hand_frame(0, Some(&h), false), StrokeOutcome::Sealed(_)));
    }

    #[test]
    fn discard_all_drops_open() {
        let mut r = recorder();
        for _ in 0..5 {
            r.on_hand_frame(0, Some(&hand(0, 1.0, 1.0, true, 6.0)), true);
            r.on_hand_frame(1, Some(&hand(1, 1.0, 1.0, true, 6.0)), true);
        }
        assert_eq!(r.discard_all(), 2);
        assert_eq!(r.on_hand_frame(0, None, true), StrokeOutcome::Idle);
        assert_eq!(r.on_hand_frame(1, None, true), StrokeOutcome::Idle);
    }

    #[test]
    fn slots_are_independent() {
        let mut r = recorder();
        for _ in 0..3 {
            r.on_hand_frame(0, Some(&hand(0, 1.0, 1.0, true, 6.0)), true);
        }
        r.on_hand_frame(1, Some(&hand(1, 1.0, 1.0, true, 6.0)), true);
        assert_eq!(r.open(0).map(OpenStroke::len), Some(3));
        assert_eq!(r.open(1).map(OpenStroke::len), Some(1));
    }
}
