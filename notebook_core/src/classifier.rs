//! Landmark classifier — one tracking frame in, up to two [`HandState`]s out.
//!
//! # Algorithm
//!
//! For each of the first two landmark sets (detection order = slot):
//!
//! * **Position**: the index fingertip mapped to canvas pixels with the
//!   horizontal axis mirrored, so the canvas behaves like a mirror.
//! * **Velocity**: displacement of that position since the previous frame in
//!   the same slot, normalized to a reference frame length.  A slot that was
//!   empty last frame starts again at velocity 0.
//! * **Writing pose**: index tip above its base knuckle AND the thumb tip
//!   close to either the index tip or (looser) the middle tip.
//! * **Waving**: fast AND not writing.  The two are exclusive.

use tracing::debug;

use crate::config::SessionConfig;
use crate::error::LandmarkError;
use crate::landmarks::{
    Landmark, LandmarkSet, TrackingFrame, INDEX_BASE, INDEX_TIP, MIDDLE_TIP, THUMB_TIP,
};
use crate::stroke::Point;

pub const SLOTS: usize = 2;

// ════════════════════════════════════════════════════════════════════════════
// HandState
// ════════════════════════════════════════════════════════════════════════════

/// The classifier's verdict on one hand for one frame.  The slot doubles as
/// the owning player index.
#[derive(Clone, Debug, PartialEq)]
pub struct HandState {
    pub slot:      usize,
    pub position:  Point,
    pub landmarks: LandmarkSet,
    pub writing:   bool,
    pub waving:    bool,
    pub velocity:  f32,
}

impl HandState {
    /// Writing pose and moving fast enough to lay down ink.
    pub fn is_drawing(&self, draw_velocity: f32) -> bool {
        self.writing && self.velocity > draw_velocity
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pose geometry
// ════════════════════════════════════════════════════════════════════════════

/// The four points classification needs, or the first one missing.
fn required_points(set: &LandmarkSet) -> Result<[Landmark; 4], LandmarkError> {
    let fetch = |index: usize| -> Result<Landmark, LandmarkError> {
        let p = set.get(index).ok_or(LandmarkError::Missing { index, len: set.len() })?;
        if p.x.is_finite() && p.y.is_finite() {
            Ok(*p)
        } else {
            Err(LandmarkError::NonFinite { index })
        }
    };
    Ok([fetch(INDEX_TIP)?, fetch(INDEX_BASE)?, fetch(THUMB_TIP)?, fetch(MIDDLE_TIP)?])
}

/// Pencil-grip test on normalized landmarks.
pub fn is_writing_pose(
    set:                   &LandmarkSet,
    grip_threshold:        f32,
    middle_grip_threshold: f32,
) -> Result<bool, LandmarkError> {
    let [index_tip, index_base, thumb_tip, middle_tip] = required_points(set)?;
    let pointing = index_tip.y < index_base.y;
    let gripped = thumb_tip.distance(&index_tip) < grip_threshold
        || thumb_tip.distance(&middle_tip) < middle_grip_threshold;
    Ok(pointing && gripped)
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

pub struct Classifier {
    canvas_width:          f32,
    canvas_height:         f32,
    grip_threshold:        f32,
    middle_grip_threshold: f32,
    wave_velocity:         f32,
    reference_frame_ms:    f32,

    /// Last fingertip position and frame time per slot.
    previous:   [Option<(Point, u64)>; SLOTS],
    last_frame: Option<u64>,
    cached:     [Option<HandState>; SLOTS],
}

impl Classifier {
    pub fn new(cfg: &SessionConfig) -> Self {
        Classifier {
            canvas_width:          cfg.canvas_width,
            canvas_height:         cfg.canvas_height,
            grip_threshold:        cfg.grip_threshold,
            middle_grip_threshold: cfg.middle_grip_threshold,
            wave_velocity:         cfg.wave_velocity,
            reference_frame_ms:    cfg.reference_frame_ms,
            previous:   [None, None],
            last_frame: None,
            cached:     [None, None],
        }
    }

    /// Mirror a normalized point into canvas pixels.
    pub fn to_canvas(&self, p: &Landmark) -> Point {
        Point::new((1.0 - p.x) * self.canvas_width, p.y * self.canvas_height)
    }

    /// True if `frame` is the one most recently classified.
    pub fn has_seen(&self, frame: &TrackingFrame) -> bool {
        self.last_frame == Some(frame.timestamp_ms)
    }

    /// Classify one frame.  Delivering the same frame again returns the
    /// cached result untouched.
    pub fn classify(&mut self, frame: &TrackingFrame) -> [Option<HandState>; SLOTS] {
        if self.last_frame == Some(frame.timestamp_ms) {
            return self.cached.clone();
        }

        let mut out: [Option<HandState>; SLOTS] = [None, None];
        for slot in 0..SLOTS {
            out[slot] = match frame.hands.get(slot) {
                Some(set) => match self.classify_hand(slot, set, frame.timestamp_ms) {
                    Ok(state) => Some(state),
                    Err(e) => {
                        debug!(slot, error = %e, "rejecting landmark set");
                        None
                    }
                },
                None => None,
            };
            if out[slot].is_none() {
                self.previous[slot] = None;
            }
        }

        self.last_frame = Some(frame.timestamp_ms);
        self.cached = out.clone();
        out
    }

    fn classify_hand(
        &mut self,
        slot: usize,
        set:  &LandmarkSet,
        now:  u64,
    ) -> Result<HandState, LandmarkError> {
        let writing = is_writing_pose(set, self.grip_threshold, self.middle_grip_threshold)?;
        let [index_tip, ..] = required_points(set)?;
        let position = self.to_canvas(&index_tip);

        let velocity = match self.previous[slot] {
            Some((prev, t)) => {
                let dist = position.distance(&prev);
                let dt = now.saturating_sub(t);
                if dt == 0 { dist } else { dist * self.reference_frame_ms / dt as f32 }
            }
            None => 0.0,
        };
        self.previous[slot] = Some((position, now));

        Ok(HandState {
            slot,
            position,
            landmarks: set.clone(),
            writing,
            waving: velocity > self.wave_velocity && !writing,
            velocity,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(&SessionConfig::default())
    }

    #[test]
    fn position_is_mirrored() {
        let mut c = classifier();
        let frame = TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.25, 0.5, true)]);
        let [h0, h1] = c.classify(&frame);
        let h0 = h0.unwrap();
        assert!(h1.is_none());
        assert!((h0.position.x - 900.0).abs() < 1e-3);
        assert!((h0.position.y - 400.0).abs() < 1e-3);
    }

    #[test]
    fn grip_is_writing_open_hand_is_not() {
        let mut c = classifier();
        let frame = TrackingFrame::new(0, vec![
            LandmarkSet::synthetic(0.3, 0.5, true),
            LandmarkSet::synthetic(0.7, 0.5, false),
        ]);
        let [h0, h1] = c.classify(&frame);
        assert!(h0.unwrap().writing);
        assert!(!h1.unwrap().writing);
    }

    #[test]
    fn index_below_knuckle_is_not_writing() {
        let mut set = LandmarkSet::synthetic(0.5, 0.5, true);
        set.points[INDEX_BASE].y = 0.4;
        assert!(!is_writing_pose(&set, 0.15, 0.20).unwrap());
    }

    #[test]
    fn middle_grip_alone_counts() {
        let mut set = LandmarkSet::synthetic(0.5, 0.5, false);
        let middle = set.points[MIDDLE_TIP];
        set.points[THUMB_TIP] = Landmark::new(middle.x - 0.18, middle.y);
        assert!(set.points[THUMB_TIP].distance(&set.points[INDEX_TIP]) >= 0.15);
        assert!(is_writing_pose(&set, 0.15, 0.20).unwrap());
    }

    #[test]
    fn velocity_from_displacement() {
        let mut c = classifier();
        c.classify(&TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, false)]));
        // 0.01 * 1200 = 12 px in one 16 ms frame
        let [h0, _] = c.classify(&TrackingFrame::new(16, vec![LandmarkSet::synthetic(0.49, 0.5, false)]));
        let h0 = h0.unwrap();
        assert!((h0.velocity - 12.0).abs() < 1e-2);
        assert!(h0.waving);
    }

    #[test]
    fn velocity_normalized_to_frame_length() {
        let mut c = classifier();
        c.classify(&TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, false)]));
        let [h0, _] = c.classify(&TrackingFrame::new(32, vec![LandmarkSet::synthetic(0.49, 0.5, false)]));
        assert!((h0.unwrap().velocity - 6.0).abs() < 1e-2);
    }

    #[test]
    fn writing_hand_never_waves() {
        let mut c = classifier();
        c.classify(&TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, true)]));
        let [h0, _] = c.classify(&TrackingFrame::new(16, vec![LandmarkSet::synthetic(0.4, 0.5, true)]));
        let h0 = h0.unwrap();
        assert!(h0.velocity > 8.0);
        assert!(h0.writing);
        assert!(!h0.waving);
    }

    #[test]
    fn dropout_resets_velocity() {
        let mut c = classifier();
        c.classify(&TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, false)]));
        c.classify(&TrackingFrame::empty(16));
        let [h0, _] = c.classify(&TrackingFrame::new(32, vec![LandmarkSet::synthetic(0.1, 0.5, false)]));
        assert_eq!(h0.unwrap().velocity, 0.0);
    }

    #[test]
    fn malformed_hand_rejected_other_kept() {
        let mut c = classifier();
        let short = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 6]);
        let frame = TrackingFrame::new(0, vec![short, LandmarkSet::synthetic(0.5, 0.5, true)]);
        let [h0, h1] = c.classify(&frame);
        assert!(h0.is_none());
        assert_eq!(h1.unwrap().slot, 1);
    }

    #[test]
    fn non_finite_rejected() {
        let mut set = LandmarkSet::synthetic(0.5, 0.5, true);
        set.points[THUMB_TIP].x = f32::NAN;
        assert_eq!(
            is_writing_pose(&set, 0.15, 0.20),
            Err(LandmarkError::NonFinite { index: THUMB_TIP })
        );
    }

    #[test]
    fn third_hand_ignored() {
        let mut c = classifier();
        let frame = TrackingFrame::new(0, vec![
            LandmarkSet::synthetic(0.2, 0.5, true),
            LandmarkSet::synthetic(0.5, 0.5, true),
            LandmarkSet::synthetic(0.8, 0.5, true),
        ]);
        let out = c.classify(&frame);
        assert_eq!(out.iter().flatten().count(), 2);
    }

    #[test]
    fn same_frame_returns_cached_velocity() {
        let mut c = classifier();
        c.classify(&TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, false)]));
        let frame = TrackingFrame::new(16, vec![LandmarkSet::synthetic(0.49, 0.5, false)]);
        assert!(!c.has_seen(&frame));
        let first = c.classify(&frame);
        assert!(c.has_seen(&frame));
        let again = c.classify(&frame);
        assert_eq!(first, again);
        assert!(again[0].as_ref().unwrap().velocity > 0.0);
    }
}
