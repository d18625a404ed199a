//! Raw hand landmarks as delivered by a tracking source.
//!
//! A [`LandmarkSet`] follows the common 21-point hand convention (wrist = 0,
//! then four points per digit from thumb to pinky).  Coordinates are
//! normalized image space: `x` and `y` in `[0, 1]`, `y` growing downward.

// ════════════════════════════════════════════════════════════════════════════
// Indices
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:        usize = 0;
pub const THUMB_TIP:    usize = 4;
pub const INDEX_BASE:   usize = 5;
pub const INDEX_TIP:    usize = 8;
pub const MIDDLE_TIP:   usize = 12;
pub const POINT_COUNT:  usize = 21;

/// Points the classifier cannot work without.
pub const REQUIRED: [usize; 4] = [INDEX_TIP, INDEX_BASE, THUMB_TIP, MIDDLE_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self { Landmark { x, y } }

    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand.  Opaque to everything except the classifier; hand
/// states carry it through so the renderer can draw the skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet {
    pub points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self { LandmarkSet { points } }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn get(&self, index: usize) -> Option<&Landmark> { self.points.get(index) }

    /// Build a plausible hand around an index fingertip at `(tip_x, tip_y)`.
    ///
    /// With `writing` the thumb closes on the index tip (pencil grip);
    /// without it the hand is open.  Used by the keyboard simulator and
    /// by tests.
    pub fn synthetic(tip_x: f32, tip_y: f32, writing: bool) -> Self {
        let mut points = vec![Landmark::new(tip_x, tip_y + 0.30); POINT_COUNT];

        let (thumb_dx, thumb_dy) = if writing { (0.05, 0.03) } else { (0.25, 0.20) };

        // thumb
        points[1] = Landmark::new(tip_x + 0.10, tip_y + 0.26);
        points[2] = Landmark::new(tip_x + 0.14, tip_y + 0.20);
        points[3] = Landmark::new(tip_x + thumb_dx, tip_y + thumb_dy + 0.04);
        points[THUMB_TIP] = Landmark::new(tip_x + thumb_dx, tip_y + thumb_dy);

        // index, base knuckle below the tip
        points[INDEX_BASE] = Landmark::new(tip_x, tip_y + 0.10);
        points[6] = Landmark::new(tip_x, tip_y + 0.07);
        points[7] = Landmark::new(tip_x, tip_y + 0.035);
        points[INDEX_TIP] = Landmark::new(tip_x, tip_y);

        // middle, ring, pinky fan out to the other side of the thumb
        for (finger, base) in [(0usize, 9usize), (1, 13), (2, 17)] {
            let fx = tip_x - 0.05 * (finger as f32 + 1.0);
            let reach = if writing && finger > 0 { 0.12 } else { 0.0 };
            points[base]     = Landmark::new(fx, tip_y + 0.11);
            points[base + 1] = Landmark::new(fx, tip_y + 0.06 + reach);
            points[base + 2] = Landmark::new(fx, tip_y + 0.02 + reach);
            points[base + 3] = Landmark::new(fx, tip_y - 0.02 + reach);
        }

        LandmarkSet { points }
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self { LandmarkSet { points } }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingFrame
// ════════════════════════════════════════════════════════════════════════════

/// One tracking result.  `timestamp_ms` identifies the delivery so a frame
/// seen on several render ticks is classified only once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackingFrame {
    pub timestamp_ms: u64,
    pub hands:        Vec<LandmarkSet>,
}

impl TrackingFrame {
    pub fn new(timestamp_ms: u64, hands: Vec<LandmarkSet>) -> Self {
        TrackingFrame { timestamp_ms, hands }
    }

    pub fn empty(timestamp_ms: u64) -> Self {
        TrackingFrame { timestamp_ms, hands: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_has_all_points() {
        let hand = LandmarkSet::synthetic(0.5, 0.5, true);
        assert_eq!(hand.len(), POINT_COUNT);
        for &i in &REQUIRED {
            assert!(hand.get(i).is_some());
        }
    }

    #[test]
    fn synthetic_grip_closes_thumb() {
        let open  = LandmarkSet::synthetic(0.5, 0.5, false);
        let grip  = LandmarkSet::synthetic(0.5, 0.5, true);
        let d = |h: &LandmarkSet| h.points[THUMB_TIP].distance(&h.points[INDEX_TIP]);
        assert!(d(&grip) < 0.15);
        assert!(d(&open) > 0.15);
    }
}
