//! Replay log — every stroke filed during a game, in creation order.

use crate::stroke::Stroke;

/// One filed stroke with the moment it was drawn, relative to game start.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayEntry {
    stroke:    Stroke,
    offset_ms: u64,
    player:    usize,
}

impl ReplayEntry {
    pub fn stroke(&self)    -> &Stroke { &self.stroke }
    pub fn offset_ms(&self) -> u64     { self.offset_ms }
    pub fn player(&self)    -> usize   { self.player }
}

#[derive(Clone, Debug, Default)]
pub struct ReplayLog {
    entries: Vec<ReplayEntry>,
}

impl ReplayLog {
    pub fn record(&mut self, stroke: Stroke, offset_ms: u64) {
        let player = stroke.slot();
        self.entries.push(ReplayEntry { stroke, offset_ms, player });
    }

    pub fn entries(&self) -> &[ReplayEntry] { &self.entries }
    pub fn len(&self)     -> usize          { self.entries.len() }
    pub fn is_empty(&self) -> bool          { self.entries.is_empty() }
    pub fn clear(&mut self)                 { self.entries.clear(); }

    /// Index one past the last entry due after `elapsed_ms` of playback at
    /// `speed`×, never moving backwards from `next`.  Entries are consumed
    /// strictly in order: a later entry with an earlier offset still waits
    /// for its predecessors.
    pub fn due_until(&self, next: usize, elapsed_ms: u64, speed: f32) -> usize {
        let played_ms = elapsed_ms as f64 * speed as f64;
        let mut i = next;
        while let Some(e) = self.entries.get(i) {
            if (e.offset_ms as f64) > played_ms { break; }
            i += 1;
        }
        i
    }

    /// Fraction of the log already played back.
    pub fn progress(&self, next: usize) -> f32 {
        if self.entries.is_empty() {
            1.0
        } else {
            (next.min(self.entries.len()) as f32) / self.entries.len() as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{OpenStroke, Point};

    fn stroke(slot: usize) -> Stroke {
        let mut s = OpenStroke::new(slot, 0xFF000000);
        for i in 0..3 { s.push(Point::new(i as f32, 0.0)); }
        s.seal()
    }

    fn log(offsets: &[u64]) -> ReplayLog {
        let mut log = ReplayLog::default();
        for (i, &o) in offsets.iter().enumerate() {
            log.record(stroke(i % 2), o);
        }
        log
    }

    #[test]
    fn entries_keep_player_and_order() {
        let log = log(&[100, 200, 300]);
        let players: Vec<usize> = log.entries().iter().map(ReplayEntry::player).collect();
        assert_eq!(players, vec![0, 1, 0]);
    }

    #[test]
    fn due_respects_speed() {
        let log = log(&[300, 600, 900]);
        // 3× speed: offset 300 is due at 100 ms of playback
        assert_eq!(log.due_until(0, 99, 3.0), 0);
        assert_eq!(log.due_until(0, 100, 3.0), 1);
        assert_eq!(log.due_until(1, 250, 3.0), 2);
        assert_eq!(log.due_until(2, 300, 3.0), 3);
    }

    #[test]
    fn due_is_strictly_ordered() {
        let log = log(&[500, 100]);
        assert_eq!(log.due_until(0, 40, 3.0), 0);
    }

    #[test]
    fn progress_fraction() {
        let log = log(&[1, 2, 3, 4]);
        assert_eq!(log.progress(0), 0.0);
        assert_eq!(log.progress(2), 0.5);
        assert_eq!(ReplayLog::default().progress(0), 1.0);
    }
}
