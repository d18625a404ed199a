//! Ambient animation state: particle bursts and doodles fading into the
//! margin.  Purely cosmetic; nothing here feeds back into the session.

use notebook_core::mood::DOODLE_COUNT;
use notebook_core::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on live particles.
const MAX_PARTICLES: usize = 256;

// ════════════════════════════════════════════════════════════════════════════
// Particle — a fleck of graphite dust drifting off the pencil
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x:  f32,
    pub y:  f32,
    pub vx: f32,
    pub vy: f32,
    /// 1.0 when spawned, gone at 0.0.
    pub life: f32,
    /// Hue seed in `[0, 1)`.
    pub hue:  f32,
}

pub struct ParticleField {
    pub particles: Vec<Particle>,
    rng:           StdRng,
}

impl ParticleField {
    pub fn new(seed: u64) -> Self {
        ParticleField { particles: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    /// Scatter `count` particles around `origin`.
    pub fn burst(&mut self, origin: Point, count: usize) {
        for _ in 0..count {
            let angle: f32 = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.random_range(0.8..2.6);
            self.particles.push(Particle {
                x:    origin.x,
                y:    origin.y,
                vx:   angle.cos() * speed,
                vy:   angle.sin() * speed,
                life: 1.0,
                hue:  self.rng.random(),
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Advance one frame: drift, slow down, fade.
    pub fn tick(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.vx *= 0.94;
            p.vy = p.vy * 0.94 + 0.03;
            p.life -= 0.025;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) { self.particles.clear(); }
}

// ════════════════════════════════════════════════════════════════════════════
// DoodleFades — how far each revealed margin doodle has faded in
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct DoodleFades {
    opacity: [f32; DOODLE_COUNT],
}

impl DoodleFades {
    /// Ramp revealed doodles toward fully drawn; hidden ones vanish at once.
    pub fn tick(&mut self, revealed: impl Fn(usize) -> bool) {
        for (i, o) in self.opacity.iter_mut().enumerate() {
            *o = if revealed(i) { (*o + 0.03).min(1.0) } else { 0.0 };
        }
    }

    pub fn opacity(&self, index: usize) -> f32 {
        self.opacity.get(index).copied().unwrap_or(0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_spawns_at_origin() {
        let mut f = ParticleField::new(7);
        f.burst(Point::new(50.0, 60.0), 8);
        assert_eq!(f.particles.len(), 8);
        assert!(f.particles.iter().all(|p| p.x == 50.0 && p.y == 60.0 && p.life == 1.0));
    }

    #[test]
    fn particles_fade_out() {
        let mut f = ParticleField::new(7);
        f.burst(Point::default(), 8);
        for _ in 0..100 { f.tick(); }
        assert!(f.particles.is_empty());
    }

    #[test]
    fn field_is_bounded() {
        let mut f = ParticleField::new(7);
        for _ in 0..100 { f.burst(Point::default(), 8); }
        assert_eq!(f.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn doodles_fade_in_and_vanish_on_clear() {
        let mut fades = DoodleFades::default();
        for _ in 0..10 { fades.tick(|i| i == 1); }
        assert!(fades.opacity(1) > 0.2 && fades.opacity(1) < 1.0);
        assert_eq!(fades.opacity(0), 0.0);
        for _ in 0..100 { fades.tick(|i| i == 1); }
        assert_eq!(fades.opacity(1), 1.0);
        fades.tick(|_| false);
        assert_eq!(fades.opacity(1), 0.0);
    }
}
