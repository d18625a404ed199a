//! Paper-and-ink colors.
//!
//! Everything is packed ARGB (`0xAARRGGBB`, A = 0xFF) as `minifb` expects.

pub const PAPER:       u32 = 0xFFFBF7EA;
pub const RULE:        u32 = 0xFFB9D3E8;
pub const MARGIN:      u32 = 0xFFE07A7A;
pub const GRAPHITE:    u32 = 0xFF4A4A4A;
pub const BANNER_BG:   u32 = 0xFF2E3A59;
pub const BANNER_TEXT: u32 = 0xFFF5F0E1;
pub const STATUS_BG:   u32 = 0xFFE9E2CF;
pub const DOODLE_INK:  u32 = 0xFF8A7F9E;
pub const METER_BG:    u32 = 0xFF4B587A;
pub const CREATIVITY:  u32 = 0xFFF2B134;
pub const DISTRACTION: u32 = 0xFF67B6C7;
pub const REPLAY_BAR:  u32 = 0xFF7FB069;

/// Convert HSV → packed ARGB.  `h` in degrees, `s`/`v` in `[0, 1]`.
pub fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

/// Linear mix of two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Soft pastel for an ambient particle; `seed` picks the hue.
pub fn particle_color(seed: f32) -> u32 {
    hsv_to_argb(seed * 360.0, 0.45, 0.95)
}

/// Paper tint drifting warmer as creativity rises.
pub fn paper_tint(creativity: f32) -> u32 {
    blend(PAPER, 0xFFFFEFD2, creativity * 0.6)
}
