//! Session tuning.
//!
//! Every threshold and timer the core uses lives in [`SessionConfig`].  The
//! defaults are the values the installation was tuned with; a JSON file can
//! override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    // ── canvas ───────────────────────────────────────────────────────────
    pub canvas_width:  f32,
    pub canvas_height: f32,

    // ── classifier ───────────────────────────────────────────────────────
    /// Thumb-tip to index-tip distance (normalized) below which the hand grips.
    pub grip_threshold:        f32,
    /// Looser thumb-tip to middle-tip grip distance (normalized).
    pub middle_grip_threshold: f32,
    /// Velocity (px per reference frame) above which a non-writing hand waves.
    pub wave_velocity:         f32,
    /// Frame length velocities are normalized to.
    pub reference_frame_ms:    f32,

    // ── stroke recorder ──────────────────────────────────────────────────
    pub draw_velocity:     f32,
    pub min_stroke_points: usize,
    /// ARGB color per slot.
    pub hand_colors:       [u32; 2],

    // ── game state machine ───────────────────────────────────────────────
    pub wave_duration_ms:       u64,
    pub wave_tolerance_ms:      u64,
    pub selection_countdown_ms: u64,
    pub highfive_distance:      f32,
    pub highfive_frames:        u32,
    pub replay_speed:           f32,
    /// One player drawing alone this long in freeplay prompts the other.
    pub collab_prompt_delay_ms: u64,

    // ── mood ─────────────────────────────────────────────────────────────
    pub idle_decay_delay_ms:   u64,
    pub doodle_threshold_scale: f32,
    pub ambient_burst_count:   usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            canvas_width:  1200.0,
            canvas_height: 800.0,

            grip_threshold:        0.15,
            middle_grip_threshold: 0.20,
            wave_velocity:         8.0,
            reference_frame_ms:    16.0,

            draw_velocity:     3.0,
            min_stroke_points: 3,
            hand_colors:       [0xFF2B4C9B, 0xFFC8442C],

            wave_duration_ms:       3000,
            wave_tolerance_ms:      700,
            selection_countdown_ms: 3000,
            highfive_distance:      150.0,
            highfive_frames:        15,
            replay_speed:           3.0,
            collab_prompt_delay_ms: 8000,

            idle_decay_delay_ms:    2000,
            doodle_threshold_scale: 0.3,
            ambient_burst_count:    8,
        }
    }
}

impl SessionConfig {
    /// Load a config from a JSON file.  Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: SessionConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the core cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: format!("must be > 0, got {}", v) })
            }
        }

        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("grip_threshold", self.grip_threshold)?;
        positive("middle_grip_threshold", self.middle_grip_threshold)?;
        positive("reference_frame_ms", self.reference_frame_ms)?;
        positive("replay_speed", self.replay_speed)?;
        positive("highfive_distance", self.highfive_distance)?;

        if self.min_stroke_points == 0 {
            return Err(ConfigError::Invalid {
                field:  "min_stroke_points",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.highfive_frames == 0 {
            return Err(ConfigError::Invalid {
                field:  "highfive_frames",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SessionConfig = serde_json::from_str(r#"{ "replay_speed": 2.0 }"#).unwrap();
        assert_eq!(cfg.replay_speed, 2.0);
        assert_eq!(cfg.wave_duration_ms, 3000);
        assert_eq!(cfg.hand_colors, SessionConfig::default().hand_colors);
    }

    #[test]
    fn zero_speed_rejected() {
        let cfg = SessionConfig { replay_speed: 0.0, ..SessionConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "replay_speed", .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SessionConfig::from_json_file("/nonexistent/notebook.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
