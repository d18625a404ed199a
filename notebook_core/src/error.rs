//! Error types for the notebook core.
//!
//! None of these are fatal to a running session: a rejected landmark set
//! just leaves its slot empty for the frame, and an illegal transition
//! leaves the session where it was.

use std::path::PathBuf;

use crate::game::{ModeKind, Trigger};

/// A landmark set that cannot be classified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LandmarkError {
    #[error("landmark set has {len} points, index {index} is required")]
    Missing { index: usize, len: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// A trigger that has no edge out of the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no transition from {from:?} on {trigger:?}")]
pub struct TransitionError {
    pub from:    ModeKind,
    pub trigger: Trigger,
}

/// Failure to load or validate a [`crate::config::SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
