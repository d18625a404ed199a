//! # notebook_core
//!
//! The logic behind a two-player notebook page that is drawn on with hand
//! gestures.  Everything here is frame-driven and single-threaded: the app
//! calls [`Session::tick`] once per render tick with the latest tracking
//! frame and reads a [`Snapshot`] back.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Landmark classifier | [`classifier`] | up to two [`HandState`]s |
//! | Stroke recorder | [`stroke`] | open / sealed [`Stroke`]s |
//! | Game state machine | [`game`], [`replay`] | [`Mode`] transitions, replay log |
//! | Ambient mood | [`mood`] | creativity / distraction, doodle reveals |
//!
//! ## Gestures
//!
//! | Gesture | Hands | Effect |
//! |---|---|---|
//! | Pencil grip + movement | Either | Draw (when the game lets that hand draw) |
//! | Wave, 3 s | Both | Start game selection (from freeplay) |
//! | High-five, 15 frames | Both | Start the replay (after a game) |
//!
//! ## Quick start
//!
//! ```rust
//! use notebook_core::{LandmarkSet, Session, SessionConfig, TrackingFrame};
//!
//! let mut session = Session::with_seed(SessionConfig::default(), 1);
//! let frame = TrackingFrame::new(0, vec![LandmarkSet::synthetic(0.5, 0.5, true)]);
//! let _events = session.tick(0, Some(&frame));
//! assert!(session.snapshot().hands[0].as_ref().unwrap().writing);
//! ```

pub mod error;
pub mod config;
pub mod landmarks;
pub mod classifier;
pub mod stroke;
pub mod replay;
pub mod game;
pub mod mood;
pub mod session;

pub use classifier::{Classifier, HandState, SLOTS};
pub use config::SessionConfig;
pub use error::{ConfigError, LandmarkError, TransitionError};
pub use game::{GameSession, GameType, Mode, ModeKind, Transition, Trigger};
pub use landmarks::{Landmark, LandmarkSet, TrackingFrame};
pub use mood::{Doodle, MoodEvent, MoodState, DOODLES};
pub use replay::{ReplayEntry, ReplayLog};
pub use session::{Command, DisplayFlags, InputCapability, SessionEvent, Session, Snapshot};
pub use stroke::{OpenStroke, Point, Stroke};
