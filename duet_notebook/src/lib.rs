//! # duet_notebook
//!
//! A notebook page two people draw on together with their hands.  Landmarks
//! come from a LeapMotion controller or a keyboard simulator; the session
//! logic lives in `notebook_core`, and this crate adds the window, input and
//! ambient animation around it.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Pencil grip + movement | Either | Draw in that hand's color |
//! | Wave for 3 s | Both | Pick a mini-game (freeplay only) |
//! | High-five, held | Both | Replay the finished game at 3× speed |
//!
//! ## Visualization
//!
//! Ruled paper with a red margin.  The rules wobble as the room gets
//! distracted; doodles fade into the margin as creativity grows.  A banner
//! shows the mode, phase and countdown, with two mood meters on the right.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: held keys pose synthetic hands.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `W` (hold) | Both hands wave |
//! | `F` (hold) | High-five |
//! | `J` / `K` (hold) | Hand 1 / hand 2 writes |
//! | Mouse (left button) | Draw when tracking is unavailable |
//! | `C` | Clear the page |
//! | `V` | Toggle landmark view |
//! | `P` | Toggle presentation mode |
//! | `H` | Show or hide the key legend |
//! | `1` | Start game selection |
//! | `2` | Start (or restart) the replay |
//! | `N` | Next game phase |
//! | `Tab` | Pass the turn (continuous line) |
//! | `Q` | Quit |

pub mod tracking;
pub mod palette;
pub mod ambient;
pub mod visualizer;
pub mod app;
