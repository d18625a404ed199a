//! Top-level application loop.
//!
//! `AppState` owns the notebook [`Session`] plus the purely visual state
//! (particles, doodle fades, status line).  It turns window input and
//! tracking messages into session calls, and session events into status
//! text and animation.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use anyhow::Context;
use notebook_core::{
    Command, InputCapability, MoodEvent, Session, SessionConfig, SessionEvent, TrackingFrame,
};
use tracing::{debug, info, warn};

use crate::ambient::{DoodleFades, ParticleField};
use crate::tracking::{spawn_landmark_source, SimInput, TrackingMessage};
use crate::visualizer::{UiInput, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub session: SessionConfig,
    /// Fixes game selection and particle scatter; random when `None`.
    pub seed:    Option<u64>,
}

impl AppConfig {
    /// Window size in pixels: the canvas, one pixel per unit.
    pub fn window_size(&self) -> (usize, usize) {
        (self.session.canvas_width as usize, self.session.canvas_height as usize)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    session:   Session,
    particles: ParticleField,
    fades:     DoodleFades,

    /// Newest tracking frame; re-delivered until a newer one arrives.
    latest:        Option<TrackingFrame>,
    tracking_live: bool,

    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        let (session, particle_seed) = match cfg.seed {
            Some(seed) => (Session::with_seed(cfg.session, seed), seed),
            None => (Session::new(cfg.session), rand::random()),
        };

        AppState {
            session,
            particles:     ParticleField::new(particle_seed),
            fades:         DoodleFades::default(),
            latest:        None,
            tracking_live: true,
            status:        "Ready - draw with a pencil grip, wave both hands to play".to_string(),
        }
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Apply one window input.  Returns false when the app should quit.
    pub fn handle_input(&mut self, input: UiInput) -> bool {
        match input {
            UiInput::Quit => return false,
            UiInput::Command(command) => {
                debug!(?command, "command");
                if command == Command::ClearAll {
                    self.particles.clear();
                    self.status = "Page cleared".to_string();
                }
                self.session.apply(command);
            }
            UiInput::PointerDown { x, y } => self.session.pointer_press(x, y),
            UiInput::PointerMove { x, y } => self.session.pointer_move(x, y),
            UiInput::PointerUp            => self.session.pointer_release(),
        }
        true
    }

    /// Drain every pending tracking message, keeping only the newest frame.
    pub fn drain_tracking(&mut self, rx: &Receiver<TrackingMessage>) {
        if !self.tracking_live { return; }
        loop {
            match rx.try_recv() {
                Ok(TrackingMessage::Frame(frame)) => self.latest = Some(frame),
                Ok(TrackingMessage::Unavailable(reason)) => {
                    self.tracking_lost(&reason);
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.tracking_lost("tracking source stopped");
                    return;
                }
            }
        }
    }

    /// Fall back to pointer-only drawing for the rest of the run.
    pub fn tracking_lost(&mut self, reason: &str) {
        warn!(reason, "hand tracking unavailable; pointer input only");
        self.tracking_live = false;
        self.latest = None;
        self.session.set_capability(InputCapability::PointerOnly);
        self.status = "Tracking unavailable - draw with the mouse".to_string();
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now_ms: u64) {
        let events = self.session.tick(now_ms, self.latest.as_ref());
        for event in &events {
            self.handle_event(event);
        }

        self.particles.tick();
        let session = &self.session;
        self.fades.tick(|i| session.doodle_revealed(i));
    }

    fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::StrokeFiled { slot, points } => {
                self.status = format!("Player {} filed a {}-point stroke", slot + 1, points);
            }
            SessionEvent::StrokeDiscarded { points, .. } => {
                self.status = format!("Stroke too short ({} points), dropped", points);
            }
            SessionEvent::ModeChanged(t) => {
                self.status = format!("{} -> {}", t.from.as_str(), t.to.as_str());
            }
            SessionEvent::GameChosen(game) => {
                info!(game = game.as_str(), "next game announced");
                self.status = format!("Next game: {}", game.as_str());
            }
            SessionEvent::ReplayStep { index } => {
                self.status = format!("Replaying stroke {}", index + 1);
            }
            SessionEvent::CollaborationPrompt { waiting } => {
                self.status = format!("Player {}, come draw too!", waiting + 1);
            }
            SessionEvent::Mood(MoodEvent::AmbientBurst { count, origin }) => {
                self.particles.burst(*origin, *count);
            }
            SessionEvent::Mood(MoodEvent::DoodleRevealed { name, .. }) => {
                self.status = format!("A {} appears in the margin", name);
            }
        }
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn session(&self)   -> &Session       { &self.session }
    pub fn particles(&self) -> &ParticleField { &self.particles }
    pub fn fades(&self)     -> &DoodleFades   { &self.fades }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the window, the landmark source (simulation by default, hardware
/// with `--features leap`) and drives the input/tick/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.session.validate().context("invalid session config")?;
    let (width, height) = cfg.window_size();

    // ── Landmark source ───────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    #[cfg(feature = "leap")]
    let tracking_rx = {
        drop(sim_rx);
        spawn_landmark_source(crate::tracking::LeapLandmarkSource)
    };
    #[cfg(not(feature = "leap"))]
    let tracking_rx = spawn_landmark_source(crate::tracking::SimLandmarkSource::new(sim_rx));

    // ── Window (owns the sim input sender) ────────────────────────────────
    let mut vis = Visualizer::new(width, height, sim_tx)?;
    let mut app = AppState::new(cfg);
    info!(width, height, "notebook open");

    // ── Main loop ─────────────────────────────────────────────────────────
    let start = Instant::now();
    while vis.is_open() {
        for input in vis.poll_input() {
            if !app.handle_input(input) {
                info!("quit");
                return Ok(());
            }
        }

        app.drain_tracking(&tracking_rx);

        let now_ms = start.elapsed().as_millis() as u64;
        app.tick(now_ms);

        let view = app.session().snapshot();
        vis.render(&view, app.particles(), app.fades(), &app.status, now_ms)?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_core::{LandmarkSet, ModeKind};

    fn make_app() -> AppState {
        AppState::new(AppConfig { seed: Some(9), ..AppConfig::default() })
    }

    fn writing_frame(ts: u64, x: f32) -> TrackingMessage {
        TrackingMessage::Frame(TrackingFrame::new(ts, vec![LandmarkSet::synthetic(x, 0.5, true)]))
    }

    #[test]
    fn window_matches_canvas() {
        assert_eq!(AppConfig::default().window_size(), (1200, 800));
    }

    #[test]
    fn only_newest_frame_is_used() {
        let mut app = make_app();
        let (tx, rx) = mpsc::channel();
        tx.send(writing_frame(0, 0.2)).unwrap();
        tx.send(TrackingMessage::Frame(TrackingFrame::new(16, vec![
            LandmarkSet::synthetic(0.3, 0.5, false),
            LandmarkSet::synthetic(0.6, 0.5, false),
        ]))).unwrap();
        app.drain_tracking(&rx);
        app.tick(16);
        assert!(app.session().hands().iter().all(Option::is_some));
    }

    #[test]
    fn frame_is_redelivered_between_arrivals() {
        let mut app = make_app();
        let (tx, rx) = mpsc::channel();
        tx.send(writing_frame(0, 0.5)).unwrap();
        app.drain_tracking(&rx);
        app.tick(0);
        app.drain_tracking(&rx);
        app.tick(16);
        assert!(app.session().hands()[0].is_some());
    }

    #[test]
    fn unavailable_switches_to_pointer() {
        let mut app = make_app();
        let (tx, rx) = mpsc::channel();
        tx.send(writing_frame(0, 0.5)).unwrap();
        tx.send(TrackingMessage::Unavailable("no device".into())).unwrap();
        app.drain_tracking(&rx);
        app.tick(0);
        assert_eq!(app.session().capability(), InputCapability::PointerOnly);
        assert!(app.session().hands()[0].is_none());
    }

    #[test]
    fn closed_source_switches_to_pointer() {
        let mut app = make_app();
        let (tx, rx) = mpsc::channel::<TrackingMessage>();
        drop(tx);
        app.drain_tracking(&rx);
        assert_eq!(app.session().capability(), InputCapability::PointerOnly);
    }

    #[test]
    fn quit_input_stops_the_loop() {
        let mut app = make_app();
        assert!(app.handle_input(UiInput::Command(Command::ToggleVisualization)));
        assert!(!app.handle_input(UiInput::Quit));
    }

    #[test]
    fn mouse_draws_a_stroke() {
        let mut app = make_app();
        app.tracking_lost("test");
        app.handle_input(UiInput::PointerDown { x: 200.0, y: 200.0 });
        for i in 0..4u64 {
            app.handle_input(UiInput::PointerMove { x: 200.0 + i as f32 * 10.0, y: 200.0 });
            app.tick(i * 16);
        }
        app.handle_input(UiInput::PointerUp);
        app.tick(64);
        assert_eq!(app.session().history().len(), 1);
        assert_eq!(app.status, "Player 1 filed a 3-point stroke");
    }

    #[test]
    fn starting_to_draw_scatters_particles() {
        let mut app = make_app();
        let (tx, rx) = mpsc::channel();
        for i in 0..3u64 {
            tx.send(writing_frame(i * 16, 0.5 + i as f32 * 0.01)).unwrap();
            app.drain_tracking(&rx);
            app.tick(i * 16);
        }
        assert!(!app.particles().particles.is_empty());

        app.handle_input(UiInput::Command(Command::ClearAll));
        assert!(app.particles().particles.is_empty());
    }

    #[test]
    fn forced_selection_announces_the_game() {
        let mut app = make_app();
        app.handle_input(UiInput::Command(Command::ForceGameSelection));
        app.tick(0);
        assert_eq!(app.session().mode().kind(), ModeKind::GameSelection);
        assert!(app.status.starts_with("Next game: "), "{}", app.status);
    }

    #[test]
    fn solo_drawing_asks_the_other_player_in() {
        let mut app = make_app();
        app.tracking_lost("test");
        let delay = app.session().config().collab_prompt_delay_ms;
        app.handle_input(UiInput::PointerDown { x: 200.0, y: 200.0 });
        let mut t = 0;
        while t <= delay + 32 {
            let x = 200.0 + ((t / 16) % 2) as f32 * 20.0;
            app.handle_input(UiInput::PointerMove { x, y: 200.0 });
            app.tick(t);
            t += 16;
        }
        assert_eq!(app.status, "Player 2, come draw too!");
    }
}
