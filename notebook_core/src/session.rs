//! The notebook session — the one context object every tick runs through.
//!
//! `Session` owns the classifier, stroke recorder, game state machine and
//! mood model, plus the free-draw history.  Nothing here is global: the app
//! builds one at startup and drives it from its render loop.
//!
//! Per tick:
//!
//! 1. classify the latest tracking frame (or treat every slot as absent);
//! 2. let the pointer stand in for slot 0 when allowed;
//! 3. feed each slot to the stroke recorder under the game's drawing gate,
//!    filing whatever gets sealed (a re-delivered frame leaves strokes alone);
//! 4. run the game's clocks and detectors, applying any transition;
//! 5. update the mood model from every drawing hand, gated or not;
//! 6. prompt the idle player when one person has drawn alone too long.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::classifier::{Classifier, HandState, SLOTS};
use crate::config::SessionConfig;
use crate::game::{GameSession, GameType, Mode, ModeKind, PhaseStep, Transition, Trigger};
use crate::landmarks::{LandmarkSet, TrackingFrame};
use crate::mood::{Doodle, MoodEvent, MoodModel, MoodState};
use crate::stroke::{OpenStroke, Point, Stroke, StrokeOutcome, StrokeRecorder};

// ════════════════════════════════════════════════════════════════════════════
// Commands, flags, events
// ════════════════════════════════════════════════════════════════════════════

/// Discrete requests from the keyboard or UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ClearAll,
    ToggleVisualization,
    TogglePresentation,
    /// Show or hide the key legend; independent of presentation mode.
    ToggleControls,
    ForceGameSelection,
    /// Start the replay, or restart it from the first entry if running.
    ForceReplay,
    AdvancePhase,
    PassTurn,
}

/// Where hand input is coming from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCapability {
    Tracking,
    /// The tracking source failed; only the pointer can draw (slot 0).
    PointerOnly,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    /// Show tracked landmarks instead of the pencil cursor.
    pub visualization: bool,
    /// Hide status and controls.
    pub presentation:  bool,
    /// Hide the key legend only.
    pub controls_hidden: bool,
}

/// Something the renderer or log may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    StrokeFiled { slot: usize, points: usize },
    StrokeDiscarded { slot: usize, points: usize },
    ModeChanged(Transition),
    GameChosen(GameType),
    ReplayStep { index: usize },
    /// One player has drawn alone in freeplay; `waiting` is the other slot.
    CollaborationPrompt { waiting: usize },
    Mood(MoodEvent),
}

// ════════════════════════════════════════════════════════════════════════════
// Pointer fallback
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
struct PointerState {
    pressed:  bool,
    position: Point,
    previous: Option<(Point, u64)>,
}

// ════════════════════════════════════════════════════════════════════════════
// Snapshot
// ════════════════════════════════════════════════════════════════════════════

/// Read-only view of everything the renderer draws.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub hands:           &'a [Option<HandState>; SLOTS],
    pub open_strokes:    [Option<&'a OpenStroke>; SLOTS],
    /// Sealed strokes for the current mode.
    pub strokes:         Vec<&'a Stroke>,
    pub mode:            &'a Mode,
    pub active_player:   usize,
    pub countdown_ms:    Option<u64>,
    pub mood:            MoodState,
    pub doodles:         Vec<&'static Doodle>,
    pub replay_progress: Option<f32>,
    pub flags:           DisplayFlags,
    pub capability:      InputCapability,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session {
    config:     SessionConfig,
    classifier: Classifier,
    recorder:   StrokeRecorder,
    game:       GameSession,
    mood:       MoodModel,

    hands:      [Option<HandState>; SLOTS],
    /// Per slot: drawing as of the last fresh hand state.
    drawing:    [bool; SLOTS],
    history:    Vec<Stroke>,
    pointer:    PointerState,

    /// The slot drawing alone in freeplay and when that started.
    solo:       Option<(usize, u64)>,
    prompted:   bool,

    flags:      DisplayFlags,
    capability: InputCapability,
    /// Time of the latest tick; commands are stamped with it.
    now_ms:     u64,
    /// Events raised by commands, delivered with the next tick.
    pending:    Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic game selection.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Session {
            classifier: Classifier::new(&config),
            recorder:   StrokeRecorder::new(&config),
            game:       GameSession::new(&config, rng),
            mood:       MoodModel::new(&config),
            config,
            hands:      [None, None],
            drawing:    [false; SLOTS],
            history:    Vec::new(),
            pointer:    PointerState::default(),
            solo:       None,
            prompted:   false,
            flags:      DisplayFlags::default(),
            capability: InputCapability::Tracking,
            now_ms:     0,
            pending:    Vec::new(),
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn config(&self)     -> &SessionConfig   { &self.config }
    pub fn mode(&self)       -> &Mode            { self.game.mode() }
    pub fn game(&self)       -> &GameSession     { &self.game }
    pub fn history(&self)    -> &[Stroke]        { &self.history }
    pub fn mood(&self)       -> MoodState        { self.mood.state() }
    pub fn flags(&self)      -> DisplayFlags     { self.flags }
    pub fn capability(&self) -> InputCapability  { self.capability }
    pub fn hands(&self)      -> &[Option<HandState>; SLOTS] { &self.hands }

    pub fn doodle_revealed(&self, index: usize) -> bool { self.mood.is_revealed(index) }

    pub fn set_capability(&mut self, capability: InputCapability) {
        if self.capability != capability {
            info!(?capability, "input capability changed");
            self.capability = capability;
        }
    }

    // ── per-tick entry points ────────────────────────────────────────────

    /// Advance one render tick.  `frame` is the most recent tracking result,
    /// or `None` when there is none (tracking unavailable).
    pub fn tick(&mut self, now: u64, frame: Option<&TrackingFrame>) -> Vec<SessionEvent> {
        match frame {
            Some(f) => {
                let fresh = !self.classifier.has_seen(f);
                let hands = self.classifier.classify(f);
                self.advance(now, hands, [fresh; SLOTS])
            }
            None => self.advance(now, [None, None], [true; SLOTS]),
        }
    }

    /// Advance one tick from already-classified hand states.
    pub fn tick_hands(&mut self, now: u64, hands: [Option<HandState>; SLOTS]) -> Vec<SessionEvent> {
        self.advance(now, hands, [true; SLOTS])
    }

    /// `fresh[slot]` is false when the slot's state is a repeat of one already
    /// fed to the recorder; its open stroke then neither grows nor seals.
    fn advance(
        &mut self,
        now:       u64,
        mut hands: [Option<HandState>; SLOTS],
        mut fresh: [bool; SLOTS],
    ) -> Vec<SessionEvent> {
        let mut events = std::mem::take(&mut self.pending);
        self.now_ms = now;

        if hands[0].is_none() {
            hands[0] = self.pointer_hand(now);
            fresh[0] |= hands[0].is_some();
        }

        let mut drawing = self.drawing;
        for slot in 0..SLOTS {
            if !fresh[slot] {
                continue;
            }
            drawing[slot] = hands[slot]
                .as_ref()
                .is_some_and(|h| h.is_drawing(self.config.draw_velocity));

            let permitted = self.game.may_draw(slot);
            match self.recorder.on_hand_frame(slot, hands[slot].as_ref(), permitted) {
                StrokeOutcome::Idle | StrokeOutcome::Extended => {}
                StrokeOutcome::Sealed(stroke) => self.file(stroke, now, &mut events),
                StrokeOutcome::Discarded { slot, points } => {
                    debug!(slot, points, "discarding short stroke");
                    events.push(SessionEvent::StrokeDiscarded { slot, points });
                }
            }
        }

        // Mood counts drawing whether or not the game lets that hand ink.
        let drawing_at = (0..SLOTS)
            .filter(|&slot| fresh[slot] && drawing[slot])
            .find_map(|slot| hands[slot].as_ref().map(|h| h.position));
        let repeated = (0..SLOTS).any(|slot| !fresh[slot] && drawing[slot]);
        self.hands = hands;
        self.drawing = drawing;

        let poll = self.game.poll(now, &self.hands);
        events.extend(poll.replayed.map(|index| SessionEvent::ReplayStep { index }));
        if let Some(trigger) = poll.trigger {
            self.transition(trigger, now, &mut events);
        }

        if drawing_at.is_some() || !repeated {
            events.extend(self.mood.update(now, drawing_at).into_iter().map(SessionEvent::Mood));
        }
        self.check_collaboration(now, &mut events);
        events
    }

    /// Prompt the idle player once someone has drawn alone in freeplay for
    /// the configured delay.  Re-arms when the drawer changes.
    fn check_collaboration(&mut self, now: u64, events: &mut Vec<SessionEvent>) {
        if self.game.mode().kind() != ModeKind::Freeplay {
            self.solo = None;
            self.prompted = false;
            return;
        }

        let drawer = match self.drawing {
            [true, true] => {
                self.solo = None;
                self.prompted = false;
                return;
            }
            [true, false] => 0,
            [false, true] => 1,
            [false, false] => return,
        };

        let since = match self.solo {
            Some((slot, since)) if slot == drawer => since,
            _ => {
                self.solo = Some((drawer, now));
                self.prompted = false;
                now
            }
        };
        if !self.prompted && now.saturating_sub(since) >= self.config.collab_prompt_delay_ms {
            self.prompted = true;
            let waiting = 1 - drawer;
            info!(drawer, waiting, "prompting the other player to join");
            events.push(SessionEvent::CollaborationPrompt { waiting });
        }
    }

    fn file(&mut self, stroke: Stroke, now: u64, events: &mut Vec<SessionEvent>) {
        let (slot, points) = (stroke.slot(), stroke.len());
        if self.game.mode().kind() == ModeKind::Freeplay {
            self.history.push(stroke);
        } else {
            self.game.file(stroke, now);
        }
        debug!(slot, points, mode = self.game.mode().kind().as_str(), "stroke filed");
        events.push(SessionEvent::StrokeFiled { slot, points });
        events.extend(self.mood.on_stroke_filed().into_iter().map(SessionEvent::Mood));
    }

    /// The single path for mode changes: open strokes never survive one.
    fn transition(&mut self, trigger: Trigger, now: u64, events: &mut Vec<SessionEvent>) -> bool {
        match self.game.fire(trigger, now) {
            Ok(t) => {
                let dropped = self.recorder.discard_all();
                if dropped > 0 {
                    debug!(dropped, "open strokes discarded by mode change");
                }
                self.pointer.previous = None;
                self.solo = None;
                self.prompted = false;
                events.push(SessionEvent::ModeChanged(t));
                if let Mode::GameSelection { chosen, .. } = self.game.mode() {
                    events.push(SessionEvent::GameChosen(*chosen));
                }
                true
            }
            Err(e) => {
                debug!(error = %e, "trigger ignored");
                false
            }
        }
    }

    // ── command surface ──────────────────────────────────────────────────

    /// Apply a command.  Resulting events arrive with the next tick.
    pub fn apply(&mut self, command: Command) {
        let now = self.now_ms;
        let mut events = std::mem::take(&mut self.pending);

        match command {
            Command::ClearAll => {
                self.history.clear();
                self.game.clear_strokes();
                self.mood.reset();
                info!("page cleared");
            }
            Command::ToggleVisualization => {
                self.flags.visualization = !self.flags.visualization;
            }
            Command::TogglePresentation => {
                self.flags.presentation = !self.flags.presentation;
                info!(on = self.flags.presentation, "presentation mode");
            }
            Command::ToggleControls => {
                self.flags.controls_hidden = !self.flags.controls_hidden;
            }
            Command::ForceGameSelection => {
                self.transition(Trigger::ForceSelection, now, &mut events);
            }
            Command::ForceReplay => {
                let trigger = if self.game.mode().kind() == ModeKind::Replay {
                    Trigger::ReplayRestart
                } else {
                    Trigger::ForceReplay
                };
                self.transition(trigger, now, &mut events);
            }
            Command::AdvancePhase => match self.game.advance_phase() {
                PhaseStep::Complete => {
                    self.transition(Trigger::GameComplete, now, &mut events);
                }
                PhaseStep::Advanced(_) | PhaseStep::Ignored => {}
            },
            Command::PassTurn => {
                self.game.pass_turn();
            }
        }

        self.pending = events;
    }

    // ── pointer fallback ─────────────────────────────────────────────────

    pub fn pointer_press(&mut self, x: f32, y: f32) {
        self.pointer.pressed = true;
        self.pointer.position = Point::new(x, y);
        self.pointer.previous = None;
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.position = Point::new(x, y);
    }

    pub fn pointer_release(&mut self) {
        self.pointer.pressed = false;
        self.pointer.previous = None;
    }

    /// A synthetic slot-0 hand from the pointer, in freeplay only.
    fn pointer_hand(&mut self, now: u64) -> Option<HandState> {
        if !self.pointer.pressed || self.game.mode().kind() != ModeKind::Freeplay {
            self.pointer.previous = None;
            return None;
        }

        let position = self.pointer.position;
        let velocity = match self.pointer.previous {
            Some((prev, t)) => {
                let dist = position.distance(&prev);
                let dt = now.saturating_sub(t);
                if dt == 0 { dist } else { dist * self.config.reference_frame_ms / dt as f32 }
            }
            None => 0.0,
        };
        self.pointer.previous = Some((position, now));

        Some(HandState {
            slot: 0,
            position,
            landmarks: LandmarkSet::default(),
            writing: true,
            waving: false,
            velocity,
        })
    }

    // ── render sink ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot<'_> {
        let strokes: Vec<&Stroke> = match self.game.mode() {
            Mode::Freeplay | Mode::GameSelection { .. } => self.history.iter().collect(),
            Mode::Replay { next_entry, .. } => self
                .game
                .replay_log()
                .entries()
                .iter()
                .take(*next_entry)
                .map(|e| e.stroke())
                .collect(),
            _ => self.game.game_strokes().iter().collect(),
        };

        Snapshot {
            hands:           &self.hands,
            open_strokes:    [self.recorder.open(0), self.recorder.open(1)],
            strokes,
            mode:            self.game.mode(),
            active_player:   self.game.active_player(),
            countdown_ms:    self.game.countdown_remaining(self.now_ms),
            mood:            self.mood.state(),
            doodles:         self.mood.revealed().collect(),
            replay_progress: self.game.replay_progress(),
            flags:           self.flags,
            capability:      self.capability,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
