//! Game-mode state machine.
//!
//! The notebook cycles forever:
//!
//! ```text
//! Freeplay ──wave──▶ GameSelection ──countdown──▶ Tracing | ContinuousLine | BlindPortraits
//!    ▲                                                        │ (final phase complete)
//!    │                                                        ▼
//!    └──────── Replay ◀──────────high-five───────── WaitingForHighFive
//! ```
//!
//! Each [`Mode`] variant carries only the state that mode needs.  Every
//! change of variant goes through [`GameSession::fire`], which consults a
//! single transition table ([`target_kind`]) and rejects illegal pairs.
//! Phase steps inside a game ([`GameSession::advance_phase`],
//! [`GameSession::pass_turn`]) are not mode transitions.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::classifier::{HandState, SLOTS};
use crate::config::SessionConfig;
use crate::error::TransitionError;
use crate::replay::ReplayLog;
use crate::stroke::Stroke;

// ════════════════════════════════════════════════════════════════════════════
// GameType and phases
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameType {
    Tracing,
    ContinuousLine,
    BlindPortraits,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::Tracing, GameType::ContinuousLine, GameType::BlindPortraits];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Tracing        => "tracing",
            GameType::ContinuousLine => "continuous_line",
            GameType::BlindPortraits => "blind_portraits",
        }
    }

    /// The mode a game starts in.
    pub fn initial_mode(self) -> Mode {
        match self {
            GameType::Tracing        => Mode::Tracing { phase: TracingPhase::Prep },
            GameType::ContinuousLine => Mode::ContinuousLine { phase: LinePhase::Prep, current_player: 0 },
            GameType::BlindPortraits => Mode::BlindPortraits { phase: BlindPhase::Prep },
        }
    }

    fn kind(self) -> ModeKind {
        match self {
            GameType::Tracing        => ModeKind::Tracing,
            GameType::ContinuousLine => ModeKind::ContinuousLine,
            GameType::BlindPortraits => ModeKind::BlindPortraits,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingPhase { Prep, Player1, Player2 }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinePhase { Prep, Playing }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlindPhase { Prep, Round1, Round2 }

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Freeplay,
    GameSelection { chosen: GameType, entered_ms: u64 },
    Tracing { phase: TracingPhase },
    ContinuousLine { phase: LinePhase, current_player: usize },
    BlindPortraits { phase: BlindPhase },
    WaitingForHighFive { finished: GameType },
    Replay { next_entry: usize, started_ms: u64 },
}

/// Payload-free mirror of [`Mode`] for the transition table and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Freeplay,
    GameSelection,
    Tracing,
    ContinuousLine,
    BlindPortraits,
    WaitingForHighFive,
    Replay,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Freeplay           => "freeplay",
            ModeKind::GameSelection      => "game_selection",
            ModeKind::Tracing            => "tracing",
            ModeKind::ContinuousLine     => "continuous_line",
            ModeKind::BlindPortraits     => "blind_portraits",
            ModeKind::WaitingForHighFive => "waiting_for_highfive",
            ModeKind::Replay             => "replay",
        }
    }
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Freeplay                => ModeKind::Freeplay,
            Mode::GameSelection { .. }    => ModeKind::GameSelection,
            Mode::Tracing { .. }          => ModeKind::Tracing,
            Mode::ContinuousLine { .. }   => ModeKind::ContinuousLine,
            Mode::BlindPortraits { .. }   => ModeKind::BlindPortraits,
            Mode::WaitingForHighFive { .. } => ModeKind::WaitingForHighFive,
            Mode::Replay { .. }           => ModeKind::Replay,
        }
    }

    /// The running game, if this is one of the three game modes.
    pub fn game(&self) -> Option<GameType> {
        match self {
            Mode::Tracing { .. }        => Some(GameType::Tracing),
            Mode::ContinuousLine { .. } => Some(GameType::ContinuousLine),
            Mode::BlindPortraits { .. } => Some(GameType::BlindPortraits),
            _ => None,
        }
    }

    /// Name of the phase within the mode, for display.
    pub fn phase_name(&self) -> &'static str {
        match self {
            Mode::Tracing { phase: TracingPhase::Prep }    => "prep",
            Mode::Tracing { phase: TracingPhase::Player1 } => "player1",
            Mode::Tracing { phase: TracingPhase::Player2 } => "player2",
            Mode::ContinuousLine { phase: LinePhase::Prep, .. }    => "prep",
            Mode::ContinuousLine { phase: LinePhase::Playing, .. } => "playing",
            Mode::BlindPortraits { phase: BlindPhase::Prep }   => "prep",
            Mode::BlindPortraits { phase: BlindPhase::Round1 } => "round1",
            Mode::BlindPortraits { phase: BlindPhase::Round2 } => "round2",
            Mode::GameSelection { .. } => "countdown",
            _ => "",
        }
    }

    /// Drawing gate: may `slot` lay down ink in this mode and phase?
    pub fn may_draw(&self, slot: usize) -> bool {
        match self {
            Mode::Freeplay => slot < SLOTS,
            Mode::Tracing { phase: TracingPhase::Player1 } => slot == 0,
            Mode::Tracing { phase: TracingPhase::Player2 } => slot == 1,
            Mode::ContinuousLine { phase: LinePhase::Playing, current_player } => slot == *current_player,
            Mode::BlindPortraits { phase: BlindPhase::Round1 } => slot == 0,
            Mode::BlindPortraits { phase: BlindPhase::Round2 } => slot == 1,
            _ => false,
        }
    }

    /// The player whose turn it is.
    pub fn active_player(&self) -> usize {
        match self {
            Mode::Tracing { phase: TracingPhase::Player2 } => 1,
            Mode::BlindPortraits { phase: BlindPhase::Round2 } => 1,
            Mode::ContinuousLine { current_player, .. } => *current_player,
            _ => 0,
        }
    }

    /// True in the last phase of a game, where completing it is allowed.
    fn in_final_phase(&self) -> bool {
        matches!(
            self,
            Mode::Tracing { phase: TracingPhase::Player2 }
                | Mode::ContinuousLine { phase: LinePhase::Playing, .. }
                | Mode::BlindPortraits { phase: BlindPhase::Round2 }
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transition table
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can move the notebook to another mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Both hands waved long enough.
    Wave,
    /// The selection countdown ran out.
    CountdownElapsed,
    /// The game's final phase was completed.
    GameComplete,
    /// Both hands held together long enough.
    HighFive,
    /// Every replay entry has been shown.
    ReplayFinished,
    /// External request to play the replay again from the start.
    ReplayRestart,
    /// External request to start a game selection now.
    ForceSelection,
    /// External request to start the replay now.
    ForceReplay,
}

/// Where `trigger` leads from `from`, or `None` if it is not a legal edge.
pub fn target_kind(from: &Mode, trigger: Trigger) -> Option<ModeKind> {
    use Trigger::*;
    match (from, trigger) {
        (_, ForceSelection) => Some(ModeKind::GameSelection),
        (_, ForceReplay)    => Some(ModeKind::Replay),

        (Mode::Freeplay, Wave) => Some(ModeKind::GameSelection),
        (Mode::GameSelection { chosen, .. }, CountdownElapsed) => Some(chosen.kind()),
        (m, GameComplete) if m.in_final_phase() => Some(ModeKind::WaitingForHighFive),
        (Mode::WaitingForHighFive { .. }, HighFive) => Some(ModeKind::Replay),
        (Mode::Replay { .. }, ReplayFinished) => Some(ModeKind::Freeplay),
        (Mode::Replay { .. }, ReplayRestart)  => Some(ModeKind::Replay),

        _ => None,
    }
}

/// A completed mode change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from:    ModeKind,
    pub to:      ModeKind,
    pub trigger: Trigger,
}

// ════════════════════════════════════════════════════════════════════════════
// Detectors
// ════════════════════════════════════════════════════════════════════════════

/// Sustained two-handed wave.  Gaps up to `tolerance_ms` between waving
/// frames count toward the total; a longer gap starts over.
#[derive(Clone, Debug)]
pub struct WaveDetector {
    accumulated_ms: u64,
    last_wave_ms:   Option<u64>,
    duration_ms:    u64,
    tolerance_ms:   u64,
}

impl WaveDetector {
    pub fn new(duration_ms: u64, tolerance_ms: u64) -> Self {
        WaveDetector { accumulated_ms: 0, last_wave_ms: None, duration_ms, tolerance_ms }
    }

    /// Feed one tick.  Returns true once the wave has been held long enough.
    pub fn update(&mut self, now: u64, both_waving: bool) -> bool {
        if both_waving {
            match self.last_wave_ms {
                Some(last) if now.saturating_sub(last) <= self.tolerance_ms => {
                    self.accumulated_ms += now.saturating_sub(last);
                }
                _ => self.accumulated_ms = 0,
            }
            self.last_wave_ms = Some(now);
        } else if let Some(last) = self.last_wave_ms {
            if now.saturating_sub(last) > self.tolerance_ms {
                self.reset();
            }
        }
        self.last_wave_ms.is_some() && self.accumulated_ms >= self.duration_ms
    }

    pub fn accumulated_ms(&self) -> u64 { self.accumulated_ms }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.last_wave_ms = None;
    }
}

/// Both hands held within `distance` px for `frames` consecutive frames.
#[derive(Clone, Debug)]
pub struct HighFiveDetector {
    count:    u32,
    frames:   u32,
    distance: f32,
}

impl HighFiveDetector {
    pub fn new(distance: f32, frames: u32) -> Self {
        HighFiveDetector { count: 0, frames, distance }
    }

    pub fn update(&mut self, hands: &[Option<HandState>; SLOTS]) -> bool {
        let close = match hands {
            [Some(a), Some(b)] => a.position.distance(&b.position) < self.distance,
            _ => false,
        };
        self.count = if close { self.count + 1 } else { 0 };
        self.count >= self.frames
    }

    pub fn reset(&mut self) { self.count = 0; }
}

// ════════════════════════════════════════════════════════════════════════════
// GameSession
// ════════════════════════════════════════════════════════════════════════════

/// Result of stepping a game's phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStep {
    Advanced(&'static str),
    /// Already in the final phase; the caller should fire `GameComplete`.
    Complete,
    /// Not in a game.
    Ignored,
}

/// What the current mode's clocks and detectors asked for this tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GamePoll {
    pub trigger:  Option<Trigger>,
    /// Replay entries that became visible this tick.
    pub replayed: std::ops::Range<usize>,
}

/// The live game-mode context.  Exactly one exists per notebook.
pub struct GameSession {
    mode:            Mode,
    game_started_ms: u64,
    completed:       Vec<GameType>,
    rng:             StdRng,

    strokes: Vec<Stroke>,
    replay:  ReplayLog,

    wave:     WaveDetector,
    highfive: HighFiveDetector,

    countdown_ms: u64,
    replay_speed: f32,
}

impl GameSession {
    pub fn new(cfg: &SessionConfig, rng: StdRng) -> Self {
        GameSession {
            mode:            Mode::Freeplay,
            game_started_ms: 0,
            completed:       Vec::new(),
            rng,
            strokes:  Vec::new(),
            replay:   ReplayLog::default(),
            wave:     WaveDetector::new(cfg.wave_duration_ms, cfg.wave_tolerance_ms),
            highfive: HighFiveDetector::new(cfg.highfive_distance, cfg.highfive_frames),
            countdown_ms: cfg.selection_countdown_ms,
            replay_speed: cfg.replay_speed,
        }
    }

    pub fn mode(&self)            -> &Mode       { &self.mode }
    pub fn active_player(&self)   -> usize       { self.mode.active_player() }
    pub fn completed(&self)       -> &[GameType] { &self.completed }
    pub fn game_strokes(&self)    -> &[Stroke]   { &self.strokes }
    pub fn replay_log(&self)      -> &ReplayLog  { &self.replay }
    pub fn game_started_ms(&self) -> u64         { self.game_started_ms }
    pub fn may_draw(&self, slot: usize) -> bool  { self.mode.may_draw(slot) }

    /// Milliseconds left on the selection countdown.
    pub fn countdown_remaining(&self, now: u64) -> Option<u64> {
        match self.mode {
            Mode::GameSelection { entered_ms, .. } => {
                Some(self.countdown_ms.saturating_sub(now.saturating_sub(entered_ms)))
            }
            _ => None,
        }
    }

    pub fn replay_progress(&self) -> Option<f32> {
        match self.mode {
            Mode::Replay { next_entry, .. } => Some(self.replay.progress(next_entry)),
            _ => None,
        }
    }

    /// Pick a game nobody has played this cycle, starting a new cycle
    /// once all have been played.
    fn choose_game(&mut self) -> GameType {
        let mut available: Vec<GameType> = GameType::ALL
            .iter()
            .copied()
            .filter(|g| !self.completed.contains(g))
            .collect();
        if available.is_empty() {
            self.completed.clear();
            available = GameType::ALL.to_vec();
        }
        available.choose(&mut self.rng).copied().unwrap_or(GameType::Tracing)
    }

    /// Apply `trigger` if the table allows it.
    pub fn fire(&mut self, trigger: Trigger, now: u64) -> Result<Transition, TransitionError> {
        let from = self.mode.kind();
        let to = target_kind(&self.mode, trigger).ok_or(TransitionError { from, trigger })?;

        self.mode = match to {
            ModeKind::Freeplay => Mode::Freeplay,
            ModeKind::GameSelection => {
                let chosen = self.choose_game();
                info!(game = chosen.as_str(), "game chosen");
                Mode::GameSelection { chosen, entered_ms: now }
            }
            ModeKind::Tracing | ModeKind::ContinuousLine | ModeKind::BlindPortraits => {
                let game = match self.mode {
                    Mode::GameSelection { chosen, .. } => chosen,
                    _ => return Err(TransitionError { from, trigger }),
                };
                self.completed.push(game);
                self.game_started_ms = now;
                self.strokes.clear();
                self.replay.clear();
                game.initial_mode()
            }
            ModeKind::WaitingForHighFive => {
                let finished = self.mode.game().ok_or(TransitionError { from, trigger })?;
                Mode::WaitingForHighFive { finished }
            }
            ModeKind::Replay => Mode::Replay { next_entry: 0, started_ms: now },
        };

        self.wave.reset();
        self.highfive.reset();

        info!(from = from.as_str(), to = to.as_str(), ?trigger, "mode transition");
        Ok(Transition { from, to, trigger })
    }

    /// Run the clocks and detectors for the current mode.
    pub fn poll(&mut self, now: u64, hands: &[Option<HandState>; SLOTS]) -> GamePoll {
        match self.mode {
            Mode::Freeplay => {
                let both_waving = hands.iter().all(|h| h.as_ref().is_some_and(|h| h.waving));
                let trigger = self.wave.update(now, both_waving).then_some(Trigger::Wave);
                GamePoll { trigger, ..GamePoll::default() }
            }
            Mode::GameSelection { entered_ms, .. } => {
                let elapsed = now.saturating_sub(entered_ms);
                let trigger = (elapsed >= self.countdown_ms).then_some(Trigger::CountdownElapsed);
                GamePoll { trigger, ..GamePoll::default() }
            }
            Mode::WaitingForHighFive { .. } => {
                let trigger = self.highfive.update(hands).then_some(Trigger::HighFive);
                GamePoll { trigger, ..GamePoll::default() }
            }
            Mode::Replay { next_entry, started_ms } => {
                if next_entry >= self.replay.len() {
                    return GamePoll { trigger: Some(Trigger::ReplayFinished), replayed: next_entry..next_entry };
                }
                let due = self.replay.due_until(next_entry, now.saturating_sub(started_ms), self.replay_speed);
                self.mode = Mode::Replay { next_entry: due, started_ms };
                GamePoll { trigger: None, replayed: next_entry..due }
            }
            _ => GamePoll::default(),
        }
    }

    /// File a sealed stroke drawn during a game.
    pub fn file(&mut self, stroke: Stroke, now: u64) {
        let offset = now.saturating_sub(self.game_started_ms);
        self.replay.record(stroke.clone(), offset);
        self.strokes.push(stroke);
    }

    /// Step to the next phase of the running game.
    pub fn advance_phase(&mut self) -> PhaseStep {
        let next = match self.mode {
            Mode::Tracing { phase: TracingPhase::Prep } => Mode::Tracing { phase: TracingPhase::Player1 },
            Mode::Tracing { phase: TracingPhase::Player1 } => Mode::Tracing { phase: TracingPhase::Player2 },
            Mode::ContinuousLine { phase: LinePhase::Prep, current_player } => {
                Mode::ContinuousLine { phase: LinePhase::Playing, current_player }
            }
            Mode::BlindPortraits { phase: BlindPhase::Prep } => Mode::BlindPortraits { phase: BlindPhase::Round1 },
            Mode::BlindPortraits { phase: BlindPhase::Round1 } => Mode::BlindPortraits { phase: BlindPhase::Round2 },
            ref m if m.in_final_phase() => return PhaseStep::Complete,
            _ => return PhaseStep::Ignored,
        };
        self.mode = next;
        info!(mode = self.mode.kind().as_str(), phase = self.mode.phase_name(), "phase advanced");
        PhaseStep::Advanced(self.mode.phase_name())
    }

    /// Hand the continuous line to the other player.
    pub fn pass_turn(&mut self) -> bool {
        if let Mode::ContinuousLine { phase: LinePhase::Playing, current_player } = &mut self.mode {
            *current_player = (*current_player + 1) % SLOTS;
            true
        } else {
            false
        }
    }

    /// Drop the game's strokes and replay log.
    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
        self.replay.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkSet;
    use crate::stroke::{OpenStroke, Point};
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn session() -> GameSession {
        GameSession::new(&SessionConfig::default(), StdRng::seed_from_u64(7))
    }

    fn hand(slot: usize, x: f32, waving: bool) -> HandState {
        HandState {
            slot,
            position: Point::new(x, 300.0),
            landmarks: LandmarkSet::default(),
            writing: false,
            waving,
            velocity: if waving { 10.0 } else { 0.0 },
        }
    }

    fn stroke(slot: usize) -> Stroke {
        let mut s = OpenStroke::new(slot, 0xFF000000);
        for i in 0..3 { s.push(Point::new(i as f32, 0.0)); }
        s.seal()
    }

    fn start_game(g: &mut GameSession, now: u64) -> GameType {
        g.fire(Trigger::ForceSelection, now).unwrap();
        let chosen = match g.mode() {
            Mode::GameSelection { chosen, .. } => *chosen,
            other => panic!("expected selection, got {:?}", other),
        };
        let poll = g.poll(now + 3000, &[None, None]);
        assert_eq!(poll.trigger, Some(Trigger::CountdownElapsed));
        g.fire(Trigger::CountdownElapsed, now + 3000).unwrap();
        chosen
    }

    // ── wave ─────────────────────────────────────────────────────────────

    fn wave_until(w: &mut WaveDetector, from: u64, to: u64) -> bool {
        let mut t = from;
        let mut fired = false;
        while t <= to {
            fired = w.update(t, true);
            t += 1;
        }
        fired
    }

    #[test]
    fn wave_needs_full_duration() {
        let mut w = WaveDetector::new(3000, 700);
        assert!(!wave_until(&mut w, 0, 2999));
        assert!(w.update(3000, true));
    }

    #[test]
    fn short_dropout_keeps_timer() {
        let mut w = WaveDetector::new(3000, 700);
        assert!(!wave_until(&mut w, 0, 1000));
        assert!(!w.update(1300, false));
        assert!(!w.update(1699, false));
        assert!(!w.update(1700, true));
        assert_eq!(w.accumulated_ms(), 1700);
        assert!(wave_until(&mut w, 1701, 3000));
    }

    #[test]
    fn long_dropout_resets_timer() {
        let mut w = WaveDetector::new(3000, 700);
        assert!(!wave_until(&mut w, 0, 1000));
        assert!(!w.update(1701, true));
        assert_eq!(w.accumulated_ms(), 0);
        assert!(!wave_until(&mut w, 1702, 3000));
        assert!(wave_until(&mut w, 3001, 4701));
    }

    #[test]
    fn single_hand_wave_does_nothing() {
        let mut g = session();
        for t in (0..5000).step_by(16) {
            let poll = g.poll(t, &[Some(hand(0, 100.0, true)), Some(hand(1, 900.0, false))]);
            assert_eq!(poll.trigger, None);
        }
    }

    #[test]
    fn two_hand_wave_fires_in_freeplay() {
        let mut g = session();
        let hands = [Some(hand(0, 100.0, true)), Some(hand(1, 900.0, true))];
        let mut fired_at = None;
        for t in (0..=3100).step_by(20) {
            if g.poll(t, &hands).trigger == Some(Trigger::Wave) {
                fired_at = Some(t);
                break;
            }
        }
        assert_eq!(fired_at, Some(3000));
    }

    // ── transitions ──────────────────────────────────────────────────────

    #[test]
    fn illegal_transition_rejected() {
        let mut g = session();
        let err = g.fire(Trigger::HighFive, 0).unwrap_err();
        assert_eq!(err, TransitionError { from: ModeKind::Freeplay, trigger: Trigger::HighFive });
        assert_eq!(g.mode(), &Mode::Freeplay);
    }

    #[test]
    fn game_complete_only_from_final_phase() {
        let mut g = session();
        start_game(&mut g, 0);
        assert!(g.fire(Trigger::GameComplete, 10).is_err());
        while g.advance_phase() != PhaseStep::Complete {}
        let t = g.fire(Trigger::GameComplete, 20).unwrap();
        assert_eq!(t.to, ModeKind::WaitingForHighFive);
    }

    #[test]
    fn countdown_starts_chosen_game_in_prep() {
        let mut g = session();
        g.fire(Trigger::Wave, 1000).unwrap();
        assert_eq!(g.countdown_remaining(2000), Some(2000));
        assert_eq!(g.poll(3999, &[None, None]).trigger, None);
        let chosen = match g.mode() { Mode::GameSelection { chosen, .. } => *chosen, _ => unreachable!() };
        g.fire(Trigger::CountdownElapsed, 4000).unwrap();
        assert_eq!(g.mode(), &chosen.initial_mode());
        assert_eq!(g.mode().phase_name(), "prep");
        assert_eq!(g.active_player(), 0);
        assert_eq!(g.completed(), &[chosen]);
        assert_eq!(g.game_started_ms(), 4000);
    }

    #[test]
    fn selection_cycles_all_games_before_repeat() {
        let mut g = session();
        for cycle in 0..4 {
            let mut seen = HashSet::new();
            for round in 0..3 {
                let now = (cycle * 3 + round) as u64 * 10_000;
                seen.insert(start_game(&mut g, now));
            }
            assert_eq!(seen.len(), 3, "cycle {} repeated a game", cycle);
        }
    }

    #[test]
    fn force_selection_from_any_mode() {
        let mut g = session();
        start_game(&mut g, 0);
        assert!(g.fire(Trigger::ForceSelection, 5000).is_ok());
        assert_eq!(g.mode().kind(), ModeKind::GameSelection);
    }

    // ── gate ─────────────────────────────────────────────────────────────

    #[test]
    fn tracing_gate_follows_phase() {
        let mut m = Mode::Tracing { phase: TracingPhase::Prep };
        assert!(!m.may_draw(0) && !m.may_draw(1));
        m = Mode::Tracing { phase: TracingPhase::Player1 };
        assert!(m.may_draw(0) && !m.may_draw(1));
        m = Mode::Tracing { phase: TracingPhase::Player2 };
        assert!(!m.may_draw(0) && m.may_draw(1));
    }

    #[test]
    fn continuous_line_gate_follows_turn() {
        let mut g = session();
        g.mode = Mode::ContinuousLine { phase: LinePhase::Prep, current_player: 0 };
        assert!(!g.may_draw(0));
        assert_eq!(g.advance_phase(), PhaseStep::Advanced("playing"));
        assert!(g.may_draw(0) && !g.may_draw(1));
        assert!(g.pass_turn());
        assert!(!g.may_draw(0) && g.may_draw(1));
        assert_eq!(g.active_player(), 1);
    }

    #[test]
    fn blind_portraits_gate_follows_round() {
        let m = Mode::BlindPortraits { phase: BlindPhase::Round1 };
        assert!(m.may_draw(0) && !m.may_draw(1));
        let m = Mode::BlindPortraits { phase: BlindPhase::Round2 };
        assert!(!m.may_draw(0) && m.may_draw(1));
    }

    #[test]
    fn nothing_draws_outside_games_and_freeplay() {
        for m in [
            Mode::GameSelection { chosen: GameType::Tracing, entered_ms: 0 },
            Mode::WaitingForHighFive { finished: GameType::Tracing },
            Mode::Replay { next_entry: 0, started_ms: 0 },
        ] {
            assert!(!m.may_draw(0) && !m.may_draw(1), "{:?}", m);
        }
        assert!(Mode::Freeplay.may_draw(0) && Mode::Freeplay.may_draw(1));
    }

    // ── high-five ────────────────────────────────────────────────────────

    #[test]
    fn highfive_needs_consecutive_frames() {
        let mut h = HighFiveDetector::new(150.0, 15);
        let close = [Some(hand(0, 500.0, false)), Some(hand(1, 600.0, false))];
        let apart = [Some(hand(0, 100.0, false)), Some(hand(1, 600.0, false))];
        for _ in 0..14 { assert!(!h.update(&close)); }
        assert!(!h.update(&apart));
        for _ in 0..14 { assert!(!h.update(&close)); }
        assert!(h.update(&close));
    }

    #[test]
    fn highfive_starts_replay() {
        let mut g = session();
        g.mode = Mode::WaitingForHighFive { finished: GameType::Tracing };
        let close = [Some(hand(0, 500.0, false)), Some(hand(1, 520.0, false))];
        let mut trigger = None;
        for f in 0..15 {
            trigger = g.poll(f * 16, &close).trigger;
        }
        assert_eq!(trigger, Some(Trigger::HighFive));
        g.fire(Trigger::HighFive, 240).unwrap();
        assert_eq!(g.mode(), &Mode::Replay { next_entry: 0, started_ms: 240 });
    }

    // ── replay ───────────────────────────────────────────────────────────

    #[test]
    fn replay_plays_in_order_then_finishes() {
        let mut g = session();
        start_game(&mut g, 0);
        g.file(stroke(0), 3000 + 300);
        g.file(stroke(1), 3000 + 900);
        assert_eq!(g.replay_log().entries()[1].offset_ms(), 900);

        g.fire(Trigger::ForceReplay, 10_000).unwrap();
        assert_eq!(g.poll(10_099, &[None, None]).replayed, 0..0);
        assert_eq!(g.poll(10_100, &[None, None]).replayed, 0..1);
        assert_eq!(g.replay_progress(), Some(0.5));
        assert_eq!(g.poll(10_300, &[None, None]).replayed, 1..2);
        assert_eq!(g.poll(10_316, &[None, None]).trigger, Some(Trigger::ReplayFinished));
        g.fire(Trigger::ReplayFinished, 10_316).unwrap();
        assert_eq!(g.mode(), &Mode::Freeplay);
    }

    #[test]
    fn replay_restart_resets_index() {
        let mut g = session();
        start_game(&mut g, 0);
        g.file(stroke(0), 3100);
        g.file(stroke(0), 3200);
        g.fire(Trigger::ForceReplay, 5000).unwrap();
        g.poll(5100, &[None, None]);
        g.fire(Trigger::ReplayRestart, 5200).unwrap();
        assert_eq!(g.mode(), &Mode::Replay { next_entry: 0, started_ms: 5200 });
    }

    #[test]
    fn new_game_clears_previous_log() {
        let mut g = session();
        start_game(&mut g, 0);
        g.file(stroke(0), 3500);
        start_game(&mut g, 10_000);
        assert!(g.replay_log().is_empty());
        assert!(g.game_strokes().is_empty());
    }
}
