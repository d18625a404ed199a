//! Hand tracking — from LeapMotion hardware or keyboard simulation.
//!
//! The public interface is [`TrackingMessage`] delivered over a `mpsc`
//! channel.  The render loop drains the channel each tick and keeps only the
//! newest frame, so a slow renderer never builds a backlog.  Consumers don't
//! need to know whether landmarks came from real hardware or the simulator.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use notebook_core::{LandmarkSet, TrackingFrame};

/// Simulator frame interval (~60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ════════════════════════════════════════════════════════════════════════════
// TrackingMessage
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum TrackingMessage {
    /// A fresh set of landmarks, possibly with no hands in it.
    Frame(TrackingFrame),
    /// The source could not start or lost its device; the app falls back to
    /// pointer input.
    Unavailable(String),
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackingMessage`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingMessage>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<TrackingMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Strictly increasing millisecond timestamps since `start`.
struct FrameClock {
    start: Instant,
    last:  Option<u64>,
}

impl FrameClock {
    fn new() -> Self { FrameClock { start: Instant::now(), last: None } }

    fn next(&mut self) -> u64 {
        let now = self.start.elapsed().as_millis() as u64;
        let ts = match self.last {
            Some(last) => now.max(last + 1),
            None => now,
        };
        self.last = Some(ts);
        ts
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each digit's four bone end-joints become landmarks 1–20 (thumb first),
/// with the palm centre standing in for the wrist at index 0.  Positions are
/// scaled out of the controller's interaction box into `[0, 1]`.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<TrackingMessage>) {
        use leaprs::*;
        use tracing::{info, warn};

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = ?e, "LeapC connection could not be created");
                let _ = tx.send(TrackingMessage::Unavailable(format!("LeapC connection: {:?}", e)));
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "LeapMotion device could not be opened");
            let _ = tx.send(TrackingMessage::Unavailable(format!("LeapMotion device: {:?}", e)));
            return;
        }
        info!("LeapMotion tracking started");

        let mut clock = FrameClock::new();
        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<LandmarkSet> = frame.hands().map(|h| hand_landmarks(&h)).collect();
                let frame = TrackingFrame::new(clock.next(), hands);
                if tx.send(TrackingMessage::Frame(frame)).is_err() { return; }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn hand_landmarks(hand: &leaprs::Hand) -> LandmarkSet {
    use notebook_core::Landmark;

    // Interaction box, millimetres above the device
    const HALF_WIDTH_MM: f32 = 200.0;
    const FLOOR_MM:      f32 = 100.0;
    const HEIGHT_MM:     f32 = 300.0;

    // The canvas mirrors x for a facing camera; the controller looks up, so
    // pre-mirror here to keep the hand under the user's own fingertip.
    let to_landmark = |x: f32, y: f32| {
        Landmark::new(
            1.0 - ((x + HALF_WIDTH_MM) / (2.0 * HALF_WIDTH_MM)).clamp(0.0, 1.0),
            1.0 - ((y - FLOOR_MM) / HEIGHT_MM).clamp(0.0, 1.0),
        )
    };

    let palm = hand.palm().position();
    let mut points = vec![to_landmark(palm.x, palm.y)];
    for digit in hand.digits() {
        for joint in [
            digit.metacarpal().next_joint(),
            digit.proximal().next_joint(),
            digit.intermediate().next_joint(),
            digit.distal().next_joint(),
        ] {
            points.push(to_landmark(joint.x, joint.y));
        }
    }
    LandmarkSet::new(points)
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
    Quit,
}

/// Held keys that pose the simulated hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Wave,         // W
    HighFive,     // F
    WriteFirst,   // J
    WriteSecond,  // K
}

const WAVE_WOBBLE:   f32 = 0.012;
const SWEEP_RADIUS:  f32 = 0.12;
const SWEEP_STEP:    f32 = 0.06;   // radians per frame
const SWEEP_CENTRES: [(f32, f32); 2] = [(0.70, 0.50), (0.30, 0.50)];

/// Synthetic hands posed by whichever simulation keys are held.
///
/// * **Wave**: two open hands jiggling side to side every frame.
/// * **High-five**: two still, open hands almost touching.
/// * **Write**: a pencil-grip hand sweeping a circle.  Holding only the
///   second key keeps a resting open hand in slot 0.
///
/// Wave beats high-five beats writing when several keys are held.
#[derive(Clone, Debug, Default)]
pub struct SimHands {
    wave:     bool,
    highfive: bool,
    write:    [bool; 2],
    frame:    u64,
}

impl SimHands {
    pub fn apply(&mut self, key: SimKey, down: bool) {
        match key {
            SimKey::Wave        => self.wave = down,
            SimKey::HighFive    => self.highfive = down,
            SimKey::WriteFirst  => self.write[0] = down,
            SimKey::WriteSecond => self.write[1] = down,
        }
    }

    pub fn frame(&mut self, timestamp_ms: u64) -> TrackingFrame {
        self.frame += 1;

        let hands = if self.wave {
            let wobble = if self.frame % 2 == 0 { 0.0 } else { WAVE_WOBBLE };
            vec![
                LandmarkSet::synthetic(0.75 - wobble, 0.45, false),
                LandmarkSet::synthetic(0.25 + wobble, 0.45, false),
            ]
        } else if self.highfive {
            vec![
                LandmarkSet::synthetic(0.51, 0.40, false),
                LandmarkSet::synthetic(0.48, 0.40, false),
            ]
        } else {
            let mut hands = Vec::new();
            if self.write[0] {
                hands.push(self.sweep(0));
            } else if self.write[1] {
                let (cx, cy) = SWEEP_CENTRES[0];
                hands.push(LandmarkSet::synthetic(cx, cy, false));
            }
            if self.write[1] {
                hands.push(self.sweep(1));
            }
            hands
        };

        TrackingFrame::new(timestamp_ms, hands)
    }

    fn sweep(&self, slot: usize) -> LandmarkSet {
        let (cx, cy) = SWEEP_CENTRES[slot];
        let theta = self.frame as f32 * SWEEP_STEP + slot as f32 * std::f32::consts::PI;
        LandmarkSet::synthetic(cx + SWEEP_RADIUS * theta.cos(), cy + SWEEP_RADIUS * theta.sin(), true)
    }
}

/// Landmark source driven by [`SimInput`] events (from the visualizer's
/// window).  Emits a frame every [`FRAME_INTERVAL`] whether or not a key is
/// held, so releasing every key reads as "no hands".
pub struct SimLandmarkSource {
    rx:    Receiver<SimInput>,
    hands: SimHands,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, hands: SimHands::default() }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<TrackingMessage>) {
        let SimLandmarkSource { rx, mut hands } = *self;
        let mut clock = FrameClock::new();
        let mut next_frame = Instant::now();

        loop {
            let wait = next_frame.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(SimInput::Quit)       => return,
                Ok(SimInput::KeyDown(k)) => { hands.apply(k, true);  continue; }
                Ok(SimInput::KeyUp(k))   => { hands.apply(k, false); continue; }
                Err(RecvTimeoutError::Timeout)      => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }

            let frame = hands.frame(clock.next());
            if tx.send(TrackingMessage::Frame(frame)).is_err() { return; }
            next_frame = Instant::now() + FRAME_INTERVAL;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
