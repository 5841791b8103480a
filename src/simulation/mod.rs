//! Route simulation
//!
//! Couples one [`PlaybackEngine`] with one [`InterpolationAnimator`] and acts
//! as the cooperative scheduler for both periodic loops:
//!
//! - the fixed-period ticker, active only while playing
//! - the frame loop, active only while an interpolation is in flight
//!
//! Every index change recomputes the metrics for the new index first and
//! retargets the animator second. Observers receive [`SimulationEvent`]s
//! through [`Simulation::drain_events`].

use crate::animation::{FrameStep, FrameTicket, InterpolationAnimator, MIN_FRAME_INTERVAL};
use crate::core::{Clock, Position, Waypoint};
use crate::kinematics::{self, Speed};
use crate::playback::{IndexChange, PlaybackConfig, PlaybackEngine, PlaybackState};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace};

/// User commands accepted by a running simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    /// Play when not playing, pause otherwise
    Toggle,
    Reset,
    Quit,
}

/// Timing configuration of a simulation
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub playback: PlaybackConfig,
    /// Length of each waypoint-to-waypoint animation
    pub animation_duration: Duration,
    /// Period of the frame loop
    pub frame_interval: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            animation_duration: crate::animation::DEFAULT_ANIMATION_DURATION,
            frame_interval: crate::animation::DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    /// Interpolated position, `None` when no route data is loaded
    pub position: Option<Position>,
    pub index: usize,
    pub total: usize,
    pub speed: Speed,
    pub elapsed: String,
    pub progress: f64,
    pub traveled_km: f64,
    pub status: PlaybackState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    Telemetry(Telemetry),
    /// The view should follow this position
    PanTo(Position),
}

/// Metrics derived for one waypoint index
#[derive(Debug, Clone)]
struct Metrics {
    speed: Speed,
    elapsed: String,
    progress: f64,
    traveled_km: f64,
}

impl Metrics {
    fn at(index: usize, waypoints: &[Waypoint]) -> Self {
        let start = waypoints.first().map(|w| w.timestamp);
        let current = waypoints.get(index).map(|w| w.timestamp);
        Self {
            speed: kinematics::speed_kmh(index, waypoints),
            elapsed: kinematics::elapsed_label(start, current),
            progress: kinematics::progress_fraction(index, waypoints.len()),
            traveled_km: kinematics::traveled_km(index, waypoints),
        }
    }
}

/// A single simulated vehicle replaying its route
pub struct Simulation<C: Clock> {
    engine: PlaybackEngine<C>,
    animator: InterpolationAnimator<C>,
    clock: C,
    animation_duration: Duration,
    frame_interval: Duration,
    /// Ticket of the next frame and the clock reading it is due at
    pending_frame: Option<(FrameTicket, Duration)>,
    metrics: Metrics,
    events: Vec<SimulationEvent>,
}

impl<C: Clock> Simulation<C> {
    pub fn new(clock: C, config: SimulationConfig) -> Self {
        Self {
            engine: PlaybackEngine::new(clock.clone(), config.playback),
            animator: InterpolationAnimator::new(clock.clone()),
            clock,
            animation_duration: config.animation_duration,
            frame_interval: config.frame_interval.max(MIN_FRAME_INTERVAL),
            pending_frame: None,
            metrics: Metrics::at(0, &[]),
            events: Vec::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> PlaybackState {
        self.engine.state()
    }

    pub fn position(&self) -> Option<Position> {
        self.animator.position()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Completed and the final animation has settled
    pub fn is_finished(&self) -> bool {
        self.engine.state() == PlaybackState::Completed && !self.is_animating()
    }

    /// Load a route and show its first waypoint
    pub fn load(&mut self, waypoints: Vec<Waypoint>) {
        self.engine.load(waypoints);
        info!(
            "Route loaded: {} waypoints, advancing every {:?}",
            self.engine.len(),
            self.engine.tick_interval()
        );
        self.rewind_view();
    }

    pub fn play(&mut self) {
        let before = self.engine.state();
        match self.engine.play() {
            Some(change) => self.on_index_change(change),
            None if self.engine.state() != before => self.emit_telemetry(),
            None => {}
        }
    }

    pub fn pause(&mut self) {
        let before = self.engine.state();
        self.engine.pause();
        if self.engine.state() != before {
            self.emit_telemetry();
        }
    }

    /// Rewind to the first waypoint, cancelling any in-flight animation
    pub fn reset(&mut self) {
        self.engine.reset();
        self.rewind_view();
    }

    pub fn apply(&mut self, command: Command) {
        debug!("Applying command {:?}", command);
        match command {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Toggle if self.engine.is_playing() => self.pause(),
            Command::Toggle => self.play(),
            Command::Reset => self.reset(),
            Command::Quit => {}
        }
    }

    /// Run every tick and frame that is due at the current clock reading
    pub fn poll(&mut self) {
        while self.engine.tick_due() {
            let before = self.engine.state();
            match self.engine.tick() {
                Some(change) => self.on_index_change(change),
                None if self.engine.state() != before => self.emit_telemetry(),
                None => {}
            }
        }

        let now = self.clock.now();
        if let Some((ticket, due)) = self.pending_frame {
            if now >= due {
                self.pending_frame = None;
                if let FrameStep::Moved { position, next } = self.animator.on_frame(ticket) {
                    trace!("Frame at {:.6},{:.6}", position.lat, position.lng);
                    self.pending_frame = next.map(|t| (t, now + self.frame_interval));
                    self.emit_telemetry();
                }
            }
        }
    }

    /// Clock reading of the earliest pending tick or frame
    pub fn next_wakeup(&self) -> Option<Duration> {
        let frame = self.pending_frame.map(|(_, due)| due);
        match (self.engine.next_tick_at(), frame) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            position: self.position(),
            index: self.engine.position(),
            total: self.engine.len(),
            speed: self.metrics.speed,
            elapsed: self.metrics.elapsed.clone(),
            progress: self.metrics.progress,
            traveled_km: self.metrics.traveled_km,
            status: self.engine.state(),
        }
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    fn on_index_change(&mut self, change: IndexChange) {
        debug!("Waypoint {} -> {}", change.previous, change.current);
        self.metrics = Metrics::at(change.current, self.engine.waypoints());

        let waypoints = self.engine.waypoints();
        let previous = waypoints.get(change.previous).map(|w| w.position());
        let target = match waypoints.get(change.current) {
            Some(w) => w.position(),
            None => return,
        };

        let retarget = self
            .animator
            .on_target_changed(previous, target, self.animation_duration);
        self.pending_frame = retarget
            .frame
            .map(|ticket| (ticket, self.clock.now() + self.frame_interval));

        self.events.push(SimulationEvent::PanTo(retarget.pan_to));
        self.emit_telemetry();
    }

    fn rewind_view(&mut self) {
        self.pending_frame = None;
        self.metrics = Metrics::at(self.engine.position(), self.engine.waypoints());

        let first = self.engine.current_waypoint().map(|w| w.position());
        self.animator.snap_to(first);
        if let Some(first) = first {
            self.events.push(SimulationEvent::PanTo(first));
        }
        self.emit_telemetry();
    }

    fn emit_telemetry(&mut self) {
        let telemetry = self.telemetry();
        self.events.push(SimulationEvent::Telemetry(telemetry));
    }
}
