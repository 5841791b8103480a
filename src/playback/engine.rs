use crate::core::{Clock, Waypoint};
use crate::playback::{IndexChange, PlaybackConfig, PlaybackState, Ticker};
use std::time::Duration;
use tracing::debug;

/// Playback controller for a recorded route
///
/// Holds the waypoint sequence, the current index and the play status, and
/// owns the fixed-period ticker that advances the index while playing.
pub struct PlaybackEngine<C: Clock> {
    waypoints: Vec<Waypoint>,
    state: PlaybackState,
    current_index: usize,
    ticker: Ticker,
    clock: C,
}

impl<C: Clock> PlaybackEngine<C> {
    pub fn new(clock: C, config: PlaybackConfig) -> Self {
        Self {
            waypoints: Vec::new(),
            ticker: Ticker::new(config.tick_interval),
            state: PlaybackState::Idle,
            current_index: 0,
            clock,
        }
    }

    /// Replace the route and rewind. An empty route is valid and stays `Idle`.
    pub fn load(&mut self, waypoints: Vec<Waypoint>) {
        debug!("Loading route with {} waypoints", waypoints.len());
        self.waypoints = waypoints;
        self.current_index = 0;
        self.state = PlaybackState::Idle;
        self.ticker.stop();
    }

    /// Get current playback position (index into waypoints)
    pub fn position(&self) -> usize {
        self.current_index
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Period between waypoint advances while playing
    pub fn tick_interval(&self) -> Duration {
        self.ticker.period()
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index)
    }

    fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Start or resume playback
    ///
    /// At the last waypoint this replays from the start, which is reported as
    /// an index change.
    pub fn play(&mut self) -> Option<IndexChange> {
        if self.is_empty() || self.state == PlaybackState::Playing {
            return None;
        }

        let mut change = None;
        if self.current_index == self.last_index() {
            let previous = self.current_index;
            self.current_index = 0;
            if previous != 0 {
                change = Some(IndexChange { previous, current: 0 });
            }
            debug!("Replaying route from the first waypoint");
        }

        self.state = PlaybackState::Playing;
        self.ticker.start(self.clock.now());
        change
    }

    /// Pause playback; ignored unless playing
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.ticker.stop();
    }

    /// Stop playback and rewind to the first waypoint
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.current_index = 0;
        self.ticker.stop();
    }

    /// Advance one waypoint
    ///
    /// Reaching the last waypoint completes playback and stops the ticker.
    /// The index is clamped, so extra ticks never move past the end.
    pub fn tick(&mut self) -> Option<IndexChange> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let last = self.last_index();
        let previous = self.current_index;
        self.current_index = (previous + 1).min(last);

        if self.current_index >= last {
            self.state = PlaybackState::Completed;
            self.ticker.stop();
            debug!("Playback completed at waypoint {}", self.current_index);
        }

        (self.current_index != previous).then_some(IndexChange {
            previous,
            current: self.current_index,
        })
    }

    /// Consume a due tick from the ticker. Only true while playing.
    pub fn tick_due(&mut self) -> bool {
        self.state == PlaybackState::Playing && self.ticker.fire(self.clock.now())
    }

    /// Clock reading of the next scheduled tick
    pub fn next_tick_at(&self) -> Option<Duration> {
        self.ticker.next_due()
    }
}
