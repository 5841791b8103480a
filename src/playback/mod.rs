pub mod engine;
pub mod ticker;

pub use engine::PlaybackEngine;
pub use ticker::Ticker;

use serde::Serialize;
use std::time::Duration;

/// Default fixed tick period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Period between index advances; fixed for the whole session
    pub tick_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// A move of the current waypoint index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub previous: usize,
    pub current: usize,
}
