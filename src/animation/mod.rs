//! Frame-driven interpolation between waypoints

pub mod animator;

pub use animator::{FrameStep, FrameTicket, InterpolationAnimator};

use std::time::Duration;

/// Default length of one waypoint-to-waypoint animation
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Default display refresh period (about 60 frames per second)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Shortest accepted frame period
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);
