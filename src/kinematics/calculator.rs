use crate::core::{Position, Waypoint};
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Mean earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const SECS_PER_HOUR: f64 = 3600.0;

/// Instantaneous speed between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speed {
    /// Speed in km/h, already rounded to two decimals
    Kmh(f64),
    /// The time delta was zero or negative
    Unavailable,
}

impl Speed {
    pub fn kmh(&self) -> Option<f64> {
        match self {
            Speed::Kmh(v) => Some(*v),
            Speed::Unavailable => None,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speed::Kmh(v) => write!(f, "{:.2}", v),
            Speed::Unavailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Speed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Great-circle distance in kilometres (haversine)
pub fn distance_km(a: Position, b: Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Speed between waypoint `index - 1` and `index`
pub fn speed_kmh(index: usize, waypoints: &[Waypoint]) -> Speed {
    if index == 0 || waypoints.len() < 2 || index >= waypoints.len() {
        return Speed::Kmh(0.0);
    }

    let prev = &waypoints[index - 1];
    let curr = &waypoints[index];

    // Negative deltas fail the conversion
    let delta = match (curr.timestamp - prev.timestamp).to_std() {
        Ok(delta) if !delta.is_zero() => delta,
        _ => return Speed::Unavailable,
    };

    let hours = delta.as_secs_f64() / SECS_PER_HOUR;
    let kmh = distance_km(prev.position(), curr.position()) / hours;
    Speed::Kmh((kmh * 100.0).round() / 100.0)
}

/// Elapsed time since route start as `MM:SS`
///
/// Minutes keep growing past 59, so a 75 minute route reads `75:03`.
pub fn elapsed_label(start: Option<DateTime<Utc>>, current: Option<DateTime<Utc>>) -> String {
    let (start, current) = match (start, current) {
        (Some(s), Some(c)) => (s, c),
        _ => return "00:00".to_string(),
    };

    let total_secs = (current - start).num_seconds().max(0);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Fraction of the route reached at `index`, in `[0, 1]`
pub fn progress_fraction(index: usize, length: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    ((index + 1) as f64 / length as f64).min(1.0)
}

/// Cumulative distance covered from the first waypoint up to `index`
pub fn traveled_km(index: usize, waypoints: &[Waypoint]) -> f64 {
    if waypoints.is_empty() {
        return 0.0;
    }
    let end = index.min(waypoints.len() - 1);
    waypoints[..=end]
        .windows(2)
        .map(|pair| distance_km(pair[0].position(), pair[1].position()))
        .sum()
}

/// Totals of a loaded route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub waypoints: usize,
    pub distance_km: f64,
    pub duration: Duration,
}

pub fn route_summary(waypoints: &[Waypoint]) -> RouteSummary {
    let duration = match (waypoints.first(), waypoints.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => Duration::zero(),
    };

    RouteSummary {
        waypoints: waypoints.len(),
        distance_km: traveled_km(waypoints.len(), waypoints),
        duration,
    }
}
