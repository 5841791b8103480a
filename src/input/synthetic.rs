use crate::core::{Position, Waypoint};
use crate::input::{SourceError, WaypointSource};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::f64::consts::TAU;

/// Kilometres per degree of latitude on the 6371 km sphere
const KM_PER_DEGREE: f64 = 111.194_926_644_558_73;

/// Synthetic route generator for demos and testing without a data file
///
/// Produces a closed loop of `count` waypoints of the given radius that
/// starts at `origin`, spaced `interval` apart in time.
pub struct SyntheticSource {
    name: String,
    origin: Position,
    radius_km: f64,
    count: usize,
    interval: Duration,
    start: DateTime<Utc>,
}

impl SyntheticSource {
    pub fn new(origin: Position, radius_km: f64, count: usize) -> Self {
        Self {
            name: "synthetic".to_string(),
            origin,
            radius_km,
            count,
            interval: Duration::seconds(10),
            start: Utc::now(),
        }
    }

    /// Time between consecutive waypoints
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Generate the waypoint sequence
    pub fn generate(&self) -> Vec<Waypoint> {
        let lat_scale = self.radius_km / KM_PER_DEGREE;
        let lng_scale = lat_scale / self.origin.lat.to_radians().cos().max(1e-6);

        (0..self.count)
            .map(|i| {
                let angle = TAU * i as f64 / self.count as f64;
                Waypoint::new(
                    self.origin.lat + lat_scale * angle.sin(),
                    self.origin.lng + lng_scale * (1.0 - angle.cos()),
                    self.start + self.interval * i as i32,
                )
            })
            .collect()
    }
}

#[async_trait]
impl WaypointSource for SyntheticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&mut self) -> Result<Vec<Waypoint>, SourceError> {
        Ok(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::calculator::distance_km;
    use crate::kinematics::{speed_kmh, Speed};

    fn source(count: usize) -> SyntheticSource {
        SyntheticSource::new(Position::new(17.385044, 78.486671), 1.0, count)
    }

    #[tokio::test]
    async fn test_synthetic_route_shape() {
        let mut source = source(12);
        let waypoints = source.fetch().await.unwrap();

        assert_eq!(waypoints.len(), 12);
        assert_eq!(waypoints[0].position(), Position::new(17.385044, 78.486671));
        for w in &waypoints {
            assert!(Waypoint::is_valid_latitude(w.latitude));
            assert!(Waypoint::is_valid_longitude(w.longitude));
        }

        // Opposite point lies two radii east of the origin
        let across = distance_km(waypoints[0].position(), waypoints[6].position());
        assert!((across - 2.0).abs() < 0.01, "got {}", across);
    }

    #[test]
    fn test_synthetic_timestamps_are_increasing() {
        let waypoints = source(5).with_interval(Duration::seconds(30)).generate();
        for (i, pair) in waypoints.windows(2).enumerate() {
            assert_eq!((pair[1].timestamp - pair[0].timestamp).num_seconds(), 30);
            assert!(matches!(speed_kmh(i + 1, &waypoints), Speed::Kmh(v) if v > 0.0));
        }
    }

    #[test]
    fn test_synthetic_empty() {
        assert!(source(0).generate().is_empty());
    }
}
