use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Linear interpolation towards `other`, latitude and longitude independently
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }
}

/// A single recorded position of the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Recording time in UTC
    pub timestamp: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    /// Finite and within [-90, 90]
    pub fn is_valid_latitude(value: f64) -> bool {
        value.is_finite() && (-90.0..=90.0).contains(&value)
    }

    /// Finite and within [-180, 180]
    pub fn is_valid_longitude(value: f64) -> bool {
        value.is_finite() && (-180.0..=180.0).contains(&value)
    }

    /// Parse an ISO-8601 timestamp. Zone-less values are taken as UTC.
    pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ts.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = Waypoint::parse_timestamp("2024-03-01T10:00:05+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 5).unwrap());
    }

    #[test]
    fn test_parse_timestamp_without_zone() {
        let ts = Waypoint::parse_timestamp("2024-03-01T10:00:05.250").unwrap();
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 5).unwrap();
        assert_eq!(ts.timestamp_millis(), whole.timestamp_millis() + 250);

        assert!(Waypoint::parse_timestamp("2024-03-01 10:00:05").is_some());
        assert!(Waypoint::parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, -20.0);
        assert_eq!(a.lerp(&b, 0.5), Position::new(5.0, -10.0));
        assert_eq!(a.lerp(&b, 1.5), b);
        assert_eq!(a.lerp(&b, -1.0), a);
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(Waypoint::is_valid_latitude(-90.0));
        assert!(!Waypoint::is_valid_latitude(91.0));
        assert!(Waypoint::is_valid_longitude(180.0));
        assert!(!Waypoint::is_valid_longitude(f64::NAN));
        assert!(!Waypoint::is_valid_longitude(f64::INFINITY));
    }
}
