//! Waypoint sources
//!
//! Routes can come from a CSV file, a JSON file or the synthetic generator.
//! Every source yields `Vec<Waypoint>` in recording order; field names are
//! normalised here so the rest of the crate only sees [`Waypoint`].

pub mod csv;
pub mod json;
pub mod synthetic;

pub use self::csv::parse_csv;
pub use self::json::parse_json;
pub use self::synthetic::SyntheticSource;

use crate::core::Waypoint;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Accepted names for the latitude field
pub const LATITUDE_FIELDS: &[&str] = &["latitude", "lat"];
/// Accepted names for the longitude field
pub const LONGITUDE_FIELDS: &[&str] = &["longitude", "lng", "lon", "long"];
/// Accepted names for the timestamp field
pub const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "time", "ts", "datetime"];

/// Errors raised while reading a waypoint source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no column or key named any of {0:?}")]
    MissingField(&'static [&'static str]),

    #[error("record {record}: invalid {field} {value:?}")]
    InvalidValue {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("unrecognised waypoint format")]
    UnknownFormat,
}

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
    Unknown,
}

/// Detect the format of a route file by looking at its content
pub fn detect_format(data: &[u8]) -> InputFormat {
    if is_json(data) {
        return InputFormat::Json;
    }

    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn is_json(data: &[u8]) -> bool {
    matches!(
        data.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'[') | Some(b'{')
    )
}

fn is_csv(data: &[u8]) -> bool {
    let head = &data[..data.len().min(500)];
    let sample = match std::str::from_utf8(head) {
        Ok(text) => text,
        // The sample may end inside a multi-byte character
        Err(e) if e.error_len().is_none() => {
            match std::str::from_utf8(&head[..e.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    // Header plus at least latitude, longitude and time columns
    sample
        .lines()
        .take(5)
        .any(|line| line.chars().filter(|&c| c == ',').count() >= 2)
}

/// Parse a route from raw bytes, auto-detecting the format
pub fn parse_waypoints(data: &[u8]) -> Result<Vec<Waypoint>, SourceError> {
    let waypoints = match detect_format(data) {
        InputFormat::Csv => parse_csv(data)?,
        InputFormat::Json => parse_json(data)?,
        InputFormat::Unknown => return Err(SourceError::UnknownFormat),
    };

    let regressions = count_time_regressions(&waypoints);
    if regressions > 0 {
        warn!(
            "{} waypoint(s) go back in time; speed will read N/A there",
            regressions
        );
    }

    Ok(waypoints)
}

/// Number of waypoints whose timestamp is before the previous one
pub fn count_time_regressions(waypoints: &[Waypoint]) -> usize {
    waypoints
        .windows(2)
        .filter(|pair| pair[1].timestamp < pair[0].timestamp)
        .count()
}

/// Find the index of the first header matching one of `names`, ignoring case
pub(crate) fn find_field<'a, I>(
    headers: I,
    names: &'static [&'static str],
) -> Result<usize, SourceError>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .position(|header| {
            let header = header.trim().to_lowercase();
            names.iter().any(|&name| header == name)
        })
        .ok_or(SourceError::MissingField(names))
}

/// Parse and range-check one record
pub(crate) fn build_waypoint(
    record: usize,
    latitude: &str,
    longitude: &str,
    timestamp: &str,
) -> Result<Waypoint, SourceError> {
    let invalid = |field: &'static str, value: &str| SourceError::InvalidValue {
        record,
        field,
        value: value.to_string(),
    };

    let lat = latitude
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|&v| Waypoint::is_valid_latitude(v))
        .ok_or_else(|| invalid("latitude", latitude))?;
    let lng = longitude
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|&v| Waypoint::is_valid_longitude(v))
        .ok_or_else(|| invalid("longitude", longitude))?;
    let ts = Waypoint::parse_timestamp(timestamp)
        .ok_or_else(|| invalid("timestamp", timestamp))?;

    Ok(Waypoint::new(lat, lng, ts))
}

/// Anything that can produce a route
#[async_trait]
pub trait WaypointSource: Send {
    /// Human readable name for logs
    fn name(&self) -> &str;

    /// Produce the full, ordered waypoint sequence
    async fn fetch(&mut self) -> Result<Vec<Waypoint>, SourceError>;
}

/// Route stored in a local CSV or JSON file
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl WaypointSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&mut self) -> Result<Vec<Waypoint>, SourceError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("Read {} bytes from {}", data.len(), self.name);
        parse_waypoints(&data)
    }
}

/// Fetch a route, degrading any failure to an empty route
///
/// An unreadable or malformed source is not fatal: playback simply has no
/// data to show.
pub async fn fetch_or_empty(source: &mut dyn WaypointSource) -> Vec<Waypoint> {
    match source.fetch().await {
        Ok(waypoints) => {
            if waypoints.is_empty() {
                warn!("{} contains no waypoints", source.name());
            }
            waypoints
        }
        Err(e) => {
            warn!("Could not load waypoints from {}: {}", source.name(), e);
            Vec::new()
        }
    }
}
