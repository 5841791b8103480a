use crate::core::Waypoint;
use crate::input::{
    build_waypoint, find_field, SourceError, LATITUDE_FIELDS, LONGITUDE_FIELDS, TIMESTAMP_FIELDS,
};
use serde_json::{Map, Value};

/// Keys that may wrap the record array in an object document
const CONTAINER_KEYS: &[&str] = &["waypoints", "points", "route", "data"];

/// Parse waypoints from JSON data
///
/// Accepts either a top-level array of records or an object holding the
/// array under `waypoints`, `points`, `route` or `data`. Coordinates may be
/// numbers or numeric strings.
pub fn parse_json(data: &[u8]) -> Result<Vec<Waypoint>, SourceError> {
    let document: Value = serde_json::from_slice(data)?;

    let records = match &document {
        Value::Array(records) => records,
        Value::Object(map) => CONTAINER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or(SourceError::MissingField(CONTAINER_KEYS))?,
        _ => return Err(SourceError::UnknownFormat),
    };

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| parse_record(idx, record))
        .collect()
}

fn parse_record(idx: usize, record: &Value) -> Result<Waypoint, SourceError> {
    let map = record.as_object().ok_or_else(|| SourceError::InvalidValue {
        record: idx,
        field: "record",
        value: record.to_string(),
    })?;

    let latitude = field_text(map, LATITUDE_FIELDS)?;
    let longitude = field_text(map, LONGITUDE_FIELDS)?;
    let timestamp = field_text(map, TIMESTAMP_FIELDS)?;

    build_waypoint(idx, &latitude, &longitude, &timestamp)
}

/// Value of the first key matching `names`, rendered as text
fn field_text(
    map: &Map<String, Value>,
    names: &'static [&'static str],
) -> Result<String, SourceError> {
    let keys: Vec<&String> = map.keys().collect();
    let idx = find_field(keys.iter().map(|k| k.as_str()), names)?;

    Ok(match &map[keys[idx]] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let data = br#"[
            {"latitude": 17.385044, "longitude": 78.486671, "timestamp": "2024-01-01T00:00:00Z"},
            {"lat": "17.3855", "lng": 78.4867, "time": "2024-01-01T00:00:10Z"}
        ]"#;
        let waypoints = parse_json(data).unwrap();

        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[1].latitude, 17.3855);
        assert_eq!(waypoints[1].longitude, 78.4867);
    }

    #[test]
    fn test_parse_json_wrapped() {
        let data = br#"{"name": "commute", "waypoints": [
            {"Lat": 1.5, "Lon": 2.5, "TS": "2024-01-01T08:00:00+01:00"}
        ]}"#;
        let waypoints = parse_json(data).unwrap();
        assert_eq!(waypoints.len(), 1);
        assert_eq!(waypoints[0].timestamp.to_rfc3339(), "2024-01-01T07:00:00+00:00");
    }

    #[test]
    fn test_parse_json_errors() {
        assert!(matches!(parse_json(b"[1, 2]"), Err(SourceError::InvalidValue { record: 0, .. })));
        assert!(matches!(parse_json(b"{\"other\": []}"), Err(SourceError::MissingField(_))));
        assert!(matches!(parse_json(b"\"text\""), Err(SourceError::UnknownFormat)));
        assert!(matches!(parse_json(b"[{"), Err(SourceError::Json(_))));
        assert!(matches!(
            parse_json(br#"[{"lat": 1, "timestamp": "2024-01-01T00:00:00Z"}]"#),
            Err(SourceError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_json_empty_array() {
        assert!(parse_json(b"[]").unwrap().is_empty());
    }
}
