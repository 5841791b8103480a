use crate::core::Waypoint;
use crate::input::{
    build_waypoint, find_field, SourceError, LATITUDE_FIELDS, LONGITUDE_FIELDS, TIMESTAMP_FIELDS,
};

/// Parse waypoints from CSV data
///
/// The first row must be a header. Column order is free and names are
/// matched case-insensitively:
/// - latitude,longitude,timestamp
/// - lat,lng,time
/// - ts,lat,lon
///
/// Extra columns are ignored. Timestamps are ISO-8601.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Waypoint>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = rdr.headers()?.clone();
    let (lat_idx, lng_idx, time_idx) = detect_columns(&headers)?;

    let mut waypoints = Vec::new();
    for (record_idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or("");
        waypoints.push(build_waypoint(
            record_idx,
            field(lat_idx),
            field(lng_idx),
            field(time_idx),
        )?);
    }

    Ok(waypoints)
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<(usize, usize, usize), SourceError> {
    let lat_idx = find_field(headers.iter(), LATITUDE_FIELDS)?;
    let lng_idx = find_field(headers.iter(), LONGITUDE_FIELDS)?;
    let time_idx = find_field(headers.iter(), TIMESTAMP_FIELDS)?;

    Ok((lat_idx, lng_idx, time_idx))
}
