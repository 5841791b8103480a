//! Derived route metrics
//!
//! Pure functions over waypoint data: great-circle distance, instantaneous
//! speed, elapsed time labels and progress. Every function is total and falls
//! back to a sentinel value instead of failing.

pub mod calculator;

pub use calculator::{
    elapsed_label, progress_fraction, route_summary, speed_kmh, traveled_km, Speed,
};
