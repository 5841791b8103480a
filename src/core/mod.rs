pub mod clock;
pub mod waypoint;

pub use clock::{Clock, SystemClock};
pub use waypoint::{Position, Waypoint};
