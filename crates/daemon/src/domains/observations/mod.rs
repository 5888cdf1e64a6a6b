mod normalize_reading;
mod payload;
mod resolve_station;

pub use normalize_reading::*;
pub use payload::*;
pub use resolve_station::*;
