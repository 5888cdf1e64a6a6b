//! Unit conversions from the SI units reported by weather.gov into the
//! imperial units the archive stores.
//!
//! Every function is pure. Rounding is half away from zero, matching
//! [`f64::round`].

const PA_TO_IN_HG: f64 = 0.000_295_3;
const KMH_TO_MPH: f64 = 0.621_371;
const MPS_TO_MPH: f64 = 2.236_936;
const METERS_TO_MILES: f64 = 0.000_621_371;

/// Width of one compass sector in degrees
const SECTOR_DEGREES: f64 = 22.5;

pub const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Label used when no wind direction was observed
pub const NO_DIRECTION: &str = "N/A";

/// Round `value` to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_to(celsius * 9.0 / 5.0 + 32.0, 1)
}

pub fn pascals_to_in_hg(pascals: f64) -> f64 {
    round_to(pascals * PA_TO_IN_HG, 2)
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    round_to(kmh * KMH_TO_MPH, 1)
}

pub fn mps_to_mph(mps: f64) -> f64 {
    round_to(mps * MPS_TO_MPH, 1)
}

pub fn meters_to_miles(meters: f64) -> f64 {
    round_to(meters * METERS_TO_MILES, 1)
}

/// Fold any finite bearing into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// 16-point compass label for a bearing: `round(deg / 22.5) mod 16`.
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    let index = (normalize_degrees(degrees) / SECTOR_DEGREES).round() as usize % CARDINALS.len();
    CARDINALS[index]
}

/// Cardinal label for an optional bearing, [`NO_DIRECTION`] when absent.
pub fn cardinal_or_na(degrees: Option<f64>) -> &'static str {
    degrees.map(degrees_to_cardinal).unwrap_or(NO_DIRECTION)
}
