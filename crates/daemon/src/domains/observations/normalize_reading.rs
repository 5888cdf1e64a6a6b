use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use wx_archive_core::{
    units::{
        celsius_to_fahrenheit, kmh_to_mph, meters_to_miles, mps_to_mph, normalize_degrees,
        pascals_to_in_hg,
    },
    Reading,
};

use super::{finite_value, ObservationProperties, QuantitativeValue};

const METERS_PER_SECOND: &str = "m_s-1";

/// Map the properties of a latest-observation document to a [`Reading`].
///
/// Pure: no I/O, no clock. Absent inputs stay absent, except wind speed which
/// falls back from speed to gust and finally to an explicit `0.0`.
pub fn normalize(props: &ObservationProperties) -> Reading {
    Reading {
        timestamp: props.timestamp.as_deref().and_then(parse_timestamp),
        temperature_f: finite_value(&props.temperature).map(celsius_to_fahrenheit),
        humidity_pct: finite_value(&props.relative_humidity).map(|h| h.round() as i64),
        wind_speed_mph: wind_speed_mph(props),
        wind_direction_deg: finite_value(&props.wind_direction).map(normalize_degrees),
        pressure_in_hg: finite_value(&props.barometric_pressure).map(pascals_to_in_hg),
        dew_point_f: finite_value(&props.dewpoint).map(celsius_to_fahrenheit),
        visibility_mi: finite_value(&props.visibility).map(meters_to_miles),
        conditions: props.text_description.clone(),
    }
}

fn wind_speed_mph(props: &ObservationProperties) -> f64 {
    [&props.wind_speed, &props.wind_gust]
        .into_iter()
        .flatten()
        .find_map(|q| q.finite().map(|value| speed_to_mph(value, q)))
        .unwrap_or(0.0)
}

/// weather.gov reports km/h; honor an explicit m/s unit code if one shows up.
fn speed_to_mph(value: f64, quantity: &QuantitativeValue) -> f64 {
    match quantity.unit_code.as_deref() {
        Some(unit) if unit.ends_with(METERS_PER_SECOND) => mps_to_mph(value),
        _ => kmh_to_mph(value),
    }
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}
