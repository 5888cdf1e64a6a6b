use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, Duration, OffsetDateTime, Time};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::units::cardinal_or_na;

/// Stored in place of a missing text description
pub const UNKNOWN_CONDITIONS: &str = "Unknown";

/// One normalized observation, before it has been archived.
///
/// `None` always means the source did not report the value. The one exception
/// is `wind_speed_mph`, which is `0.0` when neither speed nor gust were present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    pub timestamp: Option<OffsetDateTime>,
    pub temperature_f: Option<f64>,
    pub humidity_pct: Option<i64>,
    pub wind_speed_mph: f64,
    pub wind_direction_deg: Option<f64>,
    pub pressure_in_hg: Option<f64>,
    pub dew_point_f: Option<f64>,
    pub visibility_mi: Option<f64>,
    pub conditions: Option<String>,
}

impl Reading {
    pub fn wind_direction_cardinal(&self) -> &'static str {
        cardinal_or_na(self.wind_direction_deg)
    }

    /// A reading is only worth archiving when it carries a temperature.
    pub fn is_archivable(&self) -> bool {
        self.temperature_f.is_some()
    }
}

/// A row of the archive as served to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArchivedReading {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub temperature_f: Option<f64>,
    pub humidity_pct: Option<i64>,
    pub wind_speed_mph: f64,
    pub wind_direction_deg: Option<f64>,
    /// Derived from `wind_direction_deg` on read, never stored
    pub wind_direction_cardinal: String,
    pub pressure_in_hg: Option<f64>,
    pub dew_point_f: Option<f64>,
    pub visibility_mi: Option<f64>,
    pub conditions: String,
}

impl ArchivedReading {
    /// Build the archived form of `reading`, falling back to `inserted_at`
    /// when the source carried no timestamp. The archive keeps whole seconds.
    pub fn from_reading(id: Uuid, reading: Reading, inserted_at: OffsetDateTime) -> Self {
        let wind_direction_cardinal = reading.wind_direction_cardinal().to_string();
        let timestamp = reading.timestamp.unwrap_or(inserted_at);
        Self {
            id,
            timestamp: timestamp.replace_nanosecond(0).unwrap_or(timestamp),
            temperature_f: reading.temperature_f,
            humidity_pct: reading.humidity_pct,
            wind_speed_mph: reading.wind_speed_mph,
            wind_direction_deg: reading.wind_direction_deg,
            wind_direction_cardinal,
            pressure_in_hg: reading.pressure_in_hg,
            dew_point_f: reading.dew_point_f,
            visibility_mi: reading.visibility_mi,
            conditions: reading
                .conditions
                .unwrap_or_else(|| UNKNOWN_CONDITIONS.to_string()),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DateRangeError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Start date {start} is after end date {end}")]
    Inverted { start: Date, end: Date },
}

/// Inclusive, day-granular date filter evaluated in UTC. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Result<Self, DateRangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DateRangeError::Inverted { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn between(start: Date, end: Date) -> Result<Self, DateRangeError> {
        Self::new(Some(start), Some(end))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The `days` days ending at `today`, inclusive of both ends.
    pub fn trailing_days(today: Date, days: i64) -> Self {
        Self {
            start: Some(today.saturating_sub(Duration::days(days))),
            end: Some(today),
        }
    }

    /// Parse optional `YYYY-MM-DD` strings, treating blank values as open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Lower bound as a unix timestamp, inclusive.
    pub fn start_unix(&self) -> Option<i64> {
        self.start
            .map(|d| d.with_time(Time::MIDNIGHT).assume_utc().unix_timestamp())
    }

    /// Upper bound as a unix timestamp, exclusive (midnight after `end`).
    pub fn end_unix_exclusive(&self) -> Option<i64> {
        self.end.map(|d| {
            d.with_time(Time::MIDNIGHT).assume_utc().unix_timestamp() + Duration::DAY.whole_seconds()
        })
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        let ts = instant.unix_timestamp();
        self.start_unix().map_or(true, |start| ts >= start)
            && self.end_unix_exclusive().map_or(true, |end| ts < end)
    }
}

fn parse_day(raw: Option<&str>) -> Result<Option<Date>, DateRangeError> {
    let day_format = format_description!("[year]-[month]-[day]");
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Date::parse(s, day_format)
            .map(Some)
            .map_err(|_| DateRangeError::InvalidDate(s.to_string())),
        None => Ok(None),
    }
}
