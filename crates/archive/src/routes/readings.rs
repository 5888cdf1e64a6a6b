use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::IntoParams;
use wx_archive_core::{
    db::{ReadingsPage, SummaryReport},
    ArchivedReading, DateRange, DateRangeError,
};

use super::ApiError;
use crate::AppState;

/// Window used by summary and series when no dates are given
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number, values below 1 are treated as 1
    pub page: Option<i64>,
    /// Readings per page, clamped to 1..=500
    pub per_page: Option<u32>,
    /// Inclusive start day, YYYY-MM-DD (UTC)
    pub start_date: Option<String>,
    /// Inclusive end day, YYYY-MM-DD (UTC)
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    /// Inclusive start day, YYYY-MM-DD (UTC)
    pub start_date: Option<String>,
    /// Inclusive end day, YYYY-MM-DD (UTC)
    pub end_date: Option<String>,
}

impl PageParams {
    /// Requested page clamped into `1..=u32::MAX`.
    pub fn page_number(&self) -> u32 {
        u32::try_from(self.page.unwrap_or(1).max(1)).unwrap_or(u32::MAX)
    }
}

impl RangeParams {
    /// The requested range, or the trailing week through today when neither
    /// bound was given.
    pub fn range_or_last_week(&self, today: time::Date) -> Result<DateRange, DateRangeError> {
        let range = DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?;
        if range.is_bounded() {
            Ok(range)
        } else {
            Ok(DateRange::trailing_days(today, DEFAULT_WINDOW_DAYS))
        }
    }
}

#[utoipa::path(
    get,
    path = "/readings",
    params(PageParams),
    responses(
        (status = OK, description = "Newest-first page of archived readings", body = ReadingsPage),
        (status = BAD_REQUEST, description = "Malformed or inverted date range")
    ))]
pub async fn list_readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<ReadingsPage>, ApiError> {
    let range = DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref())?;
    let page = state
        .queries
        .page(params.page_number(), params.per_page, range)
        .await;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/readings/summary",
    params(RangeParams),
    responses(
        (status = OK, description = "Aggregates over the range, defaults to the last 7 days", body = SummaryReport),
        (status = BAD_REQUEST, description = "Malformed or inverted date range")
    ))]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<SummaryReport>, ApiError> {
    let range = params.range_or_last_week(OffsetDateTime::now_utc().date())?;
    Ok(Json(state.queries.summary_stats(range).await))
}

#[utoipa::path(
    get,
    path = "/readings/series",
    params(RangeParams),
    responses(
        (status = OK, description = "Oldest-first readings for charting, defaults to the last 7 days", body = Vec<ArchivedReading>),
        (status = BAD_REQUEST, description = "Malformed or inverted date range"),
        (status = SERVICE_UNAVAILABLE, description = "Archive unreachable")
    ))]
pub async fn series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<ArchivedReading>>, ApiError> {
    let range = params.range_or_last_week(OffsetDateTime::now_utc().date())?;
    let readings = state.queries.series(range).await?;
    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/readings/latest",
    responses(
        (status = OK, description = "Most recent archived reading", body = ArchivedReading),
        (status = NOT_FOUND, description = "Archive is empty"),
        (status = SERVICE_UNAVAILABLE, description = "Archive unreachable")
    ))]
pub async fn latest(State(state): State<Arc<AppState>>) -> Result<Json<ArchivedReading>, ApiError> {
    state
        .queries
        .latest()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn page_number_is_clamped() {
        let page = |page| PageParams {
            page,
            ..Default::default()
        };
        assert_eq!(page(None).page_number(), 1);
        assert_eq!(page(Some(-5)).page_number(), 1);
        assert_eq!(page(Some(0)).page_number(), 1);
        assert_eq!(page(Some(7)).page_number(), 7);
        assert_eq!(page(Some(i64::MAX)).page_number(), u32::MAX);
    }

    #[test]
    fn open_range_defaults_to_trailing_week() {
        let params = RangeParams::default();
        let range = params.range_or_last_week(date!(2026 - 03 - 08)).unwrap();
        assert_eq!(range.start, Some(date!(2026 - 03 - 01)));
        assert_eq!(range.end, Some(date!(2026 - 03 - 08)));
    }

    #[test]
    fn explicit_bounds_are_kept() {
        let params = RangeParams {
            start_date: Some("2026-02-01".to_string()),
            end_date: None,
        };
        let range = params.range_or_last_week(date!(2026 - 03 - 08)).unwrap();
        assert_eq!(range.start, Some(date!(2026 - 02 - 01)));
        assert_eq!(range.end, None);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let params = RangeParams {
            start_date: Some("03/01/2026".to_string()),
            end_date: None,
        };
        assert!(matches!(
            params.range_or_last_week(date!(2026 - 03 - 08)),
            Err(DateRangeError::InvalidDate(_))
        ));
    }
}
