use axum::{extract::State, http::StatusCode, Json};
use log::error;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataFreshness {
    Fresh,
    Stale,
    NoData,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// `connected` or `unreachable`
    pub database: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_data_update: Option<OffsetDateTime>,
    pub data_freshness: DataFreshness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl HealthReport {
    pub fn unreachable(now: OffsetDateTime) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            timestamp: now,
            database: "unreachable".to_string(),
            last_data_update: None,
            data_freshness: DataFreshness::Unknown,
            warning: Some("Archive database is unreachable".to_string()),
        }
    }

    /// Grade a reachable archive by the age of its freshest reading.
    pub fn assess(now: OffsetDateTime, latest: Option<OffsetDateTime>, stale_after: i64) -> Self {
        let (status, data_freshness, warning) = match latest {
            None => (
                HealthStatus::Degraded,
                DataFreshness::NoData,
                Some("No weather data in archive".to_string()),
            ),
            Some(at) => {
                let age = (now - at).whole_seconds();
                if age > stale_after {
                    (
                        HealthStatus::Degraded,
                        DataFreshness::Stale,
                        Some(format!("Latest reading is {} minutes old", age / 60)),
                    )
                } else {
                    (HealthStatus::Healthy, DataFreshness::Fresh, None)
                }
            }
        };

        Self {
            status,
            timestamp: now,
            database: "connected".to_string(),
            last_data_update: latest,
            data_freshness,
            warning,
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Archive reachable, data fresh or degraded", body = HealthReport),
        (status = SERVICE_UNAVAILABLE, description = "Archive unreachable", body = HealthReport)
    ))]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let now = OffsetDateTime::now_utc();

    let latest = match state.queries.ping().await {
        Ok(()) => state.queries.latest().await,
        Err(e) => Err(e),
    };

    match latest {
        Ok(latest) => {
            let report = HealthReport::assess(now, latest.map(|r| r.timestamp), state.stale_after);
            (StatusCode::OK, Json(report))
        }
        Err(e) => {
            error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport::unreachable(now)),
            )
        }
    }
}
