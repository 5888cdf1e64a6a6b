use crate::helpers::{body_json, reading, spawn_app, storage_down};
use hyper::StatusCode;
use time::{Duration, OffsetDateTime};
use wx_archive_core::db::MockReadingsArchive;

#[tokio::test]
async fn fresh_data_is_healthy() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_ping().times(1).returning(|| Ok(()));
    archive.expect_latest_reading().times(1).returning(|| {
        Ok(Some(reading(
            OffsetDateTime::now_utc() - Duration::minutes(5),
            Some(71.0),
        )))
    });

    let response = spawn_app(archive).get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["data_freshness"], "fresh");
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn stale_data_is_degraded() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_ping().returning(|| Ok(()));
    archive.expect_latest_reading().returning(|| {
        Ok(Some(reading(
            OffsetDateTime::now_utc() - Duration::hours(2),
            Some(71.0),
        )))
    });

    let response = spawn_app(archive).get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["data_freshness"], "stale");
    assert!(body["warning"].as_str().unwrap().contains("minutes old"));
}

#[tokio::test]
async fn empty_archive_is_degraded() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_ping().returning(|| Ok(()));
    archive.expect_latest_reading().returning(|| Ok(None));

    let body = body_json(spawn_app(archive).get("/health").await).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["data_freshness"], "no_data");
    assert!(body["last_data_update"].is_null());
}

#[tokio::test]
async fn unreachable_archive_is_unhealthy() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_ping().returning(|| Err(storage_down()));
    archive.expect_latest_reading().never();

    let response = spawn_app(archive).get("/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "unreachable");
}
