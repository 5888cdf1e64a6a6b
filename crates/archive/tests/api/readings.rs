use crate::helpers::{body_json, body_text, reading, spawn_app, storage_down};
use hyper::StatusCode;
use time::macros::{date, datetime};
use wx_archive_core::{db::MockReadingsArchive, DateRange};

#[tokio::test]
async fn lists_first_page_newest_first() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_list_readings()
        .withf(|offset, limit, range| *offset == 0 && *limit == 50 && !range.is_bounded())
        .times(1)
        .returning(|_, _, _| {
            Ok(vec![
                reading(datetime!(2026-03-01 12:51 UTC), Some(72.0)),
                reading(datetime!(2026-03-01 11:51 UTC), Some(70.3)),
            ])
        });
    archive.expect_count_readings().times(1).returning(|_| Ok(2));

    let test_app = spawn_app(archive);
    let response = test_app.get("/readings").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 50);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["status"], "ok");
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["timestamp"], "2026-03-01T12:51:00Z");
    assert_eq!(rows[0]["wind_direction_cardinal"], "SSW");
    assert!(rows[0]["visibility_mi"].is_null());
}

#[tokio::test]
async fn page_and_dates_are_passed_through() {
    let expected = DateRange::between(date!(2026 - 03 - 01), date!(2026 - 03 - 07)).unwrap();
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_list_readings()
        .withf(move |offset, limit, range| *offset == 50 && *limit == 25 && *range == expected)
        .times(1)
        .returning(|_, _, _| Ok(vec![]));
    archive
        .expect_count_readings()
        .withf(move |range| *range == expected)
        .times(1)
        .returning(|_| Ok(60));

    let test_app = spawn_app(archive);
    let response = test_app
        .get("/readings?page=3&per_page=25&start_date=2026-03-01&end_date=2026-03-07")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["page"], 3);
    assert_eq!(body["total"], 60);
    assert_eq!(body["total_pages"], 3);
}

#[tokio::test]
async fn page_below_one_is_treated_as_first_page() {
    for uri in ["/readings?page=-5", "/readings?page=0"] {
        let mut archive = MockReadingsArchive::new();
        archive
            .expect_list_readings()
            .withf(|offset, limit, _| *offset == 0 && *limit == 50)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![reading(datetime!(2026-03-01 12:51 UTC), Some(72.0))])
            });
        archive.expect_count_readings().times(1).returning(|_| Ok(1));

        let response = spawn_app(archive).get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");

        let body = body_json(response).await;
        assert_eq!(body["page"], 1, "{uri}");
        assert_eq!(body["offset"], 0, "{uri}");
        assert_eq!(body["rows"].as_array().unwrap().len(), 1, "{uri}");
    }
}

#[tokio::test]
async fn oversized_page_size_is_clamped() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_list_readings()
        .withf(|_, limit, _| *limit == 500)
        .times(1)
        .returning(|_, _, _| Ok(vec![]));
    archive.expect_count_readings().returning(|_| Ok(0));

    let response = spawn_app(archive).get("/readings?per_page=10000").await;
    let body = body_json(response).await;
    assert_eq!(body["per_page"], 500);
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_list_readings().never();
    archive.expect_count_readings().never();

    let test_app = spawn_app(archive);
    let response = test_app.get("/readings?start_date=2026-13-45").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("2026-13-45"));
}

#[tokio::test]
async fn inverted_range_is_a_bad_request() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_readings_ascending().never();

    let response = spawn_app(archive)
        .get("/readings/summary?start_date=2026-03-07&end_date=2026-03-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_is_flagged_not_hidden() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_list_readings()
        .returning(|_, _, _| Err(storage_down()));

    let response = spawn_app(archive).get("/readings").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "storage_unavailable");
    assert_eq!(body["total"], 0);
    assert!(body["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_over_explicit_range() {
    let expected = DateRange::between(date!(2026 - 03 - 01), date!(2026 - 03 - 02)).unwrap();
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_readings_ascending()
        .withf(move |range| *range == expected)
        .times(1)
        .returning(|_| {
            let mut calm = reading(datetime!(2026-03-01 06:00 UTC), Some(48.2));
            calm.wind_speed_mph = 0.0;
            calm.humidity_pct = Some(80);
            let mut missing = reading(datetime!(2026-03-01 09:00 UTC), None);
            missing.humidity_pct = None;
            Ok(vec![
                calm,
                missing,
                reading(datetime!(2026-03-02 15:00 UTC), Some(75.6)),
            ])
        });

    let response = spawn_app(archive)
        .get("/readings/summary?start_date=2026-03-01&end_date=2026-03-02")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["max_temp"], 75.6);
    assert_eq!(body["min_temp"], 48.2);
    // (80 + 55) / 2
    assert_eq!(body["avg_humidity"], 68);
    assert_eq!(body["max_wind_speed"], 8.1);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn summary_of_empty_range_is_all_null() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_readings_ascending()
        .withf(|range| range.start.is_some() && range.end.is_some())
        .times(1)
        .returning(|_| Ok(vec![]));

    let response = spawn_app(archive).get("/readings/summary").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["max_temp"].is_null());
    assert!(body["min_temp"].is_null());
    assert!(body["avg_humidity"].is_null());
    assert!(body["max_wind_speed"].is_null());
    assert_eq!(body["reading_count"], 0);
}

#[tokio::test]
async fn series_is_oldest_first() {
    let mut archive = MockReadingsArchive::new();
    archive.expect_readings_ascending().times(1).returning(|_| {
        Ok(vec![
            reading(datetime!(2026-03-01 06:00 UTC), Some(48.2)),
            reading(datetime!(2026-03-01 07:00 UTC), Some(50.0)),
        ])
    });

    let response = spawn_app(archive)
        .get("/readings/series?start_date=2026-03-01")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let series = body.as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["timestamp"], "2026-03-01T06:00:00Z");
    assert_eq!(series[1]["temperature_f"], 50.0);
}

#[tokio::test]
async fn series_reports_unreachable_archive() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_readings_ascending()
        .returning(|_| Err(storage_down()));

    let response = spawn_app(archive).get("/readings/series").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn latest_reading_or_not_found() {
    let mut archive = MockReadingsArchive::new();
    archive
        .expect_latest_reading()
        .times(1)
        .returning(|| Ok(Some(reading(datetime!(2026-03-01 12:51 UTC), Some(72.0)))));

    let response = spawn_app(archive).get("/readings/latest").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["temperature_f"], 72.0);
    assert_eq!(body["conditions"], "Partly Cloudy");

    let mut empty = MockReadingsArchive::new();
    empty.expect_latest_reading().returning(|| Ok(None));
    let response = spawn_app(empty).get("/readings/latest").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_docs_are_served() {
    let response = spawn_app(MockReadingsArchive::new()).get("/docs").await;
    assert_eq!(response.status(), StatusCode::OK);
}
