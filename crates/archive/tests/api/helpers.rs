use archive::{app, build_app_state};
use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use hyper::Method;
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;
use wx_archive_core::{
    db::{Error, MockReadingsArchive},
    units::cardinal_or_na,
    ArchivedReading,
};

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(archive: MockReadingsArchive) -> TestApp {
    let app_state = build_app_state(
        String::from("http://127.0.0.1:9810"),
        Arc::new(archive),
        50,
        900,
    );
    TestApp {
        app: app(app_state),
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub fn reading(timestamp: OffsetDateTime, temperature_f: Option<f64>) -> ArchivedReading {
    let wind_direction_deg = Some(200.0);
    ArchivedReading {
        id: Uuid::now_v7(),
        timestamp,
        temperature_f,
        humidity_pct: Some(55),
        wind_speed_mph: 8.1,
        wind_direction_deg,
        wind_direction_cardinal: cardinal_or_na(wind_direction_deg).to_string(),
        pressure_in_hg: Some(30.01),
        dew_point_f: Some(54.3),
        visibility_mi: None,
        conditions: String::from("Partly Cloudy"),
    }
}

pub fn storage_down() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "unable to open database file",
    ))
}
