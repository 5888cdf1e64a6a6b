use crate::{health, latest, list_readings, routes, series, summary};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};
use wx_archive_core::{
    db::{self, ArchiveQueryService, ReadingsArchive},
    ArchivedReading,
};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub queries: ArchiveQueryService,
    /// Seconds after which the freshest reading is reported stale
    pub stale_after: i64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::readings::list_readings,
        routes::readings::summary,
        routes::readings::series,
        routes::readings::latest,
        routes::health::health,
    ),
    components(
        schemas(
                ArchivedReading,
                db::ReadingsPage,
                db::SummaryStats,
                db::SummaryReport,
                db::ArchiveStatus,
                routes::health::HealthReport,
                routes::health::HealthStatus,
                routes::health::DataFreshness
            )
    ),
    tags(
        (name = "wx-archive api", description = "a read-only api over an append-only archive of weather.gov observations")
    )
)]
struct ApiDoc;

pub fn build_app_state(
    remote_url: String,
    archive: Arc<dyn ReadingsArchive>,
    page_size: u32,
    stale_after: i64,
) -> AppState {
    AppState {
        remote_url,
        queries: ArchiveQueryService::with_page_size(archive, page_size),
        stale_after,
    }
}

pub fn app(app_state: AppState) -> Router {
    let mut api_docs = ApiDoc::openapi();
    api_docs.servers = Some(vec![utoipa::openapi::Server::new(&app_state.remote_url)]);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health))
        .route("/readings", get(list_readings))
        .route("/readings/summary", get(summary))
        .route("/readings/series", get(series))
        .route("/readings/latest", get(latest))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_string();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
