use anyhow::anyhow;
use archive::{app, build_app_state, get_config_info, get_log_level, setup_logger};
use axum::serve;
use futures::TryFutureExt;
use log::{error, info};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, signal};
use wx_archive_core::{db::Database, ensure_dir_exists};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info();
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("archive", log_level)
        .level_for("wx_archive_core", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let db_dir = cli.db_dir();
    let remote_url = cli.remote_url();
    let host = cli.host();
    let port = cli.port();

    if !ensure_dir_exists(&db_dir) {
        return Err(anyhow!("archive directory {} is not usable", db_dir));
    }

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", host, port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    info!("wx-archive API starting...");
    info!("  Listen: http://{}", socket_addr);
    info!("  Docs:   http://{}/docs", socket_addr);
    info!("  Archive dir: {}", db_dir);
    info!("  Page size: {}", cli.page_size());
    info!("  Stale after: {} seconds", cli.stale_after());

    let database = Database::new(&db_dir).await.map_err(|e| {
        error!("error opening archive: {}", e);
        e
    })?;

    let app_state = build_app_state(
        remote_url,
        Arc::new(database.clone()),
        cli.page_size(),
        cli.stale_after(),
    );
    let app = app(app_state);

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    database.checkpoint().await;
    info!("wx-archive API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
