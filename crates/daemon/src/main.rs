use daemon::{get_config_info, report_outcome, setup_logger, Cli, IngestionCycle, JsonFetcher};
use slog::{error, info, Logger};
use std::{process::ExitCode, sync::Arc, time::Duration};
use tokio::{signal, time::interval};
use wx_archive_core::db::Database;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    info!(logger, "wx-archive daemon starting...");
    info!(logger, "  API base: {}", cli.api_base());
    info!(logger, "  Location: {:.4},{:.4}", cli.latitude(), cli.longitude());
    info!(logger, "  Archive dir: {}", cli.db_dir());

    let cycle = match build_cycle(&cli, &logger).await {
        Ok(cycle) => cycle,
        Err(err) => {
            error!(logger, "failed to start daemon: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    if cli.once {
        return run_once(&cycle, &logger).await;
    }

    run_forever(cli.sleep_interval(), &cycle, &logger).await;
    ExitCode::SUCCESS
}

async fn build_cycle(cli: &Cli, logger: &Logger) -> Result<IngestionCycle, anyhow::Error> {
    let fetcher = Arc::new(JsonFetcher::new(
        logger.clone(),
        &cli.user_agent(),
        cli.timeout(),
    )?);
    let database = Arc::new(Database::new(&cli.db_dir()).await?);

    Ok(IngestionCycle::new(
        logger.clone(),
        fetcher,
        database,
        &cli.api_base(),
        cli.latitude(),
        cli.longitude(),
    ))
}

async fn run_once(cycle: &IngestionCycle, logger: &Logger) -> ExitCode {
    if report_outcome(&cycle.run().await, logger) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_forever(sleep_between_runs: u64, cycle: &IngestionCycle, logger: &Logger) {
    info!(
        logger,
        "Wait time between data pulls: {} seconds", sleep_between_runs
    );

    let mut ticker = interval(Duration::from_secs(sleep_between_runs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if report_outcome(&cycle.run().await, logger) {
                    info!(logger, "Finished cycle, waiting {} seconds for next run", sleep_between_runs);
                }
            }
            _ = signal::ctrl_c() => {
                info!(logger, "shutdown requested, stopping daemon");
                break;
            }
        }
    }
}
