use slog::{debug, error, info, warn, Logger};
use std::sync::Arc;
use wx_archive_core::{db, db::ArchiveWriter, ArchivedReading};

use crate::{
    normalize, Fetch, FetchError, ObservationResolver, ObservationResponse, ResolutionError,
};

#[derive(thiserror::Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("failed to fetch latest observation: {0}")]
    Fetch(#[from] FetchError),
    #[error("insufficient weather data: observation has no temperature")]
    InsufficientData,
    #[error("failed to archive reading: {0}")]
    Archive(#[from] db::Error),
}

impl CycleError {
    /// Sparse observations are routine and are not treated as a failed run.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, CycleError::InsufficientData)
    }
}

/// Log a cycle outcome. Returns `false` only for a real failure; an
/// observation without temperature is a warning and still counts as a run.
pub fn report_outcome(result: &Result<ArchivedReading, CycleError>, logger: &Logger) -> bool {
    match result {
        Ok(_) => true,
        Err(err) if err.is_insufficient_data() => {
            warn!(logger, "{}, nothing archived this cycle", err);
            true
        }
        Err(err) => {
            error!(logger, "ingestion cycle failed: {}", err);
            false
        }
    }
}

/// resolve station, fetch latest observation, normalize, append
pub struct IngestionCycle {
    logger: Logger,
    resolver: ObservationResolver,
    fetcher: Arc<dyn Fetch>,
    writer: Arc<dyn ArchiveWriter>,
    latitude: f64,
    longitude: f64,
}

impl IngestionCycle {
    pub fn new(
        logger: Logger,
        fetcher: Arc<dyn Fetch>,
        writer: Arc<dyn ArchiveWriter>,
        api_base: &str,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let resolver = ObservationResolver::new(logger.clone(), fetcher.clone(), api_base);
        Self {
            logger,
            resolver,
            fetcher,
            writer,
            latitude,
            longitude,
        }
    }

    /// Station resolution is repeated every cycle; nothing is cached between runs.
    pub async fn run(&self) -> Result<ArchivedReading, CycleError> {
        let observation_url = self.resolver.resolve(self.latitude, self.longitude).await?;

        let body = self.fetcher.fetch(&observation_url).await?;
        let observation: ObservationResponse = serde_json::from_value(body)
            .map_err(|e| FetchError::decode(&observation_url, e))?;
        debug!(self.logger, "observation properties: {:?}", observation.properties);

        let reading = normalize(&observation.properties);
        if !reading.is_archivable() {
            return Err(CycleError::InsufficientData);
        }

        let archived = self.writer.archive(reading).await?;
        info!(
            self.logger,
            "archived reading {} at {}: {:?} F, wind {} mph {}, {}",
            archived.id,
            archived.timestamp,
            archived.temperature_f,
            archived.wind_speed_mph,
            archived.wind_direction_cardinal,
            archived.conditions
        );
        Ok(archived)
    }
}
