use serde::de::DeserializeOwned;
use slog::{debug, info, Logger};
use std::{fmt, sync::Arc};

use super::{PointResponse, StationCollection};
use crate::{Fetch, FetchError};

/// Which hop of station resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    PointLookup,
    StationsLinkMissing,
    StationList,
    NoStations,
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            ResolutionStage::PointLookup => "point-lookup",
            ResolutionStage::StationsLinkMissing => "stations-link-missing",
            ResolutionStage::StationList => "station-list",
            ResolutionStage::NoStations => "no-stations",
        };
        f.write_str(stage)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("station resolution failed at {stage}")]
pub struct ResolutionError {
    pub stage: ResolutionStage,
    #[source]
    pub source: Option<FetchError>,
}

impl ResolutionError {
    fn at(stage: ResolutionStage) -> Self {
        Self {
            stage,
            source: None,
        }
    }

    fn fetch(stage: ResolutionStage, source: FetchError) -> Self {
        Self {
            stage,
            source: Some(source),
        }
    }
}

/// Turns a coordinate into the latest-observation URL of its first station.
///
/// Two hops: `/points/{lat},{lon}` yields the `observationStations` link, and
/// that list's first feature names the station. The first station always wins;
/// there is no ranking. Each hop is tried once.
pub struct ObservationResolver {
    logger: Logger,
    fetcher: Arc<dyn Fetch>,
    api_base: String,
}

impl ObservationResolver {
    pub fn new(logger: Logger, fetcher: Arc<dyn Fetch>, api_base: &str) -> Self {
        Self {
            logger,
            fetcher,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn points_url(&self, latitude: f64, longitude: f64) -> String {
        format!("{}/points/{:.4},{:.4}", self.api_base, latitude, longitude)
    }

    pub fn latest_observation_url(&self, station_id: &str) -> String {
        format!(
            "{}/stations/{}/observations/latest",
            self.api_base, station_id
        )
    }

    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Result<String, ResolutionError> {
        let points_url = self.points_url(latitude, longitude);
        let point: PointResponse = self
            .get(&points_url)
            .await
            .map_err(|e| ResolutionError::fetch(ResolutionStage::PointLookup, e))?;

        let stations_url = point
            .properties
            .observation_stations
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ResolutionError::at(ResolutionStage::StationsLinkMissing))?;
        debug!(self.logger, "observation stations link: {}", stations_url);

        let stations: StationCollection = self
            .get(&stations_url)
            .await
            .map_err(|e| ResolutionError::fetch(ResolutionStage::StationList, e))?;

        let station = stations
            .features
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::at(ResolutionStage::NoStations))?;
        let station_id = station.properties.station_identifier;
        info!(
            self.logger,
            "resolved {:.4},{:.4} to station {} ({})",
            latitude,
            longitude,
            station_id,
            station.properties.name.as_deref().unwrap_or("unnamed")
        );

        Ok(self.latest_observation_url(&station_id))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.fetcher.fetch(url).await?;
        serde_json::from_value(body).map_err(|e| FetchError::decode(url, e))
    }
}
