use log::{debug, error};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::ReadingsArchive;
use crate::{units::round_to, ArchivedReading, DateRange, DEFAULT_PAGE_SIZE};

/// Largest page a caller may ask for
pub const MAX_PAGE_SIZE: u32 = 500;

/// Whether a response came from the archive or is a degraded stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    Ok,
    StorageUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReadingsPage {
    pub rows: Vec<ArchivedReading>,
    /// Rows matching the date filter across all pages
    pub total: i64,
    pub offset: i64,
    #[serde(rename = "per_page")]
    pub limit: u32,
    pub page: u32,
    pub total_pages: u32,
    pub status: ArchiveStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SummaryStats {
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub avg_humidity: Option<i64>,
    pub max_wind_speed: Option<f64>,
    pub reading_count: usize,
}

impl SummaryStats {
    /// Aggregate over `readings`, skipping absent values per field. Fields with
    /// no values stay `None`.
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a ArchivedReading>) -> Self {
        let mut stats = SummaryStats::default();
        let mut humidity_sum = 0_i64;
        let mut humidity_count = 0_i64;

        for reading in readings {
            stats.reading_count += 1;
            if let Some(temp) = reading.temperature_f {
                stats.max_temp = Some(stats.max_temp.map_or(temp, |max| max.max(temp)));
                stats.min_temp = Some(stats.min_temp.map_or(temp, |min| min.min(temp)));
            }
            if let Some(humidity) = reading.humidity_pct {
                humidity_sum += humidity;
                humidity_count += 1;
            }
            let wind = reading.wind_speed_mph;
            stats.max_wind_speed = Some(stats.max_wind_speed.map_or(wind, |max| max.max(wind)));
        }

        if humidity_count > 0 {
            stats.avg_humidity = Some(round_to(humidity_sum as f64 / humidity_count as f64, 0) as i64);
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub stats: SummaryStats,
    pub status: ArchiveStatus,
}

/// Range-filtered, paginated and aggregated views over the archive.
///
/// Storage failures never reach the caller as errors: they come back as empty
/// results tagged [`ArchiveStatus::StorageUnavailable`] and are logged, so a
/// genuinely empty range stays distinguishable from an unreachable archive.
#[derive(Clone)]
pub struct ArchiveQueryService {
    archive: Arc<dyn ReadingsArchive>,
    page_size: u32,
}

impl ArchiveQueryService {
    pub fn new(archive: Arc<dyn ReadingsArchive>) -> Self {
        Self::with_page_size(archive, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(archive: Arc<dyn ReadingsArchive>, page_size: u32) -> Self {
        Self {
            archive,
            page_size: clamp_limit(page_size),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Page `page_number` (1-based, clamped to 1) of the newest-first listing.
    pub async fn page(
        &self,
        page_number: u32,
        limit: Option<u32>,
        range: DateRange,
    ) -> ReadingsPage {
        let limit = limit.map(clamp_limit).unwrap_or(self.page_size);
        let page_number = page_number.max(1);
        let offset = (page_number as i64 - 1) * limit as i64;
        self.list_readings(offset, limit, range).await
    }

    /// Newest-first listing starting at `offset`, with the total for `range`.
    pub async fn list_readings(&self, offset: i64, limit: u32, range: DateRange) -> ReadingsPage {
        let offset = offset.max(0);
        let limit = clamp_limit(limit);
        let page = u32::try_from(offset / limit as i64)
            .unwrap_or(u32::MAX)
            .saturating_add(1);

        let result = async {
            let rows = self
                .archive
                .list_readings(offset, limit as i64, range)
                .await?;
            let total = self.archive.count_readings(range).await?;
            Ok::<_, super::Error>((rows, total))
        }
        .await;

        match result {
            Ok((rows, total)) => {
                debug!(
                    "listed {} of {} readings (offset {}, limit {})",
                    rows.len(),
                    total,
                    offset,
                    limit
                );
                ReadingsPage {
                    rows,
                    total,
                    offset,
                    limit,
                    page,
                    total_pages: total_pages(total, limit),
                    status: ArchiveStatus::Ok,
                }
            }
            Err(e) => {
                error!("archive unavailable while listing readings: {}", e);
                ReadingsPage {
                    rows: vec![],
                    total: 0,
                    offset,
                    limit,
                    page,
                    total_pages: 0,
                    status: ArchiveStatus::StorageUnavailable,
                }
            }
        }
    }

    pub async fn summary_stats(&self, range: DateRange) -> SummaryReport {
        match self.archive.readings_ascending(range).await {
            Ok(readings) => SummaryReport {
                stats: SummaryStats::from_readings(&readings),
                status: ArchiveStatus::Ok,
            },
            Err(e) => {
                error!("archive unavailable while summarizing readings: {}", e);
                SummaryReport {
                    stats: SummaryStats::default(),
                    status: ArchiveStatus::StorageUnavailable,
                }
            }
        }
    }

    /// Oldest-first readings in `range`, for charting.
    pub async fn series(&self, range: DateRange) -> Result<Vec<ArchivedReading>, super::Error> {
        self.archive.readings_ascending(range).await
    }

    pub async fn latest(&self) -> Result<Option<ArchivedReading>, super::Error> {
        self.archive.latest_reading().await
    }

    pub async fn ping(&self) -> Result<(), super::Error> {
        self.archive.ping().await
    }
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

fn total_pages(total: i64, limit: u32) -> u32 {
    if total <= 0 {
        0
    } else {
        ((total + limit as i64 - 1) / limit as i64) as u32
    }
}
