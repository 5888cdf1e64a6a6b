mod query;
mod sqlite;

use async_trait::async_trait;

use crate::{ArchivedReading, DateRange, Reading};

pub use query::*;
pub use sqlite::*;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query archive: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to run archive migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Failed to prepare archive directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt archive row: {0}")]
    CorruptRow(String),
    #[error("Archive writer unavailable: {0}")]
    Writer(String),
}

/// Insert-only side of the archive.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    /// Append one row. No dedup is attempted: two readings with the same
    /// timestamp produce two rows.
    async fn archive(&self, reading: Reading) -> Result<ArchivedReading, Error>;
}

/// Read-only side of the archive.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ReadingsArchive: Send + Sync {
    /// Newest first, skipping `offset` rows.
    async fn list_readings(
        &self,
        offset: i64,
        limit: i64,
        range: DateRange,
    ) -> Result<Vec<ArchivedReading>, Error>;
    async fn count_readings(&self, range: DateRange) -> Result<i64, Error>;
    /// Oldest first; used for aggregates and chart series.
    async fn readings_ascending(&self, range: DateRange) -> Result<Vec<ArchivedReading>, Error>;
    async fn latest_reading(&self) -> Result<Option<ArchivedReading>, Error>;
    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<(), Error>;
}
