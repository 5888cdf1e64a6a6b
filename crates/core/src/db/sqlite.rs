use async_trait::async_trait;
use log::{error, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{future::Future, path::Path, str::FromStr, sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};
use uuid::Uuid;

use super::{ArchiveWriter, Error, ReadingsArchive};
use crate::{ArchivedReading, DateRange, Reading};

pub const DB_FILE_NAME: &str = "weather.sqlite";

const READING_COLUMNS: &str = "id, timestamp, temperature_f, humidity_pct, wind_speed_mph,
     wind_direction_deg, pressure_in_hg, dew_point_f, visibility_mi, conditions";

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Funnels every write through one task so the archive only ever has a single
/// writer, while reads go straight to the pool.
pub struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for DatabaseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseWriter {
    pub fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    pub async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T, Error>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| Error::Writer("writer channel closed".to_string()))?;

        result_rx
            .await
            .map_err(|_| Error::Writer("failed to receive write result".to_string()))?
    }
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    writer: Arc<DatabaseWriter>,
}

impl Database {
    /// Open (or create) `weather.sqlite` inside `dir` and apply migrations.
    pub async fn new(dir: &str) -> Result<Self, Error> {
        let db_path = Path::new(dir).join(DB_FILE_NAME);

        if let Some(parent) = db_path.parent() {
            create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            writer: Arc::new(DatabaseWriter::new()),
        };

        db.run_migrations().await?;
        info!("SQLite archive initialized at: {}", db_path.display());

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checkpoint WAL to the main database file before shutdown.
    pub async fn checkpoint(&self) {
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("WAL checkpoint completed successfully"),
            Err(e) => error!("WAL checkpoint failed: {}", e),
        }
    }
}

#[async_trait]
impl ArchiveWriter for Database {
    async fn archive(&self, reading: Reading) -> Result<ArchivedReading, Error> {
        let pool = self.pool.clone();
        let inserted_at = OffsetDateTime::now_utc();
        let row = ArchivedReading::from_reading(Uuid::now_v7(), reading, inserted_at);

        self.writer
            .execute(pool, move |pool| async move {
                sqlx::query(
                    "INSERT INTO weather_readings (
                        id, timestamp, temperature_f, humidity_pct, wind_speed_mph,
                        wind_direction_deg, pressure_in_hg, dew_point_f, visibility_mi,
                        conditions, inserted_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(row.id.to_string())
                .bind(row.timestamp.unix_timestamp())
                .bind(row.temperature_f)
                .bind(row.humidity_pct)
                .bind(row.wind_speed_mph)
                .bind(row.wind_direction_deg)
                .bind(row.pressure_in_hg)
                .bind(row.dew_point_f)
                .bind(row.visibility_mi)
                .bind(&row.conditions)
                .bind(inserted_at.unix_timestamp())
                .execute(&pool)
                .await?;

                Ok(row)
            })
            .await
    }
}

#[async_trait]
impl ReadingsArchive for Database {
    async fn list_readings(
        &self,
        offset: i64,
        limit: i64,
        range: DateRange,
    ) -> Result<Vec<ArchivedReading>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {READING_COLUMNS} FROM weather_readings
             WHERE (?1 IS NULL OR timestamp >= ?1) AND (?2 IS NULL OR timestamp < ?2)
             ORDER BY timestamp DESC, id DESC
             LIMIT ?3 OFFSET ?4"
        ))
        .bind(range.start_unix())
        .bind(range.end_unix_exclusive())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_reading).collect()
    }

    async fn count_readings(&self, range: DateRange) -> Result<i64, Error> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM weather_readings
             WHERE (?1 IS NULL OR timestamp >= ?1) AND (?2 IS NULL OR timestamp < ?2)",
        )
        .bind(range.start_unix())
        .bind(range.end_unix_exclusive())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn readings_ascending(&self, range: DateRange) -> Result<Vec<ArchivedReading>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {READING_COLUMNS} FROM weather_readings
             WHERE (?1 IS NULL OR timestamp >= ?1) AND (?2 IS NULL OR timestamp < ?2)
             ORDER BY timestamp ASC, id ASC"
        ))
        .bind(range.start_unix())
        .bind(range.end_unix_exclusive())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_reading).collect()
    }

    async fn latest_reading(&self) -> Result<Option<ArchivedReading>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {READING_COLUMNS} FROM weather_readings
             ORDER BY timestamp DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_reading).transpose()
    }

    async fn ping(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

fn row_to_reading(row: &SqliteRow) -> Result<ArchivedReading, Error> {
    let id: String = row.try_get("id")?;
    let ts: i64 = row.try_get("timestamp")?;
    let wind_direction_deg: Option<f64> = row.try_get("wind_direction_deg")?;

    Ok(ArchivedReading {
        id: Uuid::parse_str(&id).map_err(|e| Error::CorruptRow(format!("id {id}: {e}")))?,
        timestamp: OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| Error::CorruptRow(format!("timestamp {ts}: {e}")))?,
        temperature_f: row.try_get("temperature_f")?,
        humidity_pct: row.try_get("humidity_pct")?,
        wind_speed_mph: row.try_get("wind_speed_mph")?,
        wind_direction_deg,
        wind_direction_cardinal: crate::units::cardinal_or_na(wind_direction_deg).to_string(),
        pressure_in_hg: row.try_get("pressure_in_hg")?,
        dew_point_f: row.try_get("dew_point_f")?,
        visibility_mi: row.try_get("visibility_mi")?,
        conditions: row.try_get("conditions")?,
    })
}
