//! wx-archive Core Library
//!
//! Shared pieces for the ingestion daemon and the archive API:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Unit conversion and the canonical `Reading` model
//! - The append-only SQLite archive

mod config;
pub mod db;
pub mod fs;
mod reading;
pub mod units;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::ensure_dir_exists;
pub use reading::{ArchivedReading, DateRange, DateRangeError, Reading, UNKNOWN_CONDITIONS};

/// Application name used for XDG paths
pub const APP_NAME: &str = "wx-archive";

/// Default archive API port
pub const DEFAULT_ARCHIVE_PORT: u16 = 9810;

/// Default ingestion interval (15 minutes)
pub const DEFAULT_FETCH_INTERVAL: u64 = 900;

/// Age of the freshest reading after which the archive reports degraded
pub const DEFAULT_STALE_AFTER_SECS: i64 = 900;

/// Default number of readings per archive page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default directory holding the archive database
pub const DEFAULT_DB_DIR: &str = "./archive_data";
