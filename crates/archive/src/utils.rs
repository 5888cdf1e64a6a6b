use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};
use wx_archive_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_ARCHIVE_PORT, DEFAULT_DB_DIR,
    DEFAULT_PAGE_SIZE, DEFAULT_STALE_AFTER_SECS,
};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "wx-archive API - paginated and summarized access to archived weather readings"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $WX_ARCHIVE_CONFIG, ./archive.toml,
    /// $XDG_CONFIG_HOME/wx-archive/archive.toml, /etc/wx-archive/archive.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "WX_ARCHIVE_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "WX_ARCHIVE_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WX_ARCHIVE_PORT")]
    pub port: Option<String>,

    /// Public URL for API responses
    #[arg(short, long, env = "WX_ARCHIVE_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory holding the archive database written by the daemon
    #[arg(long, env = "WX_ARCHIVE_DB_DIR")]
    pub db_dir: Option<String>,

    /// Readings per page when the request does not say
    #[arg(long, env = "WX_ARCHIVE_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Seconds after which the freshest reading counts as stale
    #[arg(long, env = "WX_ARCHIVE_STALE_AFTER")]
    pub stale_after: Option<i64>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_ARCHIVE_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn db_dir(&self) -> String {
        self.db_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_DIR.to_string())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn stale_after(&self) -> i64 {
        self.stale_after.unwrap_or(DEFAULT_STALE_AFTER_SECS)
    }

    /// CLI and env values win over the config file
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            domain: self.domain.or(file_config.domain),
            port: self.port.or(file_config.port),
            remote_url: self.remote_url.or(file_config.remote_url),
            db_dir: self.db_dir.or(file_config.db_dir),
            page_size: self.page_size.or(file_config.page_size),
            stale_after: self.stale_after.or(file_config.stale_after),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("WX_ARCHIVE_CONFIG", "archive.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_default();
    cli_args.merge(file_config)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
