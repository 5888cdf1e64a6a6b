use clap::Parser;
use slog::{o, Drain, Level, Logger};
use std::{env, time::Duration};
use wx_archive_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_DB_DIR, DEFAULT_FETCH_INTERVAL,
};

pub const DEFAULT_API_BASE: &str = "https://api.weather.gov";
pub const DEFAULT_USER_AGENT: &str = "wx-archive-daemon/0.1 (ops@wx-archive.local)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// San Antonio, TX
pub const DEFAULT_LATITUDE: f64 = 29.4241;
pub const DEFAULT_LONGITUDE: f64 = -98.4936;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "wx-archive daemon - archives the latest weather.gov observation for a location"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $WX_DAEMON_CONFIG, ./daemon.toml,
    /// $XDG_CONFIG_HOME/wx-archive/daemon.toml, /etc/wx-archive/daemon.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "WX_DAEMON_LEVEL")]
    pub level: Option<String>,

    /// Directory holding the archive database
    #[arg(short, long, env = "WX_DAEMON_DB_DIR")]
    pub db_dir: Option<String>,

    /// Latitude of the point to observe
    #[arg(long, env = "WX_DAEMON_LATITUDE", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude of the point to observe
    #[arg(long, env = "WX_DAEMON_LONGITUDE", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Base URL of the weather.gov API
    #[arg(short, long, env = "WX_DAEMON_API_BASE")]
    pub api_base: Option<String>,

    /// HTTP User-Agent header; weather.gov asks for contact details here
    #[arg(short, long, env = "WX_DAEMON_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, env = "WX_DAEMON_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Seconds between ingestion cycles
    #[arg(short, long, env = "WX_DAEMON_SLEEP_INTERVAL")]
    pub sleep_interval: Option<u64>,

    /// Run a single ingestion cycle and exit (for cron-style schedulers)
    #[arg(long)]
    #[serde(skip)]
    pub once: bool,
}

impl Cli {
    pub fn db_dir(&self) -> String {
        self.db_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_DIR.to_string())
    }

    pub fn latitude(&self) -> f64 {
        self.latitude.unwrap_or(DEFAULT_LATITUDE)
    }

    pub fn longitude(&self) -> f64 {
        self.longitude.unwrap_or(DEFAULT_LONGITUDE)
    }

    pub fn api_base(&self) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn sleep_interval(&self) -> u64 {
        self.sleep_interval.unwrap_or(DEFAULT_FETCH_INTERVAL)
    }

    /// Lay CLI/env values over a config file; CLI wins
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            db_dir: self.db_dir.or(file_config.db_dir),
            latitude: self.latitude.or(file_config.latitude),
            longitude: self.longitude.or(file_config.longitude),
            api_base: self.api_base.or(file_config.api_base),
            user_agent: self.user_agent.or(file_config.user_agent),
            timeout: self.timeout.or(file_config.timeout),
            sleep_interval: self.sleep_interval.or(file_config.sleep_interval),
            once: self.once,
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("WX_DAEMON_CONFIG", "daemon.toml")
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();
    cli_args.merge(file_config)
}

fn parse_level(raw: &str) -> Level {
    match raw.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}
