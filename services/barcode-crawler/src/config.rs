use url::Url;
use std::{path::PathBuf, time};
use crate::CrawlerError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 30000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 5000;
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const RETRY_MAX_ATTEMPTS: u32 = 5;
pub const RETRY_DELAY: u64 = 10000;

pub const BATCH_PACING: u64 = 1000;

pub const DISCOGS_HOST: &str = "api.discogs.com";
pub const DISCOGS_TOKEN_ENV: &str = "DISCOGS_TOKEN";

/// Wrapper over env::var that treats blank values as unset
fn env_or(s: &str, default: &str) -> String {
    match std::env::var(s) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

///
/// Configuration for the discogs api
///
#[derive(Debug, Clone)]
pub struct DiscogsConfig {
    pub base_url: Url,          // https://api.discogs.com/
    pub token_env: String,      // variable the access token is read from
    pub user_agent: String,     // discogs rejects requests without one
}

fn parse_base_url(raw: &str) -> Result<Url, CrawlerError> {
    let mut base_url = Url::parse(raw)
        .map_err(|e| CrawlerError::Config(
            format!("DISCOGS_BASE_URL invalid {e}")
        ))?;

    ensure_https(&base_url)
        .map_err(CrawlerError::Config)?;
    ensure_host(&base_url, DISCOGS_HOST)
        .map_err(CrawlerError::Config)?;

    // ensure trailing slash
    if !base_url.path().ends_with('/') {
        let mut path = base_url.path().to_string();
        path.push('/');
        base_url.set_path(&path);
    }
    Ok(base_url)
}

fn build_discogs() -> Result<DiscogsConfig, CrawlerError> {
    let base_url = parse_base_url(&env_or("DISCOGS_BASE_URL", "https://api.discogs.com/"))?;

    let application = env_or(
        "APPLICATION",
        concat!("barcode-crawler/", env!("CARGO_PKG_VERSION"))
    );

    Ok( DiscogsConfig {
        base_url,
        token_env: DISCOGS_TOKEN_ENV.to_string(),
        user_agent: application
    })
}

///
/// Configuration for Http timeouts, retries, etc.
///
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: time::Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            delay: time::Duration::from_millis(RETRY_DELAY),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
    pub retry: RetryConfig
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
            retry: RetryConfig::default()
        }
    }
}

///
/// Pacing between barcodes
///
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub pacing: time::Duration
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { pacing: time::Duration::from_millis(BATCH_PACING) }
    }
}

///
/// Where barcodes are read from
///
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
    pub column: String,     // header holding the barcodes
    pub skip_rows: usize    // preamble rows above the header
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cd_barcodes.csv"),
            column: "Code".to_string(),
            skip_rows: 2
        }
    }
}

fn build_input() -> Result<InputConfig, CrawlerError> {
    let defaults = InputConfig::default();

    let skip_rows = match std::env::var("BARCODES_SKIP_ROWS") {
        Ok(s) if !s.trim().is_empty() => s.trim().parse::<usize>()
            .map_err(|e| CrawlerError::Config(
                format!("BARCODES_SKIP_ROWS invalid {e}")
            ))?,
        _ => defaults.skip_rows
    };

    Ok( InputConfig {
        path: PathBuf::from(env_or("BARCODES_CSV", &defaults.path.to_string_lossy())),
        column: env_or("BARCODES_COLUMN", &defaults.column),
        skip_rows
    })
}

///
/// Where the two tables are exported
///
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub albums_file: String,
    pub tracks_file: String
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            albums_file: "albums.csv".to_string(),
            tracks_file: "tracks.csv".to_string()
        }
    }
}

fn build_output() -> OutputConfig {
    let defaults = OutputConfig::default();
    OutputConfig {
        dir: PathBuf::from(env_or("OUTPUT_DIR", &defaults.dir.to_string_lossy())),
        albums_file: env_or("ALBUMS_CSV", &defaults.albums_file),
        tracks_file: env_or("TRACKS_CSV", &defaults.tracks_file)
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<LogFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json"   => Some(LogFormat::Json),
            _ => None
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,barcode_crawler=debug,reqwest=warn".to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: false,
            include_target: true,
        }
    }
}

fn build_logging() -> Result<LoggingConfig, CrawlerError> {
    let mut logging = LoggingConfig::default();
    if let Ok(raw) = std::env::var("LOG_FORMAT") {
        logging.format = LogFormat::parse(&raw).ok_or_else(|| CrawlerError::Config(
            format!("LOG_FORMAT must be pretty or json, got {raw}")
        ))?;
    }
    if logging.format == LogFormat::Json {
        logging.with_ansi = false;
        logging.include_file_line = true;
    }
    Ok(logging)
}

///
/// AppConfig which holds everything main hands to the crawler
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discogs: DiscogsConfig,
    pub http: HttpConfig,
    pub batch: BatchConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, CrawlerError> {
    dotenvy::dotenv().ok();

    let discogs = build_discogs()?;
    let http    = HttpConfig::default();
    let batch   = BatchConfig::default();
    let input   = build_input()?;
    let output  = build_output();
    let logging = build_logging()?;

    Ok( AppConfig { discogs, http, batch, input, output, logging } )
}
