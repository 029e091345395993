//!
//! src/errors.rs  Andrew Belles  Oct 16th, 2026
//!
//! Defines enums and methods of error conversion
//! for errors the crawler uses
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{what}: gave up after {attempts} attempts ({last})")]
    Exhausted { what: String, attempts: u32, last: String },
    #[error("csv error: {0}")]
    Csv(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl CrawlerError {
    /// Failures worth another attempt: transport, status and decode errors
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CrawlerError::Http(_) | CrawlerError::Status(_) | CrawlerError::Parse(_)
        )
    }
}

// reqwest puts the full url (token included) into its messages
impl From<reqwest::Error> for CrawlerError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => CrawlerError::Status(status.as_u16()),
            None => CrawlerError::Http(e.without_url().to_string()),
        }
    }
}

impl From<serde_json::Error> for CrawlerError {
    fn from(e: serde_json::Error) -> Self { CrawlerError::Parse(e.to_string()) }
}

impl From<csv::Error> for CrawlerError {
    fn from(e: csv::Error) -> Self { CrawlerError::Csv(e.to_string()) }
}
