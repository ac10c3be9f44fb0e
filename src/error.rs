use std::path::PathBuf;
use thiserror::Error;
use time::Date;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no source provided: pass a history file or loaded data")]
    NoSource,
    #[error("history file {} not found", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a streaming history export: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: Date, end: Date },
    #[error("timestamp {0:?} does not start with a YYYY-MM-DD date")]
    InvalidTimestamp(String),
    #[error("invalid date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("history is empty")]
    EmptyHistory,
}
