use crate::signals::SignalSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{signal} source unavailable: {reason}")]
    SourceUnavailable {
        signal: SignalSource,
        reason: String,
    },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}
