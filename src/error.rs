//! Error type shared by the resolver, collector, transport and CLI front-ends.

use thiserror::Error;

/// Errors raised while locating, connecting to, or sampling a target process.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Caller supplied an unusable argument (empty bean, empty selector, bad CLI value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No running process matched the requested name.
    #[error("target process not found: {0}")]
    TargetNotFound(String),

    /// The bean identifier is malformed or not registered on the target.
    #[error("bean not found: {0}")]
    NotFound(String),

    /// Opening, closing or talking over the management channel failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Beans file could not be read or contains a malformed line.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::Connection(format!("request timed out: {}", err))
        } else {
            MonitorError::Connection(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
