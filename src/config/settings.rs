//! Runtime settings of the continuous monitor.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MonitorError, Result};

pub const DEFAULT_BEANS_FILE: &str = "./beans";
pub const DEFAULT_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8778/jolokia";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Everything the monitor needs before the first tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Substring matched against candidate process command lines.
    pub matcher: String,
    pub beans_file: PathBuf,
    pub interval: Duration,
    /// Jolokia agent base URL.
    pub endpoint: String,
    /// Per-request timeout on the management channel.
    pub timeout: Duration,
    pub proc_path: PathBuf,
}

impl MonitorSettings {
    /// Settings with defaults for everything but the matcher.
    pub fn new(matcher: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            beans_file: PathBuf::from(DEFAULT_BEANS_FILE),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
        }
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(MonitorError::InvalidArgument(
                "interval must be at least 1 second".to_string(),
            ));
        }
        self.interval = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(MonitorError::InvalidArgument(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_beans_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.beans_file = path.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_proc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_path = path.into();
        self
    }

    /// Checks the invariants the monitor relies on.
    pub fn validate(&self) -> Result<()> {
        if self.matcher.trim().is_empty() {
            return Err(MonitorError::InvalidArgument(
                "process matcher must not be empty".to_string(),
            ));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(MonitorError::InvalidArgument(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}
