//! Discovery of the target process by command-line substring.

pub mod mock;
mod traits;

pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MonitorError, Result};

/// A running process that could be monitored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pid: u32,
    /// Command line with arguments joined by single spaces.
    pub descriptor: String,
}

/// Finds processes under a proc root.
pub struct ProcessLocator<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    own_pid: u32,
    self_marker: Option<String>,
}

impl<F: FileSystem> ProcessLocator<F> {
    /// Creates a locator.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            own_pid: std::process::id(),
            self_marker: None,
        }
    }

    /// Overrides the pid treated as "ourselves".
    pub fn with_own_pid(mut self, pid: u32) -> Self {
        self.own_pid = pid;
        self
    }

    /// Skips any process whose command line contains `marker`
    /// (the monitor's own name, so it never matches itself).
    pub fn with_self_marker(mut self, marker: impl Into<String>) -> Self {
        self.self_marker = Some(marker.into());
        self
    }

    /// Lists every process with a non-empty command line, ordered by pid.
    ///
    /// Processes that vanish while scanning are skipped.
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        let entries = self.fs.read_dir(&self.proc_path)?;

        let mut candidates = Vec::new();
        for entry in entries {
            let Some(pid) = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            match self.fs.read(&entry.join("cmdline")) {
                Ok(raw) => {
                    let descriptor = parse_cmdline(&raw);
                    if !descriptor.is_empty() {
                        candidates.push(Candidate { pid, descriptor });
                    }
                }
                Err(e) => debug!("Skipping pid {}: {}", pid, e),
            }
        }

        candidates.sort_by_key(|c| c.pid);
        Ok(candidates)
    }

    /// Returns the lowest-pid process whose command line contains `matcher`.
    pub fn locate(&self, matcher: &str) -> Result<Candidate> {
        if matcher.is_empty() {
            return Err(MonitorError::InvalidArgument(
                "process matcher must not be empty".to_string(),
            ));
        }

        let found = self
            .candidates()?
            .into_iter()
            .filter(|c| c.pid != self.own_pid)
            .filter(|c| {
                self.self_marker
                    .as_deref()
                    .is_none_or(|m| !c.descriptor.contains(m))
            })
            .find(|c| c.descriptor.contains(matcher));

        match found {
            Some(candidate) => {
                info!(
                    "Found process \"{}\" with pid {}",
                    candidate.descriptor, candidate.pid
                );
                Ok(candidate)
            }
            None => Err(MonitorError::TargetNotFound(format!(
                "no process matches {:?} under {}",
                matcher,
                self.proc_path.display()
            ))),
        }
    }

    pub fn proc_path(&self) -> &Path {
        &self.proc_path
    }
}

/// Turns a NUL-separated `/proc/[pid]/cmdline` into a space-separated string.
fn parse_cmdline(raw: &[u8]) -> String {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> ProcessLocator<MockFs> {
        ProcessLocator::new(MockFs::jvm_host(), "/proc").with_own_pid(99999)
    }

    #[test]
    fn test_candidates_sorted_and_skip_empty() {
        let pids: Vec<u32> = locator()
            .candidates()
            .unwrap()
            .iter()
            .map(|c| c.pid)
            .collect();
        // pid 2 is a kernel thread with an empty cmdline
        assert_eq!(pids, vec![1, 1200, 1300, 2000]);
    }

    #[test]
    fn test_locate_by_substring() {
        let found = locator().locate("kafka.Kafka").unwrap();
        assert_eq!(found.pid, 1200);
        assert!(found.descriptor.ends_with("kafka.Kafka /opt/kafka/config/server.properties"));

        let found = locator().locate("QuorumPeerMain").unwrap();
        assert_eq!(found.pid, 1300);
    }

    #[test]
    fn test_locate_first_match_wins() {
        // Both JVMs contain "java"; lowest pid is returned.
        assert_eq!(locator().locate("java").unwrap().pid, 1200);
    }

    #[test]
    fn test_locate_skips_own_pid() {
        let found = ProcessLocator::new(MockFs::jvm_host(), "/proc")
            .with_own_pid(1200)
            .locate("java")
            .unwrap();
        assert_eq!(found.pid, 1300);
    }

    #[test]
    fn test_locate_skips_self_marker() {
        let mut fs = MockFs::jvm_host();
        fs.add_process(500, &["/usr/local/bin/jmxpoll", "kafka.Kafka"]);

        let found = ProcessLocator::new(fs, "/proc")
            .with_own_pid(99999)
            .with_self_marker("jmxpoll")
            .locate("kafka.Kafka")
            .unwrap();
        assert_eq!(found.pid, 1200);
    }

    #[test]
    fn test_locate_not_found() {
        let result = locator().locate("org.elasticsearch.bootstrap.Elasticsearch");
        assert!(matches!(result, Err(MonitorError::TargetNotFound(_))));
    }

    #[test]
    fn test_missing_proc_root_is_io_error() {
        let result = ProcessLocator::new(MockFs::new(), "/proc").locate("java");
        assert!(matches!(result, Err(MonitorError::Io(_))));
    }

    #[test]
    fn test_parse_cmdline() {
        assert_eq!(parse_cmdline(b"java\0-cp\0a.jar\0Main\0"), "java -cp a.jar Main");
        assert_eq!(parse_cmdline(b""), "");
    }
}
