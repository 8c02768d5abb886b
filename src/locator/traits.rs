//! Filesystem seam for process discovery.
//!
//! `ProcessLocator` reads `/proc` through this trait so discovery can be tested
//! against an in-memory tree on any platform.

use std::io;
use std::path::{Path, PathBuf};

/// Read-only filesystem access needed to enumerate processes.
pub trait FileSystem {
    /// Reads the whole file as raw bytes (`/proc/[pid]/cmdline` is NUL-separated).
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}
