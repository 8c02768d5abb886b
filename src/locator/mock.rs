//! In-memory `/proc` tree for testing process discovery.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::traits::FileSystem;

/// In-memory filesystem holding files and directories.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file; parent directories are created implicitly.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds `/proc/<pid>/cmdline` built from `args` (NUL-terminated, as the kernel writes it).
    pub fn add_process(&mut self, pid: u32, args: &[&str]) {
        let mut cmdline = Vec::new();
        for arg in args {
            cmdline.extend_from_slice(arg.as_bytes());
            cmdline.push(0);
        }
        self.add_file(format!("/proc/{}/cmdline", pid), cmdline);
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// A host running two JVMs, a kernel thread and an unrelated shell.
    pub fn jvm_host() -> Self {
        let mut fs = Self::new();
        fs.add_process(1, &["/sbin/init", "splash"]);
        // Kernel threads have an empty cmdline.
        fs.add_file("/proc/2/cmdline", "");
        fs.add_process(
            1200,
            &[
                "/usr/lib/jvm/java-17/bin/java",
                "-Xmx1G",
                "-javaagent:/opt/jolokia/jolokia-agent.jar=port=8778",
                "-cp",
                "/opt/kafka/libs/*",
                "kafka.Kafka",
                "/opt/kafka/config/server.properties",
            ],
        );
        fs.add_process(
            1300,
            &[
                "java",
                "-cp",
                "/opt/zookeeper/lib/*",
                "org.apache.zookeeper.server.quorum.QuorumPeerMain",
                "/opt/zookeeper/conf/zoo.cfg",
            ],
        );
        fs.add_process(2000, &["-bash"]);
        fs.add_file("/proc/meminfo", "MemTotal: 16384000 kB\n");
        fs
    }
}

impl FileSystem for MockFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let children = self
            .files
            .keys()
            .chain(self.directories.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect::<BTreeSet<_>>();
        Ok(children.into_iter().collect())
    }
}
