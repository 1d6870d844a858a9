//! Run configuration for an engine check
//!
//! Every file location the engine reads is carried here explicitly, so a
//! check never depends on the process working directory by itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MANIFEST_FILE: &str = "package.json";
pub const DEFAULT_OVERRIDE_FILE: &str = "engines.spec.json";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Manifest declaring the `engines` map
    pub manifest_path: PathBuf,
    /// Optional project-local override rules
    pub override_path: PathBuf,
    /// Per-probe timeout, `None` lets a probe run until it exits
    pub probe_timeout: Option<Duration>,
    /// Run validation tasks on separate threads
    pub parallel: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_FILE),
            override_path: PathBuf::from(DEFAULT_OVERRIDE_FILE),
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
            parallel: true,
        }
    }
}

impl CheckConfig {
    /// Default file names resolved against `dir`
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            manifest_path: dir.join(DEFAULT_MANIFEST_FILE),
            override_path: dir.join(DEFAULT_OVERRIDE_FILE),
            ..Default::default()
        }
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = path.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
