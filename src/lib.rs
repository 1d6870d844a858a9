//! Shared fixtures for the workspace-level scenario tests

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A throwaway project directory holding a manifest and an optional override file
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("package.json")
    }

    pub fn override_path(&self) -> PathBuf {
        self.path().join("engines.spec.json")
    }

    /// Write a package.json declaring the given engines
    pub fn with_engines(self, engines: &[(&str, &str)]) -> io::Result<Self> {
        let engines: serde_json::Map<String, Value> = engines
            .iter()
            .map(|(name, range)| (name.to_string(), Value::String(range.to_string())))
            .collect();
        self.with_manifest(&json!({ "name": "fixture", "engines": engines }))
    }

    pub fn with_manifest(self, manifest: &Value) -> io::Result<Self> {
        fs::write(self.manifest_path(), manifest.to_string())?;
        Ok(self)
    }

    /// Write an engines.spec.json mapping each package to its probe command
    pub fn with_overrides(self, overrides: &[(&str, &str)]) -> io::Result<Self> {
        let records: Vec<Value> = overrides
            .iter()
            .map(|(package, command)| json!({ "package": package, "versionCheck": command }))
            .collect();
        fs::write(self.override_path(), Value::Array(records).to_string())?;
        Ok(self)
    }

    pub fn with_raw_overrides(self, contents: &str) -> io::Result<Self> {
        fs::write(self.override_path(), contents)?;
        Ok(self)
    }
}
