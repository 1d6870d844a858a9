//! Reading the `engines` map out of a project manifest

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One declared engine and the version constraint it must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequirement {
    pub name: String,
    pub expected_version: String,
}

impl EngineRequirement {
    pub fn new(name: impl Into<String>, expected_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_version: expected_version.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    engines: Option<IndexMap<String, String>>,
}

/// A loaded manifest with its declared engines, in declaration order
#[derive(Debug, Clone)]
pub struct Manifest {
    pub engines: IndexMap<String, String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestMissing {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let manifest: PackageManifest =
            serde_json::from_str(&contents).map_err(|e| Error::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let engines = manifest.engines.ok_or_else(|| Error::NoEnginesDeclared {
            path: path.to_path_buf(),
        })?;

        tracing::debug!("Loaded {} engine(s) from {:?}", engines.len(), path);
        Ok(Self { engines })
    }

    pub fn requirements(&self) -> Vec<EngineRequirement> {
        self.engines
            .iter()
            .map(|(name, version)| EngineRequirement::new(name, version))
            .collect()
    }
}
