//! Project-local override rules (`engines.spec.json`)
//!
//! The file is a JSON array of `{ "package": ..., "versionCheck": ... }`
//! records. It is read on every lookup, so edits made while a check runs
//! are picked up by later lookups.

use super::{RuleOrigin, RuleSource, ValidatorRule, VersionValidate};
use crate::error::{Error, Result};
use crate::version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub package: String,
    pub version_check: String,
}

/// Rule source backed by an optional override file
#[derive(Debug, Clone)]
pub struct OverrideRules {
    path: PathBuf,
    validate: VersionValidate,
}

impl OverrideRules {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validate: version::satisfies,
        }
    }

    /// All records in file order, empty when the file does not exist
    pub fn load(&self) -> Result<Vec<OverrideRecord>> {
        if !self.path.is_file() {
            tracing::debug!("No override file at {:?}", self.path);
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| Error::OverrideInvalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl RuleSource for OverrideRules {
    fn lookup(&self, engine: &str) -> Result<Option<ValidatorRule>> {
        let found = self
            .load()?
            .into_iter()
            .find(|record| record.package == engine)
            .map(|record| ValidatorRule::new(record.version_check, self.validate, RuleOrigin::Override));
        Ok(found)
    }

    fn name(&self) -> &str {
        "override"
    }
}
