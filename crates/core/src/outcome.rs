//! Per-engine validation outcomes

use serde::Serialize;
use std::fmt;

/// Display severity of an outcome or report message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Result of validating a single engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outcome {
    /// Installed version satisfies the constraint. `found_version` echoes
    /// the expected constraint rather than the probed text.
    Success {
        name: String,
        expected_version: String,
        found_version: String,
    },
    /// Probe ran but its version does not satisfy the constraint
    VersionMismatch {
        name: String,
        expected_version: String,
        found_version: String,
    },
    /// No rule knows how to probe this engine
    ValidatorNotFound { name: String },
    /// Probe could not be run to completion
    ExecutionError {
        name: String,
        expected_version: String,
        error: String,
    },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Outcome::Success { name, .. }
            | Outcome::VersionMismatch { name, .. }
            | Outcome::ValidatorNotFound { name }
            | Outcome::ExecutionError { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// A missing validator is shown as a warning even though it still
    /// fails the overall verdict
    pub fn severity(&self) -> Severity {
        match self {
            Outcome::Success { .. } => Severity::Success,
            Outcome::ValidatorNotFound { .. } => Severity::Warn,
            Outcome::VersionMismatch { .. } | Outcome::ExecutionError { .. } => Severity::Error,
        }
    }

    /// Flattened record for tabular display
    pub fn detail(&self) -> PackageDetail {
        let mut detail = PackageDetail {
            name: self.name().to_string(),
            validator_found: !matches!(self, Outcome::ValidatorNotFound { .. }),
            expected_version: None,
            found_version: None,
            command_error: None,
            severity: self.severity(),
        };
        match self {
            Outcome::Success {
                expected_version,
                found_version,
                ..
            }
            | Outcome::VersionMismatch {
                expected_version,
                found_version,
                ..
            } => {
                detail.expected_version = Some(expected_version.clone());
                detail.found_version = Some(found_version.clone());
            }
            Outcome::ExecutionError {
                expected_version,
                error,
                ..
            } => {
                detail.expected_version = Some(expected_version.clone());
                detail.command_error = Some(error.clone());
            }
            Outcome::ValidatorNotFound { .. } => {}
        }
        detail
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success {
                name,
                expected_version,
                found_version,
            } => write!(f, "✔ {name}: expected {expected_version}, found {found_version}"),
            Outcome::VersionMismatch {
                name,
                expected_version,
                found_version,
            } => write!(f, "✘ {name}: expected {expected_version}, found {found_version}"),
            Outcome::ValidatorNotFound { name } => {
                write!(f, "⚠ {name}: no validator found")
            }
            Outcome::ExecutionError {
                name,
                expected_version,
                error,
            } => write!(f, "✘ {name}: expected {expected_version}, command failed: {error}"),
        }
    }
}

/// Per-engine record suitable for tabular or colorized display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetail {
    pub name: String,
    pub validator_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_error: Option<String>,
    #[serde(rename = "type")]
    pub severity: Severity,
}
