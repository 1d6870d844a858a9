//! Aggregate report and verdict

use crate::error::Error;
use crate::outcome::{Outcome, Severity};
use serde::Serialize;

pub const VALID_MESSAGE: &str = "Environment looks good!";
pub const INVALID_MESSAGE: &str = "Environment is invalid!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Top-line, human-readable result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub status: Status,
    pub message: Message,
    pub outcomes: Vec<Outcome>,
}

/// The environment is valid only if every engine validated successfully.
/// Missing validators count against the verdict.
pub fn environment_is_valid(outcomes: &[Outcome]) -> bool {
    outcomes.iter().all(Outcome::is_success)
}

impl AggregateReport {
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        let (status, message) = if environment_is_valid(&outcomes) {
            (
                Status::Ok,
                Message {
                    text: VALID_MESSAGE.to_string(),
                    severity: Severity::Success,
                },
            )
        } else {
            (
                Status::Error,
                Message {
                    text: INVALID_MESSAGE.to_string(),
                    severity: Severity::Error,
                },
            )
        };
        Self {
            status,
            message,
            outcomes,
        }
    }

    /// Report for a run that stopped before any engine was validated
    pub fn aborted(error: &Error) -> Self {
        let text = match error {
            Error::ManifestMissing { path } => format!(
                "✘ '{}' not found in the current directory so I can't validate what you need!",
                path.display()
            ),
            Error::NoEnginesDeclared { path } => format!(
                "✘ No engines found in {} so I can't validate what you need!",
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            Error::ManifestInvalid { path, .. } => format!(
                "✘ '{}' could not be parsed so I can't validate what you need!",
                path.display()
            ),
            other => format!("✘ {other}"),
        };
        Self {
            status: Status::Error,
            message: Message {
                text,
                severity: Severity::Error,
            },
            outcomes: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Process exit code for this report
    pub fn exit_code(&self) -> i32 {
        match self.status {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }

    /// Outcomes sorted by engine name, for order-insensitive comparison
    pub fn sorted_outcomes(&self) -> Vec<Outcome> {
        let mut outcomes = self.outcomes.clone();
        outcomes.sort_by(|a, b| a.name().cmp(b.name()));
        outcomes
    }
}
