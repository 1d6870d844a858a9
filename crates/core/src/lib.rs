//! engine-check - Validate installed tool versions against a project's declared engines
//!
//! This crate provides functionality to:
//! - Read the `engines` map from a project manifest
//! - Resolve a version probe for each engine from a built-in table or a project override file
//! - Run every probe concurrently and fold the outcomes into a single verdict
pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod outcome;
pub mod probe;
pub mod report;
pub mod rules;
pub mod task;
pub mod version;

// Re-export commonly used types
pub use config::CheckConfig;
pub use error::{Error, Result};
pub use manifest::{EngineRequirement, Manifest};
pub use orchestrator::Orchestrator;
pub use outcome::{Outcome, PackageDetail, Severity};
pub use probe::{ProbeError, ProbeRunner, ShellProbeRunner};
pub use report::{AggregateReport, Message, Status};
pub use rules::{RuleResolver, RuleSource, ValidatorRule};
pub use task::ValidationTask;

/// Check the engines declared by the manifest described in `config`
pub fn check(config: CheckConfig) -> AggregateReport {
    Orchestrator::new(config).run()
}
