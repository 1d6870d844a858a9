//! Validation of a single engine requirement

use crate::manifest::EngineRequirement;
use crate::outcome::Outcome;
use crate::probe::ProbeRunner;
use crate::rules::RuleResolver;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Found version reported when a mismatching probe printed nothing
pub const MISSING_VERSION: &str = "missing";

/// Composes rule resolution, probing and comparison for one engine.
/// Every failure path ends in an [`Outcome`], nothing is raised.
#[derive(Clone, Copy)]
pub struct ValidationTask<'a> {
    resolver: &'a RuleResolver,
    probe: &'a dyn ProbeRunner,
}

impl<'a> ValidationTask<'a> {
    pub fn new(resolver: &'a RuleResolver, probe: &'a dyn ProbeRunner) -> Self {
        Self { resolver, probe }
    }

    pub fn evaluate(&self, requirement: &EngineRequirement) -> Outcome {
        let name = requirement.name.clone();
        let expected_version = requirement.expected_version.clone();

        let rule = match self.resolver.resolve(&name) {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                warn!("No validator found for {}", name);
                return Outcome::ValidatorNotFound { name };
            }
            Err(e) => {
                warn!("Failed to resolve validator for {}: {}", name, e);
                return Outcome::ExecutionError {
                    name,
                    expected_version,
                    error: e.to_string(),
                };
            }
        };

        debug!("Probing {} with {} rule `{}`", name, rule.origin, rule.probe_command);
        let output = match self.probe.run(&rule.probe_command) {
            Ok(output) => output,
            Err(e) => {
                warn!("Probe for {} failed: {}", name, e);
                return Outcome::ExecutionError {
                    name,
                    expected_version,
                    error: e.to_string(),
                };
            }
        };

        let validate = rule.validate;
        let passed = panic::catch_unwind(AssertUnwindSafe(|| validate(&output, &expected_version)));

        match passed {
            Ok(true) => {
                debug!("{} satisfies {}", name, expected_version);
                Outcome::Success {
                    name,
                    found_version: expected_version.clone(),
                    expected_version,
                }
            }
            Ok(false) => {
                let found = output.trim();
                debug!("{} reported {:?}, expected {}", name, found, expected_version);
                Outcome::VersionMismatch {
                    name,
                    expected_version,
                    found_version: if found.is_empty() {
                        MISSING_VERSION.to_string()
                    } else {
                        found.to_string()
                    },
                }
            }
            Err(_) => Outcome::ExecutionError {
                name,
                expected_version,
                error: format!(
                    "version comparison panicked on output {:?}",
                    output.trim()
                ),
            },
        }
    }
}
