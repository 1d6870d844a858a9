//! Validator rules and the sources they are resolved from

pub mod builtin;
pub mod override_file;
pub mod resolver;

use crate::error::Result;
use serde::Serialize;
use std::fmt;

pub use builtin::{BUILTIN_RULES, BuiltinRule, BuiltinRules};
pub use override_file::{OverrideRecord, OverrideRules};
pub use resolver::RuleResolver;

/// Decides whether a probe's output satisfies an expected version constraint
pub type VersionValidate = fn(probe_output: &str, expected_version: &str) -> bool;

/// Where a resolved rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrigin {
    Builtin,
    Override,
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOrigin::Builtin => write!(f, "built-in"),
            RuleOrigin::Override => write!(f, "override"),
        }
    }
}

/// How to discover an engine's installed version and judge it
#[derive(Debug, Clone)]
pub struct ValidatorRule {
    pub probe_command: String,
    pub validate: VersionValidate,
    pub origin: RuleOrigin,
}

impl ValidatorRule {
    pub fn new(probe_command: impl Into<String>, validate: VersionValidate, origin: RuleOrigin) -> Self {
        Self {
            probe_command: probe_command.into(),
            validate,
            origin,
        }
    }
}

/// One link in the resolution chain
pub trait RuleSource: Send + Sync {
    /// Look up the rule for `engine`, `Ok(None)` when this source has none
    fn lookup(&self, engine: &str) -> Result<Option<ValidatorRule>>;

    /// Get the name of this source
    fn name(&self) -> &str;
}
