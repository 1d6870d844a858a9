//! Rule resolution chain
//!
//! Sources are consulted in order and the first one that knows the engine
//! wins. The default chain is built-in table, then override file.

use super::{BuiltinRules, OverrideRules, RuleSource, ValidatorRule};
use crate::error::Result;
use std::path::Path;

pub struct RuleResolver {
    sources: Vec<Box<dyn RuleSource>>,
}

impl RuleResolver {
    /// Empty chain, nothing resolves
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Built-in table first, then the override file at `override_path`
    pub fn with_defaults(override_path: &Path) -> Self {
        Self::new()
            .with_source(BuiltinRules::new())
            .with_source(OverrideRules::new(override_path))
    }

    /// Append a source at the lowest priority
    pub fn with_source(mut self, source: impl RuleSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// `Ok(None)` when no source has a rule for `engine`
    pub fn resolve(&self, engine: &str) -> Result<Option<ValidatorRule>> {
        for source in &self.sources {
            if let Some(rule) = source.lookup(engine)? {
                tracing::debug!(
                    "Resolved {} via {} rule: {}",
                    engine,
                    source.name(),
                    rule.probe_command
                );
                return Ok(Some(rule));
            }
            tracing::debug!("No {} rule for {}", source.name(), engine);
        }
        Ok(None)
    }
}

impl Default for RuleResolver {
    fn default() -> Self {
        Self::new()
    }
}
