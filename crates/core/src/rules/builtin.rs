//! Built-in rule table for common runtimes and tools

use super::{RuleOrigin, RuleSource, ValidatorRule, VersionValidate};
use crate::error::Result;
use crate::version;

#[derive(Debug, Clone, Copy)]
pub struct BuiltinRule {
    pub name: &'static str,
    pub probe_command: &'static str,
    pub validate: VersionValidate,
}

const fn rule(name: &'static str, probe_command: &'static str) -> BuiltinRule {
    BuiltinRule {
        name,
        probe_command,
        validate: version::satisfies,
    }
}

// Tools that print their version on stderr are redirected to stdout
pub static BUILTIN_RULES: &[BuiltinRule] = &[
    rule("node", "node -v"),
    rule("npm", "npm -v"),
    rule("yarn", "yarn -v"),
    rule("pnpm", "pnpm -v"),
    rule("bower", "bower -v"),
    rule("cordova", "cordova -v"),
    rule("ionic", "ionic -v"),
    rule("ember", "ember -v"),
    rule("gulp", "gulp -v"),
    rule("git", "git --version"),
    rule("java", "java -version 2>&1"),
    rule("python", "python --version 2>&1"),
    rule("python3", "python3 --version 2>&1"),
    rule("ruby", "ruby -v"),
    rule("go", "go version"),
    rule("rustc", "rustc --version"),
    rule("cargo", "cargo --version"),
    rule("docker", "docker --version"),
    rule("xcodebuild", "xcodebuild -version"),
    rule("cocoapods", "pod --version"),
    rule("carthage", "carthage version"),
    rule("deno", "deno --version"),
    rule("bun", "bun --version"),
];

/// Rule source backed by a static table
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRules {
    table: &'static [BuiltinRule],
}

impl BuiltinRules {
    pub fn new() -> Self {
        Self {
            table: BUILTIN_RULES,
        }
    }

    /// Use a different table, mostly for tests
    pub fn with_table(table: &'static [BuiltinRule]) -> Self {
        Self { table }
    }
}

impl Default for BuiltinRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSource for BuiltinRules {
    fn lookup(&self, engine: &str) -> Result<Option<ValidatorRule>> {
        Ok(self
            .table
            .iter()
            .find(|entry| entry.name == engine)
            .map(|entry| ValidatorRule::new(entry.probe_command, entry.validate, RuleOrigin::Builtin)))
    }

    fn name(&self) -> &str {
        "built-in"
    }
}
