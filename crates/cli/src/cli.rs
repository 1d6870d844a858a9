use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use engine_check_core::CheckConfig;
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{check_command, rules_command};

/// Check that installed tool versions satisfy a project's declared engines
#[derive(Parser, Debug)]
#[command(name = "engine-check")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub check: CheckArgs,

    /// Log resolution and probe details to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check installed versions against the manifest (default)
    #[command(visible_alias = "c")]
    Check(CheckArgs),
    /// List the built-in validator rules
    Rules {
        /// Print the rule table as JSON
        #[arg(long = "json")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Manifest declaring the engines (defaults to package.json)
    #[arg(short = 'p', long = "package")]
    pub package: Option<PathBuf>,

    /// Override rules file (defaults to engines.spec.json)
    #[arg(short = 'o', long = "overrides")]
    pub overrides: Option<PathBuf>,

    /// Directory the default manifest and override files are looked up in
    #[arg(long = "cwd")]
    pub cwd: Option<PathBuf>,

    /// Per-probe timeout in seconds, 0 disables it
    #[arg(long = "timeout-secs", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Run probes one after another instead of concurrently
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Print the report as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            package: None,
            overrides: None,
            cwd: None,
            timeout_secs: 30,
            sequential: false,
            json: false,
            no_color: false,
        }
    }
}

impl CheckArgs {
    pub fn to_config(&self) -> CheckConfig {
        let mut config = match &self.cwd {
            Some(dir) => CheckConfig::rooted_at(dir),
            None => CheckConfig::default(),
        };
        if let Some(package) = &self.package {
            config = config.with_manifest_path(package);
        }
        if let Some(overrides) = &self.overrides {
            config = config.with_override_path(overrides);
        }
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        config
            .with_probe_timeout(timeout)
            .with_parallel(!self.sequential)
    }
}

impl Cli {
    /// Execute the selected command and return the process exit code
    pub fn execute(self) -> Result<i32> {
        match self.command {
            Some(Commands::Check(args)) => check_command(&args),
            Some(Commands::Rules { json }) => rules_command(json),
            None => check_command(&self.check),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_bare_invocation_checks() {
        let cli = Cli::parse_from(["engine-check", "--package", "app/package.json"]);
        assert!(cli.command.is_none());
        assert_eq!(
            cli.check.to_config().manifest_path,
            PathBuf::from("app/package.json")
        );
    }

    #[test]
    fn test_cwd_roots_default_files() {
        let cli = Cli::parse_from(["engine-check", "check", "--cwd", "/work/app"]);
        let Some(Commands::Check(args)) = cli.command else {
            panic!("Expected check subcommand");
        };
        let config = args.to_config();
        assert_eq!(config.manifest_path, Path::new("/work/app/package.json"));
        assert_eq!(config.override_path, Path::new("/work/app/engines.spec.json"));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let cli = Cli::parse_from(["engine-check", "--timeout-secs", "0", "--sequential"]);
        let config = cli.check.to_config();
        assert_eq!(config.probe_timeout, None);
        assert!(!config.parallel);
    }

    #[test]
    fn test_defaults_match_core_config() {
        assert_eq!(CheckArgs::default().to_config(), CheckConfig::default());
    }
}
