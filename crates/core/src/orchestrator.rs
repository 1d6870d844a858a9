//! Engine check orchestration
//!
//! Loads the manifest, fans out one [`ValidationTask`] per declared engine
//! and folds the outcomes into an [`AggregateReport`].
//!
//! # Failure isolation
//!
//! - Manifest problems short-circuit: no task runs, the report carries the reason
//! - A failing probe or comparator only affects its own engine's outcome
//! - A panicking task is caught and recorded as an execution error
//! - Every task is awaited, there is no cross-task cancellation
//!
//! Outcomes are appended as tasks complete, so in parallel mode their order
//! follows completion. The verdict does not depend on that order.

use crate::config::CheckConfig;
use crate::manifest::{EngineRequirement, Manifest};
use crate::outcome::Outcome;
use crate::probe::{ProbeRunner, ShellProbeRunner};
use crate::report::AggregateReport;
use crate::rules::RuleResolver;
use crate::task::ValidationTask;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Orchestrator {
    config: CheckConfig,
    resolver: RuleResolver,
    probe: Box<dyn ProbeRunner>,
}

impl Orchestrator {
    /// Orchestrator with the default rule chain and a shell probe runner
    pub fn new(config: CheckConfig) -> Self {
        let resolver = RuleResolver::with_defaults(&config.override_path);
        let probe = Box::new(ShellProbeRunner::new(config.probe_timeout));
        Self {
            config,
            resolver,
            probe,
        }
    }

    pub fn with_resolver(mut self, resolver: RuleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_probe_runner(mut self, probe: impl ProbeRunner + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Check every engine declared in the configured manifest
    pub fn run(&self) -> AggregateReport {
        let manifest = match Manifest::load(&self.config.manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Not running any validation: {}", e);
                return AggregateReport::aborted(&e);
            }
        };
        self.run_requirements(&manifest.requirements())
    }

    /// Check an explicit set of requirements
    pub fn run_requirements(&self, requirements: &[EngineRequirement]) -> AggregateReport {
        let start = Instant::now();
        let task = ValidationTask::new(&self.resolver, self.probe.as_ref());

        let outcomes = if self.config.parallel {
            run_parallel(task, requirements)
        } else {
            run_sequential(task, requirements)
        };

        let report = AggregateReport::from_outcomes(outcomes);
        info!(
            "Checked {} engine(s) in {:?}: {}",
            requirements.len(),
            start.elapsed(),
            report.message.text
        );
        report
    }
}

fn run_sequential(task: ValidationTask<'_>, requirements: &[EngineRequirement]) -> Vec<Outcome> {
    requirements
        .iter()
        .map(|requirement| evaluate_isolated(task, requirement))
        .collect()
}

fn run_parallel(task: ValidationTask<'_>, requirements: &[EngineRequirement]) -> Vec<Outcome> {
    let collected = Mutex::new(Vec::with_capacity(requirements.len()));

    thread::scope(|scope| {
        for requirement in requirements {
            let collected = &collected;
            scope.spawn(move || {
                let outcome = evaluate_isolated(task, requirement);
                debug!("Task for {} completed", requirement.name);
                // Tolerate poisoning, each push is a single append
                collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(outcome);
            });
        }
    });

    collected.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn evaluate_isolated(task: ValidationTask<'_>, requirement: &EngineRequirement) -> Outcome {
    panic::catch_unwind(AssertUnwindSafe(|| task.evaluate(requirement))).unwrap_or_else(|_| {
        warn!("Validation task for {} panicked", requirement.name);
        Outcome::ExecutionError {
            name: requirement.name.clone(),
            expected_version: requirement.expected_version.clone(),
            error: "validation task panicked".to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use crate::report::Status;
    use crate::rules::{BuiltinRules, OverrideRules};
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Scripted probe: fixed output or failure per command, optional delay
    #[derive(Default)]
    struct ScriptedProbe {
        outputs: HashMap<String, Result<String, String>>,
        delays: HashMap<String, Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProbe {
        fn prints(mut self, command: &str, output: &str) -> Self {
            self.outputs
                .insert(command.to_string(), Ok(output.to_string()));
            self
        }

        fn fails(mut self, command: &str, stderr: &str) -> Self {
            self.outputs
                .insert(command.to_string(), Err(stderr.to_string()));
            self
        }

        fn delayed(mut self, command: &str, delay: Duration) -> Self {
            self.delays.insert(command.to_string(), delay);
            self
        }
    }

    impl ProbeRunner for ScriptedProbe {
        fn run(&self, command: &str) -> Result<String, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(command) {
                thread::sleep(*delay);
            }
            match self.outputs.get(command) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(stderr)) => Err(ProbeError::NonZeroExit {
                    command: command.to_string(),
                    code: Some(127),
                    stderr: stderr.clone(),
                }),
                None => Err(ProbeError::NonZeroExit {
                    command: command.to_string(),
                    code: Some(127),
                    stderr: format!("sh: 1: {command}: not found"),
                }),
            }
        }
    }

    struct PanickingProbe;

    impl ProbeRunner for PanickingProbe {
        fn run(&self, _command: &str) -> Result<String, ProbeError> {
            panic!("probe runner bug")
        }
    }

    fn isolated_config(dir: &TempDir) -> CheckConfig {
        CheckConfig::rooted_at(dir.path())
    }

    fn orchestrator(dir: &TempDir, probe: ScriptedProbe) -> Orchestrator {
        let config = isolated_config(dir);
        let resolver = RuleResolver::new()
            .with_source(BuiltinRules::new())
            .with_source(OverrideRules::new(&config.override_path));
        Orchestrator::new(config)
            .with_resolver(resolver)
            .with_probe_runner(probe)
    }

    #[test]
    fn test_single_builtin_engine_success() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, ScriptedProbe::default().prints("node -v", "v18.17.0\n"));

        let report = orch.run_requirements(&[EngineRequirement::new("node", "18.17.0")]);
        assert_eq!(report.status, Status::Ok);
        assert_eq!(report.message.text, "Environment looks good!");
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].is_success());
    }

    #[test]
    fn test_node_and_unknown_engine_scenario() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, ScriptedProbe::default().prints("node -v", "v20.11.1"));

        let report = orch.run_requirements(&[
            EngineRequirement::new("node", ">=18"),
            EngineRequirement::new("npmFake", "1.0"),
        ]);

        assert_eq!(report.status, Status::Error);
        assert_eq!(report.message.text, "Environment is invalid!");
        assert_eq!(
            report.sorted_outcomes(),
            vec![
                Outcome::Success {
                    name: "node".to_string(),
                    expected_version: ">=18".to_string(),
                    found_version: ">=18".to_string(),
                },
                Outcome::ValidatorNotFound {
                    name: "npmFake".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_failing_probe_does_not_affect_siblings() {
        let dir = TempDir::new().unwrap();
        let probe = ScriptedProbe::default()
            .prints("node -v", "v18.0.0")
            .fails("yarn -v", "sh: 1: yarn: not found")
            .prints("git --version", "git version 2.43.0");
        let orch = orchestrator(&dir, probe);

        let report = orch.run_requirements(&[
            EngineRequirement::new("node", ">=18"),
            EngineRequirement::new("yarn", "^1.22.0"),
            EngineRequirement::new("git", ">=2.30"),
        ]);

        assert_eq!(report.status, Status::Error);
        let outcomes = report.sorted_outcomes();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success(), "git: {:?}", outcomes[0]);
        assert!(outcomes[1].is_success(), "node: {:?}", outcomes[1]);
        match &outcomes[2] {
            Outcome::ExecutionError { name, error, .. } => {
                assert_eq!(name, "yarn");
                assert!(error.contains("yarn: not found"));
            }
            other => panic!("Expected ExecutionError, got {other:?}"),
        }
    }

    #[test]
    fn test_verdict_is_independent_of_completion_order() {
        let requirements = vec![
            EngineRequirement::new("node", ">=18"),
            EngineRequirement::new("npm", "^10.0.0"),
            EngineRequirement::new("git", ">=2"),
        ];
        let delays = [
            [5u64, 40, 80],
            [80, 40, 5],
            [40, 5, 80],
        ];

        let mut verdicts = Vec::new();
        let mut outcome_sets = Vec::new();
        for order in delays {
            let dir = TempDir::new().unwrap();
            let probe = ScriptedProbe::default()
                .prints("node -v", "v18.19.0")
                .prints("npm -v", "9.8.1")
                .prints("git --version", "git version 2.40.1")
                .delayed("node -v", Duration::from_millis(order[0]))
                .delayed("npm -v", Duration::from_millis(order[1]))
                .delayed("git --version", Duration::from_millis(order[2]));
            let report = orchestrator(&dir, probe).run_requirements(&requirements);
            verdicts.push(report.status);
            outcome_sets.push(report.sorted_outcomes());
        }

        assert!(verdicts.iter().all(|status| *status == Status::Error));
        assert!(outcome_sets.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_each_engine_produces_exactly_one_outcome() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(&dir, ScriptedProbe::default());
        let requirements: Vec<_> = (0..16)
            .map(|i| EngineRequirement::new(format!("tool{i}"), "1.0.0"))
            .collect();

        let report = orch.run_requirements(&requirements);
        let mut names: Vec<_> = report.outcomes.iter().map(|o| o.name().to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);
        assert_eq!(report.outcomes.len(), 16);
    }

    #[test]
    fn test_sequential_mode_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let config = isolated_config(&dir).with_parallel(false);
        let orch = Orchestrator::new(config)
            .with_resolver(RuleResolver::new().with_source(BuiltinRules::new()))
            .with_probe_runner(ScriptedProbe::default().prints("npm -v", "10.2.4"));

        let report = orch.run_requirements(&[
            EngineRequirement::new("npm", "^10"),
            EngineRequirement::new("zzz", "1"),
            EngineRequirement::new("aaa", "1"),
        ]);
        let names: Vec<_> = report.outcomes.iter().map(Outcome::name).collect();
        assert_eq!(names, vec!["npm", "zzz", "aaa"]);
    }

    #[test]
    fn test_sequential_run_follows_manifest_declaration_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "engines": { "zzz": "1", "npm": "^10", "aaa": "1" } }"#,
        )
        .unwrap();
        let orch = Orchestrator::new(isolated_config(&dir).with_parallel(false))
            .with_resolver(RuleResolver::new().with_source(BuiltinRules::new()))
            .with_probe_runner(ScriptedProbe::default().prints("npm -v", "10.2.4"));

        let report = orch.run();
        let names: Vec<_> = report.outcomes.iter().map(Outcome::name).collect();
        assert_eq!(names, vec!["zzz", "npm", "aaa"]);
    }

    #[test]
    fn test_panicking_probe_is_contained() {
        let dir = TempDir::new().unwrap();
        let orch = Orchestrator::new(isolated_config(&dir))
            .with_resolver(RuleResolver::new().with_source(BuiltinRules::new()))
            .with_probe_runner(PanickingProbe);

        let report = orch.run_requirements(&[
            EngineRequirement::new("node", ">=18"),
            EngineRequirement::new("npmFake", "1.0"),
        ]);

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            Outcome::ExecutionError { name, .. } if name == "node"
        )));
    }

    #[test]
    fn test_missing_manifest_runs_no_tasks() {
        let dir = TempDir::new().unwrap();
        let probe = ScriptedProbe::default();
        let calls = Arc::clone(&probe.calls);
        let orch = Orchestrator::new(isolated_config(&dir)).with_probe_runner(probe);

        let report = orch.run();
        assert_eq!(report.status, Status::Error);
        assert!(report.outcomes.is_empty());
        assert!(report.message.text.contains("not found"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_manifest_without_engines_runs_no_tasks() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();

        let report = Orchestrator::new(isolated_config(&dir))
            .with_probe_runner(ScriptedProbe::default())
            .run();
        assert_eq!(report.status, Status::Error);
        assert!(report.outcomes.is_empty());
        assert!(report.message.text.contains("No engines found"));
    }

    #[test]
    fn test_run_reads_manifest_and_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "engines": { "node": ">=18", "terraform": "~1.6.0" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("engines.spec.json"),
            r#"[{ "package": "terraform", "versionCheck": "terraform -version" }]"#,
        )
        .unwrap();

        let probe = ScriptedProbe::default()
            .prints("node -v", "v18.17.0")
            .prints("terraform -version", "Terraform v1.6.2\non linux_amd64");
        let report = orchestrator(&dir, probe).run();

        assert_eq!(report.status, Status::Ok, "{:?}", report.outcomes);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn test_repeated_runs_are_structurally_identical() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "engines": { "node": ">=18", "npmFake": "1.0", "yarn": "1.x" } }"#,
        )
        .unwrap();
        let probe = ScriptedProbe::default()
            .prints("node -v", "v18.17.0")
            .prints("yarn -v", "2.4.3");
        let orch = orchestrator(&dir, probe);

        let first = orch.run();
        let second = orch.run();
        assert_eq!(first.status, second.status);
        assert_eq!(first.message, second.message);
        assert_eq!(first.sorted_outcomes(), second.sorted_outcomes());
    }
}
