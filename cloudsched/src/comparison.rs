/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! One-shot PBFS vs EG-SJF comparison.
//!
//! [`ComparisonRunner::run`] builds a single [`Workload`] and lends it to both
//! strategies, so deadlines are drawn exactly once per comparison.  Reads
//! from an unreachable store fall back to in-memory defaults; a store with
//! malformed records fails the run.  Store writes are logged and never abort
//! the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{analyze, AnalysisError, RunAnalysis};
use crate::config::ComparisonConfig;
use crate::deadline::{DeadlineAssigner, WorkloadError};
use crate::execution::{ExecutionEngine, ExecutionError};
use crate::job::{Job, JobId, VirtualMachine};
use crate::placement::{Placement, PlacementError, Placer, Strategy};
use crate::report::ComparisonReport;
use crate::store::{JobStore, RunRecord, StoreError};
use crate::workload::{synthetic_jobs, Workload};

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{strategy} execution failed: {source}")]
    Execution {
        strategy: Strategy,
        #[source]
        source: ExecutionError,
    },

    #[error("{strategy} analysis failed: {source}")]
    Analysis {
        strategy: Strategy,
        #[source]
        source: AnalysisError,
    },
}

/// Everything one strategy run produced.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub placement: Placement,
    pub analysis: RunAnalysis,
}

/// Result of a full comparison.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub workload: Workload,
    pub virtual_machines: Vec<VirtualMachine>,
    pub baseline: StrategyRun,
    pub candidate: StrategyRun,
    pub report: ComparisonReport,
}

pub struct ComparisonRunner<E: ExecutionEngine> {
    config: ComparisonConfig,
    engine: E,
}

impl<E: ExecutionEngine> ComparisonRunner<E> {
    pub fn new(config: ComparisonConfig, engine: E) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Run PBFS (baseline) then EG-SJF (candidate) over one workload.
    ///
    /// # Errors
    /// Fails on malformed store records, an invalid fallback rate, duplicate
    /// job ids, an invalid VM inventory, a non-positive job length, or an
    /// engine/analyzer rejection.
    pub fn run(&self, store: &mut dyn JobStore) -> Result<ComparisonOutcome, ComparisonError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(seed = ?self.config.seed, "=== Comparison started ===");

        // ── Inputs ────────────────────────────────────────────────────────────
        let jobs = match store.load_jobs() {
            Ok(jobs) if !jobs.is_empty() => jobs,
            Ok(_) => {
                info!(
                    count = self.config.synthetic_jobs,
                    "store has no jobs, generating synthetic workload"
                );
                synthetic_jobs(self.config.synthetic_jobs, &mut rng)
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "failed to load jobs, generating synthetic workload");
                synthetic_jobs(self.config.synthetic_jobs, &mut rng)
            }
            Err(e) => return Err(e.into()),
        };

        let vms = match store.load_virtual_machines() {
            Ok(vms) if !vms.is_empty() => vms,
            Ok(_) => {
                info!("store has no virtual machines, using configured inventory");
                self.config.virtual_machines.clone()
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "failed to load virtual machines, using configured inventory");
                self.config.virtual_machines.clone()
            }
            Err(e) => return Err(e.into()),
        };

        let persisted = match store.load_deadlines() {
            Ok(deadlines) => deadlines,
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "failed to load deadlines, all missing deadlines will be synthetic");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        // ── Single workload snapshot ──────────────────────────────────────────
        let own_deadlines: HashSet<JobId> = jobs
            .iter()
            .filter(|j| j.deadline.is_some_and(f64::is_finite))
            .map(|j| j.id)
            .collect();

        let mut assigner = DeadlineAssigner::new(self.config.fallback_rate, &mut rng)?;
        let (workload, sources) = assigner.assign_with_sources(jobs, &persisted)?;
        info!(
            jobs = workload.len(),
            from_job = sources.from_job,
            persisted = sources.persisted,
            synthetic = sources.synthetic,
            "workload snapshot built"
        );

        let placer = Placer::new(vms)?;

        // ── Strategy runs ─────────────────────────────────────────────────────
        let baseline = self.run_strategy(Strategy::Pbfs, &placer, &workload, store)?;
        let candidate = self.run_strategy(Strategy::EgSjf, &placer, &workload, store)?;

        // Only a comparison that ran persists the deadlines it drew.
        let generated = generated_deadlines(&workload, &own_deadlines, &persisted);
        if !generated.is_empty() {
            if let Err(e) = store.save_deadlines(&generated) {
                warn!(error = %e, count = generated.len(), "failed to persist synthetic deadlines");
            }
        }

        let report = ComparisonReport::new(&baseline.analysis.result, &candidate.analysis.result);
        info!(
            makespan_improvement = report.improvement.makespan,
            flow_time_improvement = report.improvement.flow_time,
            tardiness_improvement = report.improvement.tardiness,
            "=== Comparison complete ==="
        );

        Ok(ComparisonOutcome {
            workload,
            virtual_machines: placer.virtual_machines().to_vec(),
            baseline,
            candidate,
            report,
        })
    }

    fn run_strategy(
        &self,
        strategy: Strategy,
        placer: &Placer,
        workload: &Workload,
        store: &mut dyn JobStore,
    ) -> Result<StrategyRun, ComparisonError> {
        let vms = placer.virtual_machines();
        let placement = placer.place(workload, strategy)?;

        let outcomes = self
            .engine
            .execute(workload, vms, &placement.assignment)
            .map_err(|source| ComparisonError::Execution { strategy, source })?;

        let analysis = analyze(strategy.label(), workload, vms.len(), &outcomes)
            .map_err(|source| ComparisonError::Analysis { strategy, source })?;

        debug!(
            strategy = %strategy,
            projected_makespan = placement.projected_makespan(),
            realised_makespan = analysis.result.makespan,
            "placement executed"
        );

        let finish_times: BTreeMap<JobId, f64> = outcomes
            .iter()
            .map(|(&id, o)| (id, o.finish_time))
            .collect();
        if let Err(e) = store.save_finish_times(&finish_times) {
            warn!(strategy = %strategy, error = %e, "failed to persist finish times");
        }
        if let Err(e) = store.save_run_result(&RunRecord::now(analysis.result.clone())) {
            warn!(strategy = %strategy, error = %e, "failed to persist run result");
        }

        Ok(StrategyRun {
            placement,
            analysis,
        })
    }
}

/// Deadlines the assigner drew for this comparison.
fn generated_deadlines(
    workload: &Workload,
    own: &HashSet<JobId>,
    persisted: &HashMap<JobId, f64>,
) -> HashMap<JobId, f64> {
    workload
        .jobs()
        .iter()
        .filter(|j| !own.contains(&j.id))
        .filter_map(|j: &Job| {
            let d = j.deadline?;
            match persisted.get(&j.id) {
                Some(p) if *p == d => None,
                _ => Some((j.id, d)),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::RunToCompletionEngine;
    use crate::store::{MemoryStore, YamlStore};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config(seed: u64) -> ComparisonConfig {
        ComparisonConfig {
            seed: Some(seed),
            synthetic_jobs: 40,
            ..Default::default()
        }
    }

    fn runner(seed: u64) -> ComparisonRunner<RunToCompletionEngine> {
        ComparisonRunner::new(config(seed), RunToCompletionEngine)
    }

    /// Store whose every call fails.
    struct BrokenStore;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn broken() -> StoreError {
        StoreError::Unavailable("broken".into())
    }

    impl JobStore for BrokenStore {
        fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
            Err(broken())
        }
        fn load_virtual_machines(&self) -> Result<Vec<VirtualMachine>, StoreError> {
            Err(broken())
        }
        fn load_deadlines(&self) -> Result<HashMap<JobId, f64>, StoreError> {
            Err(broken())
        }
        fn save_deadlines(&mut self, _: &HashMap<JobId, f64>) -> Result<(), StoreError> {
            Err(broken())
        }
        fn save_finish_times(&mut self, _: &BTreeMap<JobId, f64>) -> Result<(), StoreError> {
            Err(broken())
        }
        fn save_run_result(&mut self, _: &RunRecord) -> Result<(), StoreError> {
            Err(broken())
        }
        fn run_history(&self, _: Option<&str>) -> Result<Vec<RunRecord>, StoreError> {
            Err(broken())
        }
        fn clear_run_history(&mut self) -> Result<(), StoreError> {
            Err(broken())
        }
    }

    #[test]
    fn four_job_scenario_end_to_end() {
        let jobs = vec![
            Job::new(1, 100).with_deadline(100.0),
            Job::new(2, 500).with_deadline(100.0),
            Job::new(3, 1_000).with_deadline(100.0),
            Job::new(4, 5_000).with_deadline(100.0),
        ];
        let vms = vec![VirtualMachine::new(0, 800.0), VirtualMachine::new(1, 1_500.0)];
        let mut store = MemoryStore::new().with_jobs(jobs).with_virtual_machines(vms);

        let out = runner(1).run(&mut store).unwrap();

        let pbfs = &out.baseline.analysis.result;
        let egsjf = &out.candidate.analysis.result;
        assert_eq!(pbfs.algorithm, "PBFS");
        assert_eq!(egsjf.algorithm, "EG-SJF");
        assert!((pbfs.makespan - 8.25).abs() < 1e-9);
        assert!((egsjf.makespan - 4.4).abs() < 1e-9);
        assert!(out.report.improvement.makespan > 0.0);
        assert_eq!(out.candidate.placement.assignment.queue(1), &[1, 2, 3, 4]);
        assert!(out.baseline.placement.assignment.queue(1).is_empty());
    }

    #[test]
    fn empty_store_uses_synthetic_jobs_and_configured_vms() {
        let mut store = MemoryStore::new();
        let out = runner(5).run(&mut store).unwrap();

        assert_eq!(out.workload.len(), 40);
        assert_eq!(out.virtual_machines.len(), 4);
        assert_eq!(out.baseline.analysis.result.completed_jobs, 40);
        assert_eq!(out.candidate.analysis.result.completed_jobs, 40);
        assert_eq!(out.baseline.analysis.result.vm_count, 4);
    }

    #[test]
    fn both_runs_see_identical_deadlines() {
        let mut store = MemoryStore::new();
        let out = runner(9).run(&mut store).unwrap();

        let deadlines = out.workload.deadlines();
        for t in out
            .baseline
            .analysis
            .tardiness
            .iter()
            .chain(out.candidate.analysis.tardiness.iter())
        {
            assert_eq!(t.deadline, deadlines[&t.job]);
        }
    }

    #[test]
    fn synthetic_deadlines_are_written_back_and_reused() {
        let mut store = MemoryStore::new().with_jobs(vec![
            Job::new(1, 400),
            Job::new(2, 800).with_deadline(3.0),
        ]);
        let first = runner(3).run(&mut store).unwrap();

        let saved = store.load_deadlines().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[&1], first.workload.get(1).unwrap().deadline.unwrap());

        // A different seed must not redraw a persisted deadline.
        let second = runner(4).run(&mut store).unwrap();
        assert_eq!(
            second.workload.get(1).unwrap().deadline,
            first.workload.get(1).unwrap().deadline
        );
    }

    #[test]
    fn runs_and_finish_times_are_recorded() {
        let mut store = MemoryStore::new();
        runner(2).run(&mut store).unwrap();

        let history = store.run_history(None).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(store.run_history(Some("PBFS")).unwrap().len(), 1);
        assert_eq!(store.run_history(Some("eg-sjf")).unwrap().len(), 1);
        assert_eq!(store.finish_times().len(), 40);
    }

    #[test]
    fn broken_store_falls_back_and_continues() {
        let mut store = BrokenStore;
        let out = runner(11).run(&mut store).unwrap();
        assert_eq!(out.workload.len(), 40);
        assert_eq!(out.virtual_machines, ComparisonConfig::default().virtual_machines);
    }

    #[test]
    fn same_seed_reproduces_the_comparison() {
        let a = runner(42).run(&mut MemoryStore::new()).unwrap();
        let b = runner(42).run(&mut MemoryStore::new()).unwrap();
        assert_eq!(a.workload, b.workload);
        assert_eq!(a.report, b.report);
        assert_eq!(a.report.to_string(), b.report.to_string());
    }

    #[test]
    fn best_fit_never_loses_on_makespan() {
        for seed in 0..10 {
            let out = runner(seed).run(&mut MemoryStore::new()).unwrap();
            assert!(
                out.candidate.analysis.result.makespan
                    <= out.baseline.analysis.result.makespan + 1e-9,
                "seed {seed}"
            );
        }
    }

    #[test]
    fn empty_workload_yields_zeroed_report() {
        let cfg = ComparisonConfig {
            seed: Some(1),
            synthetic_jobs: 0,
            ..Default::default()
        };
        let out = ComparisonRunner::new(cfg, RunToCompletionEngine)
            .run(&mut MemoryStore::new())
            .unwrap();
        assert!(out.workload.is_empty());
        assert_eq!(out.report.baseline.makespan, 0.0);
        assert_eq!(out.report.improvement.makespan, 0.0);
    }

    #[test]
    fn duplicate_job_ids_fail_the_comparison() {
        let mut store = MemoryStore::new().with_jobs(vec![Job::new(1, 100), Job::new(1, 200)]);
        let err = runner(1).run(&mut store).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Workload(WorkloadError::DuplicateJob(1))
        ));
    }

    #[test]
    fn invalid_vm_rate_fails_the_comparison() {
        let mut store = MemoryStore::new().with_virtual_machines(vec![VirtualMachine::new(0, 0.0)]);
        let err = runner(1).run(&mut store).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Placement(PlacementError::InvalidProcessingRate { vm: 0, .. })
        ));
    }

    #[test]
    fn negative_length_in_yaml_store_fails_the_comparison() {
        let f = yaml_tempfile(
            r#"
jobs:
  - id: 1
    length: 400
  - id: 2
    length: -100
virtual_machines:
  - id: 0
    processing_rate: 800
"#,
        );
        let mut store = YamlStore::new(f.path());
        let err = runner(1).run(&mut store).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Placement(PlacementError::NonPositiveLength { job: 2, length: -100 })
        ));
        assert!(store.load_deadlines().unwrap().is_empty());
        assert!(store.run_history(None).unwrap().is_empty());
    }

    #[test]
    fn malformed_yaml_store_fails_instead_of_going_synthetic() {
        let f = yaml_tempfile(
            r#"
jobs:
  - id: 1
    length: "long"
virtual_machines:
  - id: 0
    processing_rate: 800
"#,
        );
        let mut store = YamlStore::new(f.path());
        let err = runner(1).run(&mut store).unwrap_err();
        assert!(matches!(err, ComparisonError::Store(StoreError::Format { .. })));
    }

    #[test]
    fn malformed_deadlines_fail_the_comparison() {
        let f = yaml_tempfile(
            r#"
jobs:
  - id: 1
    length: 400
deadlines:
  1: soon
"#,
        );
        let err = runner(1).run(&mut YamlStore::new(f.path())).unwrap_err();
        assert!(matches!(err, ComparisonError::Store(StoreError::Format { .. })));
    }

    #[test]
    fn stored_jobs_and_vms_are_used_as_is() {
        let f = yaml_tempfile(
            r#"
jobs:
  - id: 1
    length: 400
  - id: 2
    length: 800
virtual_machines:
  - id: 0
    processing_rate: 800
"#,
        );
        let out = runner(1).run(&mut YamlStore::new(f.path())).unwrap();
        assert_eq!(out.workload.len(), 2);
        assert_eq!(out.virtual_machines.len(), 1);
        assert!((out.baseline.analysis.result.makespan - 1.5).abs() < 1e-9);
    }

    #[test]
    fn missing_store_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = YamlStore::new(dir.path().join("absent.yaml"));
        let out = runner(6).run(&mut store).unwrap();
        assert_eq!(out.workload.len(), 40);
        assert_eq!(out.virtual_machines.len(), 4);
        // The writes create the file.
        assert_eq!(store.run_history(None).unwrap().len(), 2);
    }
}
