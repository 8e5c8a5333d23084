/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tardiness and run-level metrics.
//!
//! | Metric | Definition |
//! |---|---|
//! | Makespan | `max(finish_time)` |
//! | Total flow time | `Σ finish_time` |
//! | Avg execution time | `mean(cpu_time)` as reported by the engine |
//! | Avg waiting time | `mean(finish_time − start_time − cpu_time)` |
//! | Tardiness | `max(0, finish_time − deadline)` per job |
//! | Late jobs | `count(tardiness > 0)` |
//!
//! An empty run is valid: every aggregate is zero.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::execution::{ExecutionOutcome, ExecutionReport};
use crate::job::JobId;
use crate::workload::Workload;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Outcome timings are non-finite or break
    /// `finish ≥ start ≥ arrival`, or the CPU time is negative.
    #[error(
        "job {job} has inconsistent outcome (arrival {arrival}, start {start}, finish {finish}, cpu {cpu})"
    )]
    InconsistentOutcome {
        job: JobId,
        arrival: f64,
        start: f64,
        finish: f64,
        cpu: f64,
    },
}

/// Tardiness of one completed job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTardiness {
    pub job: JobId,
    pub finish_time: f64,
    pub deadline: f64,
    pub tardiness: f64,
}

/// Aggregate metrics of one strategy run.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub algorithm: String,
    pub makespan: f64,
    pub total_flow_time: f64,
    pub avg_execution_time: f64,
    pub avg_waiting_time: f64,
    pub total_tardiness: f64,
    pub max_tardiness: f64,
    pub late_job_count: usize,
    pub completed_jobs: usize,
    pub total_jobs: usize,
    /// Jobs left out of tardiness aggregation (no finish time or no deadline).
    pub incomplete_jobs: usize,
    pub vm_count: usize,
}

impl RunResult {
    /// Completed / total × 100; `0.0` for an empty run.
    pub fn success_rate(&self) -> f64 {
        percentage(self.completed_jobs, self.total_jobs)
    }

    /// Late / completed × 100; `0.0` when nothing completed.
    pub fn late_percentage(&self) -> f64 {
        percentage(self.late_job_count, self.completed_jobs)
    }

    /// Mean tardiness over late jobs only.
    pub fn average_tardiness(&self) -> f64 {
        if self.late_job_count == 0 {
            0.0
        } else {
            self.total_tardiness / self.late_job_count as f64
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Full analysis of one run.
#[derive(Debug, Clone)]
pub struct RunAnalysis {
    pub result: RunResult,
    /// Per-job tardiness, ordered by job id.
    pub tardiness: Vec<JobTardiness>,
}

/// Compute per-job tardiness and run aggregates.
///
/// Outcomes for job ids absent from `workload` are ignored with a warning.
///
/// # Errors
/// [`AnalysisError::InconsistentOutcome`] for impossible timings; the whole
/// run is rejected rather than reporting skewed metrics.
pub fn analyze(
    algorithm: &str,
    workload: &Workload,
    vm_count: usize,
    outcomes: &ExecutionReport,
) -> Result<RunAnalysis, AnalysisError> {
    let mut completed: Vec<(JobId, &ExecutionOutcome)> = Vec::with_capacity(outcomes.len());
    let mut tardiness = Vec::with_capacity(outcomes.len());

    for (&job_id, outcome) in outcomes {
        let Some(job) = workload.get(job_id) else {
            warn!(algorithm, job = job_id, "outcome for unknown job ignored");
            continue;
        };
        validate(job_id, job.arrival_time, outcome)?;
        completed.push((job_id, outcome));

        if let Some(deadline) = job.deadline {
            tardiness.push(JobTardiness {
                job: job_id,
                finish_time: outcome.finish_time,
                deadline,
                tardiness: (outcome.finish_time - deadline).max(0.0),
            });
        }
    }

    let n = completed.len();
    let mean = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

    let makespan = completed
        .iter()
        .map(|(_, o)| o.finish_time)
        .fold(0.0, f64::max);
    let total_flow_time: f64 = completed.iter().map(|(_, o)| o.finish_time).sum();
    let avg_execution_time = mean(completed.iter().map(|(_, o)| o.cpu_time).sum());
    let avg_waiting_time = mean(
        completed
            .iter()
            .map(|(_, o)| o.finish_time - o.start_time - o.cpu_time)
            .sum(),
    );

    let total_tardiness: f64 = tardiness.iter().map(|t| t.tardiness).sum();
    let max_tardiness = tardiness.iter().map(|t| t.tardiness).fold(0.0, f64::max);
    let late_job_count = tardiness.iter().filter(|t| t.tardiness > 0.0).count();

    let result = RunResult {
        algorithm: algorithm.to_string(),
        makespan,
        total_flow_time,
        avg_execution_time,
        avg_waiting_time,
        total_tardiness,
        max_tardiness,
        late_job_count,
        completed_jobs: n,
        total_jobs: workload.len(),
        incomplete_jobs: workload.len() - tardiness.len(),
        vm_count,
    };

    info!(
        algorithm,
        makespan = result.makespan,
        total_flow_time = result.total_flow_time,
        total_tardiness = result.total_tardiness,
        avg_tardiness = result.average_tardiness(),
        max_tardiness = result.max_tardiness,
        late_jobs = result.late_job_count,
        late_pct = result.late_percentage(),
        completed = result.completed_jobs,
        total = result.total_jobs,
        incomplete = result.incomplete_jobs,
        success_rate = result.success_rate(),
        "run analysed"
    );

    Ok(RunAnalysis { result, tardiness })
}

fn validate(job: JobId, arrival: f64, o: &ExecutionOutcome) -> Result<(), AnalysisError> {
    let finite = o.start_time.is_finite() && o.finish_time.is_finite() && o.cpu_time.is_finite();
    if finite && o.finish_time >= o.start_time && o.start_time >= arrival && o.cpu_time >= 0.0 {
        return Ok(());
    }
    Err(AnalysisError::InconsistentOutcome {
        job,
        arrival,
        start: o.start_time,
        finish: o.finish_time,
        cpu: o.cpu_time,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
