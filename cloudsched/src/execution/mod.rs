/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Execution collaborator interface.
//!
//! The placement engine only *decides* assignments; something else turns an
//! [`Assignment`] into realised start / finish times.  That something
//! implements [`ExecutionEngine`].  Jobs that never execute are simply absent
//! from the returned [`ExecutionReport`].
//!
//! [`RunToCompletionEngine`] is the in-tree implementation: each VM runs its
//! queue one job at a time, in hand-off order, at its full processing rate.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{debug, info};

use crate::job::{Assignment, JobId, VirtualMachine, VmId};
use crate::workload::Workload;

/// Realised timing of one completed job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionOutcome {
    /// When the job actually started executing.
    pub start_time: f64,
    pub finish_time: f64,
    /// CPU time actually consumed, as measured by the engine.
    pub cpu_time: f64,
}

/// Outcomes of one run, keyed by job id.
pub type ExecutionReport = BTreeMap<JobId, ExecutionOutcome>;

#[derive(Debug, Error, PartialEq)]
pub enum ExecutionError {
    #[error("assignment references unknown VM {0}")]
    UnknownVm(VmId),

    #[error("assignment references unknown job {0}")]
    UnknownJob(JobId),
}

/// Turns an assignment into realised timings.
///
/// Implementations must not mutate `workload` or `vms`: they are shared by
/// every run of a comparison.
pub trait ExecutionEngine {
    fn execute(
        &self,
        workload: &Workload,
        vms: &[VirtualMachine],
        assignment: &Assignment,
    ) -> Result<ExecutionReport, ExecutionError>;
}

/// Exclusive, non-preemptive, one-job-at-a-time execution per VM.
///
/// A job starts at `max(vm_clock, arrival_time)` and consumes
/// `length / processing_rate`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunToCompletionEngine;

impl ExecutionEngine for RunToCompletionEngine {
    fn execute(
        &self,
        workload: &Workload,
        vms: &[VirtualMachine],
        assignment: &Assignment,
    ) -> Result<ExecutionReport, ExecutionError> {
        let by_id: HashMap<VmId, &VirtualMachine> = vms.iter().map(|v| (v.id, v)).collect();
        let mut report = ExecutionReport::new();

        for (vm_id, queue) in assignment.queues() {
            let vm = by_id
                .get(&vm_id)
                .ok_or(ExecutionError::UnknownVm(vm_id))?;
            let mut clock = 0.0_f64;

            for &job_id in queue {
                let job = workload
                    .get(job_id)
                    .ok_or(ExecutionError::UnknownJob(job_id))?;
                let start = clock.max(job.arrival_time);
                let cpu = vm.execution_time(job.length);
                clock = start + cpu;
                report.insert(
                    job_id,
                    ExecutionOutcome {
                        start_time: start,
                        finish_time: clock,
                        cpu_time: cpu,
                    },
                );
            }

            debug!(vm = vm_id, jobs = queue.len(), busy_until = clock, "VM queue drained");
        }

        info!(completed = report.len(), "execution finished");
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
