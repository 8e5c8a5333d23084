/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Batch job placement.
//!
//! [`Placer`] implements two greedy, offline strategies that map every job of
//! a [`Workload`] onto one VM of a fixed heterogeneous inventory and fix the
//! hand-off order per VM.  The result is a [`Placement`]: an
//! [`Assignment`] plus the projected per-VM load, ready to be handed to an
//! [`ExecutionEngine`](crate::execution::ExecutionEngine).
//!
//! | Strategy | Job order | VM choice |
//! |---|---|---|
//! | `Pbfs` (Worst-Fit-Adversarial) | longest first | **latest** candidate completion |
//! | `EgSjf` (Best-Fit-Earliest-Finish) | shortest first | **earliest** candidate finish |
//!
//! Both run in O(J·V) time and O(J+V) space.  Ties go to the VM that comes
//! first in the inventory; equal-length jobs keep their workload order.
//!
//! # Example
//! ```rust,ignore
//! let placer = Placer::new(vms)?;
//! let placement = placer.place(&workload, Strategy::EgSjf)?;
//! ```

pub mod error;
pub mod feasibility;

pub use error::PlacementError;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::job::{Assignment, Job, VirtualMachine, VmId};
use crate::workload::Workload;

use feasibility::projected_misses;

// ── Strategy ──────────────────────────────────────────────────────────────────

/// Placement strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Worst-Fit-Adversarial: a deliberately poor baseline.
    Pbfs,
    /// Best-Fit-Earliest-Finish, shortest job first.
    EgSjf,
}

impl Strategy {
    /// Label used in reports and stored run records.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Pbfs => "PBFS",
            Strategy::EgSjf => "EG-SJF",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pbfs" | "worst_fit_adversarial" => Ok(Strategy::Pbfs),
            "eg-sjf" | "egsjf" | "best_fit_earliest_finish" => Ok(Strategy::EgSjf),
            other => Err(PlacementError::UnknownStrategy(other.to_string())),
        }
    }
}

// ── Placement ─────────────────────────────────────────────────────────────────

/// Result of one placement run.
#[derive(Debug, Clone)]
pub struct Placement {
    pub strategy: Strategy,
    pub assignment: Assignment,
    /// `(vm, projected completion time)` in inventory order.  Diagnostic
    /// only; the execution engine owns the real finish times.
    pub projected_load: Vec<(VmId, f64)>,
}

impl Placement {
    /// Largest projected per-VM load.
    pub fn projected_makespan(&self) -> f64 {
        self.projected_load
            .iter()
            .map(|(_, l)| *l)
            .fold(0.0, f64::max)
    }
}

// ── Placer ────────────────────────────────────────────────────────────────────

/// Stateless placement engine over a validated VM inventory.
///
/// All per-run state (the load accumulator) is allocated inside
/// [`place()`](Self::place) and dropped at the end of the call, so one
/// `Placer` can serve any number of runs, concurrently or not.
#[derive(Debug, Clone)]
pub struct Placer {
    vms: Vec<VirtualMachine>,
}

impl Placer {
    /// Validate the inventory and build a placer over it.
    ///
    /// # Errors
    /// [`PlacementError::NoVirtualMachines`],
    /// [`PlacementError::InvalidProcessingRate`] or
    /// [`PlacementError::DuplicateVm`].
    pub fn new(vms: Vec<VirtualMachine>) -> Result<Self, PlacementError> {
        if vms.is_empty() {
            return Err(PlacementError::NoVirtualMachines);
        }
        let mut seen = HashSet::with_capacity(vms.len());
        for vm in &vms {
            if !vm.has_valid_rate() {
                return Err(PlacementError::InvalidProcessingRate {
                    vm: vm.id,
                    rate: vm.processing_rate,
                });
            }
            if !seen.insert(vm.id) {
                return Err(PlacementError::DuplicateVm(vm.id));
            }
        }
        Ok(Self { vms })
    }

    pub fn virtual_machines(&self) -> &[VirtualMachine] {
        &self.vms
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Place every job of `workload` with `strategy`.
    ///
    /// An empty workload yields an empty assignment.
    ///
    /// # Errors
    /// [`PlacementError::NonPositiveLength`] if any job has a zero or negative
    /// length; no partial assignment is returned.
    pub fn place(
        &self,
        workload: &Workload,
        strategy: Strategy,
    ) -> Result<Placement, PlacementError> {
        if let Some(job) = workload.jobs().iter().find(|j| j.length <= 0) {
            return Err(PlacementError::NonPositiveLength {
                job: job.id,
                length: job.length,
            });
        }
        if workload.is_empty() {
            info!(strategy = %strategy, "empty workload, nothing to place");
        }

        info!(
            strategy = %strategy,
            job_count = workload.len(),
            vm_count = self.vms.len(),
            "=== Placer::place() ==="
        );

        // Per-call state: projected completion time per VM, by inventory index.
        let mut load = vec![0.0_f64; self.vms.len()];

        let assignment = match strategy {
            Strategy::Pbfs => self.place_worst_fit_adversarial(workload, &mut load),
            Strategy::EgSjf => self.place_best_fit_earliest_finish(workload, &mut load),
        };

        let projected_load: Vec<(VmId, f64)> =
            self.vms.iter().map(|v| v.id).zip(load).collect();
        let placement = Placement {
            strategy,
            assignment,
            projected_load,
        };

        self.log_projected_misses(workload, &placement);

        info!(
            strategy = %strategy,
            placed = placement.assignment.len(),
            projected_makespan = placement.projected_makespan(),
            "=== Placement complete ==="
        );

        Ok(placement)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy 1: Worst-Fit-Adversarial (PBFS)
    // ─────────────────────────────────────────────────────────────────────────

    fn place_worst_fit_adversarial(&self, workload: &Workload, load: &mut [f64]) -> Assignment {
        // Longest first; stable sort keeps workload order among equal lengths
        let mut order: Vec<&Job> = workload.jobs().iter().collect();
        order.sort_by(|a, b| b.length.cmp(&a.length));

        let mut assignment = Assignment::new();
        for job in order {
            let idx = self.select_vm(job, load, |candidate, best| candidate > best);
            let vm = &self.vms[idx];
            load[idx] += vm.execution_time(job.length);
            assignment.push(job.id, vm.id);
            debug!(
                job = job.id,
                length = job.length,
                vm = vm.id,
                completion = load[idx],
                "PBFS placed"
            );
        }
        assignment
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy 2: Best-Fit-Earliest-Finish (EG-SJF)
    // ─────────────────────────────────────────────────────────────────────────

    fn place_best_fit_earliest_finish(&self, workload: &Workload, load: &mut [f64]) -> Assignment {
        // Shortest first
        let mut order: Vec<&Job> = workload.jobs().iter().collect();
        order.sort_by_key(|j| j.length);

        let mut assignment = Assignment::new();
        for job in order {
            let idx = self.select_vm(job, load, |candidate, best| candidate < best);
            let vm = &self.vms[idx];
            let start = load[idx];
            load[idx] = start + vm.execution_time(job.length);
            assignment.push(job.id, vm.id);
            debug!(
                job = job.id,
                length = job.length,
                vm = vm.id,
                start = start,
                finish = load[idx],
                "EG-SJF placed"
            );
        }
        assignment
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shared helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Index of the VM whose candidate completion `load[v] + length / rate[v]`
    /// is preferred by `better(candidate, best_so_far)`.
    ///
    /// `better` must be strict so the lowest index wins ties.
    fn select_vm(&self, job: &Job, load: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
        let mut best_idx = 0usize;
        let mut best = load[0] + self.vms[0].execution_time(job.length);

        for (idx, vm) in self.vms.iter().enumerate().skip(1) {
            let candidate = load[idx] + vm.execution_time(job.length);
            if better(candidate, best) {
                best = candidate;
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Emit `warn!` for every VM whose projected queue misses deadlines.
    fn log_projected_misses(&self, workload: &Workload, placement: &Placement) {
        for m in projected_misses(workload, &self.vms, &placement.assignment) {
            warn!(
                strategy = %placement.strategy,
                vm = m.vm,
                late_jobs = m.late_jobs,
                queued_jobs = m.queued_jobs,
                projected_tardiness = m.tardiness,
                "projected deadline misses on VM"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
