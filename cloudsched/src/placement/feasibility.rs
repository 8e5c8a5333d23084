/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Projected deadline feasibility of a placement.
//!
//! Computed and logged after every placement run.  It is a **warning
//! only**: the authoritative finish times come from the execution engine,
//! and a placement is never rejected because of a projected miss.
//!
//! The projection assumes run-to-completion in queue order starting at time
//! zero, ignoring arrival times.

use std::collections::BTreeMap;

use crate::job::{Assignment, VirtualMachine, VmId};
use crate::workload::Workload;

/// Projected deadline misses on one VM.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedMisses {
    pub vm: VmId,
    pub late_jobs: usize,
    pub queued_jobs: usize,
    /// Sum of projected tardiness over the VM's queue.
    pub tardiness: f64,
}

/// Walk each VM queue and collect projected misses.
///
/// Only VMs with at least one projected miss are returned, ordered by VM id.
/// Queues naming VMs or jobs not present in `vms` / `workload` are skipped.
pub fn projected_misses(
    workload: &Workload,
    vms: &[VirtualMachine],
    assignment: &Assignment,
) -> Vec<ProjectedMisses> {
    let rates: BTreeMap<VmId, &VirtualMachine> = vms.iter().map(|v| (v.id, v)).collect();
    let mut out = Vec::new();

    for (vm_id, queue) in assignment.queues() {
        let Some(vm) = rates.get(&vm_id) else {
            continue;
        };

        let mut clock = 0.0_f64;
        let mut late_jobs = 0usize;
        let mut tardiness = 0.0_f64;

        for job in queue.iter().filter_map(|id| workload.get(*id)) {
            clock += vm.execution_time(job.length);
            if let Some(t) = job.tardiness_at(clock) {
                if t > 0.0 {
                    late_jobs += 1;
                    tardiness += t;
                }
            }
        }

        if late_jobs > 0 {
            out.push(ProjectedMisses {
                vm: vm_id,
                late_jobs,
                queued_jobs: queue.len(),
                tardiness,
            });
        }
    }

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    fn workload(jobs: Vec<Job>) -> Workload {
        Workload::from_assigned(jobs)
    }

    #[test]
    fn no_misses_when_all_deadlines_are_generous() {
        let w = workload(vec![
            Job::new(1, 1_000).with_deadline(10.0),
            Job::new(2, 1_000).with_deadline(10.0),
        ]);
        let vms = vec![VirtualMachine::new(0, 1_000.0)];
        let mut a = Assignment::new();
        a.push(1, 0);
        a.push(2, 0);

        assert!(projected_misses(&w, &vms, &a).is_empty());
    }

    #[test]
    fn queue_order_determines_which_job_is_late() {
        // Both jobs take 1.0 on the VM; the second finishes at 2.0 > 1.5.
        let w = workload(vec![
            Job::new(1, 1_000).with_deadline(1.5),
            Job::new(2, 1_000).with_deadline(1.5),
        ]);
        let vms = vec![VirtualMachine::new(0, 1_000.0)];
        let mut a = Assignment::new();
        a.push(2, 0);
        a.push(1, 0);

        let misses = projected_misses(&w, &vms, &a);
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].vm, 0);
        assert_eq!(misses[0].late_jobs, 1);
        assert_eq!(misses[0].queued_jobs, 2);
        assert!((misses[0].tardiness - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_vm_queue_is_skipped() {
        let w = workload(vec![Job::new(1, 1_000).with_deadline(0.1)]);
        let mut a = Assignment::new();
        a.push(1, 42);
        assert!(projected_misses(&w, &[], &a).is_empty());
    }
}
