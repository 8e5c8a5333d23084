/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Workload snapshots and the built-in synthetic workload.
//!
//! A [`Workload`] is the immutable, deadline-complete job set that both
//! placement strategies consume in one comparison.  It can only be built by
//! [`DeadlineAssigner::assign`](crate::deadline::DeadlineAssigner::assign), so
//! holding a `&Workload` proves deadlines were assigned exactly once.

use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use crate::job::{Job, JobId, VirtualMachine};

// ── Workload ──────────────────────────────────────────────────────────────────

/// Immutable job set with a deadline on every job.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    jobs: Vec<Job>,
    index: HashMap<JobId, usize>,
}

impl Workload {
    /// Caller guarantees unique ids and a deadline on every job.
    pub(crate) fn from_assigned(jobs: Vec<Job>) -> Self {
        debug_assert!(jobs.iter().all(|j| j.deadline.is_some()));
        let index = jobs.iter().enumerate().map(|(i, j)| (j.id, i)).collect();
        Self { jobs, index }
    }

    /// Jobs in load order (store or generator).
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.index.get(&id).map(|&i| &self.jobs[i])
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// `job_id → deadline` for every job.
    pub fn deadlines(&self) -> HashMap<JobId, f64> {
        self.jobs
            .iter()
            .filter_map(|j| j.deadline.map(|d| (j.id, d)))
            .collect()
    }
}

// ── Synthetic workload ────────────────────────────────────────────────────────

/// Default number of jobs in the synthetic workload.
pub const DEFAULT_SYNTHETIC_JOBS: usize = 100;

/// Length bands by relative position in the batch: `(upper position bound,
/// min length, max length exclusive)`.
///
/// Mostly short jobs with a thin tail of very long ones.
const LENGTH_BANDS: [(f64, i64, i64); 4] = [
    (0.70, 100, 500),
    (0.85, 500, 1_000),
    (0.95, 1_000, 2_000),
    (1.00, 5_000, 10_000),
];

/// Generate `count` jobs with ids `1..=count`, arrival time 0 and no
/// deadline.
pub fn synthetic_jobs<R: Rng>(count: usize, rng: &mut R) -> Vec<Job> {
    let jobs: Vec<Job> = (0..count)
        .map(|i| {
            let id = (i + 1) as JobId;
            Job::new(id, synthetic_length(i, count, rng))
        })
        .collect();

    debug!(
        count = jobs.len(),
        min_length = jobs.iter().map(|j| j.length).min().unwrap_or(0),
        max_length = jobs.iter().map(|j| j.length).max().unwrap_or(0),
        "synthetic workload generated"
    );
    jobs
}

fn synthetic_length<R: Rng>(index: usize, total: usize, rng: &mut R) -> i64 {
    let position = index as f64 / total as f64;
    let (_, lo, hi) = LENGTH_BANDS
        .iter()
        .copied()
        .find(|(bound, _, _)| position < *bound)
        .unwrap_or(LENGTH_BANDS[LENGTH_BANDS.len() - 1]);
    rng.random_range(lo..hi)
}

// ── Default VM inventory ──────────────────────────────────────────────────────

/// Processing rates of the default inventory, slowest first.
pub const DEFAULT_VM_RATES: [f64; 4] = [800.0, 1_000.0, 1_200.0, 1_500.0];

/// Four heterogeneous VMs used when neither the store nor the config file
/// supplies an inventory.
pub fn default_virtual_machines() -> Vec<VirtualMachine> {
    DEFAULT_VM_RATES
        .iter()
        .enumerate()
        .map(|(i, &rate)| VirtualMachine {
            id: i as u32,
            name: format!("vm-{i}"),
            processing_rate: rate,
            core_count: 2,
            memory_mb: 1_024,
            bandwidth: 1_000,
            storage: 10_000,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn synthetic_ids_are_one_based_and_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let jobs = synthetic_jobs(20, &mut rng);
        let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert!(jobs.iter().all(|j| j.deadline.is_none()));
    }

    #[test]
    fn synthetic_lengths_follow_position_bands() {
        let mut rng = StdRng::seed_from_u64(42);
        let jobs = synthetic_jobs(100, &mut rng);

        for (i, job) in jobs.iter().enumerate() {
            let range = match i {
                0..=69 => 100..500,
                70..=84 => 500..1_000,
                85..=94 => 1_000..2_000,
                _ => 5_000..10_000,
            };
            assert!(
                range.contains(&job.length),
                "job at position {i} has length {} outside {range:?}",
                job.length
            );
        }
    }

    #[test]
    fn synthetic_generation_is_reproducible_with_a_seed() {
        let a = synthetic_jobs(50, &mut StdRng::seed_from_u64(99));
        let b = synthetic_jobs(50, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_jobs_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(synthetic_jobs(0, &mut rng).is_empty());
    }

    #[test]
    fn default_inventory_has_four_heterogeneous_vms() {
        let vms = default_virtual_machines();
        assert_eq!(vms.len(), 4);
        let rates: Vec<f64> = vms.iter().map(|v| v.processing_rate).collect();
        assert_eq!(rates, DEFAULT_VM_RATES.to_vec());
        assert!(vms.iter().all(|v| v.core_count == 2 && v.memory_mb == 1_024));
        assert_eq!(vms[3].id, 3);
    }

    #[test]
    fn workload_lookup_by_id() {
        let w = Workload::from_assigned(vec![
            Job::new(10, 100).with_deadline(1.0),
            Job::new(20, 200).with_deadline(2.0),
        ]);
        assert_eq!(w.len(), 2);
        assert_eq!(w.get(20).map(|j| j.length), Some(200));
        assert!(w.get(30).is_none());
        assert_eq!(w.deadlines().get(&10), Some(&1.0));
    }
}
