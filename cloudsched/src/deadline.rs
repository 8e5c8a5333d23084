/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deadline assignment.
//!
//! Every job entering a comparison needs an absolute deadline.  Precedence:
//!
//! 1. the job's own `deadline` field,
//! 2. the persisted `job_id → deadline` map,
//! 3. a synthetic deadline `(length / fallback_rate) × factor`, with `factor`
//!    drawn uniformly from `[1.5, 2.5]` per job.
//!
//! The result is a [`Workload`], which both strategies of a comparison must
//! share.  Seed the RNG once per comparison for reproducible deadlines.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::job::{Job, JobId};
use crate::workload::Workload;

/// Lower bound of the synthetic slack factor.
pub const DEADLINE_FACTOR_MIN: f64 = 1.5;

/// Upper bound of the synthetic slack factor.
pub const DEADLINE_FACTOR_MAX: f64 = 2.5;

/// Reference rate used when the caller does not configure one.
pub const DEFAULT_FALLBACK_RATE: f64 = 1_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum WorkloadError {
    #[error("fallback rate must be positive and finite, got {0}")]
    InvalidFallbackRate(f64),

    #[error("job id {0} appears more than once in the workload")]
    DuplicateJob(JobId),
}

/// Which source a job's deadline came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineSources {
    pub from_job: usize,
    pub persisted: usize,
    pub synthetic: usize,
}

/// Derives missing deadlines from job length.
pub struct DeadlineAssigner<'r, R: Rng> {
    fallback_rate: f64,
    rng: &'r mut R,
}

impl<'r, R: Rng> DeadlineAssigner<'r, R> {
    /// # Errors
    /// [`WorkloadError::InvalidFallbackRate`] unless `fallback_rate` is
    /// positive and finite.
    pub fn new(fallback_rate: f64, rng: &'r mut R) -> Result<Self, WorkloadError> {
        if !(fallback_rate.is_finite() && fallback_rate > 0.0) {
            return Err(WorkloadError::InvalidFallbackRate(fallback_rate));
        }
        Ok(Self { fallback_rate, rng })
    }

    pub fn fallback_rate(&self) -> f64 {
        self.fallback_rate
    }

    /// Synthetic deadline for a job of `length` work units.
    pub fn synthetic_deadline(&mut self, length: i64) -> f64 {
        let factor = self
            .rng
            .random_range(DEADLINE_FACTOR_MIN..=DEADLINE_FACTOR_MAX);
        (length as f64 / self.fallback_rate) * factor
    }

    /// Give every job a deadline and freeze the result into a [`Workload`].
    ///
    /// Non-finite deadlines (from either source) are treated as missing.
    ///
    /// # Errors
    /// [`WorkloadError::DuplicateJob`] if two jobs share an id.
    pub fn assign(
        &mut self,
        jobs: Vec<Job>,
        persisted: &HashMap<JobId, f64>,
    ) -> Result<Workload, WorkloadError> {
        let (workload, sources) = self.assign_with_sources(jobs, persisted)?;
        info!(
            jobs = workload.len(),
            from_job = sources.from_job,
            persisted = sources.persisted,
            synthetic = sources.synthetic,
            fallback_rate = self.fallback_rate,
            "deadlines assigned"
        );
        Ok(workload)
    }

    /// Same as [`assign`](Self::assign), also reporting where each deadline
    /// came from.
    pub fn assign_with_sources(
        &mut self,
        jobs: Vec<Job>,
        persisted: &HashMap<JobId, f64>,
    ) -> Result<(Workload, DeadlineSources), WorkloadError> {
        let mut seen = HashSet::with_capacity(jobs.len());
        let mut sources = DeadlineSources::default();
        let mut out = Vec::with_capacity(jobs.len());

        for mut job in jobs {
            if !seen.insert(job.id) {
                return Err(WorkloadError::DuplicateJob(job.id));
            }

            match job.deadline.filter(|d| d.is_finite()) {
                Some(_) => sources.from_job += 1,
                None => match persisted.get(&job.id).copied().filter(|d| d.is_finite()) {
                    Some(d) => {
                        job.deadline = Some(d);
                        sources.persisted += 1;
                    }
                    None => {
                        if job.deadline.is_some() || persisted.contains_key(&job.id) {
                            warn!(job = job.id, "non-finite deadline discarded");
                        }
                        let d = self.synthetic_deadline(job.length);
                        debug!(job = job.id, length = job.length, deadline = d, "synthetic deadline");
                        job.deadline = Some(d);
                        sources.synthetic += 1;
                    }
                },
            }
            out.push(job);
        }

        Ok((Workload::from_assigned(out), sources))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    #[test]
    fn rejects_non_positive_fallback_rate() {
        let mut r = rng();
        assert!(matches!(
            DeadlineAssigner::new(0.0, &mut r),
            Err(WorkloadError::InvalidFallbackRate(_))
        ));
        assert!(DeadlineAssigner::new(-1.0, &mut r).is_err());
        assert!(DeadlineAssigner::new(f64::NAN, &mut r).is_err());
    }

    #[test]
    fn synthetic_deadlines_lie_within_slack_bounds() {
        let mut r = rng();
        let mut assigner = DeadlineAssigner::new(500.0, &mut r).unwrap();
        let jobs: Vec<Job> = (1..=500).map(|i| Job::new(i, 37 * i as i64)).collect();
        let workload = assigner.assign(jobs, &HashMap::new()).unwrap();

        for job in workload.jobs() {
            let reference = job.length as f64 / 500.0;
            let d = job.deadline.unwrap();
            assert!(
                d >= reference * DEADLINE_FACTOR_MIN - 1e-12
                    && d <= reference * DEADLINE_FACTOR_MAX + 1e-12,
                "deadline {d} outside [{}, {}]",
                reference * DEADLINE_FACTOR_MIN,
                reference * DEADLINE_FACTOR_MAX
            );
        }
    }

    #[test]
    fn persisted_deadline_is_used_unchanged() {
        let mut r = rng();
        let mut assigner = DeadlineAssigner::new(1_000.0, &mut r).unwrap();
        let persisted = HashMap::from([(1, 123.456)]);
        let (w, sources) = assigner
            .assign_with_sources(vec![Job::new(1, 10_000), Job::new(2, 10_000)], &persisted)
            .unwrap();

        assert_eq!(w.get(1).unwrap().deadline, Some(123.456));
        assert_eq!(sources.persisted, 1);
        assert_eq!(sources.synthetic, 1);
    }

    #[test]
    fn job_deadline_beats_persisted_deadline() {
        let mut r = rng();
        let mut assigner = DeadlineAssigner::new(1_000.0, &mut r).unwrap();
        let persisted = HashMap::from([(1, 99.0)]);
        let (w, sources) = assigner
            .assign_with_sources(vec![Job::new(1, 100).with_deadline(4.0)], &persisted)
            .unwrap();
        assert_eq!(w.get(1).unwrap().deadline, Some(4.0));
        assert_eq!(sources.from_job, 1);
    }

    #[test]
    fn non_finite_persisted_deadline_is_regenerated() {
        let mut r = rng();
        let mut assigner = DeadlineAssigner::new(1_000.0, &mut r).unwrap();
        let persisted = HashMap::from([(1, f64::NAN)]);
        let w = assigner.assign(vec![Job::new(1, 1_000)], &persisted).unwrap();
        let d = w.get(1).unwrap().deadline.unwrap();
        assert!((1.5..=2.5).contains(&d));
    }

    #[test]
    fn duplicate_job_ids_are_rejected() {
        let mut r = rng();
        let mut assigner = DeadlineAssigner::new(1_000.0, &mut r).unwrap();
        let err = assigner
            .assign(vec![Job::new(4, 10), Job::new(4, 20)], &HashMap::new())
            .unwrap_err();
        assert_eq!(err, WorkloadError::DuplicateJob(4));
    }

    #[test]
    fn same_seed_gives_same_deadlines() {
        let jobs = || (1..=30).map(|i| Job::new(i, 100 * i as i64)).collect::<Vec<_>>();

        let mut r1 = StdRng::seed_from_u64(5);
        let mut r2 = StdRng::seed_from_u64(5);
        let a = DeadlineAssigner::new(1_000.0, &mut r1)
            .unwrap()
            .assign(jobs(), &HashMap::new())
            .unwrap();
        let b = DeadlineAssigner::new(1_000.0, &mut r2)
            .unwrap()
            .assign(jobs(), &HashMap::new())
            .unwrap();
        assert_eq!(a.jobs(), b.jobs());
    }

    #[test]
    fn empty_job_list_gives_empty_workload() {
        let mut r = rng();
        let w = DeadlineAssigner::new(1_000.0, &mut r)
            .unwrap()
            .assign(vec![], &HashMap::new())
            .unwrap();
        assert!(w.is_empty());
    }
}
