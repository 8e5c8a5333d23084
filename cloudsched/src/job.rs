/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core job and VM data structures for the placement engine.
//!
//! Three types model the two sides of a placement run:
//!
//! ```text
//! store ──► Job ──(deadline assigner)──► Workload ──(placer)──► Assignment ──► execution engine
//!           VirtualMachine ─────────────────────────────┘
//! ```
//!
//! # Ownership model
//! `Job` and `VirtualMachine` are plain values.  No strategy ever writes an
//! assignment into a `Job`: the job → VM relation lives in a separate
//! [`Assignment`] keyed by [`JobId`], so two strategies can read the same
//! workload snapshot without interfering with each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable job identifier (the `job_id` column of the job store).
pub type JobId = u32;

/// Stable VM identifier.
pub type VmId = u32;

// ── Job ───────────────────────────────────────────────────────────────────────

/// A single independent batch job.
///
/// `start_time` / `finish_time` are only populated when a job is read back
/// from a store that recorded a previous execution; the placement engine never
/// reads or writes them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Human-readable label.
    #[serde(default)]
    pub name: String,

    /// Work units (MI).  Non-positive lengths load fine and are rejected by
    /// the placer.
    pub length: i64,

    /// Informational only; neither strategy consumes it.
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub arrival_time: f64,

    /// Absolute deadline.  `None` until the deadline assigner runs, unless
    /// the store already carries one.
    #[serde(default)]
    pub deadline: Option<f64>,

    #[serde(default)]
    pub start_time: Option<f64>,

    #[serde(default)]
    pub finish_time: Option<f64>,
}

impl Job {
    /// Create a job with the given id and length and every other field at its
    /// default.
    pub fn new(id: JobId, length: i64) -> Self {
        Self {
            id,
            name: format!("job-{id}"),
            length,
            ..Default::default()
        }
    }

    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_arrival_time(mut self, arrival_time: f64) -> Self {
        self.arrival_time = arrival_time;
        self
    }

    /// Tardiness against the job's own deadline for a realised finish time.
    ///
    /// Returns `None` when the job has no deadline.
    pub fn tardiness_at(&self, finish_time: f64) -> Option<f64> {
        self.deadline.map(|d| (finish_time - d).max(0.0))
    }
}

// ── VirtualMachine ────────────────────────────────────────────────────────────

/// A VM with a fixed processing rate for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: VmId,

    #[serde(default)]
    pub name: String,

    /// Work units per time unit (MIPS).
    pub processing_rate: f64,

    #[serde(default = "default_core_count")]
    pub core_count: u32,

    #[serde(default)]
    pub memory_mb: u64,

    #[serde(default)]
    pub bandwidth: u64,

    #[serde(default)]
    pub storage: u64,
}

fn default_core_count() -> u32 {
    1
}

impl VirtualMachine {
    pub fn new(id: VmId, processing_rate: f64) -> Self {
        Self {
            id,
            name: format!("vm-{id}"),
            processing_rate,
            core_count: default_core_count(),
            memory_mb: 0,
            bandwidth: 0,
            storage: 0,
        }
    }

    /// Exclusive run time of `length` work units on this VM.
    pub fn execution_time(&self, length: i64) -> f64 {
        length as f64 / self.processing_rate
    }

    /// `true` when the rate can be divided by safely.
    pub fn has_valid_rate(&self) -> bool {
        self.processing_rate.is_finite() && self.processing_rate > 0.0
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

/// Output of one placement run: which VM each job runs on, and the order in
/// which jobs were handed to each VM.
///
/// `BTreeMap` on both sides so iteration order never depends on hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    by_job: BTreeMap<JobId, VmId>,
    queues: BTreeMap<VmId, Vec<JobId>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `job` to the queue of `vm`.
    ///
    /// Returns `false` (and changes nothing) if `job` is already assigned.
    pub(crate) fn push(&mut self, job: JobId, vm: VmId) -> bool {
        if self.by_job.contains_key(&job) {
            return false;
        }
        self.by_job.insert(job, vm);
        self.queues.entry(vm).or_default().push(job);
        true
    }

    /// VM the job was placed on.
    pub fn vm_for(&self, job: JobId) -> Option<VmId> {
        self.by_job.get(&job).copied()
    }

    /// Jobs handed to `vm`, in hand-off order.  Empty for an idle VM.
    pub fn queue(&self, vm: VmId) -> &[JobId] {
        self.queues.get(&vm).map(|q| q.as_slice()).unwrap_or(&[])
    }

    /// Every non-empty VM queue, ordered by VM id.
    pub fn queues(&self) -> impl Iterator<Item = (VmId, &[JobId])> {
        self.queues.iter().map(|(vm, q)| (*vm, q.as_slice()))
    }

    /// `(job, vm)` pairs ordered by job id.
    pub fn pairs(&self) -> impl Iterator<Item = (JobId, VmId)> + '_ {
        self.by_job.iter().map(|(j, v)| (*j, *v))
    }

    pub fn len(&self) -> usize {
        self.by_job.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_job.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
