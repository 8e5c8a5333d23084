/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence collaborator interface.
//!
//! The comparison pipeline reads jobs, VMs and deadlines through
//! [`JobStore`] and writes finish times and run records back.  Every call is
//! fallible; callers fall back to in-memory defaults on read failure and
//! log-and-continue on write failure.
//!
//! Two implementations ship in-tree:
//!
//! * [`MemoryStore`]: process-local, used by tests and when no store file is
//!   configured.
//! * [`YamlStore`]: a single YAML document on disk.  No handle outlives a
//!   call: each operation opens, reads and (for writes) rewrites the file.

pub mod memory;
pub mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::RunResult;
use crate::job::{Job, JobId, VirtualMachine};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// `true` when the store could not be reached at all.  A reachable store
    /// holding malformed records is not unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unavailable(_))
    }
}

/// One stored strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: RunResult,
}

impl RunRecord {
    pub fn now(result: RunResult) -> Self {
        Self {
            recorded_at: Utc::now(),
            result,
        }
    }
}

/// Read / write interface to persisted jobs, VMs, deadlines and run history.
pub trait JobStore {
    fn load_jobs(&self) -> Result<Vec<Job>, StoreError>;

    fn load_virtual_machines(&self) -> Result<Vec<VirtualMachine>, StoreError>;

    fn load_deadlines(&self) -> Result<HashMap<JobId, f64>, StoreError>;

    /// Persist deadlines so later comparisons reuse them.  Existing entries
    /// are overwritten.
    fn save_deadlines(&mut self, deadlines: &HashMap<JobId, f64>) -> Result<(), StoreError>;

    fn save_finish_times(&mut self, finish_times: &BTreeMap<JobId, f64>) -> Result<(), StoreError>;

    fn save_run_result(&mut self, record: &RunRecord) -> Result<(), StoreError>;

    /// Stored runs, newest first, optionally restricted to one algorithm
    /// label (case-insensitive).
    fn run_history(&self, algorithm: Option<&str>) -> Result<Vec<RunRecord>, StoreError>;

    fn clear_run_history(&mut self) -> Result<(), StoreError>;
}

/// Shared history filter for the in-tree stores.
fn filter_history(records: &[RunRecord], algorithm: Option<&str>) -> Vec<RunRecord> {
    let mut out: Vec<RunRecord> = records
        .iter()
        .filter(|r| algorithm.map_or(true, |a| r.result.algorithm.eq_ignore_ascii_case(a)))
        .cloned()
        .collect();
    // Newest first; equal timestamps keep the later insertion first
    out.reverse();
    out.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    out
}
