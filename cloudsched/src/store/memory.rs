/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process-local job store.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{filter_history, JobStore, RunRecord, StoreError};
use crate::job::{Job, JobId, VirtualMachine};

/// In-memory [`JobStore`].
///
/// Finish times written by a run are recorded against the job ids but do not
/// alter the jobs returned by [`load_jobs`](JobStore::load_jobs), so the next
/// comparison starts from the same snapshot.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    jobs: Vec<Job>,
    vms: Vec<VirtualMachine>,
    deadlines: HashMap<JobId, f64>,
    finish_times: BTreeMap<JobId, f64>,
    runs: Vec<RunRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(mut self, jobs: Vec<Job>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_virtual_machines(mut self, vms: Vec<VirtualMachine>) -> Self {
        self.vms = vms;
        self
    }

    pub fn with_deadlines(mut self, deadlines: HashMap<JobId, f64>) -> Self {
        self.deadlines = deadlines;
        self
    }

    /// Finish times from the most recent write for each job.
    pub fn finish_times(&self) -> &BTreeMap<JobId, f64> {
        &self.finish_times
    }
}

impl JobStore for MemoryStore {
    fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.clone())
    }

    fn load_virtual_machines(&self) -> Result<Vec<VirtualMachine>, StoreError> {
        Ok(self.vms.clone())
    }

    fn load_deadlines(&self) -> Result<HashMap<JobId, f64>, StoreError> {
        Ok(self.deadlines.clone())
    }

    fn save_deadlines(&mut self, deadlines: &HashMap<JobId, f64>) -> Result<(), StoreError> {
        self.deadlines
            .extend(deadlines.iter().map(|(k, v)| (*k, *v)));
        Ok(())
    }

    fn save_finish_times(&mut self, finish_times: &BTreeMap<JobId, f64>) -> Result<(), StoreError> {
        self.finish_times
            .extend(finish_times.iter().map(|(k, v)| (*k, *v)));
        debug!(count = finish_times.len(), "finish times stored in memory");
        Ok(())
    }

    fn save_run_result(&mut self, record: &RunRecord) -> Result<(), StoreError> {
        self.runs.push(record.clone());
        Ok(())
    }

    fn run_history(&self, algorithm: Option<&str>) -> Result<Vec<RunRecord>, StoreError> {
        Ok(filter_history(&self.runs, algorithm))
    }

    fn clear_run_history(&mut self) -> Result<(), StoreError> {
        self.runs.clear();
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
