/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! File-backed job store.
//!
//! The expected YAML structure is:
//! ```yaml
//! jobs:
//!   - id: 1
//!     name: "render-01"
//!     length: 400
//!     priority: 2
//!     arrival_time: 0.0
//! virtual_machines:
//!   - id: 0
//!     processing_rate: 800
//!     core_count: 2
//! deadlines:
//!   1: 0.85
//! finish_times:
//!   1: 0.5
//! runs: []
//! ```
//!
//! Every section is optional.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{filter_history, JobStore, RunRecord, StoreError};
use crate::job::{Job, JobId, VirtualMachine};

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    virtual_machines: Vec<VirtualMachine>,
    #[serde(default)]
    deadlines: BTreeMap<JobId, f64>,
    #[serde(default)]
    finish_times: BTreeMap<JobId, f64>,
    #[serde(default)]
    runs: Vec<RunRecord>,
}

/// [`JobStore`] over a single YAML file.
///
/// Reads fail with [`StoreError::Io`] when the file does not exist; the first
/// write creates it.
#[derive(Debug, Clone)]
pub struct YamlStore {
    path: PathBuf,
}

impl YamlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreDocument, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        serde_yaml::from_str(&content).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })
    }

    /// Read-modify-write.  A missing file starts from an empty document.
    fn update(&self, f: impl FnOnce(&mut StoreDocument)) -> Result<(), StoreError> {
        let mut doc = if self.path.exists() {
            self.read()?
        } else {
            StoreDocument::default()
        };
        f(&mut doc);

        let content = serde_yaml::to_string(&doc).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "store file written");
        Ok(())
    }
}

impl JobStore for YamlStore {
    fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = self.read()?.jobs;
        info!(path = %self.path.display(), count = jobs.len(), "jobs loaded");
        Ok(jobs)
    }

    fn load_virtual_machines(&self) -> Result<Vec<VirtualMachine>, StoreError> {
        Ok(self.read()?.virtual_machines)
    }

    fn load_deadlines(&self) -> Result<HashMap<JobId, f64>, StoreError> {
        Ok(self.read()?.deadlines.into_iter().collect())
    }

    fn save_deadlines(&mut self, deadlines: &HashMap<JobId, f64>) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.deadlines
                .extend(deadlines.iter().map(|(k, v)| (*k, *v)))
        })
    }

    fn save_finish_times(&mut self, finish_times: &BTreeMap<JobId, f64>) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.finish_times
                .extend(finish_times.iter().map(|(k, v)| (*k, *v)))
        })?;
        info!(count = finish_times.len(), "finish times saved");
        Ok(())
    }

    fn save_run_result(&mut self, record: &RunRecord) -> Result<(), StoreError> {
        self.update(|doc| doc.runs.push(record.clone()))
    }

    fn run_history(&self, algorithm: Option<&str>) -> Result<Vec<RunRecord>, StoreError> {
        Ok(filter_history(&self.read()?.runs, algorithm))
    }

    fn clear_run_history(&mut self) -> Result<(), StoreError> {
        self.update(|doc| doc.runs.clear())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
