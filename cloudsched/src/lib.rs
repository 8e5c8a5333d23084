/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! cloudsched – deadline-aware job placement on heterogeneous VMs
//!
//! Compares a worst-fit adversarial baseline (PBFS) with a best-fit
//! earliest-finish strategy (EG-SJF) over one shared workload.
//!
//! ```text
//! lib.rs
//! ├── job/          – jobs, VMs, assignments
//! ├── workload/     – immutable workload snapshot, synthetic jobs, default VMs
//! ├── deadline/     – deadline assigner
//! ├── placement/    – PBFS and EG-SJF placers
//! ├── execution/    – execution engine seam + run-to-completion engine
//! ├── analysis/     – tardiness and run metrics
//! ├── report/       – baseline vs candidate report
//! ├── store/        – persistence seam, memory and YAML stores
//! ├── config/       – YAML comparison configuration
//! └── comparison/   – end-to-end comparison pipeline
//! ```

pub mod analysis;
pub mod comparison;
pub mod config;
pub mod deadline;
pub mod execution;
pub mod job;
pub mod placement;
pub mod report;
pub mod store;
pub mod workload;
