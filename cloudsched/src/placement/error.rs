/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the placement engine.
//!
//! Every variant is a caller contract violation: the run is failed as a whole
//! rather than producing an assignment whose metrics would be NaN or garbage.

use thiserror::Error;

use crate::job::{JobId, VmId};

/// Error returned by [`Placer::place()`](super::Placer::place) and
/// [`Placer::new()`](super::Placer::new).
#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    /// The VM inventory is empty.
    #[error("no virtual machines available — VM list is empty")]
    NoVirtualMachines,

    /// A VM has a zero, negative or non-finite processing rate.
    #[error("VM {vm} has invalid processing rate {rate} (must be positive and finite)")]
    InvalidProcessingRate { vm: VmId, rate: f64 },

    /// Two VMs share an id.
    #[error("VM id {0} appears more than once in the inventory")]
    DuplicateVm(VmId),

    /// A job has a zero or negative length.
    #[error("job {job} has non-positive length {length}")]
    NonPositiveLength { job: JobId, length: i64 },

    /// The strategy name is not recognised.
    #[error("unknown placement strategy: '{0}' (valid: pbfs, eg-sjf)")]
    UnknownStrategy(String),
}
