//! Comparison configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! fallback_rate: 1000.0
//! seed: 42
//! synthetic_jobs: 100
//! virtual_machines:
//!   - id: 0
//!     name: "slow"
//!     processing_rate: 800
//!     core_count: 2
//!     memory_mb: 1024
//!     bandwidth: 1000
//!     storage: 10000
//! ```
//!
//! Every key is optional.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::deadline::DEFAULT_FALLBACK_RATE;
use crate::job::VirtualMachine;
use crate::workload::{default_virtual_machines, DEFAULT_SYNTHETIC_JOBS};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private – callers work with [`ComparisonConfig`] instead.
#[derive(Debug, Deserialize)]
struct ComparisonConfigFile {
    #[serde(default = "default_fallback_rate")]
    fallback_rate: f64,
    seed: Option<u64>,
    #[serde(default = "default_synthetic_jobs")]
    synthetic_jobs: usize,
    #[serde(default)]
    virtual_machines: Vec<VirtualMachine>,
}

fn default_fallback_rate() -> f64 {
    DEFAULT_FALLBACK_RATE
}

fn default_synthetic_jobs() -> usize {
    DEFAULT_SYNTHETIC_JOBS
}

// ── Public data structures ────────────────────────────────────────────────────

/// Settings for one comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    /// Reference rate for synthetic deadlines.  Shared by both strategies.
    pub fallback_rate: f64,

    /// RNG seed for deadlines and the synthetic workload.  `None` draws one
    /// from the OS.
    pub seed: Option<u64>,

    /// Size of the synthetic workload used when the store has no jobs.
    pub synthetic_jobs: usize,

    /// Inventory used when the store has no VMs.
    pub virtual_machines: Vec<VirtualMachine>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            fallback_rate: DEFAULT_FALLBACK_RATE,
            seed: None,
            synthetic_jobs: DEFAULT_SYNTHETIC_JOBS,
            virtual_machines: default_virtual_machines(),
        }
    }
}

impl ComparisonConfig {
    /// Parse `path` into a configuration.
    ///
    /// An empty `virtual_machines` list is replaced by the default inventory.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, if the YAML is
    /// structurally invalid, or if `fallback_rate` is not positive.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading comparison configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ComparisonConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        if !(file.fallback_rate.is_finite() && file.fallback_rate > 0.0) {
            anyhow::bail!(
                "fallback_rate must be positive, got {} in {}",
                file.fallback_rate,
                path.display()
            );
        }

        let virtual_machines = if file.virtual_machines.is_empty() {
            warn!("No virtual machines in configuration file, using default inventory");
            default_virtual_machines()
        } else {
            file.virtual_machines
        };

        for vm in &virtual_machines {
            debug!(
                "  VM: {} ({}) | rate: {} | cores: {} | memory: {}MB",
                vm.id, vm.name, vm.processing_rate, vm.core_count, vm.memory_mb
            );
        }

        let config = Self {
            fallback_rate: file.fallback_rate,
            seed: file.seed,
            synthetic_jobs: file.synthetic_jobs,
            virtual_machines,
        };

        info!(
            fallback_rate = config.fallback_rate,
            seed = ?config.seed,
            synthetic_jobs = config.synthetic_jobs,
            vm_count = config.virtual_machines.len(),
            "configuration loaded"
        );

        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
