/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use cloudsched::comparison::ComparisonRunner;
use cloudsched::config::ComparisonConfig;
use cloudsched::execution::RunToCompletionEngine;
use cloudsched::store::{JobStore, MemoryStore, YamlStore};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Compare PBFS and EG-SJF job placement on a heterogeneous VM inventory.
///
/// Example:
///   cloudsched --config comparison.yaml --store jobs.yaml --seed 42
#[derive(Debug, Parser)]
#[command(
    name = "cloudsched",
    about = "PBFS vs EG-SJF placement comparison",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML comparison configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Path to the YAML job store.  Without it an in-memory store is used.
    #[arg(short = 's', long = "store")]
    store: Option<PathBuf>,

    /// RNG seed for deadlines and the synthetic workload.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Reference processing rate for synthetic deadlines.
    #[arg(short = 'r', long = "fallback-rate")]
    fallback_rate: Option<f64>,

    /// Number of synthetic jobs when the store has none.
    #[arg(short = 'n', long = "synthetic-jobs")]
    synthetic_jobs: Option<usize>,

    /// Print stored run records (optionally for one algorithm) and exit.
    /// Requires --store.
    #[arg(long = "history", num_args = 0..=1, default_missing_value = "")]
    history: Option<String>,

    /// Clear stored run records and exit.  Requires --store.
    #[arg(long = "clear-history", default_value_t = false)]
    clear_history: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        config         = ?cli.config,
        store          = ?cli.store,
        seed           = ?cli.seed,
        fallback_rate  = ?cli.fallback_rate,
        synthetic_jobs = ?cli.synthetic_jobs,
        history        = ?cli.history,
        clear_history  = cli.clear_history,
        "Configuration"
    );

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // ── Load comparison configuration ─────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => ComparisonConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default comparison settings");
            ComparisonConfig::default()
        }
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(rate) = cli.fallback_rate {
        config.fallback_rate = rate;
    }
    if let Some(count) = cli.synthetic_jobs {
        config.synthetic_jobs = count;
    }

    check_history_flags(&cli)?;

    // ── Open store ────────────────────────────────────────────────────────────
    let mut store: Box<dyn JobStore> = match &cli.store {
        Some(path) => {
            info!("Using job store: {}", path.display());
            Box::new(YamlStore::new(path))
        }
        None => Box::new(MemoryStore::new()),
    };

    if cli.clear_history {
        store
            .clear_run_history()
            .context("Failed to clear run history")?;
        info!("Run history cleared");
        return Ok(());
    }

    if let Some(filter) = &cli.history {
        let filter = (!filter.is_empty()).then_some(filter.as_str());
        let records = store
            .run_history(filter)
            .context("Failed to read run history")?;
        if records.is_empty() {
            println!("No stored runs.");
        }
        for r in &records {
            println!(
                "{}  {:<8} makespan={:.2} flow={:.2} tardiness={:.2} late={} completed={}/{}",
                r.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                r.result.algorithm,
                r.result.makespan,
                r.result.total_flow_time,
                r.result.total_tardiness,
                r.result.late_job_count,
                r.result.completed_jobs,
                r.result.total_jobs,
            );
        }
        return Ok(());
    }

    // ── Run comparison ────────────────────────────────────────────────────────
    let runner = ComparisonRunner::new(config, RunToCompletionEngine);
    let outcome = runner
        .run(store.as_mut())
        .context("Comparison run failed")?;

    println!("{}", outcome.report);
    Ok(())
}

/// Run history lives in the store file; the in-memory store starts empty.
fn check_history_flags(cli: &Cli) -> Result<()> {
    if (cli.clear_history || cli.history.is_some()) && cli.store.is_none() {
        anyhow::bail!("--history and --clear-history need a --store file holding run records");
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
