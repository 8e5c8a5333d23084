/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Baseline vs candidate comparison.
//!
//! A read-only projection of two [`RunResult`]s: nothing here mutates its
//! inputs, and rendering the same pair twice yields the same text.

use std::fmt;

use crate::analysis::RunResult;

/// Signed relative improvement of `candidate` over `baseline`, in percent.
///
/// Positive means the candidate is lower (better).  Defined as `0.0` when the
/// baseline is zero.
pub fn improvement(baseline: f64, candidate: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (baseline - candidate) / baseline * 100.0
    }
}

/// Relative improvements, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Improvement {
    pub makespan: f64,
    pub flow_time: f64,
    pub tardiness: f64,
}

/// Two runs ordered `(baseline, candidate)` and their improvement summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub baseline: RunResult,
    pub candidate: RunResult,
    pub improvement: Improvement,
}

impl ComparisonReport {
    pub fn new(baseline: &RunResult, candidate: &RunResult) -> Self {
        let improvement = Improvement {
            makespan: improvement(baseline.makespan, candidate.makespan),
            flow_time: improvement(baseline.total_flow_time, candidate.total_flow_time),
            tardiness: improvement(baseline.total_tardiness, candidate.total_tardiness),
        };
        Self {
            baseline: baseline.clone(),
            candidate: candidate.clone(),
            improvement,
        }
    }

    /// Rows in table order: baseline first.
    pub fn rows(&self) -> [&RunResult; 2] {
        [&self.baseline, &self.candidate]
    }
}

const RULE_WIDTH: usize = 112;

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FINAL COMPARISON: {} vs {}",
            self.candidate.algorithm, self.baseline.algorithm
        )?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "{:<12} | {:>10} | {:>12} | {:>13} | {:>13} | {:>15} | {:>6} | {:>11}",
            "Algorithm",
            "Makespan",
            "Total Flow",
            "Avg Exec Time",
            "Avg Wait Time",
            "Total Tardiness",
            "Late",
            "Completed"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for r in self.rows() {
            writeln!(
                f,
                "{:<12} | {:>10.2} | {:>12.2} | {:>13.2} | {:>13.2} | {:>15.2} | {:>6} | {:>11}",
                r.algorithm,
                r.makespan,
                r.total_flow_time,
                r.avg_execution_time,
                r.avg_waiting_time,
                r.total_tardiness,
                r.late_job_count,
                format!("{}/{}", r.completed_jobs, r.total_jobs),
            )?;
        }
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(f, "TARDINESS:")?;
        for r in self.rows() {
            writeln!(
                f,
                "  {:<12} late {}/{} ({:.1}%) | total {:.2} | avg {:.2} | max {:.2} | success rate {:.1}%",
                r.algorithm,
                r.late_job_count,
                r.completed_jobs,
                r.late_percentage(),
                r.total_tardiness,
                r.average_tardiness(),
                r.max_tardiness,
                r.success_rate(),
            )?;
        }
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "IMPROVEMENT ({} vs {}):",
            self.candidate.algorithm, self.baseline.algorithm
        )?;
        writeln!(f, "  Makespan:   {:>7.1}%", self.improvement.makespan)?;
        writeln!(f, "  Flow time:  {:>7.1}%", self.improvement.flow_time)?;
        write!(f, "  Tardiness:  {:>7.1}%", self.improvement.tardiness)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
