//! Read-only input model for a completed Apex test run. Everything here is
//! produced upstream (test execution, coverage collection, manifest
//! processing) and handed to the renderers as borrowed views.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Compute a coverage percentage, returning 100.0 when the total is zero.
///
/// A run with no instrumentable lines is treated as fully covered.
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        100.0 * covered as f64 / total as f64
    }
}

/// Run-level coverage summary, thresholds and test-execution counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageAggregate {
    pub team_coverage_percent: f64,
    pub team_coverage_threshold: f64,
    pub org_wide_coverage_percent: f64,
    pub org_wide_coverage_threshold: f64,
    pub total_test_classes_executed: u64,
    pub total_test_classes_aborted: u64,
    pub total_test_methods_executed: u64,
    /// Precomputed upstream, see [`CoverageAggregate::failure_count`].
    pub failed_test_method_count: u64,
}

impl CoverageAggregate {
    /// Number of failed test methods as the test-result handler reports it:
    /// the size of the failure list, but only when failures were flagged and
    /// the list is non-empty.
    #[must_use]
    pub fn failure_count(test_failures: bool, failed_methods: Option<&[String]>) -> u64 {
        match failed_methods {
            Some(methods) if test_failures && !methods.is_empty() => methods.len() as u64,
            _ => 0,
        }
    }

    /// Executed minus failed, clamped at zero for inconsistent input.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.total_test_methods_executed
            .saturating_sub(self.failed_test_method_count)
    }

    #[must_use]
    pub fn team_below_threshold(&self) -> bool {
        self.team_coverage_percent < self.team_coverage_threshold
    }

    #[must_use]
    pub fn org_wide_below_threshold(&self) -> bool {
        self.org_wide_coverage_percent < self.org_wide_coverage_threshold
    }
}

/// Line coverage for a single Apex class or trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassCoverageRecord {
    pub class_name: String,
    pub api_version: String,
    /// Supplied by the coverage collector; rendered as given.
    pub coverage_percent: f64,
    #[serde(default)]
    pub covered_lines: Vec<u32>,
    #[serde(default)]
    pub uncovered_lines: Vec<u32>,
    pub length_without_comments_bytes: u64,
}

impl ClassCoverageRecord {
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.covered_lines.len()
    }

    #[must_use]
    pub fn uncovered_count(&self) -> usize {
        self.uncovered_lines.len()
    }

    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.covered_count() + self.uncovered_count()
    }

    /// Coverage implied by the line lists, independent of `coverage_percent`.
    #[must_use]
    pub fn line_percent(&self) -> f64 {
        percent(self.covered_count() as u64, self.total_lines() as u64)
    }

    #[must_use]
    pub fn below_threshold(&self, threshold: f64) -> bool {
        self.coverage_percent < threshold
    }

    /// Check the invariants a coverage document depends on.
    ///
    /// The percentage is not compared against the line lists; the collector
    /// may compute it with its own rules.
    pub fn validate(&self) -> Result<()> {
        let pct = self.coverage_percent;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ReportError::DocumentBuild(format!(
                "class '{}' has coverage percentage {pct} outside 0..=100",
                self.class_name
            )));
        }
        let covered: HashSet<u32> = self.covered_lines.iter().copied().collect();
        if let Some(line) = self
            .uncovered_lines
            .iter()
            .find(|line| covered.contains(line))
        {
            return Err(ReportError::DocumentBuild(format!(
                "class '{}' lists line {line} as both covered and uncovered",
                self.class_name
            )));
        }
        Ok(())
    }
}

/// Listings produced while resolving manifest files. Empty lists suppress
/// their report section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryListings {
    #[serde(default)]
    pub duplicate_class_entries: Vec<String>,
    #[serde(default)]
    pub invalid_class_entries: Vec<String>,
}

/// Everything a run hands over for reporting, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub aggregate: CoverageAggregate,
    /// `None` when coverage collection produced nothing at all.
    #[serde(default)]
    pub classes: Option<Vec<ClassCoverageRecord>>,
    #[serde(flatten)]
    pub listings: AuxiliaryListings,
}

impl RunResults {
    /// Validate every class record; see [`ClassCoverageRecord::validate`].
    pub fn validate(&self) -> Result<()> {
        self.classes
            .iter()
            .flatten()
            .try_for_each(ClassCoverageRecord::validate)
    }
}
