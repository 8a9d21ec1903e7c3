#![allow(dead_code)]

use apexreport::model::{AuxiliaryListings, ClassCoverageRecord, CoverageAggregate};

pub fn aggregate(team: f64, org: f64) -> CoverageAggregate {
    CoverageAggregate {
        team_coverage_percent: team,
        team_coverage_threshold: 75.0,
        org_wide_coverage_percent: org,
        org_wide_coverage_threshold: 75.0,
        total_test_classes_executed: 3,
        total_test_classes_aborted: 0,
        total_test_methods_executed: 10,
        failed_test_method_count: 1,
    }
}

pub fn record(name: &str, pct: f64, covered: &[u32], uncovered: &[u32]) -> ClassCoverageRecord {
    ClassCoverageRecord {
        class_name: name.to_string(),
        api_version: "58.0".to_string(),
        coverage_percent: pct,
        covered_lines: covered.to_vec(),
        uncovered_lines: uncovered.to_vec(),
        length_without_comments_bytes: 1024,
    }
}

pub fn listings(duplicates: &[&str], invalid: &[&str]) -> AuxiliaryListings {
    AuxiliaryListings {
        duplicate_class_entries: duplicates.iter().map(|s| s.to_string()).collect(),
        invalid_class_entries: invalid.iter().map(|s| s.to_string()).collect(),
    }
}

/// Slice `html` down to the first `<table>` whose class attribute is `class`.
pub fn table<'a>(html: &'a str, class: &str) -> Option<&'a str> {
    let start = html.find(&format!("<table border=\"1\" class=\"{class}\">"))?;
    let end = html[start..].find("</table>")? + start;
    Some(&html[start..end])
}
