//! Command handler functions for the apexreport CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::ingest::load_run;
use crate::model::RunResults;
use crate::report::{self, CoberturaReport, HtmlReport, ReportInput, ReportLinkConfig};

/// Path segment that marks a CI workspace when sensing the link mode.
pub const DEFAULT_CI_MARKER: &str = "jenkins";

/// Decide where the HTML report's test-report link points.
///
/// An explicit job name wins; otherwise a base URL alone enables sensing
/// from the working directory; with neither, the link is local.
pub fn resolve_link(
    ci_base_url: Option<&str>,
    ci_job: Option<&str>,
    ci_marker: &str,
    working_dir: &Path,
) -> Result<ReportLinkConfig> {
    match (ci_base_url, ci_job) {
        (Some(base_url), Some(job)) => Ok(ReportLinkConfig::ContinuousIntegration {
            base_url: base_url.to_string(),
            job_name: job.to_string(),
        }),
        (Some(base_url), None) => Ok(ReportLinkConfig::detect(working_dir, ci_marker, base_url)),
        (None, Some(job)) => bail!("--ci-job '{job}' requires --ci-base-url"),
        (None, None) => Ok(ReportLinkConfig::Local),
    }
}

fn load(input: &Path) -> Result<RunResults> {
    load_run(input).with_context(|| format!("Failed to load run results from {}", input.display()))
}

fn write_html(run: &RunResults, base_dir: &Path, link: &ReportLinkConfig, out: &mut String) -> Result<()> {
    let renderer = HtmlReport::new(link, base_dir);
    let path = report::write_report(&renderer, &ReportInput::from(run), base_dir)
        .context("Failed to write HTML report")?;
    writeln!(out, "Wrote HTML report to {}", path.display())?;
    Ok(())
}

fn write_cobertura(
    run: &RunResults,
    base_dir: &Path,
    renderer: CoberturaReport,
    out: &mut String,
) -> Result<()> {
    let path = report::write_report(&renderer, &ReportInput::from(run), base_dir)
        .context("Failed to write Cobertura coverage report")?;
    let classes = run.classes.as_ref().map_or(0, Vec::len);
    writeln!(
        out,
        "Wrote Cobertura report to {} ({} classes)",
        path.display(),
        classes
    )?;
    Ok(())
}

pub fn cmd_html(input: &Path, base_dir: &Path, link: &ReportLinkConfig) -> Result<String> {
    let run = load(input)?;
    let mut out = String::new();
    write_html(&run, base_dir, link, &mut out)?;
    Ok(out)
}

pub fn cmd_cobertura(input: &Path, base_dir: &Path, renderer: CoberturaReport) -> Result<String> {
    let run = load(input)?;
    let mut out = String::new();
    write_cobertura(&run, base_dir, renderer, &mut out)?;
    Ok(out)
}

/// Write both reports from one load of the run results.
///
/// Class records are validated before either file is written, so a record
/// the Cobertura report would reject leaves neither report on disk.
pub fn cmd_all(
    input: &Path,
    base_dir: &Path,
    link: &ReportLinkConfig,
    renderer: CoberturaReport,
) -> Result<String> {
    let run = load(input)?;
    run.validate()
        .with_context(|| format!("Invalid class records in {}", input.display()))?;
    let mut out = String::new();
    write_html(&run, base_dir, link, &mut out)?;
    write_cobertura(&run, base_dir, renderer, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_JSON: &str = r#"{
        "aggregate": {
            "team_coverage_percent": 66.67,
            "team_coverage_threshold": 75,
            "org_wide_coverage_percent": 81.2,
            "org_wide_coverage_threshold": 75,
            "total_test_classes_executed": 1,
            "total_test_classes_aborted": 0,
            "total_test_methods_executed": 3,
            "failed_test_method_count": 0
        },
        "classes": [
            {
                "class_name": "Foo",
                "api_version": "58.0",
                "coverage_percent": 66.67,
                "covered_lines": [1, 2],
                "uncovered_lines": [3],
                "length_without_comments_bytes": 512
            }
        ]
    }"#;

    #[test]
    fn test_resolve_link() {
        let wd = Path::new("/var/lib/jenkins/workspace/apex-ci");
        let base = Some("https://ci.example.com");

        assert_eq!(
            resolve_link(None, None, DEFAULT_CI_MARKER, wd).unwrap(),
            ReportLinkConfig::Local
        );
        assert_eq!(
            resolve_link(base, None, DEFAULT_CI_MARKER, wd).unwrap(),
            ReportLinkConfig::ContinuousIntegration {
                base_url: "https://ci.example.com".to_string(),
                job_name: "apex-ci".to_string(),
            }
        );
        assert_eq!(
            resolve_link(base, Some("release"), DEFAULT_CI_MARKER, Path::new("/tmp")).unwrap(),
            ReportLinkConfig::ContinuousIntegration {
                base_url: "https://ci.example.com".to_string(),
                job_name: "release".to_string(),
            }
        );
        assert!(resolve_link(None, Some("release"), DEFAULT_CI_MARKER, wd).is_err());
    }

    #[test]
    fn test_cmd_all_writes_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.json");
        std::fs::write(&input, RUN_JSON).unwrap();

        let out = cmd_all(
            &input,
            dir.path(),
            &ReportLinkConfig::Local,
            CoberturaReport::new(0),
        )
        .unwrap();

        assert!(out.contains("Wrote HTML report to"));
        assert!(out.contains("(1 classes)"));
        assert!(dir.path().join("Report/ApexUnitReport.html").is_file());
        assert!(dir.path().join("Cobertura4Apex.xml").is_file());
    }

    #[test]
    fn test_cmd_html_clamps_pass_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.json");
        let json = RUN_JSON
            .replace("\"total_test_methods_executed\": 3", "\"total_test_methods_executed\": 2")
            .replace("\"failed_test_method_count\": 0", "\"failed_test_method_count\": 5");
        std::fs::write(&input, json).unwrap();

        cmd_html(&input, dir.path(), &ReportLinkConfig::Local).unwrap();

        let html = std::fs::read_to_string(dir.path().join("Report/ApexUnitReport.html")).unwrap();
        assert!(html.contains("Test method pass count: 0"));
        assert!(html.contains("Test method fail count: 5"));
    }

    #[test]
    fn test_cmd_all_invalid_record_writes_neither_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.json");
        let json = RUN_JSON.replace("\"uncovered_lines\": [3]", "\"uncovered_lines\": [2, 3]");
        std::fs::write(&input, json).unwrap();

        let err = cmd_all(
            &input,
            dir.path(),
            &ReportLinkConfig::Local,
            CoberturaReport::new(0),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("both covered and uncovered"));
        assert!(!dir.path().join("Report").exists());
        assert!(!dir.path().join("Cobertura4Apex.xml").exists());
    }

    #[test]
    fn test_cmd_html_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_html(
            &dir.path().join("absent.json"),
            dir.path(),
            &ReportLinkConfig::Local,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
        assert!(!dir.path().join("Report").exists());
    }

    #[test]
    fn test_cmd_cobertura_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.json");
        std::fs::write(&input, "{ not json").unwrap();

        let err = cmd_cobertura(&input, dir.path(), CoberturaReport::new(0)).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid run results"));
        assert!(!dir.path().join("Cobertura4Apex.xml").exists());
    }
}
