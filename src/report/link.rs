use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the JUnit-style test report the runner leaves in the base
/// directory.
pub const TEST_REPORT_FILE: &str = "ApexUnitReport.xml";

/// Where the "Detailed Test Report" link of the HTML report points.
///
/// Decided by the caller before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportLinkConfig {
    /// Link the test report file sitting in the base directory.
    #[default]
    Local,
    /// Link the last completed build's test report on a CI server.
    ContinuousIntegration { base_url: String, job_name: String },
}

impl ReportLinkConfig {
    /// Choose CI mode when `working_dir` contains `marker`, using its last
    /// path segment as the job name.
    pub fn detect(working_dir: &Path, marker: &str, base_url: &str) -> Self {
        let dir = working_dir.to_string_lossy();
        if marker.is_empty() || !dir.contains(marker) {
            return ReportLinkConfig::Local;
        }
        let job_name = dir
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        ReportLinkConfig::ContinuousIntegration {
            base_url: base_url.to_string(),
            job_name,
        }
    }

    /// Link target for a report rooted at `base_dir`.
    pub fn href(&self, base_dir: &Path) -> String {
        match self {
            ReportLinkConfig::Local => local_report_path(base_dir).display().to_string(),
            ReportLinkConfig::ContinuousIntegration { base_url, job_name } => format!(
                "{}/job/{}/lastCompletedBuild/testReport/",
                base_url.trim_end_matches('/'),
                job_name
            ),
        }
    }
}

fn local_report_path(base_dir: &Path) -> PathBuf {
    base_dir.join(TEST_REPORT_FILE)
}
