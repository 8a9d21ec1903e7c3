use std::path::Path;

use crate::error::{ReportError, Result};
use crate::model::RunResults;

/// Read the run results an Apex test run left behind (JSON).
pub fn load_run(path: &Path) -> Result<RunResults> {
    let content = std::fs::read(path).map_err(|e| ReportError::io("reading", path, e))?;
    let run: RunResults = serde_json::from_slice(&content).map_err(|source| ReportError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    if run.aggregate.failed_test_method_count > run.aggregate.total_test_methods_executed {
        tracing::warn!(
            failed = run.aggregate.failed_test_method_count,
            executed = run.aggregate.total_test_methods_executed,
            "more failed test methods than executed; pass count clamps to zero"
        );
    }
    tracing::debug!(
        path = %path.display(),
        classes = run.classes.as_ref().map_or(0, Vec::len),
        "loaded run results"
    );
    Ok(run)
}
