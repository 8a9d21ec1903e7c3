//! The only place reports touch the filesystem.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ReportError, Result};

/// Write `bytes` to `path`, creating parent directories as needed and
/// replacing any existing file.
///
/// Content goes to a temp file beside the target which is then renamed into
/// place, so a failed write never leaves a truncated report behind.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io("creating directory", dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| ReportError::io("creating temp file in", dir, e))?;
    if let Err(e) = tmp.write_all(bytes).and_then(|()| tmp.flush()) {
        return Err(ReportError::io("writing", tmp.path(), e));
    }
    tmp.persist(path)
        .map_err(|e| ReportError::io("replacing", path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}
