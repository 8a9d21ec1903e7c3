use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error while {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot build coverage document: {0}")]
    DocumentBuild(String),

    #[error("XML serialization error: {0}")]
    Serialization(#[from] quick_xml::Error),

    #[error("Invalid run results in {}: {source}", path.display())]
    Input {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ReportError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
