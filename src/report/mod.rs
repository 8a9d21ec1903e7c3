pub mod cobertura;
pub mod html;
pub mod link;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{AuxiliaryListings, ClassCoverageRecord, CoverageAggregate, RunResults};
use crate::writer;

pub use cobertura::CoberturaReport;
pub use html::HtmlReport;
pub use link::ReportLinkConfig;

/// Read-only view over everything a run hands to the renderers.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub aggregate: &'a CoverageAggregate,
    /// `None` omits the detail table from the HTML report.
    pub classes: Option<&'a [ClassCoverageRecord]>,
    pub listings: &'a AuxiliaryListings,
}

impl<'a> ReportInput<'a> {
    pub fn new(aggregate: &'a CoverageAggregate, listings: &'a AuxiliaryListings) -> Self {
        Self {
            aggregate,
            classes: None,
            listings,
        }
    }

    #[must_use]
    pub fn with_classes(mut self, classes: &'a [ClassCoverageRecord]) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Class records, empty when none were supplied.
    pub fn class_records(&self) -> &'a [ClassCoverageRecord] {
        self.classes.unwrap_or_default()
    }
}

impl<'a> From<&'a RunResults> for ReportInput<'a> {
    fn from(run: &'a RunResults) -> Self {
        Self {
            aggregate: &run.aggregate,
            classes: run.classes.as_deref(),
            listings: &run.listings,
        }
    }
}

/// Every report format implements this trait.
pub trait Renderer {
    /// Where the report lands, relative to the run's base directory.
    fn output_path(&self, base_dir: &Path) -> PathBuf;

    /// Render the complete document in memory.
    fn render(&self, input: &ReportInput<'_>) -> Result<Vec<u8>>;
}

/// Render a report and write it in one shot. Nothing is written if
/// rendering fails. Returns the path written.
pub fn write_report(
    renderer: &dyn Renderer,
    input: &ReportInput<'_>,
    base_dir: &Path,
) -> Result<PathBuf> {
    let bytes = renderer.render(input)?;
    let path = renderer.output_path(base_dir);
    writer::write(&path, &bytes)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}
