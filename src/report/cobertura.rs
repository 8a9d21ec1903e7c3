//! Writer for Cobertura XML coverage reports.
//!
//! Output structure (Cobertura 0.3 DTD):
//!   <?xml version="1.0" encoding="UTF-8" standalone="no"?>
//!   <!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-03.dtd">
//!   <coverage timestamp="..." version="0.0" branch-rate="0.0" line-rate="0.0">
//!     <sources><source>Salesforce.com</source></sources>
//!     <packages>
//!       <package name="..." complexity="0.0" branch-rate="0.0" line-rate="...">
//!         <classes>
//!           <class name="..." filename="..." complexity="0.0" branch-rate="0.0" line-rate="...">
//!             <methods/>
//!             <lines>
//!               <line number="..." hits="0|1"/>
//!             </lines>
//!           </class>
//!         </classes>
//!       </package>
//!     </packages>
//!   </coverage>
//!
//! Rates are written as percentages (0-100), not fractions.

use std::path::{Path, PathBuf};

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::model::{percent, ClassCoverageRecord};
use crate::report::{Renderer, ReportInput};

pub const REPORT_FILE: &str = "Cobertura4Apex.xml";
pub const DTD_SYSTEM_ID: &str = "http://cobertura.sourceforge.net/xml/coverage-03.dtd";

/// Apex has no packages; every class goes into this one.
pub const PACKAGE_NAME: &str = "Bayer Veeva";
const SOURCE: &str = "Salesforce.com";
const ZERO_RATE: &str = "0.0";

/// Cobertura XML renderer. The timestamp is fixed at construction so a
/// given instance always renders the same bytes.
#[derive(Debug, Clone, Copy)]
pub struct CoberturaReport {
    timestamp_millis: i64,
}

impl CoberturaReport {
    pub fn new(timestamp_millis: i64) -> Self {
        Self { timestamp_millis }
    }

    /// Stamp the report with the current time.
    pub fn now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    fn write_document(&self, classes: &[ClassCoverageRecord]) -> Result<Vec<u8>> {
        for record in classes {
            record.validate()?;
        }

        let covered: u64 = classes.iter().map(|c| c.covered_count() as u64).sum();
        let total: u64 = classes.iter().map(|c| c.total_lines() as u64).sum();
        let package_rate = rate_attr(percent(covered, total));

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(format!(
            "coverage SYSTEM \"{DTD_SYSTEM_ID}\""
        ))))?;

        let timestamp = self.timestamp_millis.to_string();
        writer.write_event(Event::Start(BytesStart::new("coverage").with_attributes([
            ("timestamp", timestamp.as_str()),
            ("version", ZERO_RATE),
            ("branch-rate", ZERO_RATE),
            ("line-rate", ZERO_RATE),
        ])))?;

        writer.write_event(Event::Start(BytesStart::new("sources")))?;
        writer.write_event(Event::Start(BytesStart::new("source")))?;
        writer.write_event(Event::Text(BytesText::new(SOURCE)))?;
        writer.write_event(Event::End(BytesEnd::new("source")))?;
        writer.write_event(Event::End(BytesEnd::new("sources")))?;

        writer.write_event(Event::Start(BytesStart::new("packages")))?;
        writer.write_event(Event::Start(BytesStart::new("package").with_attributes([
            ("name", PACKAGE_NAME),
            ("complexity", ZERO_RATE),
            ("branch-rate", ZERO_RATE),
            ("line-rate", package_rate.as_str()),
        ])))?;

        if classes.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("classes")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("classes")))?;
            for record in classes {
                write_class(&mut writer, record)?;
            }
            writer.write_event(Event::End(BytesEnd::new("classes")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("package")))?;
        writer.write_event(Event::End(BytesEnd::new("packages")))?;
        writer.write_event(Event::End(BytesEnd::new("coverage")))?;

        let mut out = writer.into_inner();
        out.push(b'\n');
        Ok(out)
    }
}

impl Renderer for CoberturaReport {
    fn output_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(REPORT_FILE)
    }

    fn render(&self, input: &ReportInput<'_>) -> Result<Vec<u8>> {
        let classes = input.class_records();
        tracing::debug!(classes = classes.len(), "rendering Cobertura report");
        self.write_document(classes)
    }
}

fn write_class(writer: &mut Writer<Vec<u8>>, record: &ClassCoverageRecord) -> Result<()> {
    if record.total_lines() > 0 && (record.line_percent() - record.coverage_percent).abs() > 1.0 {
        tracing::debug!(
            class = %record.class_name,
            reported = record.coverage_percent,
            from_lines = record.line_percent(),
            "coverage percentage differs from line counts"
        );
    }

    let line_rate = rate_attr(record.coverage_percent);
    writer.write_event(Event::Start(BytesStart::new("class").with_attributes([
        ("name", record.class_name.as_str()),
        ("filename", record.class_name.as_str()),
        ("complexity", ZERO_RATE),
        ("branch-rate", ZERO_RATE),
        ("line-rate", line_rate.as_str()),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("methods")))?;

    if record.total_lines() == 0 {
        writer.write_event(Event::Empty(BytesStart::new("lines")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("lines")))?;
        // Uncovered lines first, then covered, for stable output.
        let uncovered = record.uncovered_lines.iter().map(|&n| (n, "0"));
        let covered = record.covered_lines.iter().map(|&n| (n, "1"));
        for (number, hits) in uncovered.chain(covered) {
            let number = number.to_string();
            writer.write_event(Event::Empty(
                BytesStart::new("line").with_attributes([("number", number.as_str()), ("hits", hits)]),
            ))?;
        }
        writer.write_event(Event::End(BytesEnd::new("lines")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("class")))?;
    Ok(())
}

/// Format a rate the way Cobertura consumers read doubles: always with a
/// fractional part ("100.0", "66.67").
fn rate_attr(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuxiliaryListings, CoverageAggregate};

    fn record(name: &str, pct: f64, covered: Vec<u32>, uncovered: Vec<u32>) -> ClassCoverageRecord {
        ClassCoverageRecord {
            class_name: name.to_string(),
            api_version: "58.0".to_string(),
            coverage_percent: pct,
            covered_lines: covered,
            uncovered_lines: uncovered,
            length_without_comments_bytes: 0,
        }
    }

    fn render(classes: &[ClassCoverageRecord]) -> String {
        let agg = CoverageAggregate::default();
        let listings = AuxiliaryListings::default();
        let input = ReportInput::new(&agg, &listings).with_classes(classes);
        String::from_utf8(CoberturaReport::new(1_700_000_000_000).render(&input).unwrap()).unwrap()
    }

    #[test]
    fn test_rate_attr() {
        assert_eq!(rate_attr(100.0), "100.0");
        assert_eq!(rate_attr(66.67), "66.67");
        assert_eq!(rate_attr(0.0), "0.0");
    }

    #[test]
    fn test_prolog() {
        let xml = render(&[]);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#));
        assert!(xml.contains(
            r#"<!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-03.dtd">"#
        ));
        assert!(xml.contains(r#"timestamp="1700000000000""#));
        assert!(xml.contains("<source>Salesforce.com</source>"));
    }

    #[test]
    fn test_empty_run_is_fully_covered() {
        let xml = render(&[]);
        assert!(xml.contains(
            r#"<package name="Bayer Veeva" complexity="0.0" branch-rate="0.0" line-rate="100.0">"#
        ));
        assert!(xml.contains("<classes/>"));
    }

    #[test]
    fn test_package_rate_aggregates_lines() {
        let xml = render(&[
            record("A", 50.0, vec![1], vec![2]),
            record("B", 100.0, vec![1, 2], vec![]),
        ]);
        assert!(xml.contains(r#"line-rate="75.0">"#));
    }

    #[test]
    fn test_class_line_rate_is_verbatim_percentage() {
        let xml = render(&[record("Foo", 66.67, vec![1, 2], vec![3])]);
        assert!(xml.contains(
            r#"<class name="Foo" filename="Foo" complexity="0.0" branch-rate="0.0" line-rate="66.67">"#
        ));
        assert!(xml.contains("<methods/>"));
    }

    #[test]
    fn test_uncovered_lines_written_first() {
        let xml = render(&[record("Foo", 66.67, vec![1, 2], vec![3])]);
        let uncovered = xml.find(r#"<line number="3" hits="0"/>"#).unwrap();
        let first_covered = xml.find(r#"<line number="1" hits="1"/>"#).unwrap();
        let second_covered = xml.find(r#"<line number="2" hits="1"/>"#).unwrap();
        assert!(uncovered < first_covered);
        assert!(first_covered < second_covered);
    }

    #[test]
    fn test_class_names_are_escaped() {
        let xml = render(&[record("A&B", 0.0, vec![], vec![])]);
        assert!(xml.contains(r#"name="A&amp;B""#));
        assert!(xml.contains("<lines/>"));
    }

    #[test]
    fn test_invalid_record_is_build_error() {
        let agg = CoverageAggregate::default();
        let listings = AuxiliaryListings::default();
        let classes = [record("Foo", 150.0, vec![], vec![])];
        let input = ReportInput::new(&agg, &listings).with_classes(&classes);
        let err = CoberturaReport::new(0).render(&input).unwrap_err();
        assert!(matches!(err, crate::error::ReportError::DocumentBuild(_)));
    }
}
