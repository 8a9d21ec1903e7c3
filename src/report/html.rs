//! Human-readable HTML summary of a test run.
//!
//! The document is self-contained: a fixed inline stylesheet, the coverage
//! and test-execution summaries, a link to the detailed test report, the
//! per-class coverage table, the optional manifest listings and a fixed
//! footer.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::markup::{br, document, Element, Node};
use crate::model::{ClassCoverageRecord, CoverageAggregate};
use crate::report::{Renderer, ReportInput, ReportLinkConfig};

/// Directory, under the base directory, holding the HTML report.
pub const REPORT_DIR: &str = "Report";
pub const REPORT_FILE: &str = "ApexUnitReport.html";

/// Line numbers per visual row in the covered/uncovered cells.
pub const LINES_PER_ROW: usize = 10;

/// Rendered in place of an empty line list.
pub const EMPTY_LIST: &str = "-";

pub const BELOW_THRESHOLD_STYLE: &str = "color:crimson";
pub const AT_THRESHOLD_STYLE: &str = "color:green";

const TITLE: &str = "ApexUnit Report";

const STYLESHEET: &str = "body {background-color:white;} \
h1 {color:blue; font-size:300%; text-align:center;} \
h2 {color:blue; font-size:200%;} \
.summary {color:black; font-size:125%;} \
th {color:blue; font-size:125%; background-color:lightgrey;} \
td {text-align:center;}";

const COVERAGE_COLUMNS: [&str; 8] = [
    "Apex Class Name",
    "API Version",
    "Code Coverage %",
    "#Covered Lines",
    "#Uncovered Lines",
    "Covered Lines",
    "Uncovered Lines",
    "Length Without Comments(Bytes)",
];

const DUPLICATES_HEADING: &str =
    "Duplicate Apex Class Names Across Manifest Files And Regular Expressions";
const INVALIDS_HEADING: &str =
    "Invalid/Non-existent Apex Class Names Across Manifest Files And Regular Expressions";

const BEST_PRACTICES_URL: &str =
    "http://www.salesforce.com/us/developer/docs/apexcode/Content/apex_code_coverage_best_pract.htm";
const FOOTNOTE: &str = "* Code coverage is calculated by dividing the number of unique Apex code \
lines executed during your test method execution by the total number of Apex code lines in all \
of your trigger and classes.";
const FOOTNOTE_NOTE: &str = "(Note: these numbers do not include lines of code within your testMethods)";

/// HTML summary report renderer.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    test_report_href: String,
}

impl HtmlReport {
    /// `base_dir` is where the run's artifacts live; it anchors the local
    /// test-report link.
    pub fn new(link: &ReportLinkConfig, base_dir: &Path) -> Self {
        Self {
            test_report_href: link.href(base_dir),
        }
    }

    /// Build the document tree.
    pub fn build(&self, input: &ReportInput<'_>) -> Element {
        let aggregate = input.aggregate;
        let mut body = Element::new("body")
            .child(Element::new("h1").text(TITLE))
            .child(coverage_summary(aggregate))
            .child(test_execution_summary(aggregate))
            .child(
                Element::new("section")
                    .child(Element::new("h2").text("Apex Test Report:"))
                    .child(
                        Element::new("a")
                            .attr("style", "font-size:125%")
                            .attr("href", self.test_report_href.as_str())
                            .text("Detailed Test Report"),
                    ),
            );

        if let Some(classes) = input.classes {
            body.push(
                Element::new("section")
                    .child(Element::new("h2").text("Detailed code coverage report:"))
                    .child(coverage_table(classes, aggregate.team_coverage_threshold)),
            );
        }

        let listings = input.listings;
        if !listings.duplicate_class_entries.is_empty() {
            body.push(listing_table(DUPLICATES_HEADING, &listings.duplicate_class_entries));
        }
        if !listings.invalid_class_entries.is_empty() {
            body.push(listing_table(INVALIDS_HEADING, &listings.invalid_class_entries));
        }

        body.push(footer());

        Element::new("html")
            .attr("lang", "en")
            .child(
                Element::new("head")
                    .child(Element::new("meta").attr("charset", "utf-8"))
                    .child(Element::new("title").text(TITLE))
                    .child(Element::new("style").child(Node::Raw(STYLESHEET.to_string()))),
            )
            .child(body)
    }
}

impl Renderer for HtmlReport {
    fn output_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(REPORT_DIR).join(REPORT_FILE)
    }

    fn render(&self, input: &ReportInput<'_>) -> Result<Vec<u8>> {
        tracing::debug!(
            classes = input.class_records().len(),
            duplicates = input.listings.duplicate_class_entries.len(),
            invalid = input.listings.invalid_class_entries.len(),
            "rendering HTML report"
        );
        Ok(document(&self.build(input)).into_bytes())
    }
}

fn summary_line(text: String, below_threshold: bool) -> Element {
    let p = Element::new("p").attr("class", "summary");
    let p = if below_threshold {
        p.attr("style", BELOW_THRESHOLD_STYLE)
    } else {
        p
    };
    p.text(text)
}

fn coverage_summary(agg: &CoverageAggregate) -> Element {
    let team = format!(
        "Team code coverage: {:.2}%  [The customized team code coverage threshold was: {}%]",
        agg.team_coverage_percent, agg.team_coverage_threshold
    );
    let org = format!(
        "Org wide code coverage: {:.2}%  [The customized org wide code coverage threshold was: {}%]",
        agg.org_wide_coverage_percent, agg.org_wide_coverage_threshold
    );
    Element::new("section")
        .child(Element::new("h2").text("Code Coverage Summary: *"))
        .child(summary_line(team, agg.team_below_threshold()))
        .child(summary_line(org, agg.org_wide_below_threshold()))
}

fn test_execution_summary(agg: &CoverageAggregate) -> Element {
    let mut lines = vec![format!(
        "Total test classes executed: {}",
        agg.total_test_classes_executed
    )];
    if agg.total_test_classes_aborted > 0 {
        lines.push(format!(
            "Total Apex test classes aborted: {}",
            agg.total_test_classes_aborted
        ));
    }
    lines.push(format!(
        "Total test methods executed: {}",
        agg.total_test_methods_executed
    ));
    lines.push(format!("Test method pass count: {}", agg.pass_count()));
    lines.push(format!(
        "Test method fail count: {}",
        agg.failed_test_method_count
    ));

    Element::new("section")
        .child(Element::new("h2").text("Test Execution Summary:"))
        .child(
            Element::new("p")
                .attr("class", "summary")
                .children(interleave_breaks(lines)),
        )
}

fn coverage_table(classes: &[ClassCoverageRecord], threshold: f64) -> Element {
    let header = Element::new("tr").children(
        COVERAGE_COLUMNS
            .iter()
            .map(|label| Element::new("th").text(*label)),
    );
    Element::new("table")
        .attr("border", "1")
        .attr("class", "coverage")
        .child(header)
        .children(classes.iter().map(|record| coverage_row(record, threshold)))
}

fn coverage_row(record: &ClassCoverageRecord, threshold: f64) -> Element {
    let style = if record.below_threshold(threshold) {
        BELOW_THRESHOLD_STYLE
    } else {
        AT_THRESHOLD_STYLE
    };
    let cell = |nodes: Vec<Node>| Element::new("td").children(nodes);
    Element::new("tr")
        .attr("style", style)
        .child(cell(vec![record.class_name.as_str().into()]))
        .child(cell(vec![record.api_version.as_str().into()]))
        .child(cell(vec![format_percent(record.coverage_percent).into()]))
        .child(cell(vec![record.covered_count().to_string().into()]))
        .child(cell(vec![record.uncovered_count().to_string().into()]))
        .child(cell(line_list(&record.covered_lines)))
        .child(cell(line_list(&record.uncovered_lines)))
        .child(cell(vec![record
            .length_without_comments_bytes
            .to_string()
            .into()]))
}

fn listing_table(heading: &str, entries: &[String]) -> Element {
    Element::new("table")
        .attr("border", "1")
        .attr("class", "listing")
        .child(Element::new("tr").child(Element::new("th").text(heading)))
        .children(
            entries
                .iter()
                .map(|entry| Element::new("tr").child(Element::new("td").text(entry.as_str()))),
        )
}

fn footer() -> Element {
    Element::new("footer")
        .child(
            Element::new("a")
                .attr("href", BEST_PRACTICES_URL)
                .text("Apex_Code_Coverage_Best_Practices"),
        )
        .child(
            Element::new("p").child(
                Element::new("i")
                    .text(FOOTNOTE)
                    .child(br())
                    .text(FOOTNOTE_NOTE),
            ),
        )
}

/// Coverage percentage with two decimals and a trailing `%`.
#[must_use]
pub fn format_percent(pct: f64) -> String {
    format!("{pct:.2}%")
}

/// Comma-joined line numbers, [`LINES_PER_ROW`] per row.
#[must_use]
pub fn line_list_rows(lines: &[u32]) -> Vec<String> {
    lines
        .chunks(LINES_PER_ROW)
        .map(|chunk| {
            chunk
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect()
}

/// Cell content for a line list: rows separated by `,<br/>`, or
/// [`EMPTY_LIST`] when there are no lines.
fn line_list(lines: &[u32]) -> Vec<Node> {
    if lines.is_empty() {
        return vec![EMPTY_LIST.into()];
    }
    let rows = line_list_rows(lines);
    let last = rows.len() - 1;
    let mut nodes = Vec::with_capacity(rows.len() * 2);
    for (i, row) in rows.into_iter().enumerate() {
        if i < last {
            nodes.push(Node::Text(format!("{row},")));
            nodes.push(br().into());
        } else {
            nodes.push(Node::Text(row));
        }
    }
    nodes
}

fn interleave_breaks(lines: Vec<String>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            nodes.push(br().into());
        }
        nodes.push(Node::Text(line));
    }
    nodes
}
