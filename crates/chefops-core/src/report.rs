//! Aligned tab-separated table of repository reports.
//!
//! Columns are declared as `(header, dotted.path)` pairs. Each report is
//! serialized to JSON and the path is walked through the nested maps, so a
//! column can point anywhere in the report without the renderer knowing the
//! report type.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::{RepoReport, UPGRADE_MARKER};

/// A table column: display header plus the dotted path of its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportColumn {
    /// Header text
    pub header: &'static str,
    /// Dotted attribute path, e.g. `cloc_data.Python.code`
    pub path: &'static str,
}

impl ReportColumn {
    /// Declare a column
    #[must_use]
    pub const fn new(header: &'static str, path: &'static str) -> Self {
        Self { header, path }
    }
}

/// Columns of the chef code report.
pub const DEFAULT_REPORT_COLUMNS: &[ReportColumn] = &[
    ReportColumn::new("repo_name", "repo_name"),
    ReportColumn::new("branch", "branch"),
    ReportColumn::new("requirements.txt", "requirements_check.verdict"),
    ReportColumn::new("sushichef.py", "sushichef_check.verdict"),
    ReportColumn::new("pyfiles", "cloc_data.Python.nFiles"),
    ReportColumn::new("pyLOC", "cloc_data.Python.code"),
    ReportColumn::new("md", "cloc_data.Markdown.code"),
    ReportColumn::new("Bash", "cloc_data.Bourne Shell.code"),
    ReportColumn::new("js", "cloc_data.JavaScript.code"),
    ReportColumn::new("JSON", "cloc_data.JSON.code"),
    ReportColumn::new("HTML", "cloc_data.HTML.code"),
    ReportColumn::new("CSS", "cloc_data.CSS.code"),
];

/// Header of the trailing comments column.
pub const COMMENTS_HEADER: &str = "Comments";

/// Walk a dotted path through nested maps.
///
/// Returns `None` when any step is missing or passes through `null` or a
/// non-map value.
#[must_use]
pub fn rget<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        _ => None,
    })
}

/// Render a cell. Missing, null, false, zero and empty values render empty.
#[must_use]
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) if items.is_empty() => String::new(),
        Some(Value::Object(map)) if map.is_empty() => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Width of each column: the longest of the header and every rendered value.
#[must_use]
pub fn column_widths(rows: &[Value], columns: &[ReportColumn]) -> Vec<usize> {
    columns
        .iter()
        .map(|col| {
            rows.iter()
                .map(|row| render_value(rget(row, col.path)).chars().count())
                .fold(col.header.chars().count(), usize::max)
        })
        .collect()
}

fn pad(text: &str, width: usize) -> String {
    let mut cell = format!("{text:<width$}");
    if cell.contains(UPGRADE_MARKER) {
        // the marker is one glyph on screen but two chars wide
        cell.push(' ');
    }
    cell
}

/// Render reports as an aligned table.
///
/// Every report is turned into a JSON value, widths are computed over all
/// rows, and only then are lines produced. Output ends with a newline.
pub fn render_table<T: Serialize>(
    reports: &[T],
    columns: &[ReportColumn],
    comments: impl Fn(&T) -> Vec<String>,
) -> Result<String> {
    let rows = reports
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;
    let widths = column_widths(&rows, columns);

    let mut out = String::new();

    let mut header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| pad(col.header, w))
        .collect();
    header.push(COMMENTS_HEADER.to_string());
    out.push_str(&header.join("\t"));
    out.push('\n');

    for (report, row) in reports.iter().zip(&rows) {
        let mut cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| pad(&render_value(rget(row, col.path)), w))
            .collect();
        cells.push(comments(report).join("; "));
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }

    Ok(out)
}

/// Render chef repository reports with the default columns.
pub fn render_code_reports(reports: &[RepoReport]) -> Result<String> {
    render_table(reports, DEFAULT_REPORT_COLUMNS, |r| {
        r.comments().into_iter().map(String::from).collect()
    })
}
