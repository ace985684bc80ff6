//! Parsing of whitespace-delimited command output.
//!
//! The first non-blank line holds the column headers. Every following line is
//! split on whitespace into at most as many fields as there are headers, so
//! the last column keeps its internal spaces. This is what makes `ps aux`
//! command lines survive parsing intact.

use serde::Serialize;

use crate::types::ProcessRecord;

/// One data row, keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    fields: Vec<(String, String)>,
}

impl TableRow {
    /// Value for a header, if the row had a token for it
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Value for a header, or the empty string when absent
    #[must_use]
    pub fn get_or_empty(&self, header: &str) -> &str {
        self.get(header).unwrap_or("")
    }

    /// Number of populated fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(header, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Parse header + rows text into records.
///
/// Blank lines are skipped. A row with fewer tokens than headers only
/// populates the leading fields.
#[must_use]
pub fn parse_table(text: &str) -> Vec<TableRow> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split_whitespace().collect();

    lines
        .map(|line| {
            let values = split_bounded(line, headers.len());
            TableRow {
                fields: headers
                    .iter()
                    .zip(values)
                    .map(|(h, v)| ((*h).to_string(), v.to_string()))
                    .collect(),
            }
        })
        .collect()
}

/// Split on runs of whitespace into at most `max_fields` pieces; the last
/// piece is the untouched remainder of the line.
fn split_bounded(line: &str, max_fields: usize) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line.trim();

    while max_fields > 0 && !rest.is_empty() {
        if fields.len() + 1 == max_fields {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }

    fields
}

/// Parse `ps aux` output into process records.
#[must_use]
pub fn parse_psaux(text: &str) -> Vec<ProcessRecord> {
    parse_table(text)
        .iter()
        .map(|row| ProcessRecord {
            pid: row.get_or_empty("PID").to_string(),
            user: row.get_or_empty("USER").to_string(),
            start: row.get_or_empty("START").to_string(),
            time: row.get_or_empty("TIME").to_string(),
            command: row.get_or_empty("COMMAND").to_string(),
            cwd: None,
        })
        .collect()
}
