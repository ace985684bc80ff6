//! Selection and clean-up of chef processes from a process listing.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::types::ProcessRecord;

/// Python programs that are not chef scripts.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "system-config",
    "cinnamon-killer",
    "apport-gtk",
    "buildkite",
    "gpt2-slackbot",
    "jamalex/.virtualenvs",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"--token=(?P<car>[\da-f]{6})(?P<cdr>[\da-f]{34})").expect("valid token pattern")
    })
}

/// Keeps python processes that don't match any exclusion pattern
#[derive(Debug, Clone)]
pub struct ProcessFilter {
    needle: String,
    exclude: Vec<String>,
}

impl Default for ProcessFilter {
    fn default() -> Self {
        Self {
            needle: "python".to_string(),
            exclude: DEFAULT_EXCLUDE_PATTERNS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ProcessFilter {
    /// Filter with a custom exclusion list
    #[must_use]
    pub fn with_excludes<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns true if the process should be reported
    #[must_use]
    pub fn matches(&self, process: &ProcessRecord) -> bool {
        process.command.contains(&self.needle)
            && !self.exclude.iter().any(|pat| process.command.contains(pat.as_str()))
    }

    /// Matching processes, tokens redacted, sorted by command line
    #[must_use]
    pub fn select(&self, processes: Vec<ProcessRecord>) -> Vec<ProcessRecord> {
        let mut selected: Vec<ProcessRecord> = processes
            .into_iter()
            .filter(|p| self.matches(p))
            .map(|mut p| {
                p.command = redact_token(&p.command);
                p
            })
            .collect();
        selected.sort_by(|a, b| a.command.cmp(&b.command));
        selected
    }
}

/// Shorten `--token=<40 hex>` to its first six characters followed by `...`.
#[must_use]
pub fn redact_token(command: &str) -> String {
    token_pattern()
        .replace_all(command, |caps: &Captures<'_>| format!("--token={}...", &caps["car"]))
        .into_owned()
}

/// Fill in `cwd` for every record.
///
/// `resolve` is called once per distinct command line with the first process
/// running it; the answer is shared by the whole group. Records should already
/// be sorted by command.
pub fn enrich_cwd<F>(records: &mut [ProcessRecord], mut resolve: F)
where
    F: FnMut(&ProcessRecord) -> Option<String>,
{
    let mut start = 0;
    while start < records.len() {
        let mut end = start + 1;
        while end < records.len() && records[end].command == records[start].command {
            end += 1;
        }
        let cwd = resolve(&records[start]);
        for record in &mut records[start..end] {
            record.cwd.clone_from(&cwd);
        }
        start = end;
    }
}

/// Parse `pwdx` output (`<pid>: <path>`) into the path.
#[must_use]
pub fn parse_pwdx(output: &str) -> Option<String> {
    let (_, path) = output.trim().split_once(':')?;
    let path = path.trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
