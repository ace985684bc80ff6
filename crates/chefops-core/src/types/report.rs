//! Code repository report types.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;

/// Marker appended to verdicts that need an upgrade.
pub const UPGRADE_MARKER: &str = "\u{2b06}\u{fe0f}";

/// Outcome of a single convention check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Check passed
    Pass,
    /// Dependency present but not pinned, so it resolves to the latest release
    PassUnpinned,
    /// Dependency pinned with a lower bound, so it resolves to the latest release
    PassMinimum,
    /// Required file or dependency is missing
    Missing,
    /// Dependency pinned to an outdated release
    NeedsUpgrade {
        /// The pinned version
        pinned: String,
    },
}

impl Verdict {
    /// Returns true for the passing variants
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass | Self::PassUnpinned | Self::PassMinimum)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "✅"),
            Self::PassUnpinned => write!(f, "✅ *"),
            Self::PassMinimum => write!(f, "✅ >="),
            Self::Missing => write!(f, "❌"),
            Self::NeedsUpgrade { pinned } => write!(f, "{pinned} {UPGRADE_MARKER}"),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A verdict plus an optional free-text comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Short status glyph
    pub verdict: Verdict,
    /// Extra detail shown in the Comments column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CheckResult {
    /// A result without a comment
    #[must_use]
    pub const fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            comment: None,
        }
    }

    /// Attach a comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Per-language line counts as reported by `cloc`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    /// Number of files
    #[serde(rename = "nFiles")]
    pub n_files: u64,
    /// Blank lines
    pub blank: u64,
    /// Comment lines
    pub comment: u64,
    /// Code lines
    pub code: u64,
}

/// Lines-of-code summary keyed by language name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClocSummary {
    /// Counts per language (`Python`, `Bourne Shell`, `SUM`, ...)
    pub languages: BTreeMap<String, LanguageCount>,
}

impl ClocSummary {
    /// Decode the output of `cloc --json`.
    ///
    /// The `header` entry and anything else that is not a language count are
    /// skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut languages = BTreeMap::new();
        for (name, value) in raw {
            if name == "header" {
                continue;
            }
            match serde_json::from_value::<LanguageCount>(value) {
                Ok(count) => {
                    languages.insert(name, count);
                }
                Err(e) => debug!(entry = %name, error = %e, "skipping cloc entry"),
            }
        }
        Ok(Self { languages })
    }

    /// Counts for one language
    #[must_use]
    pub fn language(&self, name: &str) -> Option<&LanguageCount> {
        self.languages.get(name)
    }
}

/// Convention checks and metrics for one chef repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    /// Repository name
    pub repo_name: String,
    /// Branch the checks ran against
    pub branch: String,
    /// `requirements.txt` check
    pub requirements_check: CheckResult,
    /// `sushichef.py` entrypoint check
    pub sushichef_check: CheckResult,
    /// Lines of code per language, if `cloc` was available
    pub cloc_data: Option<ClocSummary>,
}

impl RepoReport {
    /// Row for a repository that could not be checked: every check fails and
    /// the reason goes in the comments.
    #[must_use]
    pub fn failed(
        repo_name: impl Into<String>,
        branch: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            repo_name: repo_name.into(),
            branch: branch.into(),
            requirements_check: CheckResult::new(Verdict::Missing).with_comment(reason),
            sushichef_check: CheckResult::new(Verdict::Missing),
            cloc_data: None,
        }
    }

    /// Comments from every sub-report, in column order
    #[must_use]
    pub fn comments(&self) -> Vec<&str> {
        [&self.requirements_check, &self.sushichef_check]
            .into_iter()
            .filter_map(|check| check.comment.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOC_OUTPUT: &str = r#"{
        "header": {"cloc_url": "github.com/AlDanial/cloc", "n_files": 4, "n_lines": 120},
        "Python": {"nFiles": 3, "blank": 10, "comment": 5, "code": 90},
        "Markdown": {"nFiles": 1, "blank": 2, "comment": 0, "code": 13},
        "SUM": {"blank": 12, "comment": 5, "code": 103, "nFiles": 4}
    }"#;

    #[test]
    fn cloc_summary_skips_header() {
        let summary = ClocSummary::from_json(CLOC_OUTPUT).unwrap();
        assert!(summary.language("header").is_none());
        assert_eq!(summary.language("Python").unwrap().code, 90);
        assert_eq!(summary.language("SUM").unwrap().n_files, 4);
    }

    #[test]
    fn failed_report_carries_reason() {
        let report = RepoReport::failed("sushi-chef-typo", "master", "git clone failed");
        assert!(!report.requirements_check.verdict.is_pass());
        assert_eq!(report.sushichef_check.verdict, Verdict::Missing);
        assert!(report.cloc_data.is_none());
        assert_eq!(report.comments(), vec!["git clone failed"]);
    }

    #[test]
    fn verdict_glyphs() {
        assert_eq!(Verdict::Pass.to_string(), "✅");
        assert_eq!(Verdict::PassUnpinned.to_string(), "✅ *");
        assert_eq!(Verdict::PassMinimum.to_string(), "✅ >=");
        assert_eq!(Verdict::Missing.to_string(), "❌");
        assert_eq!(
            Verdict::NeedsUpgrade {
                pinned: "0.6.2".into()
            }
            .to_string(),
            format!("0.6.2 {UPGRADE_MARKER}")
        );
    }

    #[test]
    fn report_serializes_to_nested_shape() {
        let report = RepoReport {
            repo_name: "sushi-chef-demo".into(),
            branch: "master".into(),
            requirements_check: CheckResult::new(Verdict::Pass),
            sushichef_check: CheckResult::new(Verdict::Missing).with_comment("Python files: a.py"),
            cloc_data: Some(ClocSummary::from_json(CLOC_OUTPUT).unwrap()),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["requirements_check"]["verdict"], "✅");
        assert_eq!(value["cloc_data"]["Python"]["nFiles"], 3);
        assert_eq!(report.comments(), vec!["Python files: a.py"]);
    }
}
