use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository owner as returned by the GitHub API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoOwner {
    /// Login name of the user or organization
    pub login: String,
}

/// A GitHub repository, as listed by the REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    /// Short repository name
    pub name: String,

    /// `owner/name`
    pub full_name: String,

    /// Browser URL
    pub html_url: String,

    /// Owner account
    #[serde(default)]
    pub owner: RepoOwner,

    /// Default branch
    #[serde(default)]
    pub default_branch: Option<String>,

    /// Number of forks
    #[serde(default)]
    pub forks_count: u64,

    /// Open issues plus open pull requests
    #[serde(default)]
    pub open_issues_count: u64,

    /// Whether the repository is archived
    #[serde(default)]
    pub archived: bool,

    /// Last push
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RepoSummary {
    /// Default branch, falling back to `master`
    #[must_use]
    pub fn branch(&self) -> &str {
        self.default_branch.as_deref().unwrap_or("master")
    }
}

/// A branch as listed by `/repos/{owner}/{name}/branches`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Head commit
    pub commit: CommitRef,
}

/// Bare commit reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit hash
    pub sha: String,
}

impl CommitRef {
    /// First seven characters of the hash
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// A commit as returned by `/repos/{owner}/{name}/commits/{sha}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash
    pub sha: String,
    /// GitHub account of the author, when the email maps to one
    #[serde(default)]
    pub author: Option<RepoOwner>,
    /// Git-level commit data
    pub commit: CommitDetail,
}

/// Git-level part of a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    /// Full commit message
    #[serde(default)]
    pub message: String,
    /// Committer signature
    #[serde(default)]
    pub committer: Option<GitSignature>,
}

/// Name and date of a git signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSignature {
    /// Signature date
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Commit {
    /// First line of the commit message
    #[must_use]
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }

    /// Author login, or `?` for commits not linked to an account
    #[must_use]
    pub fn author_login(&self) -> &str {
        self.author.as_ref().map_or("?", |a| a.login.as_str())
    }

    /// Committer date
    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.commit.committer.as_ref().and_then(|c| c.date)
    }
}

/// Issue or pull request label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// An open pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Title
    pub title: String,
    /// `open` or `closed`
    pub state: String,
    /// Author
    #[serde(default)]
    pub user: RepoOwner,
    /// Last update
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Labels
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// An open issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number
    pub number: u64,
    /// Title
    pub title: String,
    /// `open` or `closed`
    pub state: String,
    /// Number of comments
    #[serde(default)]
    pub comments: u64,
    /// Labels
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present when the issue is a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// The issues endpoint lists pull requests too
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// A branch and, in detailed reports, its head commit
#[derive(Debug, Clone, Serialize)]
pub struct BranchActivity {
    /// The branch
    #[serde(flatten)]
    pub branch: Branch,
    /// Head commit details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Commit>,
}

/// A fork and the branches it carries
#[derive(Debug, Clone, Serialize)]
pub struct ForkActivity {
    /// The fork
    pub repo: RepoSummary,
    /// Branch names of the fork, `master` excluded
    pub branches: Vec<String>,
}

/// Forks, branches, pull requests and issues of one repository
#[derive(Debug, Clone, Serialize)]
pub struct RepoActivity {
    /// The repository
    pub repo: RepoSummary,
    /// Forks
    pub forks: Vec<ForkActivity>,
    /// Branches
    pub branches: Vec<BranchActivity>,
    /// Open pull requests
    pub pulls: Vec<PullRequest>,
    /// Open issues, pull requests excluded
    pub issues: Vec<Issue>,
}
