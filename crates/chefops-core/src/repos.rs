//! Which GitHub repositories count as chef repositories.

use crate::types::RepoSummary;

/// Name fragment shared by chef repositories.
pub const CHEF_REPO_MARKER: &str = "sushi-chef-";

/// Repositories that are no longer in active use.
pub const DEFAULT_DEPRECATED_REPOS: &[&str] = &[
    "learningequality/sushi-chef-khan-academy-legacy",
    "learningequality/sushi-chef-pradigi",
    "learningequality/cloud-kolibri-demo",
    "learningequality/cloud-chef",
    "learningequality/sushibar",
    "learningequality/KhanTsvExports",
    "learningequality/pipeline-panic",
];

/// Chef repositories outside the organization naming pattern.
pub const DEFAULT_EXTERNAL_CHEF_REPOS: &[&str] =
    &["prathamopenschool1/pratham-content-integration-script"];

/// Non-chef repositories of the content pipeline.
pub const DEFAULT_PIPELINE_REPOS: &[&str] = &[
    "learningequality/le-utils",
    "learningequality/ricecooker",
    "learningequality/pressurecooker",
    "learningequality/pycaption",
    "learningequality/sample-channels",
    "learningequality/content-automation-scripts",
    "learningequality/imscp",
    "learningequality/microwave",
    "learningequality/treediffer",
    "learningequality/BasicCrawler",
    "learningequality/webmixer",
    "learningequality/cookiecutter-chef",
    "learningequality/html-app-starter",
];

/// Picks chef repositories out of an organization listing
#[derive(Debug, Clone)]
pub struct ChefRepoSelector {
    deprecated: Vec<String>,
}

impl Default for ChefRepoSelector {
    fn default() -> Self {
        Self::new(DEFAULT_DEPRECATED_REPOS.iter().copied())
    }
}

impl ChefRepoSelector {
    /// Selector with a custom deprecated list (`owner/name` entries)
    #[must_use]
    pub fn new<I, S>(deprecated: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deprecated: deprecated.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the repository is an active chef repository
    #[must_use]
    pub fn is_chef_repo(&self, repo: &RepoSummary) -> bool {
        repo.name.contains(CHEF_REPO_MARKER) && !self.deprecated.iter().any(|d| *d == repo.full_name)
    }

    /// Active chef repositories, in listing order
    #[must_use]
    pub fn select(&self, repos: Vec<RepoSummary>) -> Vec<RepoSummary> {
        repos.into_iter().filter(|r| self.is_chef_repo(r)).collect()
    }
}

/// Split `owner/name` into its parts.
#[must_use]
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    (!owner.is_empty() && !name.is_empty() && !name.contains('/')).then_some((owner, name))
}
