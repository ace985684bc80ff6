//! GitHub repository endpoints.

use crate::ChefopsClient;
use chefops_core::repos::{split_full_name, ChefRepoSelector};
use chefops_core::{
    Branch, BranchActivity, ChefopsError, Commit, ForkActivity, Issue, PullRequest, RepoActivity,
    RepoSummary, Result,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Maximum page size the GitHub API accepts
const PER_PAGE: usize = 100;

/// GitHub repository endpoints
pub struct GithubApi<'a> {
    client: &'a ChefopsClient,
}

impl<'a> GithubApi<'a> {
    pub(crate) fn new(client: &'a ChefopsClient) -> Self {
        Self { client }
    }

    /// Every item of a listing endpoint, following pagination
    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let page_str = page.to_string();
            let mut query = params.to_vec();
            query.push(("per_page", per_page.as_str()));
            query.push(("page", page_str.as_str()));
            let batch: Vec<T> = self.client.get_github(path, &query).await?;
            debug!(path, page, count = batch.len(), "fetched page");
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    /// All repositories of an organization
    pub async fn org_repos(&self, org: &str) -> Result<Vec<RepoSummary>> {
        self.paginate(&format!("/orgs/{org}/repos"), &[]).await
    }

    /// A single repository by `owner/name`
    pub async fn repo(&self, full_name: &str) -> Result<RepoSummary> {
        let (owner, name) = parse_full_name(full_name)?;
        self.client
            .get_github(&format!("/repos/{owner}/{name}"), &[])
            .await
    }

    /// Several repositories by `owner/name`. Ones that no longer exist are skipped.
    pub async fn repos<S: AsRef<str>>(&self, full_names: &[S]) -> Result<Vec<RepoSummary>> {
        let mut repos = Vec::with_capacity(full_names.len());
        for full_name in full_names {
            match self.repo(full_name.as_ref()).await {
                Ok(repo) => repos.push(repo),
                Err(ChefopsError::NotFound { .. }) => {
                    warn!(repo = full_name.as_ref(), "repository not found, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(repos)
    }

    /// Branches of a repository
    pub async fn branches(&self, full_name: &str) -> Result<Vec<Branch>> {
        let (owner, name) = parse_full_name(full_name)?;
        self.paginate(&format!("/repos/{owner}/{name}/branches"), &[])
            .await
    }

    /// A single commit
    pub async fn commit(&self, full_name: &str, sha: &str) -> Result<Commit> {
        let (owner, name) = parse_full_name(full_name)?;
        self.client
            .get_github(&format!("/repos/{owner}/{name}/commits/{sha}"), &[])
            .await
    }

    /// Forks of a repository
    pub async fn forks(&self, full_name: &str) -> Result<Vec<RepoSummary>> {
        let (owner, name) = parse_full_name(full_name)?;
        self.paginate(&format!("/repos/{owner}/{name}/forks"), &[])
            .await
    }

    /// Open pull requests
    pub async fn pulls(&self, full_name: &str) -> Result<Vec<PullRequest>> {
        let (owner, name) = parse_full_name(full_name)?;
        self.paginate(&format!("/repos/{owner}/{name}/pulls"), &[("state", "open")])
            .await
    }

    /// Open issues, without the pull requests GitHub lists alongside them
    pub async fn issues(&self, full_name: &str) -> Result<Vec<Issue>> {
        let (owner, name) = parse_full_name(full_name)?;
        let issues: Vec<Issue> = self
            .paginate(&format!("/repos/{owner}/{name}/issues"), &[("state", "open")])
            .await?;
        Ok(issues.into_iter().filter(|i| !i.is_pull_request()).collect())
    }

    /// Forks, branches, pull requests and issues of a repository.
    ///
    /// With `detailed`, the branches of every fork and the head commit of
    /// every branch are fetched as well.
    pub async fn activity(&self, repo: RepoSummary, detailed: bool) -> Result<RepoActivity> {
        let full_name = repo.full_name.as_str();

        let mut forks = Vec::new();
        for fork in self.forks(full_name).await? {
            let branches = if detailed {
                self.branches(&fork.full_name)
                    .await?
                    .into_iter()
                    .map(|b| b.name)
                    .filter(|name| name != "master")
                    .collect()
            } else {
                Vec::new()
            };
            forks.push(ForkActivity {
                repo: fork,
                branches,
            });
        }

        let mut branches = Vec::new();
        for branch in self.branches(full_name).await? {
            let head = if detailed {
                Some(self.commit(full_name, &branch.commit.sha).await?)
            } else {
                None
            };
            branches.push(BranchActivity { branch, head });
        }

        let pulls = self.pulls(full_name).await?;
        let issues = self.issues(full_name).await?;
        debug!(
            repo = full_name,
            forks = forks.len(),
            branches = branches.len(),
            pulls = pulls.len(),
            issues = issues.len(),
            "repository activity"
        );

        Ok(RepoActivity {
            repo,
            forks,
            branches,
            pulls,
            issues,
        })
    }

    /// Active chef repositories of `org` plus the listed external ones
    pub async fn chef_repos<S: AsRef<str>>(
        &self,
        org: &str,
        selector: &ChefRepoSelector,
        external: &[S],
    ) -> Result<Vec<RepoSummary>> {
        let mut repos = selector.select(self.org_repos(org).await?);
        repos.extend(self.repos(external).await?);
        Ok(repos)
    }
}

fn parse_full_name(full_name: &str) -> Result<(&str, &str)> {
    split_full_name(full_name).ok_or_else(|| ChefopsError::InvalidRepoUrl(full_name.to_string()))
}
