//! `chefops code-report` - convention checks and line counts for chef repositories.

use anyhow::{Context as _, Result};
use chefops_client::ChefopsClient;
use chefops_core::checks::{check_entrypoint, check_requirements, FRAMEWORK_PACKAGE};
use chefops_core::report::render_code_reports;
use chefops_core::repos::{split_full_name, ChefRepoSelector};
use chefops_core::shell::ShellCommand;
use chefops_core::{ClocSummary, RepoReport};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::Context;
use crate::cli::args::CodeReportArgs;
use crate::local;
use crate::output::print_structured;

const DEFAULT_BRANCH: &str = "master";

/// A repository to report on
struct Target {
    owner: String,
    name: String,
    branch: String,
}

pub async fn execute(ctx: Context, args: CodeReportArgs) -> Result<()> {
    let client = ctx.client()?;
    let repos_dir = match &args.repos_dir {
        Some(dir) => dir.clone(),
        None => ctx.config.repos_dir()?,
    };
    std::fs::create_dir_all(&repos_dir)
        .with_context(|| format!("Could not create {}", repos_dir.display()))?;

    let targets = targets(&ctx, &client, &args).await?;
    let mut analyzer = Analyzer::new(&client, repos_dir, !args.no_update);

    let mut reports = Vec::with_capacity(targets.len());
    for target in &targets {
        let report = match analyzer.analyze(target).await {
            Ok(report) => report,
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(repo = %target.name, error = %reason, "repository check failed");
                RepoReport::failed(&target.name, &target.branch, reason)
            }
        };
        reports.push(report);
    }

    if !print_structured(ctx.output_format, &reports)? {
        print!("{}", render_code_reports(&reports)?);
    }

    Ok(())
}

async fn targets(
    ctx: &Context,
    client: &ChefopsClient,
    args: &CodeReportArgs,
) -> Result<Vec<Target>> {
    if args.all {
        let selector = ChefRepoSelector::new(ctx.config.deprecated_repos.iter().cloned());
        let repos = client
            .github()
            .chef_repos(
                &ctx.config.organization,
                &selector,
                &ctx.config.external_chef_repos,
            )
            .await
            .context("Could not list chef repositories")?;
        return Ok(repos
            .into_iter()
            .map(|repo| Target {
                branch: args
                    .branch
                    .clone()
                    .unwrap_or_else(|| repo.branch().to_string()),
                owner: repo.owner.login,
                name: repo.name,
            })
            .collect());
    }

    Ok(args
        .repos
        .iter()
        .map(|repo| {
            let (owner, name) = split_full_name(repo)
                .unwrap_or((ctx.config.organization.as_str(), repo.as_str()));
            Target {
                owner: owner.to_string(),
                name: name.to_string(),
                branch: args
                    .branch
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            }
        })
        .collect())
}

/// Runs the checks against local checkouts
struct Analyzer<'a> {
    client: &'a ChefopsClient,
    repos_dir: PathBuf,
    update: bool,
    latest_version: Option<String>,
    cloc_available: bool,
}

impl<'a> Analyzer<'a> {
    fn new(client: &'a ChefopsClient, repos_dir: PathBuf, update: bool) -> Self {
        let cloc_available = local::is_available("cloc");
        if !cloc_available {
            eprintln!(
                "{} command line tool cloc not found, line counts are skipped",
                "Warning:".yellow().bold()
            );
        }
        Self {
            client,
            repos_dir,
            update,
            latest_version: None,
            cloc_available,
        }
    }

    async fn analyze(&mut self, target: &Target) -> Result<RepoReport> {
        let dir = self.repos_dir.join(&target.name);
        self.checkout(target, &dir)?;

        let requirements = read_optional(&dir.join("requirements.txt"))?;
        let latest = match requirements {
            Some(_) => self.latest_version().await?,
            None => "",
        };
        let requirements_check = check_requirements(requirements.as_deref(), latest);

        let sushichef_check = check_entrypoint(&root_files(&dir)?);

        let cloc_data = if self.cloc_available {
            run_cloc(&dir)
        } else {
            None
        };

        Ok(RepoReport {
            repo_name: target.name.clone(),
            branch: target.branch.clone(),
            requirements_check,
            sushichef_check,
            cloc_data,
        })
    }

    /// Latest framework release, fetched once per run
    async fn latest_version(&mut self) -> Result<&str> {
        if self.latest_version.is_none() {
            let version = self
                .client
                .packages()
                .latest_version(FRAMEWORK_PACKAGE)
                .await
                .with_context(|| format!("Could not look up the latest {FRAMEWORK_PACKAGE} release"))?;
            info!(package = FRAMEWORK_PACKAGE, %version, "latest release");
            self.latest_version = Some(version);
        }
        Ok(self.latest_version.as_deref().unwrap_or_default())
    }

    /// Clone a missing checkout, or hard-reset an existing one to the remote branch.
    fn checkout(&self, target: &Target, dir: &Path) -> Result<()> {
        let branch = target.branch.as_str();
        if !dir.exists() {
            let url = format!("https://github.com/{}/{}.git", target.owner, target.name);
            eprintln!("{} {url} into {}", "Cloning".green(), dir.display());
            local::run(
                &ShellCommand::new("git").args(["clone", "--quiet", url.as_str()]),
                Some(&self.repos_dir),
            )?;
            local::run(&ShellCommand::new("git").args(["checkout", branch]), Some(dir))?;
        } else if self.update {
            eprintln!("{} {} to branch {branch}", "Updating".green(), dir.display());
            let origin_branch = format!("origin/{branch}");
            for command in [
                ShellCommand::new("git").args(["fetch", "origin", branch]),
                ShellCommand::new("git").args(["checkout", branch]),
                ShellCommand::new("git").args(["reset", "--hard", origin_branch.as_str()]),
            ] {
                local::run(&command, Some(dir))?;
            }
        } else {
            debug!(dir = %dir.display(), "using checkout as is");
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
    }
}

/// Names of the regular files at the top of a checkout.
fn root_files(dir: &Path) -> Result<Vec<String>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Could not list {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Line counts by language; failures only cost the metrics columns.
fn run_cloc(dir: &Path) -> Option<ClocSummary> {
    let command = ShellCommand::new("cloc").args(["--exclude-dir=venv", ".", "--json"]);
    let output = match local::run(&command, Some(dir)) {
        Ok(output) => output,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cloc failed");
            return None;
        }
    };
    // cloc prints nothing for a directory without source files
    if output.trim().is_empty() {
        return None;
    }
    match ClocSummary::from_json(&output) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "unreadable cloc output");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_files_skip_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sushichef.py"), "").unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("venv")).unwrap();

        let mut files = root_files(dir.path()).unwrap();
        files.sort();
        assert_eq!(files, vec!["README.md", "sushichef.py"]);
    }

    #[test]
    fn missing_requirements_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("requirements.txt"))
            .unwrap()
            .is_none());
    }
}
