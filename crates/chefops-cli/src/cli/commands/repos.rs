//! `chefops repos` - chef and pipeline repositories on GitHub.

use anyhow::{Context as _, Result};
use chefops_core::repos::ChefRepoSelector;
use chefops_core::{Label, RepoActivity};
use chrono::{DateTime, Utc};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

use super::Context;
use crate::cli::args::ReposArgs;
use crate::output::print_structured;

/// Table row for display
#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "Repository")]
    url: String,
    #[tabled(rename = "Forks")]
    forks: usize,
    #[tabled(rename = "Branches")]
    branches: usize,
    #[tabled(rename = "PRs")]
    pulls: usize,
    #[tabled(rename = "Issues")]
    issues: usize,
    #[tabled(rename = "Last push")]
    #[tabled(display_with = "display_date")]
    pushed: Option<DateTime<Utc>>,
}

impl From<&RepoActivity> for RepoRow {
    fn from(activity: &RepoActivity) -> Self {
        let repo = &activity.repo;
        let mut url = repo.html_url.clone();
        if repo.archived {
            url.push_str(" (archived)");
        }
        Self {
            url,
            forks: activity.forks.len(),
            branches: activity.branches.len(),
            pulls: activity.pulls.len(),
            issues: activity.issues.len(),
            pushed: repo.pushed_at,
        }
    }
}

fn display_date(date: &Option<DateTime<Utc>>) -> String {
    date.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn display_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn execute(ctx: Context, args: ReposArgs) -> Result<()> {
    let client = ctx.client()?;
    let github = client.github();

    let repos = if args.pipeline {
        github
            .repos(&ctx.config.pipeline_repos)
            .await
            .context("Could not fetch pipeline repositories")?
    } else {
        let selector = ChefRepoSelector::new(ctx.config.deprecated_repos.iter().cloned());
        github
            .chef_repos(
                &ctx.config.organization,
                &selector,
                &ctx.config.external_chef_repos,
            )
            .await
            .context("Could not list chef repositories")?
    };

    let mut activities = Vec::with_capacity(repos.len());
    for repo in repos {
        let full_name = repo.full_name.clone();
        match github.activity(repo, args.detailed).await {
            Ok(activity) => activities.push(activity),
            Err(e) => warn!(repo = %full_name, error = %e, "skipping repository"),
        }
    }

    if print_structured(ctx.output_format, &activities)? {
        return Ok(());
    }

    let kind = if args.pipeline { "pipeline" } else { "chef" };
    println!(
        "{}",
        format!("{} {kind} repositories", activities.len()).bold()
    );
    if activities.is_empty() {
        return Ok(());
    }

    if args.detailed {
        for activity in &activities {
            print_detailed(activity);
        }
    } else {
        let rows: Vec<RepoRow> = activities.iter().map(RepoRow::from).collect();
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    Ok(())
}

fn print_detailed(activity: &RepoActivity) {
    println!();
    println!(
        "- {}\t{} forks\t{} branches\t{} PRs\t{} Issues",
        activity.repo.html_url.blue(),
        activity.forks.len(),
        activity.branches.len(),
        activity.pulls.len(),
        activity.issues.len()
    );

    for fork in &activity.forks {
        let mut line = format!("   - fork: {}", fork.repo.html_url).blue().to_string();
        if !fork.branches.is_empty() {
            let names: Vec<String> = fork.branches.iter().map(|b| b.yellow().to_string()).collect();
            line.push_str(&format!(" branches: {}", names.join(", ")));
        }
        println!("{line}");
    }

    for branch in &activity.branches {
        let label = format!("   - branch: {}", branch.branch.name).yellow();
        let sha = branch.branch.commit.short_sha();
        match &branch.head {
            Some(head) => println!(
                "{label} ({sha}) by {} {}\t{}",
                head.author_login(),
                head.summary(),
                display_date(&head.date())
            ),
            None => println!("{label} ({sha})"),
        }
    }

    for pr in &activity.pulls {
        println!(
            "{} {} by {}\t{} {}",
            format!("   - PR{}: {}", pr.number, pr.title).green(),
            pr.state,
            pr.user.login,
            display_date(&pr.updated_at),
            display_labels(&pr.labels)
        );
    }

    for issue in &activity.issues {
        println!(
            "{} {} {} comments {}",
            format!("   - I{}: {}", issue.number, issue.title).red(),
            issue.state,
            issue.comments,
            display_labels(&issue.labels)
        );
    }
}
