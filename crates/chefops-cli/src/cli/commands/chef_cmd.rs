//! `chefops chef-cmd` - the shell line that runs a chef in the background.

use anyhow::Result;
use chefops_core::shell::{github_repo_name, ChefRun};
use serde::Serialize;

use super::Context;
use crate::cli::args::ChefCmdArgs;
use crate::output::print_structured;

#[derive(Debug, Serialize)]
struct ChefCmd<'a> {
    chef_dir: &'a str,
    command: String,
}

/// Relative paths live inside the checkout.
fn in_dir(dir: &str, path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("{dir}/{path}")
    }
}

pub async fn execute(ctx: Context, args: ChefCmdArgs) -> Result<()> {
    let repo = github_repo_name(&args.repo_url)?;
    let chef_dir = format!("{}/{repo}", args.chefs_dir.trim_end_matches('/'));

    let run = ChefRun {
        command: args.command,
        args: args.args,
        home: Some(args.home).filter(|h| !h.is_empty()),
        venv: Some(args.venv).filter(|v| !v.is_empty()),
        log_file: args.log_file.map(|log| in_dir(&chef_dir, log)),
        pid_file: args.pid_file.map(|pid| in_dir(&chef_dir, pid)),
        chef_dir: chef_dir.clone(),
    };

    let line = ChefCmd {
        chef_dir: &chef_dir,
        command: run.render(),
    };
    if !print_structured(ctx.output_format, &line)? {
        println!("{}", line.command);
    }

    Ok(())
}
