//! `chefops ps` - running chef processes.

use anyhow::{Context as _, Result};
use chefops_core::parse::parse_psaux;
use chefops_core::process::{enrich_cwd, parse_pwdx, redact_token, ProcessFilter};
use chefops_core::shell::ShellCommand;
use chefops_core::ProcessRecord;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::Context;
use crate::cli::args::PsArgs;
use crate::local;
use crate::output::print_structured;

pub async fn execute(ctx: Context, args: PsArgs) -> Result<()> {
    let listing = match args.input.as_deref() {
        Some(path) => read_listing(path)?,
        None => local::run(&ShellCommand::new("ps").arg("aux"), None)?,
    };

    let processes = parse_psaux(&listing);
    debug!(count = processes.len(), "parsed process listing");

    let mut processes = if args.all {
        processes
            .into_iter()
            .map(|mut p| {
                p.command = redact_token(&p.command);
                p
            })
            .collect()
    } else {
        ProcessFilter::with_excludes(ctx.config.process_excludes.iter().cloned()).select(processes)
    };

    if args.cwd {
        enrich_cwd(&mut processes, lookup_cwd);
    }

    if !print_structured(ctx.output_format, &processes)? {
        for process in &processes {
            println!("{}", process.to_tsv_line());
        }
    }

    Ok(())
}

fn read_listing(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Could not read process listing from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read process listing {}", path.display()))
    }
}

/// Working directory of a process via `pwdx`; processes that are gone resolve to nothing.
fn lookup_cwd(process: &ProcessRecord) -> Option<String> {
    let pid = process.pid_number()?;
    match local::run(&ShellCommand::new("pwdx").arg(pid.to_string()), None) {
        Ok(output) => parse_pwdx(&output),
        Err(e) => {
            debug!(pid, error = %e, "pwdx failed");
            None
        }
    }
}
