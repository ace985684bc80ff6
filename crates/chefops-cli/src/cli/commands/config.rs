//! `chefops config` - CLI configuration inspection.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::mask_secret;
use crate::output::print_structured;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: Context) -> Result<()> {
    let mut config = ctx.config;
    config.github_token = ctx.github_token.as_deref().map(mask_secret);

    if print_structured(ctx.output_format, &config)? {
        return Ok(());
    }

    let source = if ctx.config_path.exists() {
        ctx.config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", ctx.config_path.display())
    };
    println!("{} {}", "# Configuration:".bold(), source);
    println!();
    print!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
