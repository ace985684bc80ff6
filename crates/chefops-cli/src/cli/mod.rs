//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Text);

    // Token from CLI or env first, then config
    let github_token = cli
        .github_token
        .filter(|t| !t.is_empty())
        .or_else(|| config.github_token.clone());

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_path,
        github_token,
        output_format,
        verbose: cli.verbose,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Ps(args) => commands::ps::execute(ctx, args).await,
        Commands::Channels(args) => commands::channels::execute(ctx, args).await,
        Commands::CodeReport(args) => commands::code_report::execute(ctx, args).await,
        Commands::Repos(args) => commands::repos::execute(ctx, args).await,
        Commands::Proxies(args) => commands::proxies::execute(ctx, args).await,
        Commands::Dns => commands::dns::execute(ctx).await,
        Commands::ChefCmd(args) => commands::chef_cmd::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}
