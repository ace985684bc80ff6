//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Operations tool for a content-integration fleet
///
/// Lists chef processes, reports on chef repositories and reconciles the
/// channel catalog with the mirror servers that host its channels.
#[derive(Parser, Debug)]
#[command(name = "chefops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(short, long, global = true, env = "CHEFOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// GitHub token (or set GITHUB_TOKEN env var)
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    pub github_token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List running chef processes
    Ps(PsArgs),

    /// Reconcile the channel catalog with the mirror servers
    Channels(ChannelsArgs),

    /// Convention checks and line counts for chef repositories
    CodeReport(CodeReportArgs),

    /// List chef or pipeline repositories on GitHub
    Repos(ReposArgs),

    /// Find demo servers with an open proxy port
    Proxies(ProxiesArgs),

    /// Check the DNS records of the demo servers
    Dns,

    /// Print the shell line that starts a chef in the background
    ChefCmd(ChefCmdArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Ps command
// ============================================================================

#[derive(Args, Debug)]
pub struct PsArgs {
    /// Read a saved `ps aux` listing instead of running `ps` ("-" for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Show every process, not only chefs
    #[arg(short, long)]
    pub all: bool,

    /// Look up the working directory of each chef with `pwdx`
    #[arg(long)]
    pub cwd: bool,
}

// ============================================================================
// Channels command
// ============================================================================

#[derive(Args, Debug)]
pub struct ChannelsArgs {
    /// Mirror server as LABEL=URL; replaces the configured mirrors
    #[arg(short, long = "mirror", value_parser = parse_key_val)]
    pub mirrors: Vec<(String, String)>,
}

// ============================================================================
// Code report command
// ============================================================================

#[derive(Args, Debug)]
pub struct CodeReportArgs {
    /// Repository names (e.g. sushi-chef-pbs) or owner/name
    #[arg(required_unless_present = "all")]
    pub repos: Vec<String>,

    /// Report on every active chef repository of the organization
    #[arg(long, conflicts_with = "repos")]
    pub all: bool,

    /// Branch to check out (default: the repository's default branch, or master)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Use the local checkouts as they are
    #[arg(long)]
    pub no_update: bool,

    /// Directory holding the checkouts (overrides repos_dir)
    #[arg(long)]
    pub repos_dir: Option<PathBuf>,
}

// ============================================================================
// Repos command
// ============================================================================

#[derive(Args, Debug)]
pub struct ReposArgs {
    /// List the content pipeline repositories instead of chef repositories
    #[arg(long)]
    pub pipeline: bool,

    /// List every fork, branch, pull request and issue
    #[arg(short, long)]
    pub detailed: bool,
}

// ============================================================================
// Proxies command
// ============================================================================

#[derive(Args, Debug)]
pub struct ProxiesArgs {
    /// Proxy port to probe
    #[arg(short, long, default_value_t = chefops_core::PROXY_PORT)]
    pub port: u16,

    /// Connect timeout in seconds
    #[arg(short, long, default_value_t = 3)]
    pub timeout: u64,
}

// ============================================================================
// Chef command builder
// ============================================================================

#[derive(Args, Debug)]
pub struct ChefCmdArgs {
    /// GitHub URL of the chef repository
    pub repo_url: String,

    /// Chef command line, run from the checkout
    #[arg(long, default_value = "./sushichef.py --token=$STUDIO_TOKEN")]
    pub command: String,

    /// Extra chef option as KEY or KEY=VALUE, inserted before --token
    #[arg(short, long = "arg", value_parser = parse_chef_arg, allow_hyphen_values = true)]
    pub args: Vec<(String, Option<String>)>,

    /// Directory holding chef checkouts on the host
    #[arg(long, default_value = "/data")]
    pub chefs_dir: String,

    /// HOME to export before running
    #[arg(long, default_value = "/data")]
    pub home: String,

    /// Virtualenv directory inside the checkout
    #[arg(long, default_value = "venv")]
    pub venv: String,

    /// Log file for stdout and stderr (relative paths are inside the checkout)
    #[arg(long)]
    pub log_file: Option<String>,

    /// File that receives the background PID
    #[arg(long)]
    pub pid_file: Option<String>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show config file path
    Path,
}

/// Parse `LABEL=URL`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=URL, got `{s}`"))?;
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected LABEL=URL, got `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse `KEY` or `KEY=VALUE`.
fn parse_chef_arg(s: &str) -> Result<(String, Option<String>), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing option name in `{s}`")),
        Some((key, value)) => Ok((key.to_string(), Some(value.to_string()))),
        None if s.is_empty() => Err("empty option".to_string()),
        None => Ok((s.to_string(), None)),
    }
}
