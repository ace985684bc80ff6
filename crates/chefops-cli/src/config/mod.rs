//! Configuration management.

use anyhow::{Context as _, Result};
use chefops_client::Endpoints;
use chefops_core::process::DEFAULT_EXCLUDE_PATTERNS;
use chefops_core::repos::{
    DEFAULT_DEPRECATED_REPOS, DEFAULT_EXTERNAL_CHEF_REPOS, DEFAULT_PIPELINE_REPOS,
};
use chefops_core::ServerRole;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// A mirror server hosting imported channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorServer {
    /// Short label, usually the server language
    pub label: String,
    /// Base URL
    pub url: String,
}

impl MirrorServer {
    fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// CLI configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// GitHub token; `--github-token` and `GITHUB_TOKEN` take precedence.
    pub github_token: Option<String>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// Directory holding local chef repository checkouts.
    pub repos_dir: String,

    /// GitHub organization that owns the chef repositories.
    pub organization: String,

    /// `owner/name` of repositories no longer in use.
    pub deprecated_repos: Vec<String>,

    /// `owner/name` of chef repositories outside the organization.
    pub external_chef_repos: Vec<String>,

    /// `owner/name` of the content pipeline repositories.
    pub pipeline_repos: Vec<String>,

    /// Python programs that are never chefs.
    pub process_excludes: Vec<String>,

    /// Service endpoints.
    pub endpoints: Endpoints,

    /// Mirror servers, in report order.
    pub mirrors: Vec<MirrorServer>,

    /// Demo servers by role name.
    pub inventory: BTreeMap<String, ServerRole>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("output_format", &self.output_format)
            .field("github_token", &self.github_token.as_deref().map(mask_secret))
            .field("timeout_secs", &self.timeout_secs)
            .field("repos_dir", &self.repos_dir)
            .field("organization", &self.organization)
            .field("deprecated_repos", &self.deprecated_repos)
            .field("external_chef_repos", &self.external_chef_repos)
            .field("pipeline_repos", &self.pipeline_repos)
            .field("process_excludes", &self.process_excludes)
            .field("endpoints", &self.endpoints)
            .field("mirrors", &self.mirrors)
            .field("inventory", &self.inventory)
            .finish()
    }
}

/// Mask all but the ends of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn role(host: &str, hostname: &str, facility_name: &str) -> ServerRole {
    ServerRole {
        host: host.to_string(),
        hostname: Some(hostname.to_string()),
        facility_name: Some(facility_name.to_string()),
        channels_to_import: Vec::new(),
    }
}

fn default_mirrors() -> Vec<MirrorServer> {
    vec![
        MirrorServer::new("ar", "https://kolibri-catalog-ar.learningequality.org"),
        MirrorServer::new("en", "https://kolibri-catalog-en.learningequality.org"),
        MirrorServer::new("es", "https://kolibri-catalog-es.learningequality.org"),
        MirrorServer::new("fr", "https://kolibri-catalog-fr.learningequality.org"),
        MirrorServer::new("hi", "https://kolibri-catalog-hi.learningequality.org"),
        MirrorServer::new("other", "https://kolibri-demo.learningequality.org"),
    ]
}

fn default_inventory() -> BTreeMap<String, ServerRole> {
    let mut alejandro = role(
        "35.227.71.104",
        "alejandro-demo.learningequality.org",
        "alejandro demo",
    );
    alejandro.channels_to_import = strings(&[
        "da53f90b1be25752a04682bbc353659f",
        "2748b6a3569a55f5bd6e35a70e2be7ee",
        "e66cd89375845ebf864ea00005be902d",
        "1d13b59b62b85470b61483fa63c530a2",
        "d6a3e8b17e8a5ac9b021f378a15afbb4",
    ]);

    BTreeMap::from([
        (
            "pradigi-demo".to_string(),
            role(
                "35.196.179.152",
                "pradigi-demo.learningequality.org",
                "PraDigi Demo Server",
            ),
        ),
        (
            "pradigi-demo-backup".to_string(),
            role("35.196.115.213", "35.196.115.213", "pradigi demo backup"),
        ),
        (
            "davemckee-demo".to_string(),
            role(
                "35.231.153.103",
                "davemckee-demo.learningequality.org",
                "Dave McKee Demo",
            ),
        ),
        ("alejandro-demo".to_string(), alejandro),
        (
            "demo-ar".to_string(),
            role(
                "35.246.148.139",
                "kolibridemo-ar.learningequality.org",
                "New Arabic Demo",
            ),
        ),
        (
            "openupresources-demo".to_string(),
            role(
                "104.196.183.152",
                "openupresources-demo.learningequality.org",
                "OLD OpenUp Resources (Illustrative Mathematics) demo",
            ),
        ),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: None,
            github_token: None,
            timeout_secs: 30,
            repos_dir: "chefrepos".to_string(),
            organization: "learningequality".to_string(),
            deprecated_repos: strings(DEFAULT_DEPRECATED_REPOS),
            external_chef_repos: strings(DEFAULT_EXTERNAL_CHEF_REPOS),
            pipeline_repos: strings(DEFAULT_PIPELINE_REPOS),
            process_excludes: strings(DEFAULT_EXCLUDE_PATTERNS),
            endpoints: Endpoints::default(),
            mirrors: default_mirrors(),
            inventory: default_inventory(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "learningequality", "chefops")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve the config file location, expanding `~` and variables in an explicit path.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => {
                let raw = path.to_string_lossy();
                let expanded = shellexpand::full(&raw)
                    .with_context(|| format!("Could not expand config path {raw}"))?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            None => Self::default_path(),
        }
    }

    /// Load configuration.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file given explicitly is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit)?;

        if !path.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Repository checkout directory with `~` and variables expanded.
    pub fn repos_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.repos_dir)
            .with_context(|| format!("Could not expand repos_dir {}", self.repos_dir))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}
