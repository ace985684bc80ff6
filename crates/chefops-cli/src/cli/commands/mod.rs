//! Command implementations.

pub mod channels;
pub mod chef_cmd;
pub mod code_report;
pub mod config;
pub mod dns;
pub mod ps;
pub mod proxies;
pub mod repos;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chefops_client::ChefopsClient;

use crate::config::{mask_secret, Config};
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Where the configuration was looked up
    pub config_path: PathBuf,

    /// GitHub token
    pub github_token: Option<String>,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("config_path", &self.config_path)
            .field("github_token", &self.github_token.as_deref().map(mask_secret))
            .field("output_format", &self.output_format)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Context {
    /// Create a client for the configured endpoints.
    pub fn client(&self) -> anyhow::Result<ChefopsClient> {
        let client = ChefopsClient::builder()
            .endpoints(self.config.endpoints.clone())
            .github_token(self.github_token.clone())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_token() {
        let ctx = Context {
            config: Config {
                github_token: Some("ghp_configtokenvalue".into()),
                ..Config::default()
            },
            config_path: PathBuf::from("/tmp/chefops.toml"),
            github_token: Some("ghp_flagtokenvalue01".into()),
            output_format: OutputFormat::Text,
            verbose: false,
        };
        let debug = format!("{ctx:?}");
        assert!(!debug.contains("configtokenvalue"));
        assert!(!debug.contains("flagtokenvalue"));
        assert!(debug.contains("ghp_...ue01"));
    }
}
