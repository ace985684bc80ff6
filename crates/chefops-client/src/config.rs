//! Client configuration types.

use serde::{Deserialize, Serialize};

/// Authoritative channel API
pub const DEFAULT_STUDIO_URL: &str = "https://studio.learningequality.org";

/// Channel catalog
pub const DEFAULT_CATALOG_URL: &str = "https://catalog.learningequality.org";

/// GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Python package index
pub const DEFAULT_PACKAGE_INDEX_URL: &str = "https://pypi.org";

/// Public channel listing, served by the authoritative API and every mirror
pub const PUBLIC_CHANNELS_PATH: &str = "/api/public/v1/channels";

/// Catalog listing
pub const CATALOG_PATH: &str = "/api/catalog";

/// Base URLs of the services the client talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Authoritative channel API
    pub studio_url: String,
    /// Channel catalog
    pub catalog_url: String,
    /// GitHub REST API
    pub github_api_url: String,
    /// Package index
    pub package_index_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            studio_url: DEFAULT_STUDIO_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            package_index_url: DEFAULT_PACKAGE_INDEX_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one server (useful for testing)
    #[must_use]
    pub fn all(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self {
            studio_url: base.clone(),
            catalog_url: base.clone(),
            github_api_url: base.clone(),
            package_index_url: base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"catalog_url": "http://localhost:8000"}"#).unwrap();
        assert_eq!(endpoints.catalog_url, "http://localhost:8000");
        assert_eq!(endpoints.studio_url, DEFAULT_STUDIO_URL);
    }
}
