//! Python package index endpoints.

use crate::ChefopsClient;
use chefops_core::{ChefopsError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct Project {
    info: ProjectInfo,
}

/// Package index endpoints
pub struct PackageIndexApi<'a> {
    client: &'a ChefopsClient,
}

impl<'a> PackageIndexApi<'a> {
    pub(crate) fn new(client: &'a ChefopsClient) -> Self {
        Self { client }
    }

    /// Latest released version of a package
    pub async fn latest_version(&self, package: &str) -> Result<String> {
        if package.is_empty() || package.contains('/') {
            return Err(ChefopsError::InvalidUrl(format!("bad package name: {package:?}")));
        }
        let base = &self.client.endpoints().package_index_url;
        let project: Project = self
            .client
            .get_json(base, &format!("/pypi/{package}/json"), &[])
            .await?;
        Ok(project.info.version)
    }
}
