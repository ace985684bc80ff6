//! Channel listing endpoints.

use crate::config::{CATALOG_PATH, PUBLIC_CHANNELS_PATH};
use crate::ChefopsClient;
use chefops_core::{
    CatalogPage, ChannelEntry, ChannelRecord, ChannelSource, MirrorCollection, Result,
};
use tracing::{debug, info};

/// Catalog page size; the whole public catalog fits in one page
const CATALOG_PAGE_SIZE: &str = "200";

/// Channel listing endpoints
pub struct ChannelsApi<'a> {
    client: &'a ChefopsClient,
}

impl<'a> ChannelsApi<'a> {
    pub(crate) fn new(client: &'a ChefopsClient) -> Self {
        Self { client }
    }

    /// Public channels of the authoritative API
    pub async fn public_channels(&self) -> Result<Vec<ChannelRecord>> {
        let base = &self.client.endpoints().studio_url;
        let entries: Vec<ChannelEntry> = self
            .client
            .get_json(base, PUBLIC_CHANNELS_PATH, &[])
            .await?;
        info!(count = entries.len(), "fetched authoritative channels");
        Ok(into_records(entries, &ChannelSource::Authoritative))
    }

    /// Public, published channels listed in the catalog
    pub async fn catalog_channels(&self) -> Result<Vec<ChannelRecord>> {
        let base = &self.client.endpoints().catalog_url;
        let page: CatalogPage = self
            .client
            .get_json(
                base,
                CATALOG_PATH,
                &[
                    ("page_size", CATALOG_PAGE_SIZE),
                    ("public", "true"),
                    ("published", "true"),
                ],
            )
            .await?;
        if let Some(count) = page.count {
            if count > page.results.len() as u64 {
                debug!(count, received = page.results.len(), "catalog has more pages");
            }
        }
        info!(count = page.results.len(), "fetched catalog channels");
        Ok(into_records(page.results, &ChannelSource::Catalog))
    }

    /// Raw channel entries served by a mirror at `origin`
    pub async fn mirror_channels(&self, origin: &str) -> Result<Vec<ChannelEntry>> {
        self.client.get_json(origin, PUBLIC_CHANNELS_PATH, &[]).await
    }

    /// Channels of one mirror, labelled
    pub async fn mirror_collection(&self, label: &str, origin: &str) -> Result<MirrorCollection> {
        let entries = self.mirror_channels(origin).await?;
        info!(label, origin, count = entries.len(), "fetched mirror channels");
        Ok(MirrorCollection::from_entries(label, origin, entries))
    }
}

fn into_records(entries: Vec<ChannelEntry>, source: &ChannelSource) -> Vec<ChannelRecord> {
    entries
        .into_iter()
        .map(|entry| ChannelRecord::from_entry(entry, source.clone()))
        .collect()
}
