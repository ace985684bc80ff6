//! Channel listing types.

use serde::{Deserialize, Serialize};

/// A channel as returned by the public channel and catalog endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// Channel identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Published version
    #[serde(default)]
    pub version: Option<u64>,

    /// Link to the demo server hosting this channel (catalog only)
    #[serde(default)]
    pub demo_server_url: Option<String>,
}

/// One page of the catalog endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Total number of channels matching the query
    #[serde(default)]
    pub count: Option<u64>,

    /// Channels on this page
    #[serde(default)]
    pub results: Vec<ChannelEntry>,
}

/// Which system reported a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelSource {
    /// The authoritative channel listing
    Authoritative,
    /// The catalog, expected to list the same channels as the authoritative source
    Catalog,
    /// A mirror server
    Mirror {
        /// Base URL of the server, e.g. `https://demo-en.example.org`
        origin: String,
        /// Short label, e.g. the server language
        label: String,
    },
}

impl std::fmt::Display for ChannelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authoritative => write!(f, "authoritative"),
            Self::Catalog => write!(f, "catalog"),
            Self::Mirror { origin, .. } => write!(f, "{origin}"),
        }
    }
}

/// A channel as seen by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel identifier, stable across sources
    pub id: String,
    /// Display name
    pub name: String,
    /// Version, if the source reported one
    pub version: Option<u64>,
    /// Where this record came from
    pub source: ChannelSource,
    /// Cross-reference link to a mirror server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ChannelRecord {
    /// Build a record from a wire entry. Empty links count as absent.
    #[must_use]
    pub fn from_entry(entry: ChannelEntry, source: ChannelSource) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            version: entry.version,
            source,
            link: entry.demo_server_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Origin URL when the record came from a mirror
    #[must_use]
    pub fn mirror_origin(&self) -> Option<&str> {
        match &self.source {
            ChannelSource::Mirror { origin, .. } => Some(origin),
            _ => None,
        }
    }
}

/// Channels fetched from a single mirror server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorCollection {
    /// Short label, e.g. the server language
    pub label: String,
    /// Base URL of the server
    pub origin: String,
    /// Channels the server reported
    pub channels: Vec<ChannelRecord>,
}

impl MirrorCollection {
    /// Tag raw entries with this mirror as their source
    #[must_use]
    pub fn from_entries(
        label: impl Into<String>,
        origin: impl Into<String>,
        entries: Vec<ChannelEntry>,
    ) -> Self {
        let label = label.into();
        let origin = origin.into();
        let source = ChannelSource::Mirror {
            origin: origin.clone(),
            label: label.clone(),
        };
        let channels = entries
            .into_iter()
            .map(|e| ChannelRecord::from_entry(e, source.clone()))
            .collect();
        Self {
            label,
            origin,
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_tolerates_missing_fields() {
        let entry: ChannelEntry = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(entry.id, "abc");
        assert!(entry.name.is_empty());
        assert!(entry.version.is_none());
        assert!(entry.demo_server_url.is_none());
    }

    #[test]
    fn empty_link_is_absent() {
        let entry = ChannelEntry {
            id: "abc".into(),
            demo_server_url: Some(String::new()),
            ..ChannelEntry::default()
        };
        let record = ChannelRecord::from_entry(entry, ChannelSource::Catalog);
        assert!(record.link.is_none());
    }

    #[test]
    fn mirror_collection_tags_records() {
        let entries = vec![ChannelEntry {
            id: "abc".into(),
            name: "Physics".into(),
            version: Some(4),
            demo_server_url: None,
        }];
        let mirror = MirrorCollection::from_entries("en", "https://demo-en.example.org", entries);
        assert_eq!(
            mirror.channels[0].mirror_origin(),
            Some("https://demo-en.example.org")
        );
        assert_eq!(mirror.channels[0].source.to_string(), "https://demo-en.example.org");
    }
}
