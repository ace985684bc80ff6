//! Channel catalog vs. mirror server reconciliation.
//!
//! Three collections go in: the authoritative channel list, the catalog
//! (expected to hold the same ids) and the channels found on each mirror
//! server. Three reports come out:
//!
//! - **A**: authoritative channels not present on any mirror
//! - **B**: mirrors holding an older version than the authoritative one
//! - **C**: catalog links that are missing, don't mention the channel id, or
//!   point at a server that doesn't hold the channel
//!
//! Everything is grouped by channel id. Versions compare as plain integers.
//! Problems with one channel never stop the others from being checked.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;
use url::Url;

use crate::types::{ChannelRecord, MirrorCollection};

/// Authoritative and catalog id sets differ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionMismatch {
    /// Ids only the authoritative source lists
    pub only_authoritative: Vec<String>,
    /// Ids only the catalog lists
    pub only_catalog: Vec<String>,
}

/// An authoritative channel no mirror holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingChannel {
    /// Channel id
    pub id: String,
    /// Display name
    pub name: String,
}

/// Version problems found on mirrors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum VersionFinding {
    /// The mirror holds an older version
    Outdated {
        /// Channel id
        id: String,
        /// Display name
        name: String,
        /// Mirror origin
        mirror: String,
        /// Version on the mirror
        mirror_version: u64,
        /// Authoritative version
        latest_version: u64,
    },
    /// A source did not report a version, so nothing could be compared
    MissingVersion {
        /// Channel id
        id: String,
        /// Display name
        name: String,
        /// Who failed to report it
        source: String,
    },
}

/// Problems with a catalog channel's mirror link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum LinkFinding {
    /// The catalog entry has no link
    MissingLink {
        /// Channel id
        id: String,
        /// Display name
        name: String,
    },
    /// The link does not contain the channel id
    IdNotInLink {
        /// Channel id
        id: String,
        /// Display name
        name: String,
        /// The link
        link: String,
    },
    /// The linked server does not hold the channel
    NotOnLinkedServer {
        /// Channel id
        id: String,
        /// Display name
        name: String,
        /// The link
        link: String,
    },
    /// The link is not a URL with a host
    InvalidLink {
        /// Channel id
        id: String,
        /// Display name
        name: String,
        /// The link
        link: String,
    },
}

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Distinct authoritative channels
    pub authoritative_count: usize,
    /// Distinct catalog channels
    pub catalog_count: usize,
    /// Distinct channel ids across all mirrors
    pub mirror_channel_count: usize,
    /// Set difference between authoritative and catalog ids, if any
    pub mismatch: Option<CollectionMismatch>,
    /// Report A
    pub missing: Vec<MissingChannel>,
    /// Report B
    pub stale: Vec<VersionFinding>,
    /// Report C
    pub links: Vec<LinkFinding>,
}

impl ReconcileReport {
    /// Returns true when no findings were made
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatch.is_none()
            && self.missing.is_empty()
            && self.stale.is_empty()
            && self.links.is_empty()
    }
}

/// `scheme://host[:port]` of a URL, or `None` if it has no host.
#[must_use]
pub fn url_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

fn normalize_origin(raw: &str) -> String {
    url_origin(raw).unwrap_or_else(|| raw.trim().trim_end_matches('/').to_string())
}

/// One record per id: the last record wins, at the position of the first.
fn unique_by_id(records: &[ChannelRecord]) -> Vec<&ChannelRecord> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<&ChannelRecord> = Vec::new();
    for record in records {
        if let Some(&idx) = position.get(record.id.as_str()) {
            unique[idx] = record;
        } else {
            position.insert(record.id.as_str(), unique.len());
            unique.push(record);
        }
    }
    unique
}

/// Compare the collections and collect all findings.
#[must_use]
pub fn reconcile(
    authoritative: &[ChannelRecord],
    catalog: &[ChannelRecord],
    mirrors: &[MirrorCollection],
) -> ReconcileReport {
    let authoritative = unique_by_id(authoritative);
    let catalog = unique_by_id(catalog);

    let mut by_id: HashMap<&str, Vec<(&ChannelRecord, String)>> = HashMap::new();
    for mirror in mirrors {
        let origin = normalize_origin(&mirror.origin);
        for channel in &mirror.channels {
            by_id
                .entry(channel.id.as_str())
                .or_default()
                .push((channel, origin.clone()));
        }
    }

    let mut report = ReconcileReport {
        authoritative_count: authoritative.len(),
        catalog_count: catalog.len(),
        mirror_channel_count: by_id.len(),
        mismatch: check_consistency(&authoritative, &catalog),
        ..ReconcileReport::default()
    };

    if let Some(mismatch) = &report.mismatch {
        warn!(
            only_authoritative = mismatch.only_authoritative.len(),
            only_catalog = mismatch.only_catalog.len(),
            "authoritative and catalog channel lists differ"
        );
    }

    for channel in &authoritative {
        match by_id.get(channel.id.as_str()) {
            None => report.missing.push(MissingChannel {
                id: channel.id.clone(),
                name: channel.name.clone(),
            }),
            Some(copies) => check_versions(channel, copies, &mut report.stale),
        }
    }

    for channel in &catalog {
        check_link(channel, by_id.get(channel.id.as_str()), &mut report.links);
    }

    report
}

fn check_consistency(
    authoritative: &[&ChannelRecord],
    catalog: &[&ChannelRecord],
) -> Option<CollectionMismatch> {
    let a: BTreeSet<&str> = authoritative.iter().map(|c| c.id.as_str()).collect();
    let c: BTreeSet<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
    if a == c {
        return None;
    }
    Some(CollectionMismatch {
        only_authoritative: a.difference(&c).map(ToString::to_string).collect(),
        only_catalog: c.difference(&a).map(ToString::to_string).collect(),
    })
}

fn check_versions(
    channel: &ChannelRecord,
    copies: &[(&ChannelRecord, String)],
    findings: &mut Vec<VersionFinding>,
) {
    let Some(latest) = channel.version else {
        findings.push(VersionFinding::MissingVersion {
            id: channel.id.clone(),
            name: channel.name.clone(),
            source: channel.source.to_string(),
        });
        return;
    };

    for (copy, origin) in copies {
        match copy.version {
            None => findings.push(VersionFinding::MissingVersion {
                id: channel.id.clone(),
                name: channel.name.clone(),
                source: origin.clone(),
            }),
            Some(version) if version < latest => findings.push(VersionFinding::Outdated {
                id: channel.id.clone(),
                name: channel.name.clone(),
                mirror: origin.clone(),
                mirror_version: version,
                latest_version: latest,
            }),
            Some(_) => {}
        }
    }
}

fn check_link(
    channel: &ChannelRecord,
    copies: Option<&Vec<(&ChannelRecord, String)>>,
    findings: &mut Vec<LinkFinding>,
) {
    let id = channel.id.clone();
    let name = channel.name.clone();

    let Some(link) = channel.link.as_deref() else {
        findings.push(LinkFinding::MissingLink { id, name });
        return;
    };

    if !link.contains(channel.id.as_str()) {
        findings.push(LinkFinding::IdNotInLink {
            id: id.clone(),
            name: name.clone(),
            link: link.to_string(),
        });
    }

    let Some(linked_origin) = url_origin(link) else {
        findings.push(LinkFinding::InvalidLink {
            id,
            name,
            link: link.to_string(),
        });
        return;
    };

    // channels on no mirror at all are already listed in report A
    if let Some(copies) = copies {
        if !copies.iter().any(|(_, origin)| *origin == linked_origin) {
            findings.push(LinkFinding::NotOnLinkedServer {
                id,
                name,
                link: link.to_string(),
            });
        }
    }
}

impl std::fmt::Display for VersionFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outdated {
                id,
                name,
                mirror,
                mirror_version,
                latest_version,
            } => write!(
                f,
                "Channel {id} {name} needs to be updated on {mirror} (v{mirror_version} < v{latest_version})"
            ),
            Self::MissingVersion { id, name, source } => {
                write!(f, "Channel {id} {name} has no version on {source}")
            }
        }
    }
}

impl std::fmt::Display for LinkFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLink { id, name } => {
                write!(f, "Channel {id} {name} does not have a demo_server_url")
            }
            Self::IdNotInLink { id, link, .. } => {
                write!(f, "ERROR: demo_server_url {link} does not contain {id}")
            }
            Self::NotOnLinkedServer { id, name, link } => write!(
                f,
                "Channel {id} {name} has demo_server_url {link} but it is not present on that server"
            ),
            Self::InvalidLink { id, name, link } => {
                write!(f, "Channel {id} {name} has an invalid demo_server_url {link}")
            }
        }
    }
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Found {} PUBLIC channels on Studio.", self.authoritative_count)?;
        writeln!(f, "Found {} PUBLIC channels in Catalog.", self.catalog_count)?;
        writeln!(f, "Found {} channels on demoservers.", self.mirror_channel_count)?;
        if let Some(mismatch) = &self.mismatch {
            writeln!(f, "WARNING: Studio PUBLIC channels and Catalog channels differ!")?;
            for id in &mismatch.only_authoritative {
                writeln!(f, " - only on Studio: {id}")?;
            }
            for id in &mismatch.only_catalog {
                writeln!(f, " - only in Catalog: {id}")?;
            }
        }

        writeln!(f, "\n\nREPORT A: Check no channels missing from catalog demoservers:")?;
        for missing in &self.missing {
            writeln!(f, " - Cannot find {} {}", missing.id, missing.name)?;
        }

        writeln!(f, "\n\nREPORT B: Check channel versions on catalog demoservers:")?;
        for finding in &self.stale {
            writeln!(f, " - {finding}")?;
        }

        writeln!(f, "\n\nREPORT C: Check the demo_server_url links in Catalog are good:")?;
        for finding in &self.links {
            writeln!(f, " - {finding}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelEntry, ChannelSource};

    fn channel(id: &str, version: Option<u64>, source: ChannelSource) -> ChannelRecord {
        ChannelRecord {
            id: id.into(),
            name: format!("Channel {id}"),
            version,
            source,
            link: None,
        }
    }

    fn studio(id: &str, version: u64) -> ChannelRecord {
        channel(id, Some(version), ChannelSource::Authoritative)
    }

    fn catalog(id: &str, link: Option<&str>) -> ChannelRecord {
        let mut record = channel(id, Some(1), ChannelSource::Catalog);
        record.link = link.map(String::from);
        record
    }

    fn mirror(origin: &str, channels: &[(&str, Option<u64>)]) -> MirrorCollection {
        let entries = channels
            .iter()
            .map(|(id, version)| ChannelEntry {
                id: (*id).into(),
                name: String::new(),
                version: *version,
                demo_server_url: None,
            })
            .collect();
        MirrorCollection::from_entries("en", origin, entries)
    }

    #[test]
    fn everything_missing_without_mirrors() {
        let authoritative = vec![studio("A", 2), studio("B", 1)];
        let report = reconcile(&authoritative, &[], &[]);
        let ids: Vec<&str> = report.missing.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(report.stale.is_empty());
    }

    #[test]
    fn older_mirror_is_stale() {
        let authoritative = vec![studio("A", 3)];
        let mirrors = vec![mirror("https://host1", &[("A", Some(1))])];
        let report = reconcile(&authoritative, &[], &mirrors);
        assert!(report.missing.is_empty());
        assert_eq!(
            report.stale,
            vec![VersionFinding::Outdated {
                id: "A".into(),
                name: "Channel A".into(),
                mirror: "https://host1".into(),
                mirror_version: 1,
                latest_version: 3,
            }]
        );
    }

    #[test]
    fn equal_or_newer_versions_are_fine() {
        let authoritative = vec![studio("A", 3)];
        let mirrors = vec![
            mirror("https://host1", &[("A", Some(3))]),
            mirror("https://host2", &[("A", Some(4))]),
        ];
        assert!(reconcile(&authoritative, &[], &mirrors).stale.is_empty());
    }

    #[test]
    fn missing_versions_are_reported() {
        let authoritative = vec![studio("A", 3)];
        let mirrors = vec![mirror("https://host1", &[("A", None)])];
        let report = reconcile(&authoritative, &[], &mirrors);
        assert!(matches!(
            &report.stale[0],
            VersionFinding::MissingVersion { source, .. } if source == "https://host1"
        ));
    }

    #[test]
    fn link_matches_mirror_host() {
        let authoritative = vec![studio("A", 1)];
        let catalog_entries = vec![catalog("A", Some("https://host1/x?id=A"))];

        let good = vec![mirror("https://host1", &[("A", Some(1))])];
        let report = reconcile(&authoritative, &catalog_entries, &good);
        assert!(report.links.is_empty());
        assert!(report.is_clean());

        let bad = vec![mirror("https://host2", &[("A", Some(1))])];
        let report = reconcile(&authoritative, &catalog_entries, &bad);
        assert_eq!(
            report.links,
            vec![LinkFinding::NotOnLinkedServer {
                id: "A".into(),
                name: "Channel A".into(),
                link: "https://host1/x?id=A".into(),
            }]
        );
    }

    #[test]
    fn mirror_origin_is_normalized() {
        let authoritative = vec![studio("A", 1)];
        let catalog_entries = vec![catalog("A", Some("https://Host1/learn/#/topics/A"))];
        let mirrors = vec![mirror("https://host1/", &[("A", Some(1))])];
        assert!(reconcile(&authoritative, &catalog_entries, &mirrors).links.is_empty());
    }

    #[test]
    fn link_without_id_and_missing_link() {
        let authoritative = vec![studio("A", 1), studio("B", 1)];
        let catalog_entries = vec![catalog("A", Some("https://host1/learn")), catalog("B", None)];
        let mirrors = vec![mirror("https://host1", &[("A", Some(1))])];
        let report = reconcile(&authoritative, &catalog_entries, &mirrors);
        assert_eq!(report.links.len(), 2);
        assert!(matches!(report.links[0], LinkFinding::IdNotInLink { .. }));
        assert!(matches!(report.links[1], LinkFinding::MissingLink { .. }));
    }

    #[test]
    fn unparseable_link() {
        let catalog_entries = vec![catalog("A", Some("not a url A"))];
        let report = reconcile(&[], &catalog_entries, &[]);
        assert!(matches!(report.links[0], LinkFinding::InvalidLink { .. }));
    }

    #[test]
    fn mismatch_is_a_warning_not_a_stop() {
        let authoritative = vec![studio("A", 1), studio("B", 1)];
        let catalog_entries = vec![catalog("A", Some("https://host1/A")), catalog("C", None)];
        let report = reconcile(&authoritative, &catalog_entries, &[]);
        assert_eq!(
            report.mismatch,
            Some(CollectionMismatch {
                only_authoritative: vec!["B".into()],
                only_catalog: vec!["C".into()],
            })
        );
        // the reports still ran
        assert_eq!(report.missing.len(), 2);
        assert_eq!(report.links.len(), 1);
    }

    #[test]
    fn duplicate_ids_count_once() {
        let authoritative = vec![studio("A", 1), studio("A", 1)];
        let report = reconcile(&authoritative, &[], &[]);
        assert_eq!(report.authoritative_count, 1);
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn duplicate_ids_keep_the_last_record() {
        let authoritative = vec![studio("A", 1), studio("B", 1), studio("A", 3)];
        let unique = unique_by_id(&authoritative);
        let ids: Vec<&str> = unique.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(unique[0].version, Some(3));

        let mirrors = vec![mirror("https://host1", &[("A", Some(2)), ("B", Some(1))])];
        let report = reconcile(&authoritative, &[], &mirrors);
        assert_eq!(report.stale.len(), 1);
    }

    #[test]
    fn rendered_sections_in_order() {
        let authoritative = vec![studio("A", 2)];
        let text = reconcile(&authoritative, &[], &[]).to_string();
        let a = text.find("REPORT A").unwrap();
        let b = text.find("REPORT B").unwrap();
        let c = text.find("REPORT C").unwrap();
        assert!(a < b && b < c);
        assert!(text.contains(" - Cannot find A Channel A\n"));
    }

    #[test]
    fn origins() {
        assert_eq!(url_origin("https://host1/x?id=A").as_deref(), Some("https://host1"));
        assert_eq!(url_origin("http://host1:8080/").as_deref(), Some("http://host1:8080"));
        assert_eq!(url_origin("nonsense"), None);
    }
}
