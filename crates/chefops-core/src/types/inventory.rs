//! Fleet inventory types.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Port the squid proxy listens on.
pub const PROXY_PORT: u16 = 3128;

/// A demo server in the inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRole {
    /// Host address (IP) used to reach the server
    pub host: String,

    /// Public DNS name, if the server has one
    #[serde(default)]
    pub hostname: Option<String>,

    /// Facility name used when provisioning the server
    #[serde(default)]
    pub facility_name: Option<String>,

    /// Channel ids the server should host
    #[serde(default)]
    pub channels_to_import: Vec<String>,
}

/// Value for the `PROXY_LIST` environment variable: `host:port` joined with `;`.
#[must_use]
pub fn proxy_list<S: AsRef<str>>(hosts: &[S], port: u16) -> String {
    hosts
        .iter()
        .map(|h| format!("{}:{port}", h.as_ref()))
        .collect::<Vec<_>>()
        .join(";")
}

/// Result of comparing a DNS lookup against the inventory address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DnsStatus {
    /// The hostname resolves to the inventory address
    Ok,
    /// The hostname resolves, but not to the inventory address
    Wrong {
        /// Addresses the lookup returned
        got: Vec<String>,
    },
    /// The hostname does not resolve
    Missing,
}

impl DnsStatus {
    /// Compare resolved addresses with the expected host address
    #[must_use]
    pub fn evaluate(expected: &str, resolved: &[IpAddr]) -> Self {
        if resolved.is_empty() {
            return Self::Missing;
        }
        if resolved.iter().any(|ip| ip.to_string() == expected) {
            Self::Ok
        } else {
            let mut got: Vec<String> = resolved.iter().map(ToString::to_string).collect();
            got.sort();
            got.dedup();
            Self::Wrong { got }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_list_joins_with_semicolons() {
        let hosts = ["10.0.0.1", "10.0.0.2"];
        assert_eq!(proxy_list(&hosts, PROXY_PORT), "10.0.0.1:3128;10.0.0.2:3128");
        assert_eq!(proxy_list::<&str>(&[], PROXY_PORT), "");
    }

    #[test]
    fn dns_status() {
        let ip: IpAddr = "35.196.179.152".parse().unwrap();
        let other: IpAddr = "35.196.179.153".parse().unwrap();
        assert_eq!(DnsStatus::evaluate("35.196.179.152", &[ip]), DnsStatus::Ok);
        assert_eq!(
            DnsStatus::evaluate("35.196.179.152", &[other, other]),
            DnsStatus::Wrong {
                got: vec!["35.196.179.153".into()]
            }
        );
        assert_eq!(DnsStatus::evaluate("35.196.179.152", &[]), DnsStatus::Missing);
    }
}
