//! `chefops dns` - DNS records of the demo servers.

use anyhow::Result;
use chefops_core::DnsStatus;
use colored::Colorize;
use serde::Serialize;
use std::net::IpAddr;
use tokio::net::lookup_host;
use tracing::debug;

use super::Context;
use crate::output::print_structured;

#[derive(Debug, Serialize)]
struct DnsCheck {
    role: String,
    hostname: String,
    expected: String,
    #[serde(flatten)]
    status: DnsStatus,
}

/// A-record style lookup; resolution failures count as no records.
async fn resolve(hostname: &str) -> Vec<IpAddr> {
    match lookup_host((hostname, 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            debug!(hostname, error = %e, "lookup failed");
            Vec::new()
        }
    }
}

pub async fn execute(ctx: Context) -> Result<()> {
    let mut checks = Vec::new();
    for (name, role) in &ctx.config.inventory {
        let Some(hostname) = role.hostname.as_deref() else {
            continue;
        };
        let resolved = resolve(hostname).await;
        checks.push(DnsCheck {
            role: name.clone(),
            hostname: hostname.to_string(),
            expected: role.host.clone(),
            status: DnsStatus::evaluate(&role.host, &resolved),
        });
    }

    if print_structured(ctx.output_format, &checks)? {
        return Ok(());
    }

    println!("{}", "Checking DNS records for all demo servers.".blue());
    for check in &checks {
        match &check.status {
            DnsStatus::Ok => println!("DNS for {} {}", check.role, "OK".green()),
            DnsStatus::Wrong { got } => println!(
                "{} for {} Hostname: {} Expected: {} Got: {}",
                "WRONG DNS".red(),
                check.role,
                check.hostname,
                check.expected,
                got.join(", ")
            ),
            DnsStatus::Missing => println!(
                "{} for {} Hostname: {} Expected: {}",
                "MISSING DNS".yellow(),
                check.role,
                check.hostname,
                check.expected
            ),
        }
    }

    Ok(())
}
