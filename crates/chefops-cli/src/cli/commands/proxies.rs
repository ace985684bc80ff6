//! `chefops proxies` - demo servers with an open proxy port.

use anyhow::Result;
use chefops_core::proxy_list;
use colored::Colorize;
use serde::Serialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::Context;
use crate::cli::args::ProxiesArgs;
use crate::output::{print_structured, OutputFormat};

#[derive(Debug, Serialize)]
struct ProxyReport {
    port: u16,
    open: Vec<String>,
    proxy_list: String,
}

/// Returns true if a TCP connection to `host:port` succeeds within `limit`.
async fn port_open(host: &str, port: u16, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(host, port, error = %e, "connect failed");
            false
        }
        Err(_) => {
            debug!(host, port, "connect timed out");
            false
        }
    }
}

pub async fn execute(ctx: Context, args: ProxiesArgs) -> Result<()> {
    // Structured formats print only the final report
    let text = ctx.output_format == OutputFormat::Text;
    let limit = Duration::from_secs(args.timeout);

    if text {
        println!("{}", "Checking proxy service on all demo servers.".green());
    }

    let mut open = Vec::new();
    for (name, role) in &ctx.config.inventory {
        if text {
            println!("Checking role_name={name} host={}", role.host);
        }
        if port_open(&role.host, args.port, limit).await {
            if text {
                println!("    - proxy port open on {name} demoserver");
            }
            open.push(role.host.clone());
        }
    }

    let report = ProxyReport {
        port: args.port,
        proxy_list: proxy_list(&open, args.port),
        open,
    };

    if !print_structured(ctx.output_format, &report)? {
        println!(
            "{}",
            "Use the following command to set the PROXY_LIST env var:\n".blue()
        );
        println!("{}", format!("  export PROXY_LIST=\"{}\"", report.proxy_list).blue());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn detects_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(port_open("127.0.0.1", port, Duration::from_secs(3)).await);

        drop(listener);
        assert!(!port_open("127.0.0.1", port, Duration::from_secs(3)).await);
    }
}
