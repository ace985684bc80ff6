//! # chefops-cli
//!
//! Operator command-line interface for a content-integration fleet.
//!
//! ## Features
//!
//! - **Process listing**: chef processes from `ps aux`, tokens redacted
//! - **Code reports**: convention checks and line counts for chef repositories
//! - **Channel reconciliation**: catalog vs. mirror server discrepancies
//! - **Fleet checks**: proxy ports and DNS records of the demo servers
//! - **Multiple output formats**: aligned text, JSON, YAML

pub mod cli;
pub mod config;
pub mod local;
pub mod output;

pub use cli::run;
