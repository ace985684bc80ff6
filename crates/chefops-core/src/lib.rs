//! Core types and algorithms for chefops.
//!
//! This crate holds everything that does not touch the network:
//!
//! - **Types**: process rows, channel records, repository reports, inventory
//! - **Parsing**: whitespace-delimited command output such as `ps aux`
//! - **Reports**: convention checks and the aligned code report table
//! - **Reconciliation**: channel catalog vs. mirror server discrepancies
//! - **Shell**: explicit command composition for remote chef runs
//! - **Errors**: operational failures with [`ChefopsError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use chefops_core::parse::parse_psaux;
//!
//! let processes = parse_psaux(&ps_output);
//! for p in &processes {
//!     println!("{} {}", p.pid, p.command);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/chefops-core/0.3.0")]

mod error;
pub mod checks;
pub mod parse;
pub mod process;
pub mod reconcile;
pub mod repos;
pub mod report;
pub mod shell;
pub mod types;

pub use error::{ChefopsError, Result};
pub use types::*;
