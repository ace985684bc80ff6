//! HTTP client for the services chefops reports on.
//!
//! [`ChefopsClient`] talks to the authoritative channel API, the catalog,
//! the mirror servers, the GitHub REST API and the package index. Requests
//! are plain GETs; nothing is retried.

#![doc(html_root_url = "https://docs.rs/chefops-client/0.3.0")]

mod client;
mod config;
pub mod api;

pub use chefops_core::{ChefopsError, Result};
pub use client::{ChefopsClient, ChefopsClientBuilder};
pub use config::*;
