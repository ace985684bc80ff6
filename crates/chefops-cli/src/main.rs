//! chefops - content-integration fleet operations
//!
//! Reports on chef processes, chef repositories and the channel catalog.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chefops_cli::run().await
}
