//! `chefops channels` - catalog vs. mirror server reconciliation.

use anyhow::{Context as _, Result};
use chefops_core::reconcile::reconcile;
use colored::Colorize;
use tracing::info;

use super::Context;
use crate::cli::args::ChannelsArgs;
use crate::config::MirrorServer;
use crate::output::print_structured;

pub async fn execute(ctx: Context, args: ChannelsArgs) -> Result<()> {
    let mirrors: Vec<MirrorServer> = if args.mirrors.is_empty() {
        ctx.config.mirrors.clone()
    } else {
        args.mirrors
            .into_iter()
            .map(|(label, url)| MirrorServer { label, url })
            .collect()
    };

    let client = ctx.client()?;
    let api = client.channels();

    // Everything is fetched before anything is compared
    let authoritative = api
        .public_channels()
        .await
        .context("Could not fetch the authoritative channel list")?;
    let catalog = api
        .catalog_channels()
        .await
        .context("Could not fetch the catalog")?;

    let mut collections = Vec::with_capacity(mirrors.len());
    for mirror in &mirrors {
        let collection = api
            .mirror_collection(&mirror.label, &mirror.url)
            .await
            .with_context(|| format!("Could not fetch channels from mirror {}", mirror.url))?;
        collections.push(collection);
    }
    info!(mirrors = collections.len(), "fetched all collections");

    let report = reconcile(&authoritative, &catalog, &collections);

    if !print_structured(ctx.output_format, &report)? {
        print!("{report}");
        if report.is_clean() {
            println!("{}", "No discrepancies found.".green());
        }
    }

    Ok(())
}
