//! `sync`: refresh, inspect or clear the local registry cache

use super::common::Session;
use crate::cache::format_size;
use crate::product::ProductConfig;
use crate::registry::ItemSource;
use anyhow::Result;
use colored::Colorize;

/// CLI arguments for the sync command
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    /// Delete the cache directory
    pub clear: bool,

    /// List cached entries instead of refreshing
    pub info: bool,
}

/// Run the sync command
pub async fn run_sync<C: ProductConfig>(session: &Session<C>, args: SyncArgs) -> Result<()> {
    if args.clear {
        session.cache.clear().await?;
        cliclack::log::success(format!("Cleared {}", session.cache.root().display()))?;
        return Ok(());
    }
    if args.info {
        return print_info(session).await;
    }

    cliclack::intro(format!("{} sync", session.config.display_name()))?;
    let fetcher = session.refreshing_fetcher()?;

    let spinner = cliclack::spinner();
    spinner.start("Fetching framework index...");
    let result = async {
        let frameworks = fetcher.fetch_framework_index().await?;
        let mut synced = 1;

        for framework in &frameworks {
            spinner.set_message(format!("Fetching {} snippets...", framework));
            fetcher
                .fetch_items(&ItemSource::Framework(framework.clone()))
                .await?;
            synced += 1;
        }
        for fixed in ["shared", "tooling"] {
            spinner.set_message(format!("Fetching {}...", fixed));
            fetcher.fetch_items(&ItemSource::Fixed(fixed)).await?;
            synced += 1;
        }

        spinner.set_message("Fetching templates...");
        fetcher.fetch_templates().await?;
        spinner.set_message("Fetching modules...");
        fetcher.fetch_modules().await?;
        Ok::<usize, anyhow::Error>(synced + 2)
    }
    .await;

    match result {
        Ok(count) => {
            spinner.stop(format!("Synced {} registries", count));
            cliclack::outro(format!("Cache: {}", session.cache.root().display()))?;
            Ok(())
        }
        Err(e) => {
            spinner.error(format!("{:#}", e));
            Err(e)
        }
    }
}

async fn print_info<C: ProductConfig>(session: &Session<C>) -> Result<()> {
    let rows = session.cache.info().await?;
    println!("{} {}", "Cache:".bold(), session.cache.root().display());

    if rows.is_empty() {
        println!("  Cache is empty. Run `{} sync` to populate it.", session.config.name());
        return Ok(());
    }

    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let mut total = 0;
    println!();
    for row in &rows {
        total += row.size;
        let key = format!("{:<width$}", row.key, width = width);
        println!(
            "  {}  {:>9}  {}",
            key.green(),
            format_size(row.size),
            row.age_label.dimmed()
        );
    }
    println!();
    println!("  {} entries, {}", rows.len(), format_size(total));
    Ok(())
}
