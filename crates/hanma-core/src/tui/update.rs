//! `update`: check crates.io for a newer release and reinstall

use super::common::Session;
use crate::product::ProductConfig;
use crate::version::{newer_version, UpdateChecker};
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;

/// CLI arguments for the update command
#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Only report whether an update exists
    pub check: bool,
}

/// Run the update command
pub async fn run_update<C: ProductConfig>(
    session: &Session<C>,
    args: UpdateArgs,
    cli_version: &str,
) -> Result<()> {
    let config = &session.config;
    cliclack::intro(format!("{} update", config.display_name()))?;

    let spinner = cliclack::spinner();
    spinner.start("Checking for updates...");
    let checker = UpdateChecker::new(config.user_agent());
    let latest = match checker.latest_version(config.crate_name()).await {
        Ok(latest) => latest,
        Err(e) => {
            spinner.error("Could not check for updates");
            return Err(e);
        }
    };

    let Some(newer) = newer_version(cli_version, &latest) else {
        spinner.stop(format!("Already up to date (v{})", cli_version));
        cliclack::outro("Nothing to do")?;
        return Ok(());
    };
    spinner.stop(format!("Update available: v{} -> v{}", cli_version, newer));

    if args.check {
        cliclack::outro(format!("Run `{}` to update", config.upgrade_command()))?;
        return Ok(());
    }

    cliclack::log::info(format!("This will execute: {}", config.upgrade_command()))?;
    run_upgrade(config.upgrade_command()).await?;
    cliclack::outro(format!("Updated to v{}", newer))?;
    Ok(())
}

async fn run_upgrade(command: &str) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts.next().context("Empty upgrade command")?;

    let status = Command::new(program)
        .args(parts)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        anyhow::bail!(
            "Upgrade failed ({}). Run it manually: {}",
            status,
            command
        );
    }
    Ok(())
}
