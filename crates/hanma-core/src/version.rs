//! CLI update checks against crates.io

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;

/// crates.io API root
pub const CRATES_IO_API: &str = "https://crates.io/api/v1/crates";

/// Parse version string, handling a leading `v`
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

/// The newer version, if `latest` is ahead of `current`
///
/// Unparseable versions never produce an update notice.
pub fn newer_version(current: &str, latest: &str) -> Option<Version> {
    let current = parse_version(current).ok()?;
    let latest = parse_version(latest).ok()?;
    (latest > current).then_some(latest)
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
    max_version: String,
}

/// Looks up the latest published version of a crate
pub struct UpdateChecker {
    client: reqwest::Client,
    api_root: String,
}

impl UpdateChecker {
    pub fn new(user_agent: &str) -> Self {
        Self::with_api_root(user_agent, CRATES_IO_API)
    }

    pub fn with_api_root(user_agent: &str, api_root: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_root: api_root.trim_end_matches('/').to_string(),
        }
    }

    /// Latest stable version, falling back to the latest of any kind
    pub async fn latest_version(&self, crate_name: &str) -> Result<String> {
        let url = format!("{}/{}", self.api_root, crate_name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to check for updates at {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to check for updates at {}: HTTP {}",
                url,
                response.status()
            );
        }

        let body: CrateResponse = response
            .json()
            .await
            .context("Failed to parse crates.io response")?;
        Ok(body
            .krate
            .max_stable_version
            .unwrap_or(body.krate.max_version))
    }
}
