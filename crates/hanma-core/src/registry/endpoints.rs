//! Remote endpoint resolution from `HANMA_*` environment variables

use crate::product::ProductConfig;
use anyhow::{Context, Result};
use url::Url;

pub const BASE_URL_ENV: &str = "HANMA_BASE_URL";
pub const REGISTRY_URL_ENV: &str = "HANMA_REGISTRY_URL";
pub const TEMPLATES_URL_ENV: &str = "HANMA_TEMPLATES_URL";
pub const MODULES_URL_ENV: &str = "HANMA_MODULES_URL";
pub const DOCS_URL_ENV: &str = "HANMA_DOCS_URL";

/// Base URLs for every registry collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Snippet, addon and tooling registries (`{registry}/{framework}.json`)
    pub registry: Url,
    /// Template blocks (`{templates}/index.json`)
    pub templates: Url,
    /// Module blocks (`{modules}/index.json`)
    pub modules: Url,
    /// Documentation site
    pub docs: Url,
}

impl Endpoints {
    /// Resolve endpoints from the process environment
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        Self::resolve(config.default_base_url(), |key| std::env::var(key).ok())
    }

    /// Resolve endpoints with an explicit variable lookup
    pub fn resolve<F>(default_base: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_str = lookup(BASE_URL_ENV).unwrap_or_else(|| default_base.to_string());
        let base = parse_url(BASE_URL_ENV, &base_str)?;

        let endpoint = |env: &str, segment: &str| -> Result<Url> {
            match lookup(env) {
                Some(value) => parse_url(env, &value),
                None => build_url(&base, segment),
            }
        };

        Ok(Self {
            registry: endpoint(REGISTRY_URL_ENV, "registry")?,
            templates: endpoint(TEMPLATES_URL_ENV, "templates")?,
            modules: endpoint(MODULES_URL_ENV, "modules")?,
            docs: endpoint(DOCS_URL_ENV, "docs")?,
        })
    }

    /// Every endpoint rooted at one base URL
    pub fn from_base(base: &str) -> Result<Self> {
        Self::resolve(base, |_| None)
    }
}

fn parse_url(env: &str, value: &str) -> Result<Url> {
    Url::parse(value).with_context(|| format!("Invalid URL in {}: {}", env, value))
}

/// Build a URL by appending a path segment, preserving query parameters
pub fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
        .pop_if_empty()
        .push(path_segment);
    Ok(url)
}
