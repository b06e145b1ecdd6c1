//! Registry fetching from the remote JSON endpoints
//!
//! Every collection is fetched with a plain GET, parsed, then validated before
//! it is trusted. When a cache is attached, a fresh cache entry is served
//! instead of hitting the network; a failed fetch is never retried.

use super::endpoints::{build_url, Endpoints};
use super::schema::{FrameworkIndex, ModulesRegistry, RegistryItem, TemplatesRegistry, Validate};
use crate::cache::CacheStore;
use crate::error::RegistryError;
use crate::product::ProductConfig;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Where a list of registry items lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    /// `registry/{framework}.json`
    Framework(String),
    /// A fixed file under `registry/`, e.g. `tooling`
    Fixed(&'static str),
}

impl ItemSource {
    fn file_stem(&self) -> String {
        match self {
            ItemSource::Framework(name) => name.to_lowercase(),
            ItemSource::Fixed(name) => name.to_string(),
        }
    }

    fn cache_key(&self) -> String {
        format!("registry-{}", self.file_stem())
    }
}

impl fmt::Display for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

/// Registry fetcher - retrieves and validates registry collections
pub struct RegistryFetcher {
    endpoints: Endpoints,
    client: reqwest::Client,
    cache: Option<Arc<CacheStore>>,
    ttl: Duration,
    /// Skip cache reads (fetched data is still written back)
    refresh: bool,
}

impl RegistryFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(endpoints: Endpoints, user_agent: &str) -> Self {
        Self {
            endpoints,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            cache: None,
            ttl: crate::cache::DEFAULT_TTL,
            refresh: false,
        }
    }

    /// Create a fetcher from a product config and the process environment
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let endpoints = Endpoints::from_config(config)?;
        Ok(Self::new(endpoints, config.user_agent()))
    }

    /// Serve fresh entries from `cache` and store everything fetched
    pub fn with_cache(mut self, cache: Arc<CacheStore>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    /// Always hit the network
    pub fn refreshing(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn cache(&self) -> Option<&Arc<CacheStore>> {
        self.cache.as_ref()
    }

    /// Framework names that have a snippet registry
    pub async fn fetch_framework_index(&self) -> Result<Vec<String>> {
        let url = build_url(&self.endpoints.registry, "index.json")?;
        let index: FrameworkIndex = self.fetch_json("registry-index", url).await?;
        Ok(index.0)
    }

    /// Items of a framework registry or a fixed registry file
    pub async fn fetch_items(&self, source: &ItemSource) -> Result<Vec<RegistryItem>> {
        let url = build_url(
            &self.endpoints.registry,
            &format!("{}.json", source.file_stem()),
        )?;
        Ok(self.fetch_json(&source.cache_key(), url).await?)
    }

    /// Template blocks for `create`
    pub async fn fetch_templates(&self) -> Result<TemplatesRegistry> {
        let url = build_url(&self.endpoints.templates, "index.json")?;
        Ok(self.fetch_json("templates", url).await?)
    }

    /// Module blocks grouped by category
    pub async fn fetch_modules(&self) -> Result<ModulesRegistry> {
        let url = build_url(&self.endpoints.modules, "index.json")?;
        Ok(self.fetch_json("modules", url).await?)
    }

    /// GET, parse and validate one collection, consulting the cache first
    async fn fetch_json<T>(&self, key: &str, url: Url) -> Result<T, RegistryError>
    where
        T: DeserializeOwned + Serialize + Validate,
    {
        if let Some(cached) = self.read_cached::<T>(key).await {
            tracing::debug!(key, "registry cache hit");
            return Ok(cached);
        }

        tracing::debug!(key, %url, "fetching registry");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| RegistryError::Network {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Http {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Network {
                url: url.to_string(),
                source,
            })?;
        let value: T = serde_json::from_str(&body).map_err(|source| RegistryError::Parse {
            url: url.to_string(),
            source,
        })?;
        value
            .validate()
            .map_err(|source| RegistryError::Validation {
                url: url.to_string(),
                source,
            })?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.write(key, &value).await {
                tracing::warn!(key, error = %e, "failed to cache registry data");
            }
        }

        Ok(value)
    }

    async fn read_cached<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Validate,
    {
        let cache = self.cache.as_ref().filter(|_| !self.refresh)?;
        if !cache.is_valid(key, self.ttl).await {
            return None;
        }
        let value: T = cache.read(key).await?;
        match value.validate() {
            Ok(()) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "discarding invalid cache entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fetcher_for(server: &MockServer) -> RegistryFetcher {
        let endpoints = Endpoints::from_base(&server.base_url()).unwrap();
        RegistryFetcher::new(endpoints, "hanma-test")
    }

    fn snippet(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "description": "snippet",
            "type": "snippet",
            "dependencies": ["cors@2.8.5"],
            "files": [{ "name": format!("{}.ts", name), "content": "export {}" }]
        })
    }

    #[tokio::test]
    async fn test_fetch_framework_registry() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/registry/express.json");
                then.status(200).json_body(json!([snippet("cors")]));
            })
            .await;

        let items = fetcher_for(&server)
            .fetch_items(&ItemSource::Framework("Express".to_string()))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "cors");
    }

    #[tokio::test]
    async fn test_http_error_mentions_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/registry/tooling.json");
                then.status(404).body("Not Found");
            })
            .await;

        let err = fetcher_for(&server)
            .fetch_items(&ItemSource::Fixed("tooling"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Http { .. })
        ));
        assert!(err.to_string().contains("404"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_validation_failure_is_reported() {
        let server = MockServer::start_async().await;
        let mut broken = snippet("cors");
        broken["files"] = json!([]);
        let body = json!([broken]);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/registry/shared.json");
                then.status(200).json_body(body.clone());
            })
            .await;

        let err = fetcher_for(&server)
            .fetch_items(&ItemSource::Fixed("shared"))
            .await
            .unwrap_err();

        match err.downcast_ref::<RegistryError>() {
            Some(RegistryError::Validation { source, .. }) => {
                assert!(source.to_string().contains("no files"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/templates/index.json");
                then.status(200).json_body(json!({ "base": "nope" }));
            })
            .await;

        let err = fetcher_for(&server).fetch_templates().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/registry/index.json");
                then.status(200).json_body(json!(["express", "hono"]));
            })
            .await;

        let temp = TempDir::new().unwrap();
        let cache = Arc::new(CacheStore::new(temp.path()));
        let fetcher = fetcher_for(&server).with_cache(cache, Duration::from_secs(60));

        let first = fetcher.fetch_framework_index().await.unwrap();
        let second = fetcher.fetch_framework_index().await.unwrap();

        assert_eq!(first, vec!["express", "hono"]);
        assert_eq!(first, second);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/modules/index.json");
                then.status(200)
                    .json_body(json!({ "categories": [], "modules": {} }));
            })
            .await;

        let temp = TempDir::new().unwrap();
        let cache = Arc::new(CacheStore::new(temp.path()));
        let fetcher = fetcher_for(&server)
            .with_cache(cache, Duration::from_secs(60))
            .refreshing(true);

        fetcher.fetch_modules().await.unwrap();
        fetcher.fetch_modules().await.unwrap();

        mock.assert_calls_async(2).await;
    }
}
