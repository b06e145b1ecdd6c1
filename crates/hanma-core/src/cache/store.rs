//! Cache storage implementation

use super::meta::{CacheMeta, CacheMetaEntry, META_FILE};
use super::format_age;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::sync::Mutex;
use walkdir::WalkDir;

/// One row of `hanma sync --info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub key: String,
    pub size: u64,
    pub age: Duration,
    /// e.g. `3h ago`
    pub age_label: String,
}

/// Filesystem-backed key -> JSON cache
pub struct CacheStore {
    root: PathBuf,
    /// Held for the whole read-modify-write of `.cache-meta.json`
    meta_lock: Mutex<()>,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            meta_lock: Mutex::new(()),
        }
    }

    /// Get the cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join(META_FILE)
    }

    /// True if `key` is cached and was written less than `ttl` ago
    pub async fn is_valid(&self, key: &str, ttl: Duration) -> bool {
        let path = self.key_path(key);
        let Ok(file_meta) = fs::metadata(&path).await else {
            return false;
        };

        let recorded = self
            .read_meta()
            .await
            .and_then(|meta| meta.entries.get(key).map(|e| e.timestamp));
        let timestamp = recorded.or_else(|| file_meta.modified().ok().map(system_time_millis));

        match timestamp {
            Some(ts) => within_ttl(age_since(ts), ttl),
            None => false,
        }
    }

    /// Read a cached value; missing or corrupt blobs read as `None`
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.key_path(key);
        let content = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "discarding corrupt cache entry");
                None
            }
        }
    }

    /// Write a value and record it in the shared metadata
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create cache directory {}", self.root.display()))?;

        let json = serde_json::to_string(data).context("Failed to serialize cache entry")?;
        let path = self.key_path(key);
        fs::write(&path, &json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let size = json.len() as u64;
        self.update_meta(|meta| {
            let now = now_millis();
            meta.entries.insert(
                key.to_string(),
                CacheMetaEntry {
                    timestamp: now,
                    size,
                },
            );
            meta.last_update = now;
        })
        .await
    }

    /// Run `f` against the metadata file as one critical section
    ///
    /// The lock covers the read, the mutation and the write, so concurrent
    /// writers in this process never overwrite each other's entries.
    pub async fn update_meta<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut CacheMeta) -> R,
    {
        let _guard = self.meta_lock.lock().await;

        let mut meta = self.read_meta().await.unwrap_or_default();
        let result = f(&mut meta);

        let json = serde_json::to_string_pretty(&meta).context("Failed to serialize cache metadata")?;
        let path = self.meta_path();
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(result)
    }

    /// Current metadata, `None` if absent or unreadable
    pub async fn read_meta(&self) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path()).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Remove the whole cache directory
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.meta_lock.lock().await;
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove cache directory {}", self.root.display())),
        }
    }

    /// Enumerate cached keys with their sizes and ages
    pub async fn info(&self) -> Result<Vec<CacheInfo>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let meta = self.read_meta().await.unwrap_or_default();
        let now = now_millis();
        let mut rows = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to read {}", self.root.display()))?;
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy();

            if !entry.file_type().is_file() || file_name == META_FILE {
                continue;
            }
            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };

            let file_meta = fs::metadata(path).await?;
            let recorded = meta.entries.iter().find(|(key, _)| file_stem(key) == stem);
            let (key, timestamp) = match recorded {
                Some((key, e)) => (key.clone(), e.timestamp),
                None => (
                    stem.to_string(),
                    file_meta.modified().map(system_time_millis).unwrap_or(now),
                ),
            };

            let age = Duration::from_millis(now.saturating_sub(timestamp).max(0) as u64);
            rows.push(CacheInfo {
                key,
                size: file_meta.len(),
                age,
                age_label: format_age(age),
            });
        }

        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }
}

/// Keys become file names; anything outside `[A-Za-z0-9._-]` maps to `_`
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Time elapsed since a millisecond timestamp; future timestamps count as zero
fn age_since(timestamp: i64) -> Duration {
    Duration::from_millis(now_millis().saturating_sub(timestamp).max(0) as u64)
}

fn within_ttl(age: Duration, ttl: Duration) -> bool {
    age < ttl
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
