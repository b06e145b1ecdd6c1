//! Local registry cache
//!
//! Registry collections are cached as `<key>.json` blobs under a per-user
//! directory, with one shared `.cache-meta.json` recording when each key was
//! written. Metadata updates are serialized inside the process only; two CLI
//! processes writing at once can still lose an entry.

pub mod meta;
pub mod store;

pub use meta::{CacheMeta, CacheMetaEntry, META_FILE};
pub use store::{CacheInfo, CacheStore};

use std::path::PathBuf;
use std::time::Duration;

/// Default time a cached registry stays fresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Get the default cache directory for this platform
pub fn default_cache_dir() -> PathBuf {
    cache_dir_for(
        cfg!(windows),
        std::env::var("LOCALAPPDATA").ok(),
        dirs::home_dir(),
    )
}

/// Windows: `%LOCALAPPDATA%\hanma\cache`, else `~/.hanma/cache`
fn cache_dir_for(windows: bool, local_app_data: Option<String>, home: Option<PathBuf>) -> PathBuf {
    let home = home.unwrap_or_else(|| PathBuf::from("."));
    if windows {
        let base = local_app_data
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("AppData").join("Local"));
        base.join("hanma").join("cache")
    } else {
        home.join(".hanma").join("cache")
    }
}

/// Human-readable age using the coarsest non-zero unit
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    let (days, hours, minutes) = (secs / 86_400, secs / 3_600, secs / 60);

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else if secs > 0 {
        format!("{}s ago", secs)
    } else {
        "just now".to_string()
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= KB * KB {
        format!("{:.1} MB", bytes_f / (KB * KB))
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_cache_dir() {
        let dir = cache_dir_for(false, None, Some(PathBuf::from("/home/dev")));
        assert_eq!(dir, PathBuf::from("/home/dev/.hanma/cache"));
    }

    #[test]
    fn test_windows_cache_dir_uses_local_app_data() {
        let dir = cache_dir_for(
            true,
            Some("/appdata/local".to_string()),
            Some(PathBuf::from("/home/dev")),
        );
        assert_eq!(dir, PathBuf::from("/appdata/local").join("hanma").join("cache"));
    }

    #[test]
    fn test_windows_cache_dir_falls_back_to_home() {
        let dir = cache_dir_for(true, None, Some(PathBuf::from("/home/dev")));
        assert_eq!(
            dir,
            PathBuf::from("/home/dev")
                .join("AppData")
                .join("Local")
                .join("hanma")
                .join("cache")
        );
    }

    #[test]
    fn test_format_age_picks_coarsest_unit() {
        assert_eq!(format_age(Duration::from_secs(3 * 86_400 + 7_200)), "3d ago");
        assert_eq!(format_age(Duration::from_secs(5 * 3_600 + 59)), "5h ago");
        assert_eq!(format_age(Duration::from_secs(125)), "2m ago");
        assert_eq!(format_age(Duration::from_secs(42)), "42s ago");
        assert_eq!(format_age(Duration::from_millis(300)), "just now");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
