//! `hanma.json`: per-project install locations

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE: &str = "hanma.json";

pub const DEFAULT_COMPONENTS_PATH: &str = "src";
pub const DEFAULT_UTILS_PATH: &str = "src/utils";

/// Project configuration written by `hanma init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HanmaConfig {
    /// Where snippets are written
    pub components_path: String,

    /// Where addons are written
    pub utils_path: String,

    /// Default snippet registry for `hanma add`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

impl Default for HanmaConfig {
    fn default() -> Self {
        Self {
            components_path: DEFAULT_COMPONENTS_PATH.to_string(),
            utils_path: DEFAULT_UTILS_PATH.to_string(),
            framework: None,
        }
    }
}

impl HanmaConfig {
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    pub fn exists_in(project_dir: &Path) -> bool {
        Self::path_in(project_dir).exists()
    }

    /// Load `hanma.json` from `project_dir`
    pub async fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(project_dir);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing { path })
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Write `hanma.json` into `project_dir`, replacing any existing file
    pub async fn save(&self, project_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = Self::path_in(project_dir);
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, json)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    pub fn components_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.components_path)
    }

    pub fn utils_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.utils_path)
    }
}

/// Longest package name npm accepts
pub const MAX_PROJECT_NAME_LEN: usize = 214;

/// Check a project name is usable as a directory and a `package.json` name
pub fn validate_project_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Project name cannot be empty".to_string());
    }
    if name.len() > MAX_PROJECT_NAME_LEN {
        return Err(format!(
            "Project name must be at most {} characters",
            MAX_PROJECT_NAME_LEN
        ));
    }
    if name.starts_with('.') || name.starts_with('_') {
        return Err("Project name cannot start with '.' or '_'".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!(
            "Project name can only contain lowercase letters, digits, '-', '_' and '.' (found '{}')",
            c
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_name_rules() {
        assert!(validate_project_name("my-api").is_ok());
        assert!(validate_project_name("api.v2_beta").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("My-Api").is_err());
        assert!(validate_project_name(".hidden").is_err());
        assert!(validate_project_name("_private").is_err());
        assert!(validate_project_name("has space").is_err());
        assert!(validate_project_name(&"a".repeat(215)).is_err());
    }

    #[tokio::test]
    async fn test_round_trip_with_camel_case_keys() {
        let temp = TempDir::new().unwrap();
        let config = HanmaConfig {
            components_path: "src/lib".to_string(),
            utils_path: "src/lib/utils".to_string(),
            framework: Some("express".to_string()),
        };

        let path = config.save(temp.path()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["componentsPath"], "src/lib");
        assert_eq!(raw["utilsPath"], "src/lib/utils");

        assert_eq!(HanmaConfig::load(temp.path()).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_missing_config() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            HanmaConfig::load(temp.path()).await,
            Err(ConfigError::Missing { .. })
        ));
        assert!(!HanmaConfig::exists_in(temp.path()));
    }

    #[tokio::test]
    async fn test_framework_is_optional() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"componentsPath":"src","utilsPath":"src/utils"}"#,
        )
        .unwrap();

        let config = HanmaConfig::load(temp.path()).await.unwrap();
        assert_eq!(config.framework, None);
        assert_eq!(config.utils_dir(temp.path()), temp.path().join("src/utils"));
    }

    #[tokio::test]
    async fn test_malformed_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "{").unwrap();
        assert!(matches!(
            HanmaConfig::load(temp.path()).await,
            Err(ConfigError::Parse { .. })
        ));
    }
}
