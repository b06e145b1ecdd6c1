//! Synthesized `package.json` and edits to an existing one

use super::collector::CollectedBlockData;
use crate::deps::DependencyMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

pub const PACKAGE_JSON: &str = "package.json";

/// Version written into every new project
pub const INITIAL_VERSION: &str = "0.1.0";

/// The `package.json` of a freshly created project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: String,
    pub version: String,
    pub private: bool,
    pub scripts: BTreeMap<String, String>,
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
}

impl PackageJson {
    pub fn from_collected(project_name: &str, data: &CollectedBlockData) -> Self {
        Self {
            name: project_name.to_string(),
            version: INITIAL_VERSION.to_string(),
            private: true,
            scripts: data.scripts.clone(),
            dependencies: data.dependencies.clone(),
            dev_dependencies: data.dev_dependencies.clone(),
        }
    }

    /// Pretty-printed with two-space indentation
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize package.json")
    }
}

/// `name` from an existing `package.json`, if there is one
pub async fn read_project_name(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join(PACKAGE_JSON)).await.ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value.get("name")?.as_str().map(str::to_string)
}

/// Merge scripts into an existing `package.json`, later values winning
///
/// Returns `false` without touching anything when no `package.json` exists.
pub async fn merge_scripts(dir: &Path, scripts: &BTreeMap<String, String>) -> Result<bool> {
    let path = dir.join(PACKAGE_JSON);
    if scripts.is_empty() || !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let root = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("{} is not a JSON object", path.display()))?;
    let existing = root
        .entry("scripts")
        .or_insert_with(|| serde_json::Value::Object(Default::default()));
    let existing = existing
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("\"scripts\" in {} is not an object", path.display()))?;

    for (name, command) in scripts {
        existing.insert(name.clone(), serde_json::Value::String(command.clone()));
    }

    let json = serde_json::to_string_pretty(&value)?;
    fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
