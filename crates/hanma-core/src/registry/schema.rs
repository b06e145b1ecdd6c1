//! Registry record types and their post-deserialization validation
//!
//! serde enforces the JSON shape; [`Validate`] enforces the invariants serde
//! cannot express (non-empty file lists, relative file paths).

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

/// Runtime checks applied to every record fetched from the registry
pub trait Validate {
    fn validate(&self) -> Result<(), SchemaError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), SchemaError> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// Anything addressable by a registry name
pub trait Named {
    fn name(&self) -> &str;
}

/// Case-insensitive lookup by name
pub fn find_named<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    items.iter().find(|item| item.name().eq_ignore_ascii_case(name))
}

/// Comma-separated names, for "available: ..." messages
pub fn available_names<T: Named>(items: &[T]) -> String {
    items
        .iter()
        .map(Named::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Kind of single-purpose registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Snippet,
    Module,
    Addon,
    Tooling,
}

impl ItemType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemType::Snippet => "snippet",
            ItemType::Module => "module",
            ItemType::Addon => "addon",
            ItemType::Tooling => "tooling",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// File carried inline by a registry item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    /// Destination file name, relative to the install directory
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Literal file text
    pub content: String,
}

/// A snippet, addon or tooling entry (registry/{framework}.json and friends)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    pub name: String,
    pub description: String,

    #[serde(rename = "type")]
    pub item_type: ItemType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub dev_dependencies: Vec<String>,

    pub files: Vec<RegistryFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Named for RegistryItem {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validate for RegistryItem {
    fn validate(&self) -> Result<(), SchemaError> {
        const KIND: &str = "Registry item";
        check_name(KIND, &self.name)?;
        if self.files.is_empty() {
            return Err(SchemaError::NoFiles {
                kind: KIND,
                name: self.name.clone(),
            });
        }
        for file in &self.files {
            check_path(KIND, &self.name, &file.name)?;
        }
        check_dependencies(KIND, &self.name, &self.dependencies)?;
        check_dependencies(KIND, &self.name, &self.dev_dependencies)
    }
}

/// File of a template or module block; `.hbs` paths are stripped on write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    pub path: String,
    pub content: String,
}

/// Slot a template block fills in a scaffolded project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Base,
    Database,
    Auth,
    Feature,
    Preset,
    Extra,
}

impl BlockCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            BlockCategory::Base => "base",
            BlockCategory::Database => "database",
            BlockCategory::Auth => "auth",
            BlockCategory::Feature => "feature",
            BlockCategory::Preset => "preset",
            BlockCategory::Extra => "extra",
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Sub-classification of feature blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Mailer,
    Upload,
    Cache,
    Queue,
    Logging,
    Monitoring,
    Tooling,
}

impl FeatureType {
    pub const ALL: [FeatureType; 7] = [
        FeatureType::Mailer,
        FeatureType::Upload,
        FeatureType::Cache,
        FeatureType::Queue,
        FeatureType::Logging,
        FeatureType::Monitoring,
        FeatureType::Tooling,
    ];

    /// Radio-style types: a project gets at most one of each
    pub fn is_exclusive(&self) -> bool {
        matches!(self, FeatureType::Mailer | FeatureType::Upload)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FeatureType::Mailer => "mailer",
            FeatureType::Upload => "upload",
            FeatureType::Cache => "cache",
            FeatureType::Queue => "queue",
            FeatureType::Logging => "logging",
            FeatureType::Monitoring => "monitoring",
            FeatureType::Tooling => "tooling",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Composable unit of a scaffolded project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBlock {
    pub name: String,
    pub category: BlockCategory,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub dev_dependencies: Vec<String>,

    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    #[serde(default)]
    pub env_vars: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<FeatureType>,

    pub files: Vec<TemplateFile>,
}

impl TemplateBlock {
    /// True when the block has no framework or targets `framework`
    pub fn supports(&self, framework: Option<&str>) -> bool {
        match (self.framework.as_deref(), framework) {
            (Some(own), Some(wanted)) => own.eq_ignore_ascii_case(wanted),
            _ => true,
        }
    }
}

impl Named for TemplateBlock {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validate for TemplateBlock {
    fn validate(&self) -> Result<(), SchemaError> {
        const KIND: &str = "Template block";
        check_name(KIND, &self.name)?;
        for file in &self.files {
            check_path(KIND, &self.name, &file.path)?;
        }
        check_dependencies(KIND, &self.name, &self.dependencies)?;
        check_dependencies(KIND, &self.name, &self.dev_dependencies)
    }
}

/// templates/index.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatesRegistry {
    pub base: Vec<TemplateBlock>,
    pub database: Vec<TemplateBlock>,
    pub auth: Vec<TemplateBlock>,

    #[serde(default)]
    pub features: Vec<TemplateBlock>,

    #[serde(default)]
    pub presets: Vec<TemplateBlock>,

    #[serde(default)]
    pub extra: Vec<TemplateBlock>,
}

impl TemplatesRegistry {
    /// Every block, grouped in registry order
    pub fn all_blocks(&self) -> impl Iterator<Item = &TemplateBlock> {
        self.base
            .iter()
            .chain(&self.database)
            .chain(&self.auth)
            .chain(&self.features)
            .chain(&self.presets)
            .chain(&self.extra)
    }

    pub fn blocks_for(&self, category: BlockCategory) -> &[TemplateBlock] {
        match category {
            BlockCategory::Base => &self.base,
            BlockCategory::Database => &self.database,
            BlockCategory::Auth => &self.auth,
            BlockCategory::Feature => &self.features,
            BlockCategory::Preset => &self.presets,
            BlockCategory::Extra => &self.extra,
        }
    }
}

impl Validate for TemplatesRegistry {
    fn validate(&self) -> Result<(), SchemaError> {
        for (field, blocks) in [
            ("base", &self.base),
            ("database", &self.database),
            ("auth", &self.auth),
            ("features", &self.features),
            ("presets", &self.presets),
            ("extra", &self.extra),
        ] {
            blocks.validate().map_err(|e| SchemaError::Nested {
                context: format!("templates.{}", field),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

/// Multi-file unit such as a complete auth subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleBlock {
    pub name: String,
    pub category: String,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,

    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    #[serde(default)]
    pub env_vars: Vec<String>,

    pub files: Vec<TemplateFile>,
}

impl Named for ModuleBlock {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validate for ModuleBlock {
    fn validate(&self) -> Result<(), SchemaError> {
        const KIND: &str = "Module";
        check_name(KIND, &self.name)?;
        if self.files.is_empty() {
            return Err(SchemaError::NoFiles {
                kind: KIND,
                name: self.name.clone(),
            });
        }
        for file in &self.files {
            check_path(KIND, &self.name, &file.path)?;
        }
        check_dependencies(KIND, &self.name, &self.dependencies)?;
        check_dependencies(KIND, &self.name, &self.dev_dependencies)
    }
}

/// modules/index.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulesRegistry {
    pub categories: Vec<String>,
    pub modules: BTreeMap<String, Vec<ModuleBlock>>,
}

impl ModulesRegistry {
    /// Modules of one category, matched case-insensitively
    pub fn category(&self, category: &str) -> Option<&[ModuleBlock]> {
        self.modules
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, modules)| modules.as_slice())
    }

    /// Every module, categories in declared order
    pub fn all_modules(&self) -> Vec<&ModuleBlock> {
        self.categories
            .iter()
            .filter_map(|c| self.modules.get(c))
            .flatten()
            .collect()
    }

    /// Case-insensitive lookup across all categories
    pub fn find(&self, name: &str) -> Option<&ModuleBlock> {
        self.all_modules()
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

impl Validate for ModulesRegistry {
    fn validate(&self) -> Result<(), SchemaError> {
        for (category, modules) in &self.modules {
            if !self.categories.contains(category) {
                return Err(SchemaError::UnknownCategory {
                    category: category.clone(),
                });
            }
            modules.validate().map_err(|e| SchemaError::Nested {
                context: format!("modules.{}", category),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

/// registry/index.json: the framework names that have a snippet registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkIndex(pub Vec<String>);

impl Validate for FrameworkIndex {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.0.iter().any(|name| name.trim().is_empty()) {
            return Err(SchemaError::MissingName { kind: "Framework" });
        }
        Ok(())
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<(), SchemaError> {
    if name.trim().is_empty() {
        return Err(SchemaError::MissingName { kind });
    }
    Ok(())
}

fn check_path(kind: &'static str, name: &str, path: &str) -> Result<(), SchemaError> {
    let unsafe_path = path.trim().is_empty()
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if unsafe_path {
        return Err(SchemaError::UnsafePath {
            kind,
            name: name.to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}

fn check_dependencies(kind: &'static str, name: &str, deps: &[String]) -> Result<(), SchemaError> {
    if deps.iter().any(|d| d.trim().is_empty()) {
        return Err(SchemaError::EmptyDependency {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
