//! Turning user choices into an ordered, valid list of template blocks

use crate::error::SelectionError;
use crate::registry::schema::{
    available_names, BlockCategory, FeatureType, TemplateBlock, TemplatesRegistry,
};

/// Accepted in place of a block name to skip an optional slot
pub const NONE_CHOICE: &str = "none";

/// Block names chosen by flags or prompts; `None` leaves a slot empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Base block name or its framework
    pub framework: Option<String>,
    pub database: Option<String>,
    pub auth: Option<String>,
    pub preset: Option<String>,
    pub features: Vec<String>,
    pub extras: Vec<String>,
}

/// Concrete blocks for one `create` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub base: &'a TemplateBlock,
    pub database: Option<&'a TemplateBlock>,
    pub auth: Option<&'a TemplateBlock>,
    pub preset: Option<&'a TemplateBlock>,
    pub features: Vec<&'a TemplateBlock>,
    pub extras: Vec<&'a TemplateBlock>,
}

impl<'a> Selection<'a> {
    pub fn new(base: &'a TemplateBlock) -> Self {
        Self {
            base,
            database: None,
            auth: None,
            preset: None,
            features: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// Framework the project is built on
    pub fn framework(&self) -> Option<&'a str> {
        self.base.framework.as_deref()
    }

    /// Blocks in merge order: base, database, auth, preset, features, extras
    pub fn blocks(&self) -> Vec<&'a TemplateBlock> {
        let mut blocks = vec![self.base];
        blocks.extend(self.database);
        blocks.extend(self.auth);
        blocks.extend(self.preset);
        blocks.extend(self.features.iter().copied());
        blocks.extend(self.extras.iter().copied());
        blocks
    }

    /// Check slot categories, framework compatibility and radio feature types
    pub fn validate(&self) -> Result<(), SelectionError> {
        let framework = self.framework();
        let slots = [
            (Some(self.base), BlockCategory::Base),
            (self.database, BlockCategory::Database),
            (self.auth, BlockCategory::Auth),
            (self.preset, BlockCategory::Preset),
        ];
        let lists = self
            .features
            .iter()
            .map(|b| (Some(*b), BlockCategory::Feature))
            .chain(self.extras.iter().map(|b| (Some(*b), BlockCategory::Extra)));

        for (block, expected) in slots.into_iter().chain(lists) {
            let Some(block) = block else { continue };
            if block.category != expected {
                return Err(SelectionError::WrongCategory {
                    name: block.name.clone(),
                    expected: expected.to_string(),
                    actual: block.category.to_string(),
                });
            }
            if !block.supports(framework) {
                return Err(SelectionError::IncompatibleFramework {
                    name: block.name.clone(),
                    block_framework: block.framework.clone().unwrap_or_default(),
                    framework: framework.unwrap_or_default().to_string(),
                });
            }
        }

        for feature_type in FeatureType::ALL.iter().filter(|t| t.is_exclusive()) {
            let mut of_type = self
                .features
                .iter()
                .filter(|b| b.feature_type == Some(*feature_type));
            if let (Some(first), Some(second)) = (of_type.next(), of_type.next()) {
                return Err(SelectionError::ExclusiveFeature {
                    feature_type: feature_type.to_string(),
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Feature blocks sharing a `featureType`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup<'a> {
    /// `None` collects untyped features
    pub feature_type: Option<FeatureType>,
    pub blocks: Vec<&'a TemplateBlock>,
}

impl FeatureGroup<'_> {
    /// Pick one (radio) rather than many (checkbox)
    pub fn is_exclusive(&self) -> bool {
        self.feature_type.is_some_and(|t| t.is_exclusive())
    }

    pub fn label(&self) -> &'static str {
        self.feature_type.map_or("other", |t| t.display_name())
    }
}

/// Partition features by type, in `FeatureType::ALL` order with untyped last
pub fn group_features<'a>(features: &[&'a TemplateBlock]) -> Vec<FeatureGroup<'a>> {
    FeatureType::ALL
        .iter()
        .map(|t| Some(*t))
        .chain(std::iter::once(None))
        .filter_map(|feature_type| {
            let blocks: Vec<_> = features
                .iter()
                .copied()
                .filter(|b| b.feature_type == feature_type)
                .collect();
            (!blocks.is_empty()).then_some(FeatureGroup {
                feature_type,
                blocks,
            })
        })
        .collect()
}

/// Blocks usable with `framework` (blocks without a framework always are)
pub fn compatible<'a>(blocks: &'a [TemplateBlock], framework: Option<&str>) -> Vec<&'a TemplateBlock> {
    blocks.iter().filter(|b| b.supports(framework)).collect()
}

/// Find a base block by name or by the framework it targets
pub fn find_base<'a>(
    registry: &'a TemplatesRegistry,
    name: &str,
) -> Result<&'a TemplateBlock, SelectionError> {
    registry
        .base
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .or_else(|| {
            registry.base.iter().find(|b| {
                b.framework
                    .as_deref()
                    .is_some_and(|f| f.eq_ignore_ascii_case(name))
            })
        })
        .ok_or_else(|| SelectionError::NotFound {
            kind: "Framework",
            name: name.to_string(),
            available: available_names(&registry.base),
        })
}

/// Resolve an optional slot; `none` (or no name) leaves it empty
pub fn find_optional<'a>(
    candidates: &[&'a TemplateBlock],
    kind: &'static str,
    name: Option<&str>,
) -> Result<Option<&'a TemplateBlock>, SelectionError> {
    match name {
        None => Ok(None),
        Some(n) if n.eq_ignore_ascii_case(NONE_CHOICE) => Ok(None),
        Some(n) => find_in(candidates, kind, n).map(Some),
    }
}

/// Resolve a list of names against candidates
pub fn find_many<'a>(
    candidates: &[&'a TemplateBlock],
    kind: &'static str,
    names: &[String],
) -> Result<Vec<&'a TemplateBlock>, SelectionError> {
    let mut found: Vec<&'a TemplateBlock> = Vec::new();
    for name in names {
        let block = find_in(candidates, kind, name)?;
        if !found.iter().any(|b| std::ptr::eq(*b, block)) {
            found.push(block);
        }
    }
    // keep registry order regardless of flag order
    found.sort_by_key(|b| candidates.iter().position(|c| std::ptr::eq(*c, *b)));
    Ok(found)
}

fn find_in<'a>(
    candidates: &[&'a TemplateBlock],
    kind: &'static str,
    name: &str,
) -> Result<&'a TemplateBlock, SelectionError> {
    candidates
        .iter()
        .copied()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SelectionError::NotFound {
            kind,
            name: name.to_string(),
            available: candidates
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Resolve a fully named request without prompting
pub fn resolve<'a>(
    registry: &'a TemplatesRegistry,
    request: &SelectionRequest,
) -> Result<Selection<'a>, SelectionError> {
    let base = match request.framework.as_deref() {
        Some(name) => find_base(registry, name)?,
        None => match registry.base.as_slice() {
            [only] => only,
            _ => {
                return Err(SelectionError::MissingBase {
                    available: available_names(&registry.base),
                })
            }
        },
    };

    let framework = base.framework.as_deref();
    let mut selection = Selection::new(base);

    selection.database = find_optional(
        &compatible(&registry.database, framework),
        "Database",
        request.database.as_deref(),
    )?;
    selection.auth = find_optional(
        &compatible(&registry.auth, framework),
        "Auth",
        request.auth.as_deref(),
    )?;
    selection.preset = find_optional(
        &compatible(&registry.presets, framework),
        "Preset",
        request.preset.as_deref(),
    )?;
    selection.features = find_many(
        &compatible(&registry.features, framework),
        "Feature",
        &request.features,
    )?;
    selection.extras = find_many(
        &compatible(&registry.extra, framework),
        "Extra",
        &request.extras,
    )?;

    selection.validate()?;
    Ok(selection)
}
