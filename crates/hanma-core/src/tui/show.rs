//! `show` and `docs`: browse the registries without installing anything
//!
//! Listings go to stdout as plain colored text so they can be piped;
//! `--json` prints the validated registry data instead.

use super::common::Session;
use crate::product::ProductConfig;
use crate::project::HanmaConfig;
use crate::registry::schema::{
    available_names, find_named, BlockCategory, ModuleBlock, RegistryItem, TemplateBlock, TemplatesRegistry,
};
use crate::registry::ItemSource;
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Registry collections `show` can list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowKind {
    Snippets,
    Templates,
    Modules,
    Addons,
    Tooling,
}

/// CLI arguments for the show command
#[derive(Debug, Clone)]
pub struct ShowArgs {
    pub kind: ShowKind,

    /// Show one entry in detail
    pub name: Option<String>,

    /// Snippet registry to read; defaults to `hanma.json`
    pub framework: Option<String>,

    pub json: bool,
}

/// Run the show command
pub async fn run_show<C: ProductConfig>(session: &Session<C>, args: ShowArgs) -> Result<()> {
    match args.kind {
        ShowKind::Snippets => {
            let framework = snippet_framework(session, &args).await?;
            let items = session
                .fetcher
                .fetch_items(&ItemSource::Framework(framework.clone()))
                .await?;
            show_items(&format!("Snippets ({})", framework), &items, &args)
        }
        ShowKind::Addons => {
            let items = session.fetcher.fetch_items(&ItemSource::Fixed("shared")).await?;
            show_items("Addons", &items, &args)
        }
        ShowKind::Tooling => {
            let items = session.fetcher.fetch_items(&ItemSource::Fixed("tooling")).await?;
            show_items("Tooling", &items, &args)
        }
        ShowKind::Templates => {
            let templates = session.fetcher.fetch_templates().await?;
            show_templates(&templates, &args)
        }
        ShowKind::Modules => {
            let registry = session.fetcher.fetch_modules().await?;
            let modules = registry.all_modules();
            match &args.name {
                Some(name) => {
                    let module = registry.find(name).ok_or_else(|| {
                        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
                        anyhow::anyhow!(
                            "Module '{}' not found. Available: {}",
                            name,
                            names.join(", ")
                        )
                    })?;
                    if args.json {
                        print_json(module)
                    } else {
                        print_module(module);
                        Ok(())
                    }
                }
                None if args.json => print_json(&registry),
                None => {
                    println!("{}", "Modules".bold());
                    for category in &registry.categories {
                        let in_category: Vec<&ModuleBlock> = modules
                            .iter()
                            .copied()
                            .filter(|m| &m.category == category)
                            .collect();
                        print_group(
                            category,
                            in_category.iter().map(|m| (&m.name, &m.description)),
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Open the documentation site in the default browser
pub fn run_docs<C: ProductConfig>(session: &Session<C>) -> Result<()> {
    let url = session.fetcher.endpoints().docs.as_str();
    cliclack::log::info(format!("Opening {}", url))?;
    open::that(url).with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}

async fn snippet_framework<C: ProductConfig>(
    session: &Session<C>,
    args: &ShowArgs,
) -> Result<String> {
    if let Some(framework) = &args.framework {
        return Ok(framework.clone());
    }
    if let Ok(config) = HanmaConfig::load(&session.cwd).await {
        if let Some(framework) = config.framework {
            return Ok(framework);
        }
    }

    let frameworks = session.fetcher.fetch_framework_index().await?;
    anyhow::bail!(
        "No framework configured. Pass --framework (available: {})",
        frameworks.join(", ")
    )
}

fn show_items(title: &str, items: &[RegistryItem], args: &ShowArgs) -> Result<()> {
    if let Some(name) = &args.name {
        let item = find_named(items, name).ok_or_else(|| {
            anyhow::anyhow!(
                "'{}' not found. Available: {}",
                name,
                available_names(items)
            )
        })?;
        if args.json {
            return print_json(item);
        }
        print_item(item);
        return Ok(());
    }

    if args.json {
        return print_json(items);
    }

    println!("{}", title.bold());
    for (category, entries) in by_category(items) {
        print_group(&category, entries.into_iter().map(|i| (&i.name, &i.description)));
    }
    Ok(())
}

fn show_templates(templates: &TemplatesRegistry, args: &ShowArgs) -> Result<()> {
    if let Some(name) = &args.name {
        let block = templates
            .all_blocks()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let names: Vec<&str> = templates.all_blocks().map(|b| b.name.as_str()).collect();
                anyhow::anyhow!(
                    "Template '{}' not found. Available: {}",
                    name,
                    names.join(", ")
                )
            })?;
        if args.json {
            return print_json(block);
        }
        print_block(block);
        return Ok(());
    }

    if args.json {
        return print_json(templates);
    }

    println!("{}", "Templates".bold());
    for category in [
        BlockCategory::Base,
        BlockCategory::Database,
        BlockCategory::Auth,
        BlockCategory::Preset,
        BlockCategory::Feature,
        BlockCategory::Extra,
    ] {
        let blocks = templates.blocks_for(category);
        if !blocks.is_empty() {
            print_group(
                category.display_name(),
                blocks.iter().map(|b| (&b.name, &b.description)),
            );
        }
    }
    Ok(())
}

/// Items grouped by category; uncategorized items go under `general`
fn by_category(items: &[RegistryItem]) -> BTreeMap<String, Vec<&RegistryItem>> {
    let mut groups: BTreeMap<String, Vec<&RegistryItem>> = BTreeMap::new();
    for item in items {
        let category = item.category.clone().unwrap_or_else(|| "general".to_string());
        groups.entry(category).or_default().push(item);
    }
    groups
}

fn print_group<'a>(heading: &str, entries: impl Iterator<Item = (&'a String, &'a String)>) {
    let entries: Vec<_> = entries.collect();
    if entries.is_empty() {
        return;
    }
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    println!();
    println!("  {}", heading.cyan().bold());
    for (name, description) in entries {
        let padded = format!("{:<width$}", name, width = width);
        println!("    {}  {}", padded.green(), description.dimmed());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", format!("{}:", label).bold(), value);
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        print_field(label, values.join(", "));
    }
}

fn print_item(item: &RegistryItem) {
    println!("{}", item.name.green().bold());
    println!("  {}", item.description);
    print_field("Type", item.item_type);
    if let Some(category) = &item.category {
        print_field("Category", category);
    }
    if let Some(framework) = &item.framework {
        print_field("Framework", framework);
    }
    if let Some(version) = &item.version {
        print_field("Version", version);
    }
    print_list("Dependencies", &item.dependencies);
    print_list("Dev deps", &item.dev_dependencies);
    let files: Vec<String> = item.files.iter().map(|f| f.name.clone()).collect();
    print_list("Files", &files);
}

fn print_block(block: &TemplateBlock) {
    println!("{}", block.name.green().bold());
    println!("  {}", block.description);
    print_field("Category", block.category.display_name());
    if let Some(feature_type) = block.feature_type {
        print_field("Feature type", feature_type.display_name());
    }
    if let Some(framework) = &block.framework {
        print_field("Framework", framework);
    }
    if let Some(version) = &block.version {
        print_field("Version", version);
    }
    print_list("Dependencies", &block.dependencies);
    print_list("Dev deps", &block.dev_dependencies);
    print_list("Env vars", &block.env_vars);
    let scripts: Vec<String> = block.scripts.keys().cloned().collect();
    print_list("Scripts", &scripts);
    let files: Vec<String> = block.files.iter().map(|f| f.path.clone()).collect();
    print_list("Files", &files);
}

fn print_module(module: &ModuleBlock) {
    println!("{}", module.name.green().bold());
    println!("  {}", module.description);
    print_field("Category", &module.category);
    if let Some(framework) = &module.framework {
        print_field("Framework", framework);
    }
    if let Some(version) = &module.version {
        print_field("Version", version);
    }
    print_list("Dependencies", &module.dependencies);
    print_list("Dev deps", &module.dev_dependencies);
    print_list("Env vars", &module.env_vars);
    let files: Vec<String> = module.files.iter().map(|f| f.path.clone()).collect();
    print_list("Files", &files);
}
