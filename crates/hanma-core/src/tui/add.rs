//! `add`, `addons` and `tooling`: one flow, configured per item source
//!
//! Each command is an [`AddCommandConfig`] constant; the binary maps its
//! subcommands onto them and calls [`AddCommandConfig::run`].

use super::common::{
    capitalize, load_or_init_config, package_manager_for, report_install, with_spinner, Session,
};
use crate::compose::{install_items, DependencyInstall};
use crate::product::ProductConfig;
use crate::project::HanmaConfig;
use crate::registry::schema::{available_names, find_named, ItemType, RegistryItem};
use crate::registry::ItemSource;
use crate::runtime::PackageManager;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Which registry file a command reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSource {
    /// `registry/{framework}.json`, framework from flag, `hanma.json` or a prompt
    Framework,
    /// A fixed registry file such as `tooling`
    Fixed(&'static str),
}

/// Default write location, relative to the project root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallLocation {
    Components,
    Utils,
    ProjectRoot,
}

impl InstallLocation {
    pub(crate) fn resolve(&self, project_dir: &Path, config: &HanmaConfig) -> PathBuf {
        match self {
            InstallLocation::Components => config.components_dir(project_dir),
            InstallLocation::Utils => config.utils_dir(project_dir),
            InstallLocation::ProjectRoot => project_dir.to_path_buf(),
        }
    }
}

/// Everything that differs between the item-installing commands
#[derive(Debug, Clone, Copy)]
pub struct AddCommandConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub item_type: ItemType,
    pub source: AddSource,
    /// Shown when a category filter matches nothing
    pub category_hint: &'static str,
    pub location: InstallLocation,
}

pub const SNIPPETS: AddCommandConfig = AddCommandConfig {
    name: "add",
    description: "Add snippets to your project",
    item_type: ItemType::Snippet,
    source: AddSource::Framework,
    category_hint: "e.g. middleware, routes, utils",
    location: InstallLocation::Components,
};

pub const ADDONS: AddCommandConfig = AddCommandConfig {
    name: "addons",
    description: "Add framework-independent addons",
    item_type: ItemType::Addon,
    source: AddSource::Fixed("shared"),
    category_hint: "e.g. validation, logging",
    location: InstallLocation::Utils,
};

pub const TOOLING: AddCommandConfig = AddCommandConfig {
    name: "tooling",
    description: "Add tooling configuration (linting, formatting, docker)",
    item_type: ItemType::Tooling,
    source: AddSource::Fixed("tooling"),
    category_hint: "e.g. linting, docker",
    location: InstallLocation::ProjectRoot,
};

/// CLI arguments shared by the add-style commands
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    /// Item names; empty means prompt
    pub items: Vec<String>,

    /// Install every item (after the category filter)
    pub all: bool,

    /// Write files here instead of the configured location
    pub path: Option<PathBuf>,

    pub category: Option<String>,

    /// Only used by framework-sourced commands
    pub framework: Option<String>,

    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    pub yes: bool,
}

impl AddCommandConfig {
    /// Run the add flow for this command
    pub async fn run<C: ProductConfig>(&self, session: &Session<C>, args: AddArgs) -> Result<()> {
        cliclack::intro(format!("{} {}", session.config.name(), self.name))?;

        let Some(project) = load_or_init_config(session, args.yes).await? else {
            cliclack::outro_cancel("A hanma.json is required to add items")?;
            return Ok(());
        };

        let source = self.item_source(session, &project, &args).await?;
        let items = with_spinner(
            &format!("Loading {} registry...", source),
            |items: &Vec<RegistryItem>| format!("Loaded {} {} entries", items.len(), source),
            session.fetcher.fetch_items(&source),
        )
        .await?;

        let items = self.filter_category(items, args.category.as_deref())?;
        let selected = self.select_items(&items, &args)?;
        if selected.is_empty() {
            cliclack::outro(format!("No {} items selected", self.item_type))?;
            return Ok(());
        }

        let target_dir = match &args.path {
            Some(path) => session.cwd.join(path),
            None => self.location.resolve(&session.cwd, &project),
        };

        let how = if args.skip_install {
            DependencyInstall::Skip
        } else {
            DependencyInstall::Run {
                package_manager: package_manager_for(args.package_manager, &session.cwd),
                project_dir: &session.cwd,
            }
        };

        let names: Vec<&str> = selected.iter().map(|i| i.name.as_str()).collect();
        let spinner = cliclack::spinner();
        spinner.start(format!("Adding {}...", names.join(", ")));
        let report = match install_items(&selected, &target_dir, &how).await {
            Ok(report) => report,
            Err(e) => {
                spinner.error(format!("{:#}", e));
                return Err(e);
            }
        };
        spinner.stop(format!(
            "Added {} files to {}",
            report.files.len(),
            target_dir.display()
        ));

        for file in &report.files {
            cliclack::log::remark(file.display().to_string())?;
        }
        report_install(&report.outcomes())?;

        cliclack::outro("Done")?;
        Ok(())
    }

    async fn item_source<C: ProductConfig>(
        &self,
        session: &Session<C>,
        project: &HanmaConfig,
        args: &AddArgs,
    ) -> Result<ItemSource> {
        match self.source {
            AddSource::Fixed(stem) => Ok(ItemSource::Fixed(stem)),
            AddSource::Framework => {
                if let Some(framework) = args.framework.as_ref().or(project.framework.as_ref()) {
                    return Ok(ItemSource::Framework(framework.clone()));
                }

                let frameworks = session.fetcher.fetch_framework_index().await?;
                if args.yes || frameworks.is_empty() {
                    anyhow::bail!(
                        "No framework configured. Pass --framework (available: {})",
                        frameworks.join(", ")
                    );
                }

                let mut select = cliclack::select("Select a framework");
                for framework in &frameworks {
                    select = select.item(framework.clone(), framework, "");
                }
                let framework: String = select.interact()?;
                Ok(ItemSource::Framework(framework))
            }
        }
    }

    fn filter_category(
        &self,
        items: Vec<RegistryItem>,
        category: Option<&str>,
    ) -> Result<Vec<RegistryItem>> {
        let Some(category) = category else {
            return Ok(items);
        };

        let categories = categories_of(&items);
        let filtered: Vec<RegistryItem> = items
            .into_iter()
            .filter(|item| {
                item.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            })
            .collect();

        if filtered.is_empty() {
            anyhow::bail!(
                "No {} items in category '{}' ({}). Available categories: {}",
                self.item_type,
                category,
                self.category_hint,
                categories.join(", ")
            );
        }
        Ok(filtered)
    }

    fn select_items<'a>(
        &self,
        items: &'a [RegistryItem],
        args: &AddArgs,
    ) -> Result<Vec<&'a RegistryItem>> {
        if !args.items.is_empty() {
            let mut selected: Vec<&RegistryItem> = Vec::new();
            for name in &args.items {
                let item = find_named(items, name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "{} '{}' not found. Available: {}",
                        capitalize(self.item_type.display_name()),
                        name,
                        available_names(items)
                    )
                })?;
                if !selected.iter().any(|s| std::ptr::eq(*s, item)) {
                    selected.push(item);
                }
            }
            return Ok(selected);
        }

        if args.all {
            return Ok(items.iter().collect());
        }

        if args.yes {
            anyhow::bail!(
                "Name the {} items to add, or pass --all",
                self.item_type
            );
        }

        let mut multi = cliclack::multiselect(format!("Select {} items", self.item_type));
        for (idx, item) in items.iter().enumerate() {
            let label = match &item.category {
                Some(category) => format!("{} ({})", item.name, category),
                None => item.name.clone(),
            };
            multi = multi.item(idx, label, &item.description);
        }
        let picked: Vec<usize> = multi.required(false).interact()?;
        Ok(picked.into_iter().filter_map(|idx| items.get(idx)).collect())
    }
}

/// Distinct categories in first-seen order
fn categories_of(items: &[RegistryItem]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for category in items.iter().filter_map(|i| i.category.as_ref()) {
        if !categories.contains(category) {
            categories.push(category.clone());
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: Option<&str>) -> RegistryItem {
        RegistryItem {
            name: name.to_string(),
            description: String::new(),
            item_type: ItemType::Snippet,
            category: category.map(str::to_string),
            dependencies: vec![],
            dev_dependencies: vec![],
            files: vec![],
            framework: None,
            version: None,
        }
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let items = vec![
            item("cors", Some("middleware")),
            item("health", Some("routes")),
            item("helmet", Some("Middleware")),
        ];
        let filtered = SNIPPETS.filter_category(items, Some("MIDDLEWARE")).unwrap();
        let names: Vec<_> = filtered.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["cors", "helmet"]);
    }

    #[test]
    fn test_unknown_category_lists_available() {
        let items = vec![item("cors", Some("middleware")), item("health", Some("routes"))];
        let err = SNIPPETS.filter_category(items, Some("auth")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("middleware, routes"));
    }

    #[test]
    fn test_named_selection_dedups_and_reports_unknown() {
        let items = vec![item("cors", None), item("health", None)];
        let args = AddArgs {
            items: vec!["CORS".into(), "cors".into()],
            ..Default::default()
        };
        let selected = SNIPPETS.select_items(&items, &args).unwrap();
        assert_eq!(selected.len(), 1);

        let args = AddArgs {
            items: vec!["rate-limit".into()],
            ..Default::default()
        };
        let err = TOOLING.select_items(&items, &args).unwrap_err();
        assert!(err.to_string().contains("Tooling 'rate-limit' not found"));
        assert!(err.to_string().contains("cors, health"));
    }

    #[test]
    fn test_all_selects_everything() {
        let items = vec![item("a", None), item("b", None)];
        let args = AddArgs {
            all: true,
            ..Default::default()
        };
        assert_eq!(ADDONS.select_items(&items, &args).unwrap().len(), 2);
    }

    #[test]
    fn test_install_locations() {
        let config = HanmaConfig {
            components_path: "src/components".into(),
            utils_path: "lib".into(),
            framework: None,
        };
        let root = Path::new("/project");
        assert_eq!(
            SNIPPETS.location.resolve(root, &config),
            PathBuf::from("/project/src/components")
        );
        assert_eq!(ADDONS.location.resolve(root, &config), PathBuf::from("/project/lib"));
        assert_eq!(TOOLING.location.resolve(root, &config), PathBuf::from("/project"));
    }
}
