//! `module`: install multi-file modules into the current project

use super::add::InstallLocation;
use super::common::{
    load_or_init_config, package_manager_for, report_install, with_spinner, Session,
};
use crate::compose::{install_blocks, DependencyInstall};
use crate::product::ProductConfig;
use crate::project::HanmaConfig;
use crate::registry::schema::{ModuleBlock, ModulesRegistry};
use crate::runtime::PackageManager;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the module command
#[derive(Debug, Clone, Default)]
pub struct ModuleArgs {
    pub modules: Vec<String>,
    pub category: Option<String>,
    pub all: bool,

    /// Write module files under this directory instead of the project root
    pub path: Option<PathBuf>,

    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    pub yes: bool,
}

/// Run the module flow
pub async fn run_module<C: ProductConfig>(session: &Session<C>, args: ModuleArgs) -> Result<()> {
    cliclack::intro(format!("{} module", session.config.name()))?;

    let Some(project) = load_or_init_config(session, args.yes).await? else {
        cliclack::outro_cancel("A hanma.json is required to install modules")?;
        return Ok(());
    };

    let registry = with_spinner(
        "Loading modules...",
        |r: &ModulesRegistry| format!("Loaded {} modules", r.all_modules().len()),
        session.fetcher.fetch_modules(),
    )
    .await?;

    let selected = select_modules(&registry, &args)?;
    if selected.is_empty() {
        cliclack::outro("No modules selected")?;
        return Ok(());
    }

    let target_dir = module_target_dir(&session.cwd, &project, args.path.as_deref());
    let how = if args.skip_install {
        DependencyInstall::Skip
    } else {
        DependencyInstall::Run {
            package_manager: package_manager_for(args.package_manager, &session.cwd),
            project_dir: &session.cwd,
        }
    };

    let names: Vec<&str> = selected.iter().map(|m| m.name.as_str()).collect();
    let spinner = cliclack::spinner();
    spinner.start(format!("Installing {}...", names.join(", ")));
    let report = match install_blocks(&selected, &session.cwd, &target_dir, &how).await {
        Ok(report) => report,
        Err(e) => {
            spinner.error(format!("{:#}", e));
            return Err(e);
        }
    };
    spinner.stop(format!("Wrote {} files", report.install.files.len()));

    for file in &report.install.files {
        cliclack::log::remark(file.display().to_string())?;
    }
    if report.env_vars_added > 0 {
        cliclack::log::info(format!(
            "Added {} variables to .env.example",
            report.env_vars_added
        ))?;
    }
    if report.scripts_merged {
        cliclack::log::info("Updated package.json scripts")?;
    }
    report_install(&report.install.outcomes())?;

    cliclack::outro("Done")?;
    Ok(())
}

/// `--path` if given, else the project root (module files carry their own `src/...` prefix)
fn module_target_dir(project_dir: &Path, project: &HanmaConfig, path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => project_dir.join(path),
        None => InstallLocation::ProjectRoot.resolve(project_dir, project),
    }
}

fn select_modules<'a>(
    registry: &'a ModulesRegistry,
    args: &ModuleArgs,
) -> Result<Vec<&'a ModuleBlock>> {
    let pool: Vec<&ModuleBlock> = match &args.category {
        Some(category) => registry
            .category(category)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Category '{}' not found. Available categories: {}",
                    category,
                    registry.categories.join(", ")
                )
            })?
            .iter()
            .collect(),
        None => registry.all_modules(),
    };

    if !args.modules.is_empty() {
        let mut selected: Vec<&ModuleBlock> = Vec::new();
        for name in &args.modules {
            let module = pool
                .iter()
                .copied()
                .find(|m| m.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    let available: Vec<&str> = pool.iter().map(|m| m.name.as_str()).collect();
                    anyhow::anyhow!(
                        "Module '{}' not found. Available: {}",
                        name,
                        available.join(", ")
                    )
                })?;
            if !selected.iter().any(|s| std::ptr::eq(*s, module)) {
                selected.push(module);
            }
        }
        return Ok(selected);
    }

    if args.all {
        return Ok(pool);
    }
    if args.yes {
        anyhow::bail!("Name the modules to install, or pass --all");
    }

    let mut multi = cliclack::multiselect("Select modules");
    for (idx, module) in pool.iter().enumerate() {
        multi = multi.item(
            idx,
            format!("{} ({})", module.name, module.category),
            &module.description,
        );
    }
    let picked: Vec<usize> = multi.required(false).interact()?;
    Ok(picked.into_iter().filter_map(|idx| pool.get(idx).copied()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn module(name: &str, category: &str) -> ModuleBlock {
        ModuleBlock {
            name: name.to_string(),
            category: category.to_string(),
            description: String::new(),
            framework: None,
            version: None,
            dependencies: vec![],
            dev_dependencies: vec![],
            scripts: BTreeMap::new(),
            env_vars: vec![],
            files: vec![],
        }
    }

    fn registry() -> ModulesRegistry {
        let mut modules = BTreeMap::new();
        modules.insert("auth".to_string(), vec![module("jwt-auth", "auth")]);
        modules.insert(
            "payments".to_string(),
            vec![module("stripe", "payments"), module("paddle", "payments")],
        );
        ModulesRegistry {
            categories: vec!["auth".into(), "payments".into()],
            modules,
        }
    }

    #[test]
    fn test_target_dir_defaults_to_project_root() {
        let config = HanmaConfig {
            components_path: "lib".into(),
            utils_path: "lib/utils".into(),
            framework: None,
        };
        let root = Path::new("/project");
        assert_eq!(module_target_dir(root, &config, None), PathBuf::from("/project"));
        assert_eq!(
            module_target_dir(root, &config, Some(Path::new("packages/api"))),
            PathBuf::from("/project/packages/api")
        );
    }

    #[test]
    fn test_all_in_category() {
        let registry = registry();
        let args = ModuleArgs {
            category: Some("Payments".into()),
            all: true,
            ..Default::default()
        };
        let names: Vec<_> = select_modules(&registry, &args)
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["stripe", "paddle"]);
    }

    #[test]
    fn test_unknown_category() {
        let registry = registry();
        let args = ModuleArgs {
            category: Some("storage".into()),
            all: true,
            ..Default::default()
        };
        let err = select_modules(&registry, &args).unwrap_err();
        assert!(err.to_string().contains("auth, payments"));
    }

    #[test]
    fn test_named_modules_outside_category_fail() {
        let registry = registry();
        let args = ModuleArgs {
            modules: vec!["jwt-auth".into()],
            category: Some("payments".into()),
            ..Default::default()
        };
        assert!(select_modules(&registry, &args).is_err());

        let args = ModuleArgs {
            modules: vec!["JWT-AUTH".into()],
            ..Default::default()
        };
        assert_eq!(select_modules(&registry, &args).unwrap()[0].name, "jwt-auth");
    }
}
