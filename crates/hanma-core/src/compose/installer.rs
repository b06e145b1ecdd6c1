//! Installing registry items and module blocks into an existing project

use super::collector::{collect_blocks, Block, CollectedBlockData};
use super::materializer::{append_env_example, write_template_files};
use super::package_json::{merge_scripts, read_project_name};
use crate::deps::DependencyMap;
use crate::registry::schema::RegistryItem;
use crate::runtime::{InstallOutcome, PackageManager};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// How (and whether) to install npm dependencies
#[derive(Debug, Clone)]
pub enum DependencyInstall<'a> {
    /// Run the package manager in `project_dir`
    Run {
        package_manager: PackageManager,
        project_dir: &'a Path,
    },
    Skip,
}

/// Dependencies of a set of items, merged by package name (later items win)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPlan {
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
}

impl DependencyPlan {
    pub fn for_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a RegistryItem>,
    {
        let mut plan = Self::default();
        for item in items {
            plan.dependencies.extend_specs(&item.dependencies);
            plan.dev_dependencies.extend_specs(&item.dev_dependencies);
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }

    /// Install both lists; failures are reported, never returned as errors
    pub async fn install(&self, how: &DependencyInstall<'_>) -> (InstallOutcome, InstallOutcome) {
        let DependencyInstall::Run {
            package_manager,
            project_dir,
        } = how
        else {
            return (InstallOutcome::Skipped, InstallOutcome::Skipped);
        };

        let deps = run_add(*package_manager, project_dir, &self.dependencies, false).await;
        let dev_deps = run_add(*package_manager, project_dir, &self.dev_dependencies, true).await;
        (deps, dev_deps)
    }
}

async fn run_add(
    package_manager: PackageManager,
    project_dir: &Path,
    deps: &DependencyMap,
    dev: bool,
) -> InstallOutcome {
    if deps.is_empty() {
        return InstallOutcome::Skipped;
    }
    let args = package_manager.add_args(&deps.install_args(), dev);
    package_manager.run(project_dir, &args).await
}

/// What an install run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Written paths, relative to the target directory
    pub files: Vec<PathBuf>,
    pub dependencies: InstallOutcome,
    pub dev_dependencies: InstallOutcome,
}

impl InstallReport {
    pub fn outcomes(&self) -> [&InstallOutcome; 2] {
        [&self.dependencies, &self.dev_dependencies]
    }
}

/// Install dependencies for `items`, then write each item's files to `target_dir/<file.name>`
///
/// Existing files are overwritten without asking.
pub async fn install_items(
    items: &[&RegistryItem],
    target_dir: &Path,
    how: &DependencyInstall<'_>,
) -> Result<InstallReport> {
    let plan = DependencyPlan::for_items(items.iter().copied());
    let (dependencies, dev_dependencies) = plan.install(how).await;

    let mut files = Vec::new();
    for item in items {
        for file in &item.files {
            let relative = PathBuf::from(&file.name);
            let target = target_dir.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&target, &file.content)
                .await
                .with_context(|| format!("Failed to write file: {}", target.display()))?;
            tracing::info!(item = %item.name, path = %target.display(), "installed file");
            files.push(relative);
        }
    }

    Ok(InstallReport {
        files,
        dependencies,
        dev_dependencies,
    })
}

/// Result of installing blocks into an existing project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInstallReport {
    pub install: InstallReport,
    pub env_vars_added: usize,
    pub scripts_merged: bool,
}

/// Install module-style blocks into an existing project
///
/// Blocks are folded with [`collect_blocks`], so dependency collisions resolve
/// the same way as in `create`. Files land under `target_dir`; env vars and
/// scripts go to the project root.
pub async fn install_blocks<B: Block>(
    blocks: &[&B],
    project_dir: &Path,
    target_dir: &Path,
    how: &DependencyInstall<'_>,
) -> Result<BlockInstallReport> {
    let data: CollectedBlockData = collect_blocks(blocks.iter().copied());

    let plan = DependencyPlan {
        dependencies: data.dependencies.clone(),
        dev_dependencies: data.dev_dependencies.clone(),
    };
    let (dependencies, dev_dependencies) = plan.install(how).await;

    let project_name = project_name_for(project_dir).await;
    let files = write_template_files(target_dir, &data.files, &project_name).await?;
    let env_vars_added = append_env_example(project_dir, &data.env_vars).await?;
    let scripts_merged = merge_scripts(project_dir, &data.scripts).await?;

    Ok(BlockInstallReport {
        install: InstallReport {
            files,
            dependencies,
            dev_dependencies,
        },
        env_vars_added,
        scripts_merged,
    })
}

/// `package.json` name, else the directory name
async fn project_name_for(project_dir: &Path) -> String {
    if let Some(name) = read_project_name(project_dir).await {
        return name;
    }
    project_dir
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
