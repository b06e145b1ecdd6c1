//! `create`: compose a new project from template blocks

use super::common::{
    capitalize, package_manager_for, report_install, with_spinner, Cancelled, Session,
};
use crate::compose::selection::{compatible, find_base, group_features, NONE_CHOICE};
use crate::compose::materializer::MaterializeReport;
use crate::compose::{collect_blocks, materialize, resolve, PackageJson, Selection, SelectionRequest};
use crate::product::ProductConfig;
use crate::project::validate_project_name;
use crate::registry::schema::{TemplateBlock, TemplatesRegistry};
use crate::runtime::{InstallOutcome, PackageManager};
use anyhow::Result;
use std::path::Path;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name, also the directory created under the working directory
    pub name: Option<String>,

    /// Base block name or framework
    pub framework: Option<String>,

    pub database: Option<String>,
    pub auth: Option<String>,
    pub preset: Option<String>,

    /// Feature block names; `Some(vec![])` selects none without prompting
    pub features: Option<Vec<String>>,

    /// Extra block names; `Some(vec![])` selects none without prompting
    pub extras: Option<Vec<String>>,

    pub package_manager: Option<PackageManager>,

    /// Write files only
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the create flow
pub async fn run_create<C: ProductConfig>(session: &Session<C>, args: CreateArgs) -> Result<()> {
    cliclack::intro(format!("{} create", session.config.display_name()))?;

    // Step 1: Name and directory
    let project_name = select_project_name(&args)?;
    let project_dir = session.cwd.join(&project_name);
    confirm_directory(&project_dir, args.yes)?;

    // Step 2: Templates
    let templates = with_spinner(
        "Loading templates...",
        |t: &TemplatesRegistry| format!("Loaded {} base templates", t.base.len()),
        session.fetcher.fetch_templates(),
    )
    .await?;

    // Step 3: Blocks
    let request = build_request(&templates, &args)?;
    let selection = resolve(&templates, &request)?;
    log_selection(&selection)?;

    // Step 4: Write the project
    let data = collect_blocks(selection.blocks());
    let package_json = PackageJson::from_collected(&project_name, &data);
    let report = with_spinner(
        "Creating project...",
        |r: &MaterializeReport| {
            format!("Created {} files in {}", r.files.len() + 1, project_dir.display())
        },
        materialize(&project_dir, &project_name, &package_json, &data.files, &data.env_vars),
    )
    .await?;
    tracing::debug!(files = report.files.len(), "project written");

    // Step 5: Install
    let package_manager = package_manager_for(args.package_manager, &session.cwd);
    let outcome = if args.skip_install {
        cliclack::log::info("Skipping dependency installation")?;
        InstallOutcome::Skipped
    } else {
        install_project(package_manager, &project_dir).await?
    };

    // Step 6: Next steps
    print_next_steps(
        &project_name,
        package_manager,
        &outcome,
        data.scripts.contains_key("dev"),
        report.wrote_env_example,
    )
}

fn select_project_name(args: &CreateArgs) -> Result<String> {
    if let Some(name) = &args.name {
        validate_project_name(name).map_err(anyhow::Error::msg)?;
        cliclack::log::info(format!("Project name: {}", name))?;
        return Ok(name.clone());
    }

    if args.yes {
        anyhow::bail!("A project name is required in non-interactive mode");
    }

    let name: String = cliclack::input("Project name")
        .placeholder("my-app")
        .validate(|input: &String| validate_project_name(input))
        .interact()?;
    Ok(name)
}

fn confirm_directory(project_dir: &Path, yes: bool) -> Result<()> {
    if !project_dir.is_dir() {
        return Ok(());
    }
    let count = std::fs::read_dir(project_dir).map(|e| e.count()).unwrap_or(0);
    if count == 0 {
        return Ok(());
    }

    cliclack::log::warning(format!(
        "{} already exists and has {} items",
        project_dir.display(),
        count
    ))?;

    let confirm = if yes {
        true
    } else {
        cliclack::confirm("Write into it anyway?")
            .initial_value(false)
            .interact()?
    };

    if !confirm {
        return Err(Cancelled.into());
    }
    Ok(())
}

/// Fill every slot from flags, falling back to prompts unless `--yes`
fn build_request(templates: &TemplatesRegistry, args: &CreateArgs) -> Result<SelectionRequest> {
    let framework = match (&args.framework, templates.base.as_slice()) {
        (Some(name), _) => Some(name.clone()),
        (None, [] | [_]) => None,
        (None, _) if args.yes => None,
        (None, bases) => Some(select_base(bases)?),
    };

    let base = match framework.as_deref() {
        Some(name) => Some(find_base(templates, name)?),
        None => templates.base.first().filter(|_| templates.base.len() == 1),
    };
    let Some(base) = base else {
        // resolve reports the missing base with the available choices
        return Ok(SelectionRequest::default());
    };
    let fw = base.framework.as_deref();

    let database = choose_one(
        args.database.as_ref(),
        args.yes,
        "Database",
        &compatible(&templates.database, fw),
    )?;
    let auth = choose_one(
        args.auth.as_ref(),
        args.yes,
        "Authentication",
        &compatible(&templates.auth, fw),
    )?;
    let preset = choose_one(
        args.preset.as_ref(),
        args.yes,
        "Preset",
        &compatible(&templates.presets, fw),
    )?;

    let features = match &args.features {
        Some(names) => names.clone(),
        None if args.yes => Vec::new(),
        None => select_features(&compatible(&templates.features, fw))?,
    };
    let extras = match &args.extras {
        Some(names) => names.clone(),
        None if args.yes => Vec::new(),
        None => choose_many("Extras (optional)", &compatible(&templates.extra, fw))?,
    };

    Ok(SelectionRequest {
        framework: Some(base.name.clone()),
        database,
        auth,
        preset,
        features,
        extras,
    })
}

fn select_base(bases: &[TemplateBlock]) -> Result<String> {
    let mut select = cliclack::select("Select a framework");
    for block in bases {
        select = select.item(block.name.clone(), &block.name, &block.description);
    }
    Ok(select.interact()?)
}

fn choose_one(
    flag: Option<&String>,
    yes: bool,
    prompt: &str,
    candidates: &[&TemplateBlock],
) -> Result<Option<String>> {
    if let Some(name) = flag {
        return Ok(Some(name.clone()));
    }
    if yes || candidates.is_empty() {
        return Ok(None);
    }

    let mut select = cliclack::select(prompt).item(NONE_CHOICE.to_string(), "None", "");
    for block in candidates {
        select = select.item(block.name.clone(), &block.name, &block.description);
    }
    let choice: String = select.interact()?;
    Ok(Some(choice))
}

fn choose_many(prompt: &str, candidates: &[&TemplateBlock]) -> Result<Vec<String>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut multi = cliclack::multiselect(prompt);
    for block in candidates {
        multi = multi.item(block.name.clone(), &block.name, &block.description);
    }
    Ok(multi.required(false).interact()?)
}

/// One prompt per feature type: radio for exclusive types, checkboxes otherwise
fn select_features(candidates: &[&TemplateBlock]) -> Result<Vec<String>> {
    let mut chosen = Vec::new();
    for group in group_features(candidates) {
        if group.is_exclusive() {
            let prompt = format!("{} (pick one)", capitalize(group.label()));
            if let Some(name) = choose_one(None, false, &prompt, &group.blocks)? {
                if name != NONE_CHOICE {
                    chosen.push(name);
                }
            }
        } else {
            let prompt = format!("{} features (optional)", capitalize(group.label()));
            chosen.extend(choose_many(&prompt, &group.blocks)?);
        }
    }
    Ok(chosen)
}

fn log_selection(selection: &Selection<'_>) -> Result<()> {
    let names: Vec<&str> = selection.blocks().iter().map(|b| b.name.as_str()).collect();
    cliclack::log::success(format!("Blocks: {}", names.join(", ")))?;
    Ok(())
}

async fn install_project(
    package_manager: PackageManager,
    project_dir: &Path,
) -> Result<InstallOutcome> {
    let spinner = cliclack::spinner();
    spinner.start(format!("Installing dependencies with {}...", package_manager));

    let outcome = package_manager
        .run(project_dir, &package_manager.install_args())
        .await;
    match &outcome {
        InstallOutcome::Failed { .. } => spinner.error("Dependency installation failed"),
        _ => spinner.stop("Dependencies installed"),
    }
    report_install(&[&outcome])?;
    Ok(outcome)
}

fn print_next_steps(
    project_name: &str,
    package_manager: PackageManager,
    install: &InstallOutcome,
    has_dev_script: bool,
    has_env_example: bool,
) -> Result<()> {
    let mut steps = vec![format!("cd {}", project_name)];
    if matches!(install, InstallOutcome::Skipped | InstallOutcome::Failed { .. }) {
        steps.push(package_manager.display_command(&package_manager.install_args()));
    }
    if has_env_example {
        steps.push("cp .env.example .env".to_string());
    }
    if has_dev_script {
        steps.push(package_manager.display_command(&["run".to_string(), "dev".to_string()]));
    }

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::session_at;
    use super::*;
    use crate::error::SelectionError;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn templates_json() -> Value {
        json!({
            "base": [
                {
                    "name": "express",
                    "category": "base",
                    "description": "Express server",
                    "framework": "express",
                    "dependencies": ["express@^4.19.0"],
                    "devDependencies": ["tsx"],
                    "scripts": { "dev": "tsx watch src/index.ts" },
                    "envVars": ["PORT"],
                    "files": [
                        { "path": "src/index.ts.hbs", "content": "// {{projectName}} server" },
                        { "path": "README.md", "content": "# {{projectName}}" }
                    ]
                },
                {
                    "name": "hono",
                    "category": "base",
                    "description": "Hono server",
                    "framework": "hono",
                    "files": [{ "path": "src/index.ts", "content": "" }]
                }
            ],
            "database": [{
                "name": "postgres",
                "category": "database",
                "description": "Postgres with pg",
                "framework": "express",
                "dependencies": ["pg"],
                "envVars": ["DATABASE_URL"],
                "files": [{ "path": "src/db.ts", "content": "export const db = '{{projectName}}';" }]
            }],
            "auth": [],
            "features": [{
                "name": "redis-cache",
                "category": "feature",
                "description": "Redis cache",
                "featureType": "cache",
                "dependencies": ["ioredis@5.4.0"],
                "envVars": ["REDIS_URL"],
                "files": [{ "path": "src/cache.ts", "content": "" }]
            }]
        })
    }

    fn templates() -> TemplatesRegistry {
        serde_json::from_value(templates_json()).unwrap()
    }

    fn yes_args() -> CreateArgs {
        CreateArgs {
            name: Some("my-api".to_string()),
            yes: true,
            skip_install: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_yes_request_passes_flags_through() {
        let args = CreateArgs {
            framework: Some("express".to_string()),
            database: Some("postgres".to_string()),
            features: Some(vec!["redis-cache".to_string()]),
            ..yes_args()
        };
        let request = build_request(&templates(), &args).unwrap();

        assert_eq!(request.framework.as_deref(), Some("express"));
        assert_eq!(request.database.as_deref(), Some("postgres"));
        assert_eq!(request.auth, None);
        assert_eq!(request.features, vec!["redis-cache"]);
        assert!(request.extras.is_empty());
    }

    #[test]
    fn test_yes_without_framework_and_many_bases_is_missing_base() {
        let templates = templates();
        let request = build_request(&templates, &yes_args()).unwrap();
        assert_eq!(request, SelectionRequest::default());

        let err = resolve(&templates, &request).unwrap_err();
        assert!(matches!(err, SelectionError::MissingBase { .. }));
    }

    #[test]
    fn test_yes_picks_the_only_base() {
        let mut templates = templates();
        templates.base.truncate(1);

        let request = build_request(&templates, &yes_args()).unwrap();
        assert_eq!(request.framework.as_deref(), Some("express"));
        assert_eq!(request.database, None);
        assert!(request.features.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_yes_writes_project() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/templates/index.json");
                then.status(200).json_body(templates_json());
            })
            .await;

        let temp = TempDir::new().unwrap();
        let session = session_at(temp.path(), &server.base_url());
        let args = CreateArgs {
            framework: Some("express".to_string()),
            database: Some("postgres".to_string()),
            features: Some(vec!["redis-cache".to_string()]),
            ..yes_args()
        };

        run_create(&session, args).await.unwrap();
        mock.assert_calls_async(1).await;

        let dir = temp.path().join("my-api");
        let package: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(package["name"], "my-api");
        assert_eq!(package["version"], "0.1.0");
        assert_eq!(package["dependencies"]["express"], "^4.19.0");
        assert_eq!(package["dependencies"]["pg"], "*");
        assert_eq!(package["dependencies"]["ioredis"], "5.4.0");
        assert_eq!(package["devDependencies"]["tsx"], "*");
        assert_eq!(package["scripts"]["dev"], "tsx watch src/index.ts");

        assert_eq!(
            std::fs::read_to_string(dir.join("src/index.ts")).unwrap(),
            "// my-api server"
        );
        assert!(!dir.join("src/index.ts.hbs").exists());
        assert_eq!(
            std::fs::read_to_string(dir.join("src/db.ts")).unwrap(),
            "export const db = 'my-api';"
        );
        assert!(dir.join("src/cache.ts").exists());

        let env = std::fs::read_to_string(dir.join(".env.example")).unwrap();
        assert!(env.contains("PORT="));
        assert!(env.contains("DATABASE_URL="));
        assert!(env.contains("REDIS_URL="));
    }

    #[tokio::test]
    async fn test_create_with_yes_rejects_unknown_database() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/templates/index.json");
                then.status(200).json_body(templates_json());
            })
            .await;

        let temp = TempDir::new().unwrap();
        let session = session_at(temp.path(), &server.base_url());
        let args = CreateArgs {
            framework: Some("express".to_string()),
            database: Some("mongo".to_string()),
            ..yes_args()
        };

        let err = run_create(&session, args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelectionError>(),
            Some(SelectionError::NotFound { .. })
        ));
        assert!(!temp.path().join("my-api").exists());
    }
}
