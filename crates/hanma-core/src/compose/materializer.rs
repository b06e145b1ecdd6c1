//! Writing a composed project to disk
//!
//! Every write overwrites what is there, except `.gitignore`, which is only
//! created when missing. A failure part-way leaves the files written so far.

use super::package_json::{PackageJson, PACKAGE_JSON};
use crate::registry::schema::TemplateFile;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Suffix marking a template file
pub const TEMPLATE_EXTENSION: &str = ".hbs";

/// Placeholder replaced with the project name in file contents
pub const PROJECT_NAME_PLACEHOLDER: &str = "{{projectName}}";

pub const ENV_EXAMPLE: &str = ".env.example";
pub const GITIGNORE: &str = ".gitignore";

pub const DEFAULT_GITIGNORE: &str = "\
node_modules
dist
build
coverage
.env
.env.local
*.log
.DS_Store
";

/// Paths written by [`materialize`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Relative paths in write order (a path written twice appears twice)
    pub files: Vec<PathBuf>,
    pub wrote_env_example: bool,
    pub wrote_gitignore: bool,
}

/// Write `package.json`, the merged files, `.env.example` and `.gitignore`
pub async fn materialize(
    project_dir: &Path,
    project_name: &str,
    package_json: &PackageJson,
    files: &[TemplateFile],
    env_vars: &[String],
) -> Result<MaterializeReport> {
    fs::create_dir_all(project_dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", project_dir.display()))?;

    let package_path = project_dir.join(PACKAGE_JSON);
    fs::write(&package_path, package_json.to_pretty_json()?)
        .await
        .with_context(|| format!("Failed to write file: {}", package_path.display()))?;

    let mut report = MaterializeReport {
        files: write_template_files(project_dir, files, project_name).await?,
        ..MaterializeReport::default()
    };

    if !env_vars.is_empty() {
        let path = project_dir.join(ENV_EXAMPLE);
        fs::write(&path, env_example_content(env_vars))
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        report.wrote_env_example = true;
    }

    let gitignore = project_dir.join(GITIGNORE);
    if !gitignore.exists() {
        fs::write(&gitignore, DEFAULT_GITIGNORE)
            .await
            .with_context(|| format!("Failed to write file: {}", gitignore.display()))?;
        report.wrote_gitignore = true;
    }

    Ok(report)
}

/// Write template files under `dir`, skipping any `package.json`
pub async fn write_template_files(
    dir: &Path,
    files: &[TemplateFile],
    project_name: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for file in files {
        if is_package_json(&file.path) {
            tracing::debug!(path = %file.path, "skipping package.json from block");
            continue;
        }

        let relative = PathBuf::from(output_path(&file.path));
        let target = dir.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&target, render_content(&file.content, project_name))
            .await
            .with_context(|| format!("Failed to write file: {}", target.display()))?;
        tracing::info!(path = %target.display(), "wrote file");

        written.push(relative);
    }

    Ok(written)
}

/// True for a root `package.json`, with or without `.hbs` and `./` prefixes
fn is_package_json(path: &str) -> bool {
    let mut parts = Path::new(output_path(path))
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(name)), None) => name
            .to_str()
            .is_some_and(|n| n.eq_ignore_ascii_case(PACKAGE_JSON)),
        _ => false,
    }
}

/// Destination path with a trailing `.hbs` removed
pub fn output_path(path: &str) -> &str {
    path.strip_suffix(TEMPLATE_EXTENSION).unwrap_or(path)
}

/// Replace every `{{projectName}}` with the project name
pub fn render_content(content: &str, project_name: &str) -> String {
    content.replace(PROJECT_NAME_PLACEHOLDER, project_name)
}

/// One `NAME=` line per variable; `NAME=value` entries are kept as given
pub fn env_example_content(env_vars: &[String]) -> String {
    env_vars
        .iter()
        .map(|var| {
            if var.contains('=') {
                var.clone()
            } else {
                format!("{}=", var)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn env_var_name(line: &str) -> &str {
    line.split('=').next().unwrap_or(line).trim()
}

/// Append variables to an existing `.env.example`, skipping names already present
///
/// Returns the number of lines appended.
pub async fn append_env_example(dir: &Path, env_vars: &[String]) -> Result<usize> {
    if env_vars.is_empty() {
        return Ok(0);
    }

    let path = dir.join(ENV_EXAMPLE);
    let existing = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let mut seen: HashSet<String> = existing
        .lines()
        .map(env_var_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let fresh: Vec<String> = env_vars
        .iter()
        .filter(|var| seen.insert(env_var_name(var).to_string()))
        .cloned()
        .collect();
    if fresh.is_empty() {
        return Ok(0);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&env_example_content(&fresh));

    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(fresh.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::collector::CollectedBlockData;
    use tempfile::TempDir;

    fn file(path: &str, content: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    fn package(name: &str) -> PackageJson {
        let mut data = CollectedBlockData::default();
        data.dependencies.extend_specs(&["express@4"]);
        PackageJson::from_collected(name, &data)
    }

    fn read(dir: &Path, rel: &str) -> String {
        std::fs::read_to_string(dir.join(rel)).unwrap()
    }

    #[tokio::test]
    async fn test_materialize_writes_project() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my-api");
        let files = vec![
            file("src/index.ts.hbs", "console.log('{{projectName}} {{projectName}}')"),
            file("README.md", "# {{projectName}}"),
        ];

        let report = materialize(&dir, "my-api", &package("my-api"), &files, &[])
            .await
            .unwrap();

        assert_eq!(
            read(&dir, "src/index.ts"),
            "console.log('my-api my-api')"
        );
        assert_eq!(read(&dir, "README.md"), "# my-api");
        assert!(!dir.join("src/index.ts.hbs").exists());
        assert!(!dir.join(ENV_EXAMPLE).exists());
        assert!(report.wrote_gitignore);
        assert_eq!(
            report.files,
            vec![PathBuf::from("src/index.ts"), PathBuf::from("README.md")]
        );

        let pkg: serde_json::Value = serde_json::from_str(&read(&dir, PACKAGE_JSON)).unwrap();
        assert_eq!(pkg["name"], "my-api");
        assert_eq!(pkg["dependencies"]["express"], "4");
    }

    #[tokio::test]
    async fn test_block_package_json_is_never_written() {
        let temp = TempDir::new().unwrap();
        let files = vec![
            file("package.json.hbs", "{\"name\": \"from-block\"}"),
            file("package.json", "{\"name\": \"also-from-block\"}"),
        ];

        materialize(temp.path(), "real", &package("real"), &files, &[])
            .await
            .unwrap();

        assert!(!temp.path().join("package.json.hbs").exists());
        let pkg: serde_json::Value =
            serde_json::from_str(&read(temp.path(), PACKAGE_JSON)).unwrap();
        assert_eq!(pkg["name"], "real");
    }

    #[tokio::test]
    async fn test_dot_prefixed_package_json_is_skipped() {
        let temp = TempDir::new().unwrap();
        let files = vec![
            file("./package.json.hbs", "{\"name\": \"from-block\"}"),
            file("./package.json", "{\"name\": \"also-from-block\"}"),
            file("server/package.json", "{\"name\": \"nested\"}"),
        ];

        materialize(temp.path(), "real", &package("real"), &files, &[])
            .await
            .unwrap();

        let pkg: serde_json::Value =
            serde_json::from_str(&read(temp.path(), PACKAGE_JSON)).unwrap();
        assert_eq!(pkg["name"], "real");
        assert!(temp.path().join("server").join(PACKAGE_JSON).exists());
    }

    #[test]
    fn test_is_package_json_forms() {
        assert!(is_package_json("package.json"));
        assert!(is_package_json("./package.json.hbs"));
        assert!(is_package_json("././package.json"));
        assert!(!is_package_json("server/package.json"));
        assert!(!is_package_json("package.json.bak"));
    }

    #[tokio::test]
    async fn test_duplicate_path_last_write_wins() {
        let temp = TempDir::new().unwrap();
        let files = vec![file("src/db.ts", "A"), file("src/db.ts", "B")];

        let report = materialize(temp.path(), "x", &package("x"), &files, &[])
            .await
            .unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(read(temp.path(), "src/db.ts"), "B");
    }

    #[tokio::test]
    async fn test_env_example_lines() {
        let temp = TempDir::new().unwrap();
        let env = vec!["FOO".to_string(), "BAR=baz".to_string()];

        let report = materialize(temp.path(), "x", &package("x"), &[], &env)
            .await
            .unwrap();

        assert!(report.wrote_env_example);
        assert_eq!(read(temp.path(), ENV_EXAMPLE), "FOO=\nBAR=baz");
    }

    #[tokio::test]
    async fn test_gitignore_preserved_on_second_run() {
        let temp = TempDir::new().unwrap();

        materialize(temp.path(), "x", &package("x"), &[], &[])
            .await
            .unwrap();
        assert_eq!(read(temp.path(), GITIGNORE), DEFAULT_GITIGNORE);

        std::fs::write(temp.path().join(GITIGNORE), "custom\n").unwrap();
        let report = materialize(temp.path(), "x", &package("x"), &[], &[])
            .await
            .unwrap();

        assert!(!report.wrote_gitignore);
        assert_eq!(read(temp.path(), GITIGNORE), "custom\n");
    }

    #[tokio::test]
    async fn test_append_env_example_skips_known_names() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(ENV_EXAMPLE), "PORT=3000").unwrap();

        let added = append_env_example(
            temp.path(),
            &[
                "PORT".to_string(),
                "JWT_SECRET".to_string(),
                "JWT_EXPIRES_IN=1h".to_string(),
                "JWT_SECRET".to_string(),
            ],
        )
        .await
        .unwrap();

        assert_eq!(added, 2);
        assert_eq!(
            read(temp.path(), ENV_EXAMPLE),
            "PORT=3000\nJWT_SECRET=\nJWT_EXPIRES_IN=1h"
        );
    }

    #[test]
    fn test_output_path_strips_only_trailing_hbs() {
        assert_eq!(output_path("src/app.ts.hbs"), "src/app.ts");
        assert_eq!(output_path("src/hbs/app.ts"), "src/hbs/app.ts");
        assert_eq!(output_path("views/page.hbs.html"), "views/page.hbs.html");
    }
}
