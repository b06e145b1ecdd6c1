//! Integration tests for the `hanma` binary that need no network access.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Nothing listens on the discard port
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn hanma(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("hanma"));
    cmd.env("HOME", home.path())
        .env("HANMA_BASE_URL", UNREACHABLE)
        .env_remove("HANMA_REGISTRY_URL")
        .env_remove("HANMA_TEMPLATES_URL")
        .env_remove("HANMA_MODULES_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    hanma(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hanma registry"))
        .stdout(predicate::str::contains("tooling"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    hanma(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_module_alias() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    hanma(&home)
        .args(["mod", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--category"));
    Ok(())
}

#[test]
fn cli_show_rejects_unknown_kind() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    hanma(&home)
        .args(["show", "widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
    Ok(())
}

#[test]
fn cli_unreachable_registry_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    hanma(&home)
        .current_dir(project.path())
        .args(["show", "snippets", "--framework", "express", "--no-cache"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("127.0.0.1"));
    Ok(())
}

#[test]
fn cli_invalid_base_url_names_variable() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    hanma(&home)
        .env("HANMA_BASE_URL", "not a url")
        .args(["show", "templates"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HANMA_BASE_URL"));
    Ok(())
}

#[test]
fn cli_sync_clear_and_info_on_empty_cache() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let cache = home.path().join(".hanma").join("cache");
    fs::create_dir_all(&cache)?;
    fs::write(cache.join("templates.json"), "{}")?;

    hanma(&home).args(["sync", "--clear"]).assert().success();
    assert!(!cache.exists());

    hanma(&home)
        .args(["sync", "--info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
    Ok(())
}

#[test]
fn cli_sync_info_lists_entries() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let cache = home.path().join(".hanma").join("cache");
    fs::create_dir_all(&cache)?;
    fs::write(cache.join("registry-express.json"), "[]")?;

    hanma(&home)
        .args(["sync", "--info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("registry-express"))
        .stdout(predicate::str::contains("1 entries"));
    Ok(())
}

#[test]
fn cli_init_writes_config() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    hanma(&home)
        .current_dir(project.path())
        .args(["init", "-y", "--components-path", "lib/snippets"])
        .assert()
        .success();

    let written = fs::read_to_string(project.path().join("hanma.json"))?;
    let json: serde_json::Value = serde_json::from_str(&written)?;
    assert_eq!(json["componentsPath"], "lib/snippets");
    assert_eq!(json["utilsPath"], "src/utils");
    assert!(json.get("framework").is_none());
    Ok(())
}

#[test]
fn cli_module_creates_missing_config() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    hanma(&home)
        .current_dir(project.path())
        .args(["module", "-y", "jwt-auth"])
        .assert()
        .code(1);

    let written = fs::read_to_string(project.path().join("hanma.json"))?;
    let json: serde_json::Value = serde_json::from_str(&written)?;
    assert_eq!(json["componentsPath"], "src");
    assert_eq!(json["utilsPath"], "src/utils");
    Ok(())
}

#[test]
fn cli_create_requires_name_when_non_interactive() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    hanma(&home)
        .current_dir(project.path())
        .args(["create", "-y"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("project name is required"));
    Ok(())
}

#[test]
fn cli_create_rejects_invalid_name() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    hanma(&home)
        .current_dir(project.path())
        .args(["create", "My App", "-y"])
        .assert()
        .code(1);
    assert!(!project.path().join("My App").exists());
    Ok(())
}
