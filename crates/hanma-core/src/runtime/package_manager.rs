//! Detecting and running the project's JavaScript package manager

use clap::ValueEnum;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

/// Lockfiles in detection order
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
];

impl PackageManager {
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Detect from lockfiles in `dir`, then the invoking package manager, else npm
    pub fn detect(dir: &Path) -> Self {
        Self::detect_with(dir, std::env::var("npm_config_user_agent").ok().as_deref())
    }

    pub fn detect_with(dir: &Path, user_agent: Option<&str>) -> Self {
        LOCKFILES
            .iter()
            .find(|(file, _)| dir.join(file).exists())
            .map(|(_, pm)| *pm)
            .or_else(|| user_agent.and_then(Self::from_user_agent))
            .unwrap_or(PackageManager::Npm)
    }

    /// `npm_config_user_agent` looks like `pnpm/9.1.0 npm/? node/v20.11.0 linux x64`
    fn from_user_agent(user_agent: &str) -> Option<Self> {
        let name = user_agent.split('/').next()?;
        match name {
            "npm" => Some(PackageManager::Npm),
            "pnpm" => Some(PackageManager::Pnpm),
            "yarn" => Some(PackageManager::Yarn),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }

    /// Arguments for installing everything in `package.json`
    pub fn install_args(&self) -> Vec<String> {
        vec!["install".to_string()]
    }

    /// Arguments for adding packages
    pub fn add_args(&self, packages: &[String], dev: bool) -> Vec<String> {
        let verb = match self {
            PackageManager::Npm => "install",
            _ => "add",
        };
        let mut args = vec![verb.to_string()];
        if dev {
            args.push("-D".to_string());
        }
        args.extend(packages.iter().cloned());
        args
    }

    /// Shell form of a command, for "run this manually" hints
    pub fn display_command(&self, args: &[String]) -> String {
        let mut parts = vec![self.command().to_string()];
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }

    /// Run the package manager in `dir`, capturing output
    pub async fn run(&self, dir: &Path, args: &[String]) -> InstallOutcome {
        let command = self.display_command(args);
        tracing::debug!(%command, dir = %dir.display(), "running package manager");

        let output = TokioCommand::new(self.command())
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => InstallOutcome::Succeeded { command },
            Ok(out) => InstallOutcome::Failed {
                command,
                reason: format!(
                    "exit code {}: {}",
                    out.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            },
            Err(e) => InstallOutcome::Failed {
                command,
                reason: e.to_string(),
            },
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Result of one package manager run; failures carry the manual fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Succeeded { command: String },
    Failed { command: String, reason: String },
    Skipped,
}

impl InstallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallOutcome::Failed { .. })
    }
}
