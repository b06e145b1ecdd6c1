//! Session state and prompt helpers shared by every command

use super::init::{prompt_config, InitArgs};
use crate::cache::{default_cache_dir, CacheStore, DEFAULT_TTL};
use crate::error::ConfigError;
use crate::product::ProductConfig;
use crate::project::HanmaConfig;
use crate::registry::RegistryFetcher;
use crate::runtime::{InstallOutcome, PackageManager};
use anyhow::{Context, Result};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// The user backed out of a prompt; exits 0
#[derive(Debug, Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// True for user cancellation, including Esc/Ctrl+C inside a prompt
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<Cancelled>()
            || cause
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
    })
}

/// Global options from the command line
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Ignore fresh cache entries
    pub no_cache: bool,
    /// Project directory (defaults to the current directory)
    pub cwd: Option<PathBuf>,
}

/// Everything a command needs: product identity, fetcher, working directory
pub struct Session<C: ProductConfig> {
    pub config: C,
    pub fetcher: RegistryFetcher,
    pub cache: Arc<CacheStore>,
    pub cwd: PathBuf,
}

impl<C: ProductConfig> Session<C> {
    pub fn new(config: C, options: SessionOptions) -> Result<Self> {
        let cache = Arc::new(CacheStore::new(default_cache_dir()));
        let fetcher = RegistryFetcher::from_config(&config)?
            .with_cache(Arc::clone(&cache), DEFAULT_TTL)
            .refreshing(options.no_cache);
        let cwd = match options.cwd {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        Ok(Self {
            config,
            fetcher,
            cache,
            cwd,
        })
    }

    /// A fetcher that always hits the network and refreshes the cache
    pub fn refreshing_fetcher(&self) -> Result<RegistryFetcher> {
        Ok(RegistryFetcher::from_config(&self.config)?
            .with_cache(Arc::clone(&self.cache), DEFAULT_TTL)
            .refreshing(true))
    }
}

/// Await `future` behind a spinner; the spinner shows the error on failure
pub async fn with_spinner<T, F, D>(start: &str, done: D, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
    D: FnOnce(&T) -> String,
{
    let spinner = cliclack::spinner();
    spinner.start(start);
    match future.await {
        Ok(value) => {
            spinner.stop(done(&value));
            Ok(value)
        }
        Err(e) => {
            spinner.error(format!("{:#}", e));
            Err(e)
        }
    }
}

/// Upper-case the first character, for prompt and error labels
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `--pm` if given, else detect from the project directory
pub fn package_manager_for(flag: Option<PackageManager>, dir: &Path) -> PackageManager {
    flag.unwrap_or_else(|| PackageManager::detect(dir))
}

/// Print the result of each package manager run
pub fn report_install(outcomes: &[&InstallOutcome]) -> Result<()> {
    for outcome in outcomes {
        match outcome {
            InstallOutcome::Succeeded { command } => {
                cliclack::log::success(format!("Ran {}", command))?;
            }
            InstallOutcome::Failed { command, reason } => {
                cliclack::log::error(format!("Failed to install dependencies: {}", reason))?;
                cliclack::log::info(format!("Install them manually with: {}", command))?;
            }
            InstallOutcome::Skipped => {}
        }
    }
    Ok(())
}

/// Load `hanma.json`, offering to create it when missing
///
/// Returns `Ok(None)` when the user declines to create one.
pub async fn load_or_init_config<C: ProductConfig>(
    session: &Session<C>,
    yes: bool,
) -> Result<Option<HanmaConfig>> {
    match HanmaConfig::load(&session.cwd).await {
        Ok(config) => return Ok(Some(config)),
        Err(ConfigError::Missing { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    cliclack::log::warning("No hanma.json found in this project")?;

    let create = if yes {
        true
    } else {
        cliclack::confirm("Create one now?")
            .initial_value(true)
            .interact()?
    };
    if !create {
        return Ok(None);
    }

    let args = InitArgs {
        yes,
        ..Default::default()
    };
    let config = prompt_config(session, &args).await?;
    let path = config.save(&session.cwd).await?;
    cliclack::log::success(format!("Created {}", path.display()))?;
    Ok(Some(config))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::registry::Endpoints;

    #[derive(Clone)]
    pub(crate) struct TestProduct;

    impl ProductConfig for TestProduct {
        fn name(&self) -> &'static str {
            "hanma"
        }
        fn display_name(&self) -> &'static str {
            "Hanma"
        }
        fn crate_name(&self) -> &'static str {
            "hanma-cli"
        }
        fn default_base_url(&self) -> &'static str {
            "http://127.0.0.1:9"
        }
        fn cli_description(&self) -> &'static str {
            "test"
        }
        fn upgrade_command(&self) -> &'static str {
            "true"
        }
    }

    /// A session rooted at `cwd` whose registry lives at `base_url`
    pub(crate) fn session_at(cwd: &Path, base_url: &str) -> Session<TestProduct> {
        let cache = Arc::new(CacheStore::new(cwd.join(".test-cache")));
        let endpoints = Endpoints::from_base(base_url).unwrap();
        Session {
            config: TestProduct,
            fetcher: RegistryFetcher::new(endpoints, "hanma-test")
                .with_cache(Arc::clone(&cache), DEFAULT_TTL)
                .refreshing(true),
            cache,
            cwd: cwd.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session<testing::TestProduct> {
        testing::session_at(dir.path(), "http://127.0.0.1:9")
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("mailer"), "Mailer");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_cancellation_detection() {
        let interrupted = anyhow::Error::new(io::Error::new(io::ErrorKind::Interrupted, "esc"));
        assert!(is_cancelled(&interrupted));
        assert!(is_cancelled(&anyhow::Error::new(Cancelled).context("init")));
        assert!(!is_cancelled(&anyhow::anyhow!("HTTP 404")));
    }

    #[tokio::test]
    async fn test_missing_config_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);

        let config = load_or_init_config(&session, true).await.unwrap().unwrap();

        assert_eq!(config, HanmaConfig::default());
        assert_eq!(HanmaConfig::load(dir.path()).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_existing_config_is_loaded_untouched() {
        let dir = TempDir::new().unwrap();
        let existing = HanmaConfig {
            components_path: "lib".into(),
            utils_path: "lib/utils".into(),
            framework: Some("hono".into()),
        };
        existing.save(dir.path()).await.unwrap();

        let loaded = load_or_init_config(&session(&dir), true).await.unwrap();
        assert_eq!(loaded, Some(existing));
    }

    #[tokio::test]
    async fn test_corrupt_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hanma.json"), "{ nope").unwrap();

        assert!(load_or_init_config(&session(&dir), true).await.is_err());
    }
}
