//! `init`: write `hanma.json`

use super::common::{Cancelled, Session};
use crate::compose::selection::NONE_CHOICE;
use crate::product::ProductConfig;
use crate::project::{HanmaConfig, DEFAULT_COMPONENTS_PATH, DEFAULT_UTILS_PATH};
use anyhow::Result;

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    pub components_path: Option<String>,
    pub utils_path: Option<String>,
    pub framework: Option<String>,

    /// Accept defaults and overwrite an existing file
    pub yes: bool,
}

/// Run the init flow
pub async fn run_init<C: ProductConfig>(session: &Session<C>, args: InitArgs) -> Result<()> {
    cliclack::intro(format!("{} init", session.config.display_name()))?;

    if HanmaConfig::exists_in(&session.cwd) {
        let overwrite = if args.yes {
            true
        } else {
            cliclack::confirm("hanma.json already exists. Overwrite it?")
                .initial_value(false)
                .interact()?
        };
        if !overwrite {
            return Err(Cancelled.into());
        }
    }

    let config = prompt_config(session, &args).await?;
    let path = config.save(&session.cwd).await?;

    cliclack::log::success(format!("Components: {}", config.components_path))?;
    cliclack::log::success(format!("Utilities: {}", config.utils_path))?;
    if let Some(framework) = &config.framework {
        cliclack::log::success(format!("Framework: {}", framework))?;
    }
    cliclack::outro(format!("Wrote {}", path.display()))?;
    Ok(())
}

/// Collect `hanma.json` values from flags, prompting for the rest
pub(crate) async fn prompt_config<C: ProductConfig>(
    session: &Session<C>,
    args: &InitArgs,
) -> Result<HanmaConfig> {
    let components_path = prompt_path(
        args.components_path.as_ref(),
        args.yes,
        "Where should snippets go?",
        DEFAULT_COMPONENTS_PATH,
    )?;
    let utils_path = prompt_path(
        args.utils_path.as_ref(),
        args.yes,
        "Where should addons go?",
        DEFAULT_UTILS_PATH,
    )?;

    let framework = match &args.framework {
        Some(framework) => Some(framework.clone()),
        None if args.yes => None,
        None => select_framework(session).await?,
    };

    Ok(HanmaConfig {
        components_path,
        utils_path,
        framework,
    })
}

fn prompt_path(flag: Option<&String>, yes: bool, prompt: &str, default: &str) -> Result<String> {
    if let Some(path) = flag {
        return Ok(path.clone());
    }
    if yes {
        return Ok(default.to_string());
    }

    let input: String = cliclack::input(prompt)
        .placeholder(default)
        .default_input(default)
        .interact()?;
    Ok(if input.trim().is_empty() {
        default.to_string()
    } else {
        input
    })
}

/// The framework is optional, so an unreachable registry only skips the prompt
async fn select_framework<C: ProductConfig>(session: &Session<C>) -> Result<Option<String>> {
    let frameworks = match session.fetcher.fetch_framework_index().await {
        Ok(frameworks) if !frameworks.is_empty() => frameworks,
        Ok(_) => return Ok(None),
        Err(e) => {
            tracing::debug!(error = %e, "framework index unavailable");
            cliclack::log::warning("Could not load frameworks; skipping default framework")?;
            return Ok(None);
        }
    };

    let mut select = cliclack::select("Default framework for snippets")
        .item(NONE_CHOICE.to_string(), "None", "choose on each add");
    for framework in &frameworks {
        select = select.item(framework.clone(), framework, "");
    }
    let choice: String = select.interact()?;
    Ok((choice != NONE_CHOICE).then_some(choice))
}
