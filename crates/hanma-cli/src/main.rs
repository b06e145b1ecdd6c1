//! Hanma CLI - copy backend snippets, modules and templates into your project

mod logging;

use clap::{Args as ClapArgs, Parser, Subcommand};
use hanma_core::tui::{
    self, AddArgs, CreateArgs, InitArgs, ModuleArgs, Session, SessionOptions, ShowArgs, ShowKind,
    SyncArgs, UpdateArgs,
};
use hanma_core::{PackageManager, ProductConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hanma product configuration
#[derive(Clone)]
pub struct HanmaProduct;

impl ProductConfig for HanmaProduct {
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
        "https://hanma.dev"
    }

    fn cli_description(&self) -> &'static str {
        "Add backend snippets, modules and project templates from the Hanma registry"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install hanma-cli --force"
    }
}

#[derive(Parser, Debug)]
#[command(name = "hanma")]
#[command(about = "Add backend snippets, modules and project templates from the Hanma registry")]
#[command(version)]
pub struct Args {
    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Bypass cached registry data
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create hanma.json in the current project
    Init(CliInitArgs),
    /// Create a new project from template blocks
    Create(CliCreateArgs),
    /// Add snippets to your project
    Add(CliSnippetArgs),
    /// Add framework-independent addons
    Addons(CliAddArgs),
    /// Add tooling configuration (linting, formatting, docker)
    Tooling(CliAddArgs),
    /// Install multi-file modules
    #[command(alias = "mod")]
    Module(CliModuleArgs),
    /// Browse registry contents
    Show(CliShowArgs),
    /// Refresh the local registry cache
    Sync(CliSyncArgs),
    /// Update the hanma CLI
    Update(CliUpdateArgs),
    /// Open the documentation in your browser
    Docs,
}

#[derive(ClapArgs, Debug)]
pub struct CliInitArgs {
    /// Directory for snippets
    #[arg(long = "components-path")]
    pub components_path: Option<String>,

    /// Directory for addons
    #[arg(long = "utils-path")]
    pub utils_path: Option<String>,

    /// Default snippet framework
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Accept defaults and overwrite an existing hanma.json
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            components_path: args.components_path,
            utils_path: args.utils_path,
            framework: args.framework,
            yes: args.yes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliCreateArgs {
    /// Project name (also the directory to create)
    pub name: Option<String>,

    /// Base template or framework (e.g. express, hono)
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Database block, or "none"
    #[arg(long)]
    pub database: Option<String>,

    /// Auth block, or "none"
    #[arg(long)]
    pub auth: Option<String>,

    /// Preset block, or "none"
    #[arg(long)]
    pub preset: Option<String>,

    /// Feature blocks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Extra blocks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub extras: Option<Vec<String>>,

    /// Package manager to install with
    #[arg(long = "pm", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Write files without installing dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            framework: args.framework,
            database: args.database,
            auth: args.auth,
            preset: args.preset,
            features: args.features,
            extras: args.extras,
            package_manager: args.package_manager,
            skip_install: args.skip_install,
            yes: args.yes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliAddArgs {
    /// Item names to add
    pub items: Vec<String>,

    /// Add every item (after --category)
    #[arg(short, long)]
    pub all: bool,

    /// Write files here instead of the configured directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Only consider items in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Package manager to install with
    #[arg(long = "pm", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Write files without installing dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl CliAddArgs {
    fn into_add_args(self, framework: Option<String>) -> AddArgs {
        AddArgs {
            items: self.items,
            all: self.all,
            path: self.path,
            category: self.category,
            framework,
            package_manager: self.package_manager,
            skip_install: self.skip_install,
            yes: self.yes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliSnippetArgs {
    #[command(flatten)]
    pub add: CliAddArgs,

    /// Snippet registry to use (defaults to hanma.json)
    #[arg(short, long)]
    pub framework: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct CliModuleArgs {
    /// Module names to install
    pub modules: Vec<String>,

    /// Only consider modules in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Install every module (after --category)
    #[arg(short, long)]
    pub all: bool,

    /// Write module files under this directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Package manager to install with
    #[arg(long = "pm", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Write files without installing dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliModuleArgs> for ModuleArgs {
    fn from(args: CliModuleArgs) -> Self {
        ModuleArgs {
            modules: args.modules,
            category: args.category,
            all: args.all,
            path: args.path,
            package_manager: args.package_manager,
            skip_install: args.skip_install,
            yes: args.yes,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliShowArgs {
    /// What to list
    #[arg(value_enum)]
    pub kind: ShowKind,

    /// Show a single entry in detail
    pub name: Option<String>,

    /// Snippet registry to read (defaults to hanma.json)
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

impl From<CliShowArgs> for ShowArgs {
    fn from(args: CliShowArgs) -> Self {
        ShowArgs {
            kind: args.kind,
            name: args.name,
            framework: args.framework,
            json: args.json,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliSyncArgs {
    /// Delete all cached registry data
    #[arg(long, conflicts_with = "info")]
    pub clear: bool,

    /// List cached entries with size and age
    #[arg(long)]
    pub info: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CliUpdateArgs {
    /// Only check whether a newer version exists
    #[arg(long)]
    pub check: bool,
}

async fn run(command: Command, session: Session<HanmaProduct>) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => tui::run_init(&session, args.into()).await,
        Command::Create(args) => tui::run_create(&session, args.into()).await,
        Command::Add(args) => {
            tui::SNIPPETS
                .run(&session, args.add.into_add_args(args.framework))
                .await
        }
        Command::Addons(args) => tui::ADDONS.run(&session, args.into_add_args(None)).await,
        Command::Tooling(args) => tui::TOOLING.run(&session, args.into_add_args(None)).await,
        Command::Module(args) => tui::run_module(&session, args.into()).await,
        Command::Show(args) => tui::run_show(&session, args.into()).await,
        Command::Sync(args) => {
            let args = SyncArgs {
                clear: args.clear,
                info: args.info,
            };
            tui::run_sync(&session, args).await
        }
        Command::Update(args) => {
            let args = UpdateArgs { check: args.check };
            tui::run_update(&session, args, CLI_VERSION).await
        }
        Command::Docs => tui::run_docs(&session),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C outside of prompts
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    if let Err(e) = logging::init_logging(args.verbose, args.quiet) {
        eprintln!("{:#}", e);
    }

    let options = SessionOptions {
        no_cache: args.no_cache,
        cwd: None,
    };
    let result = match Session::new(HanmaProduct, options) {
        Ok(session) => run(args.command, session).await,
        Err(e) => Err(e),
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if tui::is_cancelled(&e) => {
            let _ = cliclack::outro_cancel("Cancelled");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{} {:#}", console::style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
