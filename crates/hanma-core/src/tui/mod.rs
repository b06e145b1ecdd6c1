//! CLI command flows using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod add;
mod common;
mod create;
mod init;
mod module;
mod show;
mod sync;
mod update;

pub use add::{AddArgs, AddCommandConfig, AddSource, InstallLocation, ADDONS, SNIPPETS, TOOLING};
pub use common::{is_cancelled, Cancelled, Session, SessionOptions};
pub use create::{run_create, CreateArgs};
pub use init::{run_init, InitArgs};
pub use module::{run_module, ModuleArgs};
pub use show::{run_docs, run_show, ShowArgs, ShowKind};
pub use sync::{run_sync, SyncArgs};
pub use update::{run_update, UpdateArgs};
