//! Hanma Core - Shared library for the Hanma content-distribution CLI
//!
//! Hanma copies pre-written backend snippets, modules and project templates
//! from a remote JSON registry into a user's project.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Dependency parsing, registry schema and fetching, caching
//! - **Layer 2: Composition** - Block selection, merging, materialization and installation
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based command flows (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based command flows
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use hanma_core::compose::{collect_blocks, materialize, resolve, PackageJson, SelectionRequest};
//! use hanma_core::registry::RegistryFetcher;
//!
//! let fetcher = RegistryFetcher::from_config(&MyProduct)?;
//! let templates = fetcher.fetch_templates().await?;
//! let selection = resolve(&templates, &SelectionRequest {
//!     framework: Some("express".into()),
//!     ..Default::default()
//! })?;
//! let data = collect_blocks(selection.blocks());
//! let package = PackageJson::from_collected("my-api", &data);
//! materialize(dir, "my-api", &package, &data.files, &data.env_vars).await?;
//! ```

pub mod cache;
pub mod compose;
pub mod deps;
pub mod error;
pub mod product;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod version;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use deps::{DependencyMap, DependencySpec};
pub use error::{ConfigError, RegistryError, SchemaError, SelectionError};
pub use product::ProductConfig;
pub use project::HanmaConfig;
pub use registry::{Endpoints, RegistryFetcher};
pub use runtime::PackageManager;
