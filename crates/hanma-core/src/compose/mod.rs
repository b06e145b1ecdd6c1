//! Project composition: selecting blocks, merging them, and writing the result
//!
//! This module provides:
//! - Block collection with last-wins dependency and script merging
//! - Selection resolution for `create`
//! - `package.json` synthesis and project materialization
//! - Registry item and module installation into existing projects

pub mod collector;
pub mod installer;
pub mod materializer;
pub mod package_json;
pub mod selection;

pub use collector::{collect_blocks, Block, CollectedBlockData};
pub use installer::{install_blocks, install_items, DependencyInstall, DependencyPlan};
pub use materializer::materialize;
pub use package_json::PackageJson;
pub use selection::{resolve, Selection, SelectionRequest};
