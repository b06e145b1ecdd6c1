//! Registry schema, endpoint resolution and fetching
//!
//! This module provides:
//! - Record types for snippets, template blocks and modules, with runtime validation
//! - Endpoint resolution from `HANMA_*` environment variables
//! - A cache-first HTTP fetcher

pub mod endpoints;
pub mod fetcher;
pub mod schema;

pub use endpoints::Endpoints;
pub use fetcher::{ItemSource, RegistryFetcher};
pub use schema::{
    FrameworkIndex, ItemType, ModuleBlock, ModulesRegistry, RegistryItem, TemplateBlock,
    TemplatesRegistry, Validate,
};
