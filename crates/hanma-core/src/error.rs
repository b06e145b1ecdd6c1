//! Typed errors for the registry boundary, content selection and local config

use std::path::PathBuf;
use thiserror::Error;

/// Failure while fetching or trusting registry JSON
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to fetch {url}: HTTP {status}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse registry data from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid registry data from {url}: {source}")]
    Validation {
        url: String,
        #[source]
        source: SchemaError,
    },
}

/// A record that deserialized but breaks a registry invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{kind} is missing a name")]
    MissingName { kind: &'static str },

    #[error("{kind} '{name}' has no files")]
    NoFiles { kind: &'static str, name: String },

    #[error("{kind} '{name}' has an unsafe file path '{path}'")]
    UnsafePath {
        kind: &'static str,
        name: String,
        path: String,
    },

    #[error("{kind} '{name}' has an empty dependency specifier")]
    EmptyDependency { kind: &'static str, name: String },

    #[error("Module category '{category}' is not listed in categories")]
    UnknownCategory { category: String },

    #[error("{context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<SchemaError>,
    },
}

/// A set of chosen blocks that cannot be composed together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No base framework selected. Available: {available}")]
    MissingBase { available: String },

    #[error("{kind} '{name}' not found. Available: {available}")]
    NotFound {
        kind: &'static str,
        name: String,
        available: String,
    },

    #[error("Only one {feature_type} feature can be selected (got {first} and {second})")]
    ExclusiveFeature {
        feature_type: String,
        first: String,
        second: String,
    },

    #[error("Block '{name}' is a {actual} block, expected {expected}")]
    WrongCategory {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Block '{name}' targets {block_framework}, not {framework}")]
    IncompatibleFramework {
        name: String,
        block_framework: String,
        framework: String,
    },
}

/// Failure loading or saving `hanma.json`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No hanma.json found at {path}. Run `hanma init` first")]
    Missing { path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
