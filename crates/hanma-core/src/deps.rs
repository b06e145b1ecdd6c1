//! Dependency specifier parsing and merging
//!
//! Registry content lists npm dependencies as `name@version` strings. Scoped
//! packages start with `@` and may carry a second `@` for the version, so
//! they are split on the last `@` rather than the first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Version used when a specifier carries none
pub const ANY_VERSION: &str = "*";

/// A parsed `name@version` dependency specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub version: String,
}

impl DependencySpec {
    /// Parse a specifier such as `express@4.18.0` or `@types/node@20.0.0`
    pub fn parse(spec: &str) -> Self {
        let (name, version) = if spec.starts_with('@') {
            match spec.rfind('@') {
                Some(idx) if idx > 0 => (&spec[..idx], &spec[idx + 1..]),
                _ => (spec, ""),
            }
        } else if let Some((name, version)) = spec.split_once('@') {
            (name, version)
        } else {
            (spec, "")
        };

        let version = if version.is_empty() {
            ANY_VERSION
        } else {
            version
        };

        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Argument form for a package manager: the bare name when unpinned
    pub fn install_arg(&self) -> String {
        if self.version == ANY_VERSION {
            self.name.clone()
        } else {
            self.to_string()
        }
    }
}

impl FromStr for DependencySpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Name-keyed dependency accumulator; a later insert for the same name replaces the earlier one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyMap(BTreeMap<String, String>);

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and insert every specifier in order
    pub fn extend_specs<S: AsRef<str>>(&mut self, specs: &[S]) {
        for spec in specs {
            self.insert(DependencySpec::parse(spec.as_ref()));
        }
    }

    pub fn insert(&mut self, spec: DependencySpec) {
        self.0.insert(spec.name, spec.version);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Package manager arguments, sorted by package name
    pub fn install_args(&self) -> Vec<String> {
        self.iter()
            .map(|(name, version)| {
                DependencySpec {
                    name: name.to_string(),
                    version: version.to_string(),
                }
                .install_arg()
            })
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DependencyMap {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut map = Self::new();
        for spec in iter {
            map.insert(DependencySpec::parse(spec.as_ref()));
        }
        map
    }
}
