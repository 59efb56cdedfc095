//! Resolver configuration

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the flow map name
pub const MAPPING_ENV: &str = "FLOWMAP_MAPPING";

/// Default flow map name
pub const DEFAULT_MAPPING: &str = "flowmap-default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Name of the flow map loaded at startup and written after each new entry.
    pub mapping_name: String,

    /// Look up providers for product and waste flows.
    pub resolve_providers: bool,

    /// Candidates with a lower name score are ignored. The default of 0
    /// accepts the first compatible search hit even when it shares no word.
    pub min_name_score: usize,

    /// Create a new flow when no candidate matches; otherwise report
    /// [`ResolveError::NoCandidate`](crate::ResolveError::NoCandidate).
    pub create_missing: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mapping_name: DEFAULT_MAPPING.to_string(),
            resolve_providers: true,
            min_name_score: 0,
            create_missing: true,
        }
    }
}

impl ResolverConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse resolver config")
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup(MAPPING_ENV).filter(|n| !n.trim().is_empty()) {
            self.mapping_name = name.trim().to_string();
        }
        self
    }

    pub fn with_mapping_name(mut self, name: impl Into<String>) -> Self {
        self.mapping_name = name.into();
        self
    }
}
