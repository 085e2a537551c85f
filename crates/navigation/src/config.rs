//! Deployment configuration for the navigation engine.

use serde::{Deserialize, Serialize};

pub const ENV_FALLBACK_MODULE: &str = "DESKGATE_FALLBACK_MODULE";
pub const ENV_LEGACY_SUFFIXES: &str = "DESKGATE_LEGACY_SUFFIXES";

/// Overrides applied on top of a registry catalog.
///
/// `None` keeps whatever the catalog (or the registry defaults) say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub fallback_module: Option<String>,
    #[serde(default)]
    pub legacy_suffixes: Option<Vec<String>>,
}

impl NavigationConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fallback_module = lookup(ENV_FALLBACK_MODULE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let legacy_suffixes = lookup(ENV_LEGACY_SUFFIXES)
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            });

        Self {
            fallback_module,
            legacy_suffixes,
        }
    }
}
