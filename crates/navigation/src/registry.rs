//! In-memory snapshot of the module catalog.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use deskgate_core::{ModuleId, NavigationError, NavigationResult, SubItemId};

use crate::config::NavigationConfig;
use crate::rules::{StandardRules, VisibilityRule, VisibilityStrategy};

/// Module shown when no tier yields anything.
pub const DEFAULT_FALLBACK_MODULE: &str = "my-desk";

/// Legacy id suffixes stripped before a direct registry lookup.
pub const DEFAULT_LEGACY_SUFFIXES: &[&str] = &["-desk"];

/// Module lifecycle status; only used to order role-assigned modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemDescriptor {
    pub id: SubItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Display-only count; never read by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

impl SubItemDescriptor {
    pub fn new(id: impl Into<SubItemId>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            badge: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: ModuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub sub_items: Vec<SubItemDescriptor>,
    #[serde(default)]
    pub status: ModuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_visibility: Option<VisibilityRule>,
}

impl ModuleDescriptor {
    pub fn new(id: impl Into<ModuleId>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            sub_items: Vec::new(),
            status: ModuleStatus::Active,
            custom_visibility: None,
        }
    }

    pub fn with_sub_items(mut self, sub_items: Vec<SubItemDescriptor>) -> Self {
        self.sub_items = sub_items;
        self
    }

    pub fn with_status(mut self, status: ModuleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_visibility(mut self, rule: VisibilityRule) -> Self {
        self.custom_visibility = Some(rule);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ModuleStatus::Active
    }

    pub fn has_sub_item(&self, id: &str) -> bool {
        self.sub_items.iter().any(|s| s.id == id)
    }
}

/// A registry module narrowed to what one user may see.
///
/// Same shape as [`ModuleDescriptor`]; `sub_items` holds the filtered subset.
pub type ResolvedModule = ModuleDescriptor;

/// Serialized (JSON) form of a registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryCatalog {
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_suffixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_module: Option<String>,
}

/// Read-only module catalog consulted by the resolver.
///
/// Modules keep catalog order; ids are unique.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, ModuleId>,
    legacy_suffixes: Vec<String>,
    fallback_module: ModuleId,
    strategy: Arc<dyn VisibilityStrategy>,
}

impl ModuleRegistry {
    pub fn new(modules: Vec<ModuleDescriptor>) -> NavigationResult<Self> {
        let mut index = HashMap::with_capacity(modules.len());
        for (pos, module) in modules.iter().enumerate() {
            if index.insert(module.id.as_str().to_string(), pos).is_some() {
                return Err(NavigationError::DuplicateModule(module.id.to_string()));
            }
        }

        Ok(Self {
            modules,
            index,
            aliases: HashMap::new(),
            legacy_suffixes: DEFAULT_LEGACY_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            fallback_module: ModuleId::from(DEFAULT_FALLBACK_MODULE),
            strategy: Arc::new(StandardRules),
        })
    }

    pub fn from_catalog(catalog: RegistryCatalog) -> NavigationResult<Self> {
        let mut registry = Self::new(catalog.modules)?;
        for (raw, canonical) in catalog.aliases {
            registry = registry.with_alias(raw, canonical);
        }
        if let Some(suffixes) = catalog.legacy_suffixes {
            registry.legacy_suffixes = suffixes;
        }
        if let Some(fallback) = catalog.fallback_module {
            registry.fallback_module = ModuleId::from(fallback);
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> NavigationResult<Self> {
        let catalog: RegistryCatalog = serde_json::from_str(json)
            .map_err(|e| NavigationError::InvalidCatalog(e.to_string()))?;
        Self::from_catalog(catalog)
    }

    pub fn with_alias(mut self, raw: impl Into<String>, canonical: impl Into<ModuleId>) -> Self {
        self.aliases.insert(raw.into(), canonical.into());
        self
    }

    pub fn with_legacy_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_module(mut self, id: impl Into<ModuleId>) -> Self {
        self.fallback_module = id.into();
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn VisibilityStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Apply deployment overrides; unset fields keep the catalog values.
    pub fn with_config(mut self, config: &NavigationConfig) -> Self {
        if let Some(fallback) = &config.fallback_module {
            self.fallback_module = ModuleId::from(fallback.clone());
        }
        if let Some(suffixes) = &config.legacy_suffixes {
            self.legacy_suffixes = suffixes.clone();
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.index.get(id).map(|&pos| &self.modules[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn alias(&self, raw: &str) -> Option<&ModuleId> {
        self.aliases.get(raw)
    }

    pub fn legacy_suffixes(&self) -> &[String] {
        &self.legacy_suffixes
    }

    pub fn fallback_module_id(&self) -> &ModuleId {
        &self.fallback_module
    }

    pub fn strategy(&self) -> &dyn VisibilityStrategy {
        self.strategy.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_duplicate_ids() {
        let err = ModuleRegistry::new(vec![
            ModuleDescriptor::new("finance", "Finance", "/finance"),
            ModuleDescriptor::new("finance", "Finance 2", "/finance2"),
        ])
        .unwrap_err();
        assert_eq!(err, NavigationError::DuplicateModule("finance".to_string()));
    }

    #[test]
    fn catalog_json_round_trips_into_registry() {
        let catalog = json!({
            "modules": [
                {
                    "id": "finance",
                    "name": "Finance",
                    "path": "/finance",
                    "subItems": [{ "id": "budgets", "name": "Budgets", "path": "/finance/budgets" }],
                    "customVisibility": { "rule": "has_capability", "module": "finance" }
                },
                { "id": "my-desk", "name": "My Desk", "path": "/", "status": "inactive" }
            ],
            "aliases": { "finance-desk": "finance" },
            "fallbackModule": "my-desk"
        });

        let registry = ModuleRegistry::from_json(&catalog.to_string()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.alias("finance-desk"), Some(&ModuleId::from("finance")));
        assert_eq!(registry.legacy_suffixes(), ["-desk".to_string()]);
        let finance = registry.get("finance").unwrap();
        assert!(finance.has_sub_item("budgets"));
        assert!(finance.custom_visibility.is_some());
        assert!(!registry.get("my-desk").unwrap().is_active());
    }

    #[test]
    fn config_overrides_only_what_it_sets() {
        let config = NavigationConfig {
            fallback_module: Some("home".to_string()),
            legacy_suffixes: None,
        };
        let registry = ModuleRegistry::new(vec![])
            .unwrap()
            .with_legacy_suffixes(["-legacy"])
            .with_config(&config);

        assert_eq!(registry.fallback_module_id(), "home");
        assert_eq!(registry.legacy_suffixes(), ["-legacy".to_string()]);
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(ModuleRegistry::from_json("{ \"modules\": 3 }").is_err());
    }
}
