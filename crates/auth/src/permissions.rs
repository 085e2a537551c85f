use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Grant recorded for a single module in the capability map.
///
/// `items == None` means every sub-item of the module is granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<BTreeSet<String>>,
}

impl ModulePermission {
    pub fn granted() -> Self {
        Self {
            enabled: true,
            items: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            enabled: false,
            items: None,
        }
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            items: Some(items.into_iter().map(Into::into).collect()),
        }
    }

    /// Lenient decoding of one `permissions.modules` value.
    ///
    /// - `true` / `false` grant or deny the whole module.
    /// - `{ "enabled"?: bool, "items"?: [ids] | { id: bool } }` grants unless
    ///   `enabled` is `false`; a malformed `items` grants no sub-items.
    /// - Anything else denies.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(enabled) => Self {
                enabled: *enabled,
                items: None,
            },
            Value::Object(obj) => {
                let enabled = obj.get("enabled").and_then(Value::as_bool).unwrap_or(true);
                let items = obj.get("items").map(|raw| match raw {
                    Value::Array(ids) => ids
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Value::Object(flags) => flags
                        .iter()
                        .filter(|(_, v)| v.as_bool() == Some(true))
                        .map(|(k, _)| k.clone())
                        .collect(),
                    _ => BTreeSet::new(),
                });
                Self { enabled, items }
            }
            _ => Self::denied(),
        }
    }

    pub fn allows_item(&self, sub_item: &str) -> bool {
        self.enabled
            && self
                .items
                .as_ref()
                .is_none_or(|items| items.contains(sub_item))
    }
}

/// Capability map (`permissions.modules`): module id → grant, in source order.
///
/// Source order matters: the permission-map tier lists modules in the order
/// the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct PermissionMap {
    entries: Vec<(String, ModulePermission)>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw `permissions.modules` value; non-objects yield an empty map.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(obj) = value else {
            if !value.is_null() {
                tracing::debug!("permissions.modules is not an object; treating as empty");
            }
            return Self::default();
        };

        Self {
            entries: obj
                .iter()
                .map(|(k, v)| (k.clone(), ModulePermission::from_value(v)))
                .collect(),
        }
    }

    /// Insert or replace the grant for `module`, keeping its original position.
    pub fn insert(&mut self, module: impl Into<String>, permission: ModulePermission) {
        let module = module.into();
        match self.entries.iter_mut().find(|(k, _)| *k == module) {
            Some((_, existing)) => *existing = permission,
            None => self.entries.push((module, permission)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Module keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, module: &str) -> Option<&ModulePermission> {
        self.entries
            .iter()
            .find(|(k, _)| k == module)
            .map(|(_, p)| p)
    }

    /// Capability check: the map holds an enabled grant for `module`.
    pub fn has_module(&self, module: &str) -> bool {
        self.get(module).is_some_and(|p| p.enabled)
    }

    /// Sub-item predicate evaluated against the grant for `module`.
    pub fn allows_sub_item(&self, module: &str, sub_item: &str) -> bool {
        self.get(module).is_some_and(|p| p.allows_item(sub_item))
    }
}

impl From<Value> for PermissionMap {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl Serialize for PermissionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, p) in &self.entries {
            map.serialize_entry(k, p)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, ModulePermission)> for PermissionMap {
    fn from_iter<T: IntoIterator<Item = (K, ModulePermission)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, p) in iter {
            map.insert(k, p);
        }
        map
    }
}
