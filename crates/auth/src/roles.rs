use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One role-assigned sidebar entry (`userType.sidebarModules[n]`).
///
/// `items` restricts which sub-items of the module are visible; an empty list
/// means "all sub-items".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarAssignment {
    #[serde(alias = "moduleId")]
    pub module_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, alias = "sub_items", alias = "subItems")]
    pub items: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl SidebarAssignment {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            enabled: true,
            items: Vec::new(),
        }
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Lenient decoding of one decoded sidebar entry.
    ///
    /// Returns `None` for non-objects and for a missing or empty module id.
    /// Only a literal `false` disables an entry; any other `enabled` value
    /// (or none) keeps it. Non-string item ids are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let module_id = obj
            .get("module_id")
            .or_else(|| obj.get("moduleId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())?
            .to_string();

        let enabled = obj.get("enabled") != Some(&Value::Bool(false));

        let items = obj
            .get("items")
            .or_else(|| obj.get("sub_items"))
            .or_else(|| obj.get("subItems"))
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            module_id,
            enabled,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_snake_and_camel_case_ids() {
        let a = SidebarAssignment::from_value(&json!({ "module_id": "finance" })).unwrap();
        let b = SidebarAssignment::from_value(&json!({ "moduleId": "finance" })).unwrap();
        assert_eq!(a, b);
        assert!(a.enabled);
        assert!(a.items.is_empty());
    }

    #[test]
    fn only_literal_false_disables() {
        let off = SidebarAssignment::from_value(&json!({ "module_id": "hr", "enabled": false })).unwrap();
        let odd = SidebarAssignment::from_value(&json!({ "module_id": "hr", "enabled": 0 })).unwrap();
        assert!(!off.enabled);
        assert!(odd.enabled);
    }

    #[test]
    fn whitespace_module_id_is_kept_verbatim() {
        let entry = SidebarAssignment::from_value(&json!({ "module_id": " " })).unwrap();
        assert_eq!(entry.module_id, " ");
    }

    #[test]
    fn sub_items_alias_is_read() {
        let entry = SidebarAssignment::from_value(&json!({
            "module_id": "finance",
            "sub_items": ["budgets", 3, "transactions"],
        }))
        .unwrap();
        assert_eq!(entry.items, vec!["budgets", "transactions"]);
    }

    #[test]
    fn rejects_entries_without_module_id() {
        assert!(SidebarAssignment::from_value(&json!({ "enabled": true })).is_none());
        assert!(SidebarAssignment::from_value(&json!({ "module_id": "" })).is_none());
        assert!(SidebarAssignment::from_value(&json!({ "module_id": 7 })).is_none());
        assert!(SidebarAssignment::from_value(&json!("finance")).is_none());
    }
}
