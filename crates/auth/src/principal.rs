use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::PermissionMap;

/// Identity of the authenticated user a navigation is resolved for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Company-level data; `allowed_modules` is kept raw for the source decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub allowed_modules: Value,
}

/// User-type (role) data; `sidebar_modules` is kept raw for the source decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sidebar_modules: Value,
}

/// Capability data (`permissions`), decoded eagerly since it is never string-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub modules: PermissionMap,
}

/// Everything known about the user for one resolution call.
///
/// Deserialization never fails on shape: fields of the wrong type are treated
/// as absent, and the raw authorization fields are left for the navigation
/// crate to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<PrincipalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserTypeProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
}

fn field<'a>(obj: &'a serde_json::Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    obj.get(camel).or_else(|| obj.get(snake))
}

fn name_of(obj: &serde_json::Map<String, Value>) -> Option<String> {
    obj.get("name").and_then(Value::as_str).map(str::to_string)
}

impl From<Value> for UserContext {
    fn from(value: Value) -> Self {
        let Value::Object(root) = value else {
            tracing::debug!("user context is not an object; treating as empty");
            return Self::default();
        };

        let principal_id = field(&root, "principalId", "principal_id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());

        let company = root
            .get("company")
            .and_then(Value::as_object)
            .map(|obj| CompanyProfile {
                name: name_of(obj),
                allowed_modules: field(obj, "allowedModules", "allowed_modules")
                    .cloned()
                    .unwrap_or(Value::Null),
            });

        let user_type = field(&root, "userType", "user_type")
            .and_then(Value::as_object)
            .map(|obj| UserTypeProfile {
                name: name_of(obj),
                sidebar_modules: field(obj, "sidebarModules", "sidebar_modules")
                    .cloned()
                    .unwrap_or(Value::Null),
            });

        let permissions = root
            .get("permissions")
            .and_then(Value::as_object)
            .map(|obj| PermissionSet {
                modules: obj
                    .get("modules")
                    .map(PermissionMap::from_value)
                    .unwrap_or_default(),
            });

        Self {
            principal_id,
            company,
            user_type,
            permissions,
        }
    }
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal_id: PrincipalId) -> Self {
        self.principal_id = Some(principal_id);
        self
    }

    pub fn with_company_modules(mut self, allowed_modules: Value) -> Self {
        self.company.get_or_insert_with(CompanyProfile::default).allowed_modules = allowed_modules;
        self
    }

    pub fn with_sidebar_modules(mut self, sidebar_modules: Value) -> Self {
        self.user_type
            .get_or_insert_with(UserTypeProfile::default)
            .sidebar_modules = sidebar_modules;
        self
    }

    pub fn with_user_type_name(mut self, name: impl Into<String>) -> Self {
        self.user_type.get_or_insert_with(UserTypeProfile::default).name = Some(name.into());
        self
    }

    pub fn with_permissions(mut self, modules: PermissionMap) -> Self {
        self.permissions = Some(PermissionSet { modules });
        self
    }

    pub fn allowed_modules_raw(&self) -> Option<&Value> {
        self.company.as_ref().map(|c| &c.allowed_modules)
    }

    pub fn sidebar_modules_raw(&self) -> Option<&Value> {
        self.user_type.as_ref().map(|u| &u.sidebar_modules)
    }

    pub fn user_type_name(&self) -> Option<&str> {
        self.user_type.as_ref().and_then(|u| u.name.as_deref())
    }

    pub fn permission_map(&self) -> Option<&PermissionMap> {
        self.permissions.as_ref().map(|p| &p.modules)
    }

    /// Capability check; `false` when the user has no permission data at all.
    pub fn has_module(&self, module: &str) -> bool {
        self.permission_map().is_some_and(|m| m.has_module(module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_context() {
        let ctx: UserContext = serde_json::from_value(json!({
            "company": { "name": "Acme", "allowedModules": ["finance"] },
            "userType": { "name": "accountant", "sidebarModules": "[]" },
            "permissions": { "modules": { "finance": true } },
        }))
        .unwrap();

        assert_eq!(ctx.allowed_modules_raw(), Some(&json!(["finance"])));
        assert_eq!(ctx.sidebar_modules_raw(), Some(&json!("[]")));
        assert_eq!(ctx.user_type_name(), Some("accountant"));
        assert!(ctx.has_module("finance"));
    }

    #[test]
    fn parses_snake_case_context() {
        let ctx: UserContext = serde_json::from_value(json!({
            "company": { "allowed_modules": ["hr"] },
            "user_type": { "sidebar_modules": [{ "module_id": "hr" }] },
        }))
        .unwrap();

        assert_eq!(ctx.allowed_modules_raw(), Some(&json!(["hr"])));
        assert!(ctx.sidebar_modules_raw().is_some_and(Value::is_array));
        assert!(ctx.permissions.is_none());
    }

    #[test]
    fn wrong_shapes_are_treated_as_absent() {
        let ctx: UserContext = serde_json::from_value(json!({
            "company": "acme",
            "userType": 12,
            "permissions": { "modules": "oops" },
        }))
        .unwrap();

        assert!(ctx.company.is_none());
        assert!(ctx.user_type.is_none());
        assert!(ctx.permission_map().is_some_and(PermissionMap::is_empty));
        assert!(!ctx.has_module("finance"));

        let empty: UserContext = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(empty, UserContext::default());
    }

    #[test]
    fn builders_fill_missing_profiles() {
        let ctx = UserContext::new()
            .with_sidebar_modules(json!([]))
            .with_user_type_name("manager")
            .with_company_modules(json!(["finance"]));

        assert_eq!(ctx.user_type_name(), Some("manager"));
        assert_eq!(ctx.allowed_modules_raw(), Some(&json!(["finance"])));
    }
}
