//! Per-module visibility rules.
//!
//! A module's `customVisibility` is data, not code: a [`VisibilityRule`]
//! evaluated by the registry's [`VisibilityStrategy`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deskgate_auth::UserContext;

use crate::decode::CompanyAllowlist;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum VisibilityRule {
    Always,
    Never,
    /// The capability map grants `module`.
    HasCapability { module: String },
    /// The company allowlist names `module` (raw or normalized).
    CompanyAllows { module: String },
    /// The user type's name is one of `names`.
    UserTypeIn { names: Vec<String> },
    AllOf { rules: Vec<VisibilityRule> },
    AnyOf { rules: Vec<VisibilityRule> },
    /// Application-specific rule resolved by the strategy.
    Named { name: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule could not be evaluated for this user; the module is hidden.
    #[error("rule evaluation failed: {0}")]
    Failed(String),

    /// The strategy itself is unusable; resolution degrades to the fallback.
    #[error("visibility strategy unavailable: {0}")]
    Unavailable(String),
}

/// Inputs a rule may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub user: &'a UserContext,
    pub company: &'a CompanyAllowlist,
}

impl<'a> RuleContext<'a> {
    pub fn new(user: &'a UserContext, company: &'a CompanyAllowlist) -> Self {
        Self { user, company }
    }
}

/// Evaluates visibility rules.
///
/// Implementors normally override only [`evaluate_named`](Self::evaluate_named);
/// the structural variants are handled by the provided `evaluate`.
pub trait VisibilityStrategy: fmt::Debug + Send + Sync {
    fn evaluate_named(&self, name: &str, ctx: &RuleContext<'_>) -> Result<bool, RuleError>;

    fn evaluate(&self, rule: &VisibilityRule, ctx: &RuleContext<'_>) -> Result<bool, RuleError> {
        match rule {
            VisibilityRule::Always => Ok(true),
            VisibilityRule::Never => Ok(false),
            VisibilityRule::HasCapability { module } => Ok(ctx.user.has_module(module)),
            VisibilityRule::CompanyAllows { module } => Ok(ctx.company.accepts(module)),
            VisibilityRule::UserTypeIn { names } => Ok(ctx
                .user
                .user_type_name()
                .is_some_and(|name| names.iter().any(|n| n == name))),
            VisibilityRule::AllOf { rules } => {
                for r in rules {
                    if !self.evaluate(r, ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            VisibilityRule::AnyOf { rules } => {
                for r in rules {
                    if self.evaluate(r, ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            VisibilityRule::Named { name } => self.evaluate_named(name, ctx),
        }
    }
}

/// Strategy with no named rules; any `named` rule fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl VisibilityStrategy for StandardRules {
    fn evaluate_named(&self, name: &str, _ctx: &RuleContext<'_>) -> Result<bool, RuleError> {
        Err(RuleError::Failed(format!("unknown rule '{name}'")))
    }
}

pub type NamedPredicate = fn(&RuleContext<'_>) -> bool;

/// Strategy backed by a table of named predicates.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    predicates: HashMap<String, NamedPredicate>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, name: impl Into<String>, predicate: NamedPredicate) -> Self {
        self.predicates.insert(name.into(), predicate);
        self
    }
}

impl VisibilityStrategy for RuleTable {
    fn evaluate_named(&self, name: &str, ctx: &RuleContext<'_>) -> Result<bool, RuleError> {
        self.predicates
            .get(name)
            .map(|predicate| predicate(ctx))
            .ok_or_else(|| RuleError::Failed(format!("unknown rule '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskgate_auth::{ModulePermission, PermissionMap};
    use serde_json::json;

    fn user() -> UserContext {
        UserContext::new()
            .with_user_type_name("accountant")
            .with_permissions([("finance", ModulePermission::granted())].into_iter().collect::<PermissionMap>())
    }

    #[test]
    fn structural_rules_evaluate_against_context() {
        let user = user();
        let company = CompanyAllowlist::from_ids(["hr"]);
        let ctx = RuleContext::new(&user, &company);
        let rules = StandardRules;

        let has_finance = VisibilityRule::HasCapability { module: "finance".into() };
        let company_hr = VisibilityRule::CompanyAllows { module: "hr".into() };
        let accountants = VisibilityRule::UserTypeIn { names: vec!["accountant".into()] };

        assert_eq!(rules.evaluate(&has_finance, &ctx), Ok(true));
        assert_eq!(rules.evaluate(&company_hr, &ctx), Ok(true));
        assert_eq!(rules.evaluate(&accountants, &ctx), Ok(true));
        assert_eq!(
            rules.evaluate(
                &VisibilityRule::AllOf { rules: vec![has_finance.clone(), VisibilityRule::Never] },
                &ctx
            ),
            Ok(false)
        );
        assert_eq!(
            rules.evaluate(
                &VisibilityRule::AnyOf { rules: vec![VisibilityRule::Never, accountants] },
                &ctx
            ),
            Ok(true)
        );
    }

    #[test]
    fn unknown_named_rule_fails() {
        let user = user();
        let company = CompanyAllowlist::default();
        let ctx = RuleContext::new(&user, &company);

        let err = StandardRules
            .evaluate(&VisibilityRule::Named { name: "beta".into() }, &ctx)
            .unwrap_err();
        assert!(matches!(err, RuleError::Failed(_)));
    }

    #[test]
    fn rule_table_resolves_named_rules() {
        let user = user();
        let company = CompanyAllowlist::default();
        let ctx = RuleContext::new(&user, &company);
        let table = RuleTable::new().with_rule("accountants_only", |ctx| {
            ctx.user.user_type_name() == Some("accountant")
        });

        assert_eq!(
            table.evaluate(&VisibilityRule::Named { name: "accountants_only".into() }, &ctx),
            Ok(true)
        );
    }

    #[test]
    fn rules_serialize_with_tag() {
        let rule: VisibilityRule =
            serde_json::from_value(json!({ "rule": "user_type_in", "names": ["admin"] })).unwrap();
        assert_eq!(rule, VisibilityRule::UserTypeIn { names: vec!["admin".into()] });
    }
}
