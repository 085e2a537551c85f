//! Tiered resolution of visible modules.
//!
//! Exactly one tier produces the output; the first tier yielding at least one
//! module wins and later tiers are not consulted:
//!
//! 1. role assignment (`userType.sidebarModules`, constrained by the company allowlist)
//! 2. company allowlist (`company.allowedModules`)
//! 3. permission map (`permissions.modules`)
//! 4. the registry's fallback module
//!
//! Any catastrophic failure degrades to the fallback module with no sub-items.

use std::collections::HashSet;

use serde::Serialize;

use deskgate_auth::{PermissionMap, SidebarAssignment, UserContext};
use deskgate_core::{NavigationError, NavigationResult, SubItemId};

use crate::decode::{CompanyAllowlist, decode_with};
use crate::registry::{ModuleDescriptor, ModuleRegistry, ResolvedModule};
use crate::rules::{RuleContext, RuleError};
use crate::visibility::{SubItemFilter, filter_sub_items, narrow_module};

/// Which source produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    RoleAssignment,
    CompanyAllowlist,
    PermissionMap,
    Fallback,
    /// Resolution failed; only the fallback module, without sub-items.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub tier: ResolutionTier,
    pub modules: Vec<ResolvedModule>,
}

impl Resolution {
    fn new(tier: ResolutionTier, modules: Vec<ResolvedModule>) -> Self {
        Self { tier, modules }
    }

    pub fn module_ids(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id.as_str()).collect()
    }
}

/// Modules (with narrowed sub-items) the user may see, in display order.
///
/// Never fails; see [`resolve_with_trace`] for which tier was used.
pub fn resolve_visible_modules(ctx: &UserContext, registry: &ModuleRegistry) -> Vec<ResolvedModule> {
    resolve_with_trace(ctx, registry).modules
}

pub fn resolve_with_trace(ctx: &UserContext, registry: &ModuleRegistry) -> Resolution {
    let resolution = match try_resolve(ctx, registry) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::error!(error = %err, "navigation resolution failed; degrading to fallback module");
            Resolution::new(ResolutionTier::Degraded, fallback(registry, SubItemFilter::None))
        }
    };

    tracing::debug!(
        principal = ?ctx.principal_id,
        tier = ?resolution.tier,
        modules = resolution.modules.len(),
        "navigation resolved"
    );
    resolution
}

fn try_resolve(ctx: &UserContext, registry: &ModuleRegistry) -> NavigationResult<Resolution> {
    if registry.is_empty() {
        return Err(NavigationError::catastrophic("module registry is empty"));
    }

    let company = CompanyAllowlist::decode(ctx, registry);
    let rules = RuleContext::new(ctx, &company);

    let modules = role_assignment_tier(ctx, registry, &company, &rules)?;
    if !modules.is_empty() {
        return Ok(Resolution::new(ResolutionTier::RoleAssignment, modules));
    }

    let modules = company_allowlist_tier(registry, &company, &rules)?;
    if !modules.is_empty() {
        return Ok(Resolution::new(ResolutionTier::CompanyAllowlist, modules));
    }

    if let Some(map) = ctx.permission_map() {
        let modules = permission_map_tier(registry, map, &rules)?;
        if !modules.is_empty() {
            return Ok(Resolution::new(ResolutionTier::PermissionMap, modules));
        }
    }

    Ok(Resolution::new(
        ResolutionTier::Fallback,
        fallback(registry, SubItemFilter::All),
    ))
}

/// Evaluate a module's visibility rule. Rule failures hide only that module.
fn is_visible(
    module: &ModuleDescriptor,
    registry: &ModuleRegistry,
    rules: &RuleContext<'_>,
) -> NavigationResult<bool> {
    let Some(rule) = &module.custom_visibility else {
        return Ok(true);
    };

    match registry.strategy().evaluate(rule, rules) {
        Ok(visible) => Ok(visible),
        Err(RuleError::Failed(reason)) => {
            let err = NavigationError::predicate(module.id.as_str(), reason);
            tracing::warn!(error = %err, "module hidden");
            Ok(false)
        }
        Err(RuleError::Unavailable(reason)) => Err(NavigationError::catastrophic(reason)),
    }
}

fn skip_unknown(raw: &str) {
    let err = NavigationError::unknown(raw);
    tracing::debug!(error = %err, "entry skipped");
}

fn role_assignment_tier(
    ctx: &UserContext,
    registry: &ModuleRegistry,
    company: &CompanyAllowlist,
    rules: &RuleContext<'_>,
) -> NavigationResult<Vec<ResolvedModule>> {
    let entries = decode_with(
        ctx.sidebar_modules_raw(),
        "userType.sidebarModules",
        SidebarAssignment::from_value,
    );

    let mut seen: HashSet<&str> = HashSet::new();
    let mut picked: Vec<(&ModuleDescriptor, Vec<SubItemId>)> = Vec::new();

    for entry in entries.iter().filter(|e| e.enabled) {
        let raw = entry.module_id.as_str();

        // A non-empty company allowlist caps what a role can grant.
        if !company.is_empty() && !company.accepts(raw) && !company.accepts(&registry.normalize(raw)) {
            tracing::debug!(module = raw, "role-assigned module not in company allowlist");
            continue;
        }

        let Some(module) = registry.lookup(raw) else {
            skip_unknown(raw);
            continue;
        };
        if seen.contains(module.id.as_str()) || !is_visible(module, registry, rules)? {
            continue;
        }
        seen.insert(module.id.as_str());

        let allowlist = entry
            .items
            .iter()
            .filter(|id| module.has_sub_item(id))
            .map(|id| SubItemId::from(id.clone()))
            .collect();
        picked.push((module, allowlist));
    }

    // Stable: ties keep encounter order.
    picked.sort_by_key(|(module, _)| !module.is_active());

    Ok(picked
        .iter()
        .map(|(module, allowlist)| narrow_module(module, SubItemFilter::Allowlist(allowlist)))
        .collect())
}

fn company_allowlist_tier(
    registry: &ModuleRegistry,
    company: &CompanyAllowlist,
    rules: &RuleContext<'_>,
) -> NavigationResult<Vec<ResolvedModule>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut modules = Vec::new();

    for raw in company.ids() {
        let Some(module) = registry.lookup(raw) else {
            skip_unknown(raw);
            continue;
        };
        if seen.contains(module.id.as_str()) || !is_visible(module, registry, rules)? {
            continue;
        }
        seen.insert(module.id.as_str());
        modules.push(narrow_module(module, SubItemFilter::All));
    }

    Ok(modules)
}

fn permission_map_tier(
    registry: &ModuleRegistry,
    map: &PermissionMap,
    rules: &RuleContext<'_>,
) -> NavigationResult<Vec<ResolvedModule>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut modules = Vec::new();

    for key in map.keys() {
        let Some(module) = registry.lookup(key) else {
            skip_unknown(key);
            continue;
        };
        if !map.has_module(key) || seen.contains(module.id.as_str()) {
            continue;
        }
        if !is_visible(module, registry, rules)? {
            continue;
        }

        let sub_items = filter_sub_items(module, SubItemFilter::Permissions { map, key });
        if sub_items.is_empty() && !module.sub_items.is_empty() {
            continue;
        }

        seen.insert(module.id.as_str());
        modules.push(ResolvedModule {
            sub_items,
            ..module.clone()
        });
    }

    Ok(modules)
}

fn fallback(registry: &ModuleRegistry, filter: SubItemFilter<'_>) -> Vec<ResolvedModule> {
    let id = registry.fallback_module_id();
    match registry.get(id.as_str()) {
        Some(module) => vec![narrow_module(module, filter)],
        None => {
            tracing::warn!(module = %id, "fallback module missing from registry");
            Vec::new()
        }
    }
}
