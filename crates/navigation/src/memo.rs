//! Recompute-on-change wrapper around [`resolve_with_trace`].

use deskgate_auth::UserContext;

use crate::registry::ModuleRegistry;
use crate::resolver::{Resolution, resolve_with_trace};

/// Caches the last resolution and recomputes only when the context changes.
///
/// The engine holds no subscriptions: callers pass the current context on
/// every read and call [`invalidate`](Self::invalidate) when the registry
/// itself is replaced.
#[derive(Debug, Default)]
pub struct NavigationMemo {
    last: Option<(UserContext, Resolution)>,
    recomputations: u64,
}

impl NavigationMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, ctx: &UserContext, registry: &ModuleRegistry) -> &Resolution {
        if self.last.as_ref().is_some_and(|(cached, _)| cached != ctx) {
            self.last = None;
        }

        let recomputations = &mut self.recomputations;
        let (_, resolution) = self.last.get_or_insert_with(|| {
            *recomputations += 1;
            (ctx.clone(), resolve_with_trace(ctx, registry))
        });
        resolution
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleDescriptor;
    use serde_json::json;

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new(vec![
            ModuleDescriptor::new("my-desk", "My Desk", "/"),
            ModuleDescriptor::new("finance", "Finance", "/finance"),
        ])
        .unwrap()
    }

    #[test]
    fn unchanged_context_is_not_recomputed() {
        let registry = registry();
        let ctx = UserContext::new().with_company_modules(json!(["finance"]));
        let mut memo = NavigationMemo::new();

        memo.resolve(&ctx, &registry);
        memo.resolve(&ctx, &registry);
        assert_eq!(memo.recomputations(), 1);
    }

    #[test]
    fn changed_permissions_trigger_recompute() {
        let registry = registry();
        let mut memo = NavigationMemo::new();

        let before = memo.resolve(&UserContext::new(), &registry).module_ids().join(",");
        let ctx = UserContext::new().with_company_modules(json!(["finance"]));
        let after = memo.resolve(&ctx, &registry).module_ids().join(",");

        assert_eq!(before, "my-desk");
        assert_eq!(after, "finance");
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let registry = registry();
        let ctx = UserContext::new();
        let mut memo = NavigationMemo::new();

        memo.resolve(&ctx, &registry);
        memo.invalidate();
        memo.resolve(&ctx, &registry);
        assert_eq!(memo.recomputations(), 2);
    }
}
