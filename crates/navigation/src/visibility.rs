//! Sub-item filtering for resolved modules.

use deskgate_auth::PermissionMap;
use deskgate_core::SubItemId;

use crate::registry::{ModuleDescriptor, ResolvedModule, SubItemDescriptor};

/// What decides which sub-items of a module survive.
#[derive(Debug, Clone, Copy)]
pub enum SubItemFilter<'a> {
    /// Every registry sub-item.
    All,
    /// Registry sub-items listed here; an empty allowlist keeps all.
    Allowlist(&'a [SubItemId]),
    /// Sub-items the capability map grants under `key`.
    Permissions { map: &'a PermissionMap, key: &'a str },
    /// No sub-items.
    None,
}

/// Registry sub-items of `module` passing `filter`, in registry order.
///
/// A module without sub-items always yields an empty list, never an error.
pub fn filter_sub_items(module: &ModuleDescriptor, filter: SubItemFilter<'_>) -> Vec<SubItemDescriptor> {
    match filter {
        SubItemFilter::All => module.sub_items.clone(),
        SubItemFilter::Allowlist([]) => module.sub_items.clone(),
        SubItemFilter::Allowlist(allowed) => module
            .sub_items
            .iter()
            .filter(|s| allowed.contains(&s.id))
            .cloned()
            .collect(),
        SubItemFilter::Permissions { map, key } => module
            .sub_items
            .iter()
            .filter(|s| map.allows_sub_item(key, s.id.as_str()))
            .cloned()
            .collect(),
        SubItemFilter::None => Vec::new(),
    }
}

/// Copy of `module` with its sub-items narrowed by `filter`.
pub fn narrow_module(module: &ModuleDescriptor, filter: SubItemFilter<'_>) -> ResolvedModule {
    ResolvedModule {
        sub_items: filter_sub_items(module, filter),
        ..module.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskgate_auth::ModulePermission;

    fn finance() -> ModuleDescriptor {
        ModuleDescriptor::new("finance", "Finance", "/finance").with_sub_items(vec![
            SubItemDescriptor::new("a", "A", "/finance/a"),
            SubItemDescriptor::new("b", "B", "/finance/b"),
            SubItemDescriptor::new("c", "C", "/finance/c"),
        ])
    }

    fn ids(items: &[SubItemDescriptor]) -> Vec<&str> {
        items.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn allowlist_narrows_in_registry_order() {
        let allow = [SubItemId::from("c"), SubItemId::from("a")];
        let items = filter_sub_items(&finance(), SubItemFilter::Allowlist(&allow));
        assert_eq!(ids(&items), vec!["a", "c"]);
    }

    #[test]
    fn allowlist_of_b_yields_exactly_b() {
        let allow = [SubItemId::from("b")];
        let items = filter_sub_items(&finance(), SubItemFilter::Allowlist(&allow));
        assert_eq!(ids(&items), vec!["b"]);
    }

    #[test]
    fn empty_allowlist_keeps_everything() {
        let items = filter_sub_items(&finance(), SubItemFilter::Allowlist(&[]));
        assert_eq!(ids(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn permissions_filter_uses_the_given_key() {
        let map: PermissionMap = [("finance-desk", ModulePermission::with_items(["b", "c"]))]
            .into_iter()
            .collect();

        let items = filter_sub_items(
            &finance(),
            SubItemFilter::Permissions { map: &map, key: "finance-desk" },
        );
        assert_eq!(ids(&items), vec!["b", "c"]);
    }

    #[test]
    fn narrowing_leaves_the_registry_untouched() {
        let module = finance();
        let narrowed = narrow_module(&module, SubItemFilter::None);

        assert!(narrowed.sub_items.is_empty());
        assert_eq!(narrowed.id, module.id);
        assert_eq!(module.sub_items.len(), 3);
    }
}
