//! `deskgate-navigation` — decides which navigation modules a user may see.
//!
//! Three independent authorization sources are reconciled in strict tier
//! order (role assignment, company allowlist, permission map, fallback).
//! Resolution is a pure, synchronous function of a [`UserContext`] and a
//! [`ModuleRegistry`] snapshot; callers re-invoke it when either changes
//! (see [`NavigationMemo`]).

pub mod badges;
pub mod config;
pub mod decode;
pub mod memo;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod visibility;

pub use badges::{APPROVAL_BADGE_PATHS, BadgeError, BadgeSource, apply_badges, collect_badges};
pub use config::NavigationConfig;
pub use decode::{CompanyAllowlist, MAX_DECODE_PASSES, decode_list};
pub use memo::NavigationMemo;
pub use registry::{
    ModuleDescriptor, ModuleRegistry, ModuleStatus, RegistryCatalog, ResolvedModule,
    SubItemDescriptor,
};
pub use resolver::{Resolution, ResolutionTier, resolve_visible_modules, resolve_with_trace};
pub use rules::{RuleContext, RuleError, RuleTable, StandardRules, VisibilityRule, VisibilityStrategy};
pub use visibility::{SubItemFilter, filter_sub_items, narrow_module};

pub use deskgate_auth::UserContext;
