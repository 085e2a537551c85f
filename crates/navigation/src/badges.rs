//! Badge counts for sub-items (display only).
//!
//! Counts come from an external source and never influence which modules are
//! visible. Each path is fetched independently; a failing path is simply
//! left without a badge.

use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;

use crate::registry::ResolvedModule;

/// Sub-item paths of the approval workflow that carry pending-count badges.
pub const APPROVAL_BADGE_PATHS: [&str; 3] = [
    "/approvals/pending",
    "/approvals/my-requests",
    "/approvals/history",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BadgeError {
    #[error("badge request for '{path}' failed: {reason}")]
    Request { path: String, reason: String },

    #[error("unexpected badge payload for '{0}'")]
    Payload(String),
}

/// Source of badge counts keyed by sub-item path.
pub trait BadgeSource {
    fn count(&self, path: &str) -> impl Future<Output = Result<u32, BadgeError>> + Send;
}

/// Fetch counts for `paths`; failures are logged and omitted.
pub async fn collect_badges<S: BadgeSource>(source: &S, paths: &[&str]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for &path in paths {
        match source.count(path).await {
            Ok(count) => {
                counts.insert(path.to_string(), count);
            }
            Err(err) => tracing::warn!(error = %err, path, "badge count unavailable"),
        }
    }
    counts
}

/// Copy counts onto matching sub-items by path. Zero counts clear the badge.
pub fn apply_badges(modules: &mut [ResolvedModule], counts: &BTreeMap<String, u32>) {
    for sub_item in modules.iter_mut().flat_map(|m| m.sub_items.iter_mut()) {
        if let Some(&count) = counts.get(&sub_item.path) {
            sub_item.badge = (count > 0).then_some(count);
        }
    }
}
