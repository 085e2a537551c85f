//! Identifier normalization: legacy and aliased ids → canonical ids.

use crate::registry::{ModuleDescriptor, ModuleRegistry};

impl ModuleRegistry {
    /// Map a raw identifier to its canonical form.
    ///
    /// Alias table first; then a legacy suffix is stripped if the remainder
    /// is a registry id; otherwise `raw` is returned unchanged (it may still
    /// be unknown, in which case later lookups drop it).
    pub fn normalize(&self, raw: &str) -> String {
        if let Some(canonical) = self.alias(raw) {
            return canonical.to_string();
        }
        match self.strip_legacy_suffix(raw) {
            Some(stripped) => stripped.to_string(),
            None => raw.to_string(),
        }
    }

    /// `raw` without its legacy suffix, if the stripped id is registered.
    pub fn strip_legacy_suffix<'a>(&self, raw: &'a str) -> Option<&'a str> {
        self.legacy_suffixes()
            .iter()
            .filter_map(|suffix| raw.strip_suffix(suffix.as_str()))
            .find(|stripped| !stripped.is_empty() && self.contains(stripped))
    }

    /// Three-step lookup: raw id, normalized id, then suffix-stripped id.
    pub fn lookup(&self, raw: &str) -> Option<&ModuleDescriptor> {
        self.get(raw)
            .or_else(|| self.get(&self.normalize(raw)))
            .or_else(|| self.strip_legacy_suffix(raw).and_then(|id| self.get(id)))
    }
}
