//! Navigation error model.

use thiserror::Error;

/// Result type used across the navigation layer.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Navigation-level error.
///
/// Only `DuplicateModule` and `InvalidCatalog` ever reach a caller (when
/// building a registry).
/// Everything else is recovered inside the resolution call: decode failures
/// become empty lists, unknown identifiers are skipped, predicate failures
/// hide a single module and catastrophic failures degrade to the fallback
/// module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// An authorization source field held malformed or unexpected JSON.
    #[error("decode failure in '{field}': {reason}")]
    Decode { field: &'static str, reason: String },

    /// A module identifier had no registry match after alias and suffix resolution.
    #[error("unknown module identifier: {0}")]
    UnknownIdentifier(String),

    /// A module's visibility rule could not be evaluated.
    #[error("visibility rule failed for module '{module}': {reason}")]
    Predicate { module: String, reason: String },

    /// The registry catalog declared the same module id twice.
    #[error("duplicate module id in registry: {0}")]
    DuplicateModule(String),

    /// The registry catalog could not be parsed.
    #[error("invalid registry catalog: {0}")]
    InvalidCatalog(String),

    /// The resolution call as a whole could not complete.
    #[error("resolution failed: {0}")]
    Catastrophic(String),
}

impl NavigationError {
    pub fn decode(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            field,
            reason: reason.into(),
        }
    }

    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownIdentifier(id.into())
    }

    pub fn predicate(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Predicate {
            module: module.into(),
            reason: reason.into(),
        }
    }

    pub fn catastrophic(msg: impl Into<String>) -> Self {
        Self::Catastrophic(msg.into())
    }

    /// Whether this error aborts the whole resolution call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Catastrophic(_))
    }
}
