//! Source decoding for string-encoded authorization fields.
//!
//! Upstream data sometimes arrives as a JSON string containing the list, and
//! sometimes as a JSON string containing *that* string. Decoding is bounded
//! to [`MAX_DECODE_PASSES`]; this is a workaround for the double-encoding
//! defect, not a general decoder.
// TODO: drop the second pass once user-type records are re-saved as plain arrays.

use std::collections::HashSet;

use serde_json::Value;

use deskgate_auth::UserContext;
use deskgate_core::NavigationError;

use crate::registry::ModuleRegistry;

pub const MAX_DECODE_PASSES: usize = 2;

/// Extract a list from a raw field. Never fails: anything unusable is empty.
///
/// Element shapes are not checked; see [`decode_with`].
pub fn decode_list(raw: Option<&Value>, field: &'static str) -> Vec<Value> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(encoded)) => match decode_str(encoded, field) {
            Ok(items) => items,
            Err(err) => {
                tracing::debug!(error = %err, "authorization source ignored");
                Vec::new()
            }
        },
        Some(_) => {
            let err = NavigationError::decode(field, "expected a list or an encoded list");
            tracing::debug!(error = %err, "authorization source ignored");
            Vec::new()
        }
    }
}

/// Decode a list and keep the elements `parse` accepts, in order.
pub fn decode_with<T>(
    raw: Option<&Value>,
    field: &'static str,
    parse: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
    decode_list(raw, field).iter().filter_map(parse).collect()
}

fn decode_str(encoded: &str, field: &'static str) -> Result<Vec<Value>, NavigationError> {
    let mut value = Value::String(encoded.to_string());
    for _ in 0..MAX_DECODE_PASSES {
        let Value::String(text) = &value else {
            break;
        };
        value = serde_json::from_str(text).map_err(|e| NavigationError::decode(field, e.to_string()))?;
    }

    match value {
        Value::Array(items) => Ok(items),
        other => Err(NavigationError::decode(
            field,
            format!("decoded to {} instead of a list", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Decoded `company.allowedModules`.
///
/// `ids` keeps the usable (non-empty string) entries in order; membership
/// checks accept either the raw or the normalized form of each entry.
/// Emptiness follows the decoded list, so `[42, null]` is a non-empty
/// allowlist that accepts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyAllowlist {
    ids: Vec<String>,
    accepted: HashSet<String>,
    decoded_len: usize,
}

impl CompanyAllowlist {
    pub fn decode(ctx: &UserContext, registry: &ModuleRegistry) -> Self {
        let decoded = decode_list(ctx.allowed_modules_raw(), "company.allowedModules");
        let ids: Vec<String> = decoded
            .iter()
            .filter_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
            .collect();

        let mut accepted = HashSet::with_capacity(ids.len() * 2);
        for id in &ids {
            accepted.insert(registry.normalize(id));
            accepted.insert(id.clone());
        }

        Self {
            ids,
            accepted,
            decoded_len: decoded.len(),
        }
    }

    /// Allowlist taken verbatim, without alias normalization.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let accepted = ids.iter().cloned().collect();
        Self {
            decoded_len: ids.len(),
            ids,
            accepted,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// No company restriction: the decoded list had no entries at all.
    pub fn is_empty(&self) -> bool {
        self.decoded_len == 0
    }

    pub fn accepts(&self, id: &str) -> bool {
        self.accepted.contains(id)
    }
}
