//! Principal lists as persisted JSON text.
//!
//! Principal lists are stored as a JSON array of strings
//! (`["team-a","team-b"]`). Some writers double-encode the column, so the
//! stored text is a JSON string whose content is the array
//! (`"[\"team-a\"]"`). Lists are decoded at evaluation time and any decoding
//! problem degrades to an empty list.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Resolved team ids of the caller.
pub type TeamIds = HashSet<String>;

/// Raw persisted principal list (team ids or user ids).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalList(Option<String>);

impl PrincipalList {
    /// A missing (NULL) list.
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps stored JSON text verbatim. Nothing is validated here.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self(Some(json.into()))
    }

    /// Encodes the given ids as a plain JSON array.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = ids
            .into_iter()
            .map(|id| serde_json::Value::String(id.into()))
            .collect();
        Self(Some(serde_json::Value::Array(values).to_string()))
    }

    /// The stored JSON text, if any.
    pub fn json(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True for NULL, empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        self.0.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    /// Decoded entries; empty on any decoding problem.
    pub fn entries(&self) -> Vec<String> {
        decode_principal_list(self.json())
    }
}

impl From<Option<String>> for PrincipalList {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

/// Decodes a principal list, tolerating one level of double-encoding.
///
/// Returns an empty list for NULL, blank or malformed input. Order,
/// duplicates and empty strings inside a valid array are preserved.
pub fn decode_principal_list(json: Option<&str>) -> Vec<String> {
    let Some(raw) = json.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    match decode_unwrapping_once::<Vec<String>>(raw) {
        Some(list) => list,
        None => {
            tracing::warn!(json = raw, "failed to deserialize principal list");
            Vec::new()
        }
    }
}

/// Parses `raw` as `T`; if that fails and `raw` is a JSON string literal,
/// parses the string's content as `T` instead.
fn decode_unwrapping_once<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(raw) {
        return Some(value);
    }
    let inner = serde_json::from_str::<String>(raw).ok()?;
    serde_json::from_str::<T>(&inner).ok()
}
