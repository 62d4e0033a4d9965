//! Graph client types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the post being shared.
///
/// The resolver returns it either as a JSON string or a number; both are
/// normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a post id from the resolver's `id` field.
    ///
    /// Empty strings, `null`, booleans and structured values count as absent.
    pub(crate) fn from_resolver_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body returned by the resolver endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResolveResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl ResolveResponse {
    pub fn post_id(&self) -> Option<PostId> {
        self.id.as_ref().and_then(PostId::from_resolver_value)
    }
}
