//! Authenticated caller identity

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identity of the authenticated caller.
///
/// Built once per request from verified claim material and carried on the
/// execution context; immutable for the lifetime of the request. `id` and
/// `identity_type` are fixed fields, everything else the verifier supplied
/// lives in the open `claims` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub identity_type: String,
    #[serde(default)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl Identity {
    pub fn new(id: impl Into<String>, identity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identity_type: identity_type.into(),
            claims: HashMap::new(),
        }
    }

    /// Attach an extra claim.
    pub fn with_claim(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    /// Look up an extra claim by name.
    pub fn claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.claims.get(name)
    }
}
