//! Typed department permission set: resource name → allowed action names.
//!
//! Stored on the department row as a JSON object of the form
//! `{"resource": ["action", ...]}`. Parsing validates the shape; any other
//! shape is rejected so callers can fail closed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The set of actions a department may perform, keyed by resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, BTreeSet<String>>);

impl PermissionSet {
    /// Create an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored JSON representation.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize into the stored JSON representation.
    ///
    /// Output is canonical: keys sorted, actions sorted and deduplicated.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Builder-style grant of several actions on one resource.
    pub fn with<I, S>(mut self, resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(resource.into())
            .or_default()
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Grant a single action on a resource.
    pub fn grant(&mut self, resource: impl Into<String>, action: impl Into<String>) {
        self.0.entry(resource.into()).or_default().insert(action.into());
    }

    /// Revoke a single action. Drops the resource once it has no actions left.
    pub fn revoke(&mut self, resource: &str, action: &str) -> bool {
        let Some(actions) = self.0.get_mut(resource) else {
            return false;
        };
        let removed = actions.remove(action);
        if actions.is_empty() {
            self.0.remove(resource);
        }
        removed
    }

    /// Whether `action` is allowed on `resource`. Absent resources deny.
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.0
            .get(resource)
            .is_some_and(|actions| actions.contains(action))
    }

    /// Allowed actions for a resource, if it is present.
    pub fn actions(&self, resource: &str) -> Option<&BTreeSet<String>> {
        self.0.get(resource)
    }

    /// Resource names present in the set.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether the set grants nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
