//! Types exchanged with the invoking runtime.
//!
//! State crosses the runtime boundary as `serde_json::Value`; these types
//! describe plans, imports and provider metadata around that state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resource type name served by this provider.
pub const SITE_RESOURCE_TYPE: &str = "jamf_site";

/// Data source type name served by this provider.
pub const SITE_DATA_SOURCE_TYPE: &str = "jamf_site";

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if unset).
    pub before: Option<serde_json::Value>,
    /// The value after the change (None if unset).
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a newly set attribute.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for an attribute that becomes unset.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// Compare two optional string values, returning a change if they differ.
    pub(crate) fn between(path: &str, before: Option<&str>, after: Option<&str>) -> Option<Self> {
        match (before, after) {
            (b, a) if b == a => None,
            (None, Some(a)) => Some(Self::added(path, a.into())),
            (Some(b), None) => Some(Self::removed(path, b.into())),
            (Some(b), Some(a)) => Some(Self::modified(path, b.into(), a.into())),
            (None, None) => None,
        }
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: serde_json::Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying this plan would touch the remote site.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty() || self.requires_replace
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Advisory per-operation timeouts published to the runtime.
///
/// The lifecycle operations never enforce these themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTimeouts {
    /// Timeout for create.
    pub create: Duration,
    /// Timeout for read.
    pub read: Duration,
    /// Timeout for update.
    pub update: Duration,
    /// Timeout for delete.
    pub delete: Duration,
}

impl ResourceTimeouts {
    /// The default timeout applied to every operation.
    pub const DEFAULT: Duration = Duration::from_secs(60);

    /// Use the same timeout for every operation.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            create: timeout,
            read: timeout,
            update: timeout,
            delete: timeout,
        }
    }
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT)
    }
}

/// Provider metadata returned to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
    /// Advisory timeouts for resource operations.
    pub timeouts: ResourceTimeouts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("HQ"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("HQ")));

        let removed = AttributeChange::removed("city", json!("Oslo"));
        assert_eq!(removed.before, Some(json!("Oslo")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("name", json!("old"), json!("new"));
        assert_eq!(modified.before, Some(json!("old")));
        assert_eq!(modified.after, Some(json!("new")));
    }

    #[test]
    fn test_attribute_change_between() {
        assert_eq!(AttributeChange::between("city", Some("Oslo"), Some("Oslo")), None);
        assert_eq!(AttributeChange::between("city", None, None), None);
        assert_eq!(
            AttributeChange::between("city", None, Some("Oslo")),
            Some(AttributeChange::added("city", json!("Oslo")))
        );
        assert_eq!(
            AttributeChange::between("city", Some("Oslo"), None),
            Some(AttributeChange::removed("city", json!("Oslo")))
        );
        assert_eq!(
            AttributeChange::between("city", Some(""), Some("Bergen")),
            Some(AttributeChange::modified("city", json!(""), json!("Bergen")))
        );
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(json!({"id": "42"}));
        assert!(!no_change.has_changes());

        let with_changes = PlanResult::with_changes(
            json!({"id": "42", "name": "new"}),
            vec![AttributeChange::modified("name", json!("old"), json!("new"))],
            false,
        );
        assert!(with_changes.has_changes());
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new(SITE_RESOURCE_TYPE, json!({"id": "site-123"}));
        assert_eq!(imported.resource_type, "jamf_site");
        assert_eq!(imported.state["id"], "site-123");
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = ResourceTimeouts::default();
        assert_eq!(timeouts.create, Duration::from_secs(60));
        assert_eq!(timeouts.delete, Duration::from_secs(60));
        assert_eq!(
            ResourceTimeouts::uniform(Duration::from_secs(5)).read,
            Duration::from_secs(5)
        );
    }
}
