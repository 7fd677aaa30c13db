//! Schema types for describing the site resource and data source.
//!
//! Every site attribute is a string; the schema records which ones the
//! operator must set, may set, or only reads back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::SiteAddress;
use crate::types::{SITE_DATA_SOURCE_TYPE, SITE_RESOURCE_TYPE};

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
    /// The attribute is computed by the provider (read-only).
    pub computed: bool,
}

impl AttributeFlags {
    /// Create flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Create flags for a computed attribute (read-only, set by provider).
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Whether the operator never sets this attribute.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Describes a single string attribute in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    /// Create a new attribute with the given flags.
    pub fn new(flags: AttributeFlags) -> Self {
        Self {
            flags,
            description: None,
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeFlags::optional())
    }

    /// Create a computed string attribute.
    pub fn computed_string() -> Self {
        Self::new(AttributeFlags::computed())
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for a resource or data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// The attributes, keyed by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Attribute>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to the schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schemas for everything a provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
    /// Schemas for each data source type.
    #[serde(default)]
    pub data_sources: HashMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source schema.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

// =========================================================================
// Site schemas
// =========================================================================

fn address_description(field: &str) -> String {
    format!("Site {}. Unset fields are sent as unset.", field.replace('_', " "))
}

/// Schema of the `jamf_site` resource.
pub fn site_resource_schema() -> Schema {
    let schema = Schema::new()
        .with_description("A site managed in the remote management service.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Identity assigned by the service."),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("Unique site name."),
        );

    SiteAddress::FIELD_NAMES
        .iter()
        .fold(schema, |schema, field| {
            schema.with_attribute(
                *field,
                Attribute::optional_string().with_description(address_description(field)),
            )
        })
}

/// Schema of the `jamf_site` data source.
pub fn site_data_source_schema() -> Schema {
    let schema = Schema::new()
        .with_description("Looks up an existing site by name.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string());

    SiteAddress::FIELD_NAMES
        .iter()
        .fold(schema, |schema, field| {
            schema.with_attribute(*field, Attribute::computed_string())
        })
}

/// Provider schema with the site resource and data source.
pub fn site_provider_schema() -> ProviderSchema {
    ProviderSchema::new()
        .with_resource(SITE_RESOURCE_TYPE, site_resource_schema())
        .with_data_source(SITE_DATA_SOURCE_TYPE, site_data_source_schema())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.optional);
        assert!(!required.is_computed_only());

        let computed = AttributeFlags::computed();
        assert!(!computed.required);
        assert!(computed.is_computed_only());
    }

    #[test]
    fn test_site_resource_schema() {
        let schema = site_resource_schema();
        assert_eq!(schema.attributes.len(), 8);
        assert!(schema.attributes["name"].flags.required);
        assert!(schema.attributes["id"].flags.is_computed_only());
        for field in SiteAddress::FIELD_NAMES {
            assert!(schema.attributes[field].flags.optional, "{} should be optional", field);
        }
        assert_eq!(
            schema.attributes["zip_postal_code"].description.as_deref(),
            Some("Site zip postal code. Unset fields are sent as unset.")
        );
    }

    #[test]
    fn test_site_data_source_schema() {
        let schema = site_data_source_schema();
        assert!(schema.attributes["name"].flags.required);
        assert!(schema.attributes["city"].flags.is_computed_only());
    }

    #[test]
    fn test_provider_schema() {
        let schema = site_provider_schema();
        assert!(schema.resources.contains_key("jamf_site"));
        assert!(schema.data_sources.contains_key("jamf_site"));
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid configuration")
            .with_detail("The name must not be empty")
            .with_attribute("name");

        assert!(err.is_error());
        assert_eq!(err.summary, "Invalid configuration");
        assert_eq!(err.detail, Some("The name must not be empty".to_string()));
        assert_eq!(err.attribute, Some("name".to_string()));
        assert!(!Diagnostic::warning("heads up").is_error());
    }

    #[test]
    fn test_schema_serializes_flags_flat() {
        let json = serde_json::to_value(Attribute::required_string()).unwrap();
        assert_eq!(json["required"], true);
        assert_eq!(json["computed"], false);
    }

    #[test]
    fn test_schema_json_has_only_attributes_and_description() {
        let json = serde_json::to_value(site_resource_schema()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["attributes", "description"]);
        assert_eq!(Schema::new(), Schema::default());
    }
}
