//! Configuration validation against a [`Schema`].
//!
//! Validation is limited to presence and string typing: required attributes
//! must be present and non-null, set attributes must be strings, and
//! computed-only attributes are ignored.
//!
//! # Example
//!
//! ```
//! use jamf_site_provider::schema::site_resource_schema;
//! use jamf_site_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = site_resource_schema();
//!
//! let diagnostics = validate(&schema, &json!({"name": "HQ", "city": "Oslo"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"city": 7}));
//! assert_eq!(diagnostics.len(), 2);
//! ```

use serde_json::Value;

use crate::schema::{Attribute, Diagnostic, Schema};

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics; an empty list means the value is valid.
/// Diagnostics are ordered by attribute name.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let obj = match value {
        Value::Object(map) => map,
        _ => {
            return vec![Diagnostic::error("Expected object")
                .with_detail(format!("Got {}", value_type_name(value)))];
        }
    };

    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();

    let mut diagnostics = Vec::new();
    for name in names {
        validate_attribute(&schema.attributes[name], obj.get(name), name, &mut diagnostics);
    }
    diagnostics
}

/// Validate a JSON value, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(Value::String(s)) => {
            if attr.flags.required && s.is_empty() {
                diagnostics.push(
                    Diagnostic::error(format!("Attribute '{}' must not be empty", path))
                        .with_attribute(path),
                );
            }
        }
        Some(v) => diagnostics.push(
            Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                .with_detail(format!("Expected string, got {}", value_type_name(v)))
                .with_attribute(path),
        ),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::site_resource_schema;
    use serde_json::json;

    #[test]
    fn test_validate_required_name() {
        let schema = site_resource_schema();

        let diagnostics = validate(&schema, &json!({"name": "HQ"}));
        assert!(diagnostics.is_empty());

        // Missing required
        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        // Null value
        let diagnostics = validate(&schema, &json!({"name": null}));
        assert_eq!(diagnostics.len(), 1);

        // Empty string
        let diagnostics = validate(&schema, &json!({"name": ""}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("must not be empty"));
    }

    #[test]
    fn test_validate_optional_address_fields() {
        let schema = site_resource_schema();

        let diagnostics = validate(
            &schema,
            &json!({"name": "HQ", "city": "", "country": null}),
        );
        assert!(diagnostics.is_empty());

        let diagnostics = validate(&schema, &json!({"name": "HQ", "zip_postal_code": 12345}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
        assert_eq!(
            diagnostics[0].detail.as_deref(),
            Some("Expected string, got number")
        );
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = site_resource_schema();
        let diagnostics = validate(&schema, &json!({"name": "HQ", "id": 42}));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_validate_multiple_errors_sorted() {
        let schema = site_resource_schema();
        let diagnostics = validate(&schema, &json!({"name": true, "city": []}));
        let paths: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.as_deref().unwrap())
            .collect();
        assert_eq!(paths, vec!["city", "name"]);
    }

    #[test]
    fn test_validate_root_not_object() {
        let schema = site_resource_schema();
        let diagnostics = validate(&schema, &json!("HQ"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_helpers() {
        let schema = site_resource_schema();
        assert!(is_valid(&schema, &json!({"name": "HQ"})));
        assert!(!is_valid(&schema, &json!({})));
        assert!(validate_result(&schema, &json!({"name": "HQ"})).is_ok());
        assert_eq!(validate_result(&schema, &json!({})).unwrap_err().len(), 1);
    }
}
