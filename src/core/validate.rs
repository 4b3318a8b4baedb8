//! core::validate
//!
//! Structural validation of typed objects against class definitions.
//!
//! The parsers in [`core::schema`](crate::core::schema) and
//! [`core::object`](crate::core::object) accept any property values; this
//! module is the validation concern layered on top. It checks presence
//! (mandatory properties exist, no undeclared properties) and shape
//! (values conform to their declared type, recursively through lists).
//!
//! Regex constraints (`regex`, `content-type-regex`) are carried as data
//! by the definitions and are NOT applied here; pattern enforcement is
//! the server's contract.
//!
//! # Invariants
//!
//! - Never mutates the object or the definition
//! - Deterministic: findings are reported in property-name order

use serde_json::Value;
use thiserror::Error;

use super::object::TypedObject;
use super::schema::{ClassDefinition, PropertyDefinition, PropertyType};

/// A single validation finding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The object's class name is not the one the definition describes.
    #[error("object class '{actual}' does not match definition '{expected}'")]
    ClassMismatch { expected: String, actual: String },

    /// A mandatory property is absent from the object.
    #[error("mandatory property '{property}' is missing")]
    MissingProperty { property: String },

    /// The object carries a property its class does not declare.
    #[error("property '{property}' is not declared by class '{class}'")]
    UndeclaredProperty { property: String, class: String },

    /// A property value does not have the shape its definition requires.
    #[error("property '{property}' does not conform to its '{kind}' definition")]
    ShapeMismatch { property: String, kind: String },
}

/// Result of validating one object against its class definition.
#[derive(Debug)]
pub struct ValidationReport {
    /// Findings, in property-name order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether validation found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate an object against a class definition.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use strata::core::object::TypedObject;
/// use strata::core::schema::Schema;
/// use strata::core::validate::validate_object;
///
/// let schema = Schema::from_wire(&json!({
///     "name": "s",
///     "classes": {
///         "person": { "properties": { "name": { "type": "text" } } }
///     }
/// })).unwrap();
///
/// let person = TypedObject::from_wire("person", &json!({
///     "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
///     "properties": { "name": "Ada" },
/// })).unwrap();
///
/// let report = validate_object(&person, schema.class("person").unwrap());
/// assert!(report.is_clean());
/// ```
pub fn validate_object(object: &TypedObject, class: &ClassDefinition) -> ValidationReport {
    let mut issues = Vec::new();

    if object.klass != class.name {
        issues.push(ValidationIssue::ClassMismatch {
            expected: class.name.clone(),
            actual: object.klass.clone(),
        });
    }

    for (name, definition) in &class.properties {
        if !definition.optional && object.get(name).is_none() {
            issues.push(ValidationIssue::MissingProperty {
                property: name.clone(),
            });
        }
    }

    for (name, property) in &object.properties {
        match class.property(name) {
            None => issues.push(ValidationIssue::UndeclaredProperty {
                property: name.clone(),
                class: class.name.clone(),
            }),
            Some(definition) => {
                if !value_conforms(&property.value, definition) {
                    issues.push(ValidationIssue::ShapeMismatch {
                        property: name.clone(),
                        kind: definition.kind.to_string(),
                    });
                }
            }
        }
    }

    ValidationReport { issues }
}

/// Whether a value has the shape its definition requires.
///
/// Unknown property types accept any value, matching the parser's
/// forward-compatibility stance.
fn value_conforms(value: &Value, definition: &PropertyDefinition) -> bool {
    match &definition.kind {
        PropertyType::Boolean => value.is_boolean(),
        PropertyType::Integer => value.is_i64() || value.is_u64(),
        PropertyType::Float => value.is_number(),
        PropertyType::Text | PropertyType::Raw | PropertyType::Timestamp => value.is_string(),
        PropertyType::Reference => reference_conforms(value),
        PropertyType::List => match (&definition.elements, value.as_array()) {
            (Some(elements), Some(items)) => {
                items.iter().all(|item| value_conforms(item, elements))
            }
            _ => false,
        },
        PropertyType::Other(_) => true,
    }
}

/// Reference values are either a record carrying a `uuid` string or a
/// bare uuid string.
fn reference_conforms(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Object(map) => matches!(map.get("uuid"), Some(Value::String(_))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Schema;
    use serde_json::json;

    fn issue_class() -> ClassDefinition {
        let schema = Schema::from_wire(&json!({
            "name": "s",
            "classes": {
                "issue": {
                    "properties": {
                        "title": { "type": "text" },
                        "open": { "type": "boolean" },
                        "severity": { "type": "integer", "optional": true },
                        "tags": {
                            "type": "list",
                            "elements": { "type": "text" },
                            "optional": true,
                        },
                        "assignee": { "type": "reference", "class": "person", "optional": true },
                        "custom": { "type": "geojson", "optional": true },
                    }
                }
            }
        }))
        .unwrap();
        schema.class("issue").unwrap().clone()
    }

    fn issue_with(properties: Value) -> TypedObject {
        TypedObject::from_wire(
            "issue",
            &json!({
                "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                "properties": properties,
            }),
        )
        .unwrap()
    }

    #[test]
    fn conforming_object_is_clean() {
        let object = issue_with(json!({
            "title": "Parsing fails on empty refs",
            "open": true,
            "severity": 2,
            "tags": ["parser"],
        }));
        assert!(validate_object(&object, &issue_class()).is_clean());
    }

    #[test]
    fn optional_absent_is_clean() {
        let object = issue_with(json!({ "title": "t", "open": false }));
        assert!(validate_object(&object, &issue_class()).is_clean());
    }

    #[test]
    fn missing_mandatory_property_reported() {
        let object = issue_with(json!({ "title": "t" }));
        let report = validate_object(&object, &issue_class());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::MissingProperty {
                property: "open".into()
            }]
        );
    }

    #[test]
    fn undeclared_property_reported() {
        let object = issue_with(json!({ "title": "t", "open": true, "reporter": "Ada" }));
        let report = validate_object(&object, &issue_class());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::UndeclaredProperty {
                property: "reporter".into(),
                class: "issue".into()
            }]
        );
    }

    #[test]
    fn shape_mismatch_reported() {
        let object = issue_with(json!({ "title": 17, "open": true }));
        let report = validate_object(&object, &issue_class());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::ShapeMismatch {
                property: "title".into(),
                kind: "text".into()
            }]
        );
    }

    #[test]
    fn list_elements_checked_recursively() {
        let object = issue_with(json!({
            "title": "t",
            "open": true,
            "tags": ["ok", 42],
        }));
        let report = validate_object(&object, &issue_class());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::ShapeMismatch {
                property: "tags".into(),
                kind: "list".into()
            }]
        );
    }

    #[test]
    fn reference_accepts_uuid_record_and_bare_string() {
        let class = issue_class();

        let with_record = issue_with(json!({
            "title": "t",
            "open": true,
            "assignee": { "uuid": "0f60bb2b-3956-4b8e-9c3d-a33dbd4e2e71" },
        }));
        assert!(validate_object(&with_record, &class).is_clean());

        let with_string = issue_with(json!({
            "title": "t",
            "open": true,
            "assignee": "0f60bb2b-3956-4b8e-9c3d-a33dbd4e2e71",
        }));
        assert!(validate_object(&with_string, &class).is_clean());

        let with_number = issue_with(json!({ "title": "t", "open": true, "assignee": 7 }));
        assert!(!validate_object(&with_number, &class).is_clean());
    }

    #[test]
    fn unknown_type_accepts_any_value() {
        let object = issue_with(json!({
            "title": "t",
            "open": true,
            "custom": { "deeply": ["nested", 1] },
        }));
        assert!(validate_object(&object, &issue_class()).is_clean());
    }

    #[test]
    fn class_mismatch_reported() {
        let object = TypedObject::from_wire(
            "person",
            &json!({
                "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
                "properties": { "title": "t", "open": true },
            }),
        )
        .unwrap();
        let report = validate_object(&object, &issue_class());
        assert!(report
            .issues
            .contains(&ValidationIssue::ClassMismatch {
                expected: "issue".into(),
                actual: "person".into()
            }));
    }

    #[test]
    fn integer_rejects_float_value() {
        let object = issue_with(json!({
            "title": "t",
            "open": true,
            "severity": 2.5,
        }));
        let report = validate_object(&object, &issue_class());
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(
            report.issues[0],
            ValidationIssue::ShapeMismatch { .. }
        ));
    }
}
