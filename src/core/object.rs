//! core::object
//!
//! Typed objects and their properties.
//!
//! A [`TypedObject`] is one instance of a schema class: a UUID, the class
//! name, and a map of named property values. Property values are dynamic
//! JSON; their shape is dictated by the class's property definitions and
//! checked by the validation layer, not here.
//!
//! The wire payload's property insertion order is not guaranteed by
//! callers' JSON decoding, so properties are stored name-sorted
//! (`BTreeMap`) to give a defined iteration order.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors from object parsing.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// A single-object record without its `class` field.
    #[error("object record is missing its class name")]
    MissingClass,

    /// The payload does not have the expected JSON shape.
    #[error("malformed object payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named property value on an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The property name.
    pub name: String,
    /// The property value; shape governed by the class's definition.
    pub value: Value,
}

impl Property {
    /// Create a property.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Wire shape of one object record.
#[derive(Debug, Deserialize)]
struct ObjectBody {
    uuid: String,
    // Object records tag their class as `class`; reference property
    // definitions use the same wire name for their target. The two reads
    // are kept separate rather than assumed to be one canonical field.
    #[serde(default, rename = "class")]
    klass: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

/// An instance of a schema class, identified by UUID.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use strata::core::object::TypedObject;
///
/// let object = TypedObject::from_wire_single(&json!({
///     "uuid": "5e27f17c-ff22-4c49-82d9-6549f2800d1a",
///     "class": "issue",
///     "properties": { "title": "Lorem ipsum" },
/// })).unwrap();
///
/// assert_eq!(object.get("title"), Some(&json!("Lorem ipsum")));
/// assert_eq!(object.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypedObject {
    /// The object UUID.
    pub uuid: String,
    /// The name of the class the object is an instance of.
    pub klass: String,
    /// Properties, keyed (and iterated) by property name.
    pub properties: BTreeMap<String, Property>,
}

impl TypedObject {
    /// Parse an object from a grouped wire payload, where the class name
    /// comes from the enclosing map key rather than the record.
    pub fn from_wire(klass: &str, value: &Value) -> Result<Self, ObjectError> {
        let body: ObjectBody = serde_json::from_value(value.clone())?;
        Ok(Self::from_body(klass.to_string(), body))
    }

    /// Parse a standalone object record carrying its own `class` field.
    pub fn from_wire_single(value: &Value) -> Result<Self, ObjectError> {
        let body: ObjectBody = serde_json::from_value(value.clone())?;
        let klass = body.klass.clone().ok_or(ObjectError::MissingClass)?;
        Ok(Self::from_body(klass, body))
    }

    fn from_body(klass: String, body: ObjectBody) -> Self {
        let properties = body
            .properties
            .into_iter()
            .map(|(name, value)| {
                let property = Property::new(name.clone(), value);
                (name, property)
            })
            .collect();
        Self {
            uuid: body.uuid,
            klass,
            properties,
        }
    }

    /// Look up a property value by name.
    ///
    /// Total: returns `None` for absent names, never panics.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).map(|p| &p.value)
    }

    /// Look up a property (name and value) by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Re-encode to the single-object wire shape.
    pub fn to_wire(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), property.value.clone()))
            .collect();
        json!({
            "uuid": self.uuid,
            "class": self.klass,
            "properties": properties,
        })
    }

    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_wire()).unwrap_or_default()
    }
}
