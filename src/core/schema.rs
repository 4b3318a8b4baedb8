//! core::schema
//!
//! Schema model: property, class, and schema definitions.
//!
//! # Wire format
//!
//! Schemas arrive as JSON of the shape
//! `{name, classes: {class_name: {properties: {property_name: {...}}}}}`.
//! Class names are not repeated inside class bodies; they are back-filled
//! from the enclosing map keys at parse time. Hyphenated wire field names
//! (`content-type-regex`) map to non-hyphenated Rust names; this is the
//! only normalization this layer performs.
//!
//! # Permissiveness
//!
//! Unrecognized property types parse to a minimal definition (name, type
//! tag, optional flag) instead of failing, so schemas written against a
//! newer server remain loadable. Unknown extra fields are ignored. The one
//! hard error is a `list` definition without `elements`.
//!
//! # Reference resolution
//!
//! `reference` definitions keep their target class and schema as plain
//! strings. Resolving them to actual [`ClassDefinition`]s (possibly in a
//! different schema) is the caller's job; doing it at parse time would
//! force eager, possibly cyclic, cross-service fetches.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors from schema parsing.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A `list` property definition without an `elements` definition.
    #[error("list property '{property}' has no element definition")]
    MissingElements { property: String },

    /// The payload does not have the expected JSON shape.
    #[error("malformed schema payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// The type of a property, as tagged on the wire.
///
/// Unrecognized tags are preserved in [`PropertyType::Other`] rather than
/// rejected, so definitions survive a round-trip through a client that
/// does not know them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Boolean,
    Integer,
    Float,
    Text,
    Raw,
    Reference,
    Timestamp,
    List,
    /// A type tag this client does not recognize.
    Other(String),
}

impl PropertyType {
    /// Parse a wire type tag. Never fails; unknown tags become `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "text" => Self::Text,
            "raw" => Self::Raw,
            "reference" => Self::Reference,
            "timestamp" => Self::Timestamp,
            "list" => Self::List,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Raw => "raw",
            Self::Reference => "reference",
            Self::Timestamp => "timestamp",
            Self::List => "list",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this is one of the known type tags.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire shape of one property definition.
#[derive(Debug, Deserialize)]
struct PropertyDefBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    elements: Option<Box<PropertyDefBody>>,
    #[serde(default, rename = "content-type-regex")]
    content_type_regex: Option<Vec<String>>,
    #[serde(default, rename = "class")]
    klass: Option<String>,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    bidirectional: Option<String>,
    #[serde(default)]
    regex: Option<Vec<String>>,
}

/// The definition of one property: its type and type-specific constraints.
///
/// Type-specific fields are `Some` only for the type they belong to:
///
/// - `elements` - `list` only; the (recursive) element definition
/// - `content_type_regex` - `raw` only; empty means any content type
/// - `klass` / `schema` / `bidirectional` - `reference` only; `schema`
///   of `None` means "the defining schema itself"
/// - `regex` - `text` only; empty means unconstrained
///
/// Regex constraints are carried as data for a validation layer to apply;
/// this layer does not compile or enforce them.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// The property name (assigned by the owning class).
    pub name: String,
    /// The property type.
    pub kind: PropertyType,
    /// Whether the property may be absent from objects.
    pub optional: bool,
    /// Element definition, for `list` properties.
    pub elements: Option<Box<PropertyDefinition>>,
    /// Accepted content-type patterns, for `raw` properties.
    pub content_type_regex: Option<Vec<String>>,
    /// Target class name, for `reference` properties.
    pub klass: Option<String>,
    /// Schema the target class lives in, for `reference` properties.
    pub schema: Option<String>,
    /// Name of the reciprocal property in the target class, for
    /// `reference` properties that require a back-link.
    pub bidirectional: Option<String>,
    /// Accepted value patterns, for `text` properties.
    pub regex: Option<Vec<String>>,
}

impl PropertyDefinition {
    /// Parse a property definition from its wire record.
    ///
    /// The property name comes from the enclosing class's properties map,
    /// not from the record itself.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MissingElements` for a `list` without an
    /// `elements` record, or `SchemaError::Json` if the record does not
    /// have the expected shape.
    pub fn from_wire(name: &str, value: &Value) -> Result<Self, SchemaError> {
        let body: PropertyDefBody = serde_json::from_value(value.clone())?;
        Self::from_body(name, body)
    }

    fn from_body(name: &str, body: PropertyDefBody) -> Result<Self, SchemaError> {
        let mut def = Self {
            name: name.to_string(),
            kind: PropertyType::parse(&body.kind),
            optional: body.optional,
            elements: None,
            content_type_regex: None,
            klass: None,
            schema: None,
            bidirectional: None,
            regex: None,
        };

        match def.kind {
            PropertyType::List => {
                let elements = body.elements.ok_or_else(|| SchemaError::MissingElements {
                    property: name.to_string(),
                })?;
                // Element definitions share their container's property name.
                def.elements = Some(Box::new(Self::from_body(name, *elements)?));
            }
            PropertyType::Raw => {
                def.content_type_regex = Some(body.content_type_regex.unwrap_or_default());
            }
            PropertyType::Reference => {
                def.klass = body.klass;
                def.schema = body.schema;
                def.bidirectional = body.bidirectional;
            }
            PropertyType::Text => {
                def.regex = Some(body.regex.unwrap_or_default());
            }
            PropertyType::Boolean
            | PropertyType::Integer
            | PropertyType::Float
            | PropertyType::Timestamp
            | PropertyType::Other(_) => {}
        }

        Ok(def)
    }

    /// Re-encode to the wire shape.
    ///
    /// Inverse of [`from_wire`](Self::from_wire) for every field the model
    /// carries: parsing the result yields an equal definition.
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), json!(self.kind.as_str()));
        map.insert("optional".into(), json!(self.optional));
        if let Some(elements) = &self.elements {
            map.insert("elements".into(), elements.to_wire());
        }
        if let Some(patterns) = &self.content_type_regex {
            map.insert("content-type-regex".into(), json!(patterns));
        }
        if let Some(klass) = &self.klass {
            map.insert("class".into(), json!(klass));
        }
        if let Some(schema) = &self.schema {
            map.insert("schema".into(), json!(schema));
        }
        if let Some(bidirectional) = &self.bidirectional {
            map.insert("bidirectional".into(), json!(bidirectional));
        }
        if let Some(patterns) = &self.regex {
            map.insert("regex".into(), json!(patterns));
        }
        Value::Object(map)
    }
}

/// Wire shape of one class body. The class name lives in the enclosing
/// schema's classes map, not here.
#[derive(Debug, Deserialize)]
struct ClassBody {
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

/// A named class: a mapping of property names to their definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    /// The class name (assigned by the owning schema).
    pub name: String,
    /// Property definitions, keyed by property name.
    pub properties: BTreeMap<String, PropertyDefinition>,
}

impl ClassDefinition {
    /// Parse a class definition from its wire record, back-filling `name`
    /// from the schema's classes-map key.
    pub fn from_wire(name: &str, value: &Value) -> Result<Self, SchemaError> {
        let body: ClassBody = serde_json::from_value(value.clone())?;
        let mut properties = BTreeMap::new();
        for (property_name, property_value) in &body.properties {
            properties.insert(
                property_name.clone(),
                PropertyDefinition::from_wire(property_name, property_value)?,
            );
        }
        Ok(Self {
            name: name.to_string(),
            properties,
        })
    }

    /// Look up a property definition by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    /// Re-encode to the wire shape (class name not repeated in the body).
    pub fn to_wire(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, def)| (name.clone(), def.to_wire()))
            .collect();
        json!({ "properties": properties })
    }
}

/// A named schema: a mapping of class names to their definitions.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use strata::core::schema::{PropertyType, Schema};
///
/// let schema = Schema::from_wire(&json!({
///     "name": "org.example.schemas.issues.1",
///     "classes": {
///         "issue": {
///             "properties": {
///                 "title": { "type": "text" },
///                 "tags": { "type": "list", "elements": { "type": "text" } },
///             }
///         }
///     }
/// })).unwrap();
///
/// let issue = schema.class("issue").unwrap();
/// assert_eq!(issue.name, "issue");
/// let tags = issue.property("tags").unwrap();
/// assert_eq!(tags.elements.as_ref().unwrap().kind, PropertyType::Text);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// The schema name.
    pub name: String,
    /// Class definitions, keyed by class name.
    pub classes: BTreeMap<String, ClassDefinition>,
}

impl Schema {
    /// Parse a schema from its wire record.
    pub fn from_wire(value: &Value) -> Result<Self, SchemaError> {
        #[derive(Deserialize)]
        struct SchemaBody {
            name: String,
            #[serde(default)]
            classes: BTreeMap<String, Value>,
        }

        let body: SchemaBody = serde_json::from_value(value.clone())?;
        let mut classes = BTreeMap::new();
        for (class_name, class_value) in &body.classes {
            classes.insert(
                class_name.clone(),
                ClassDefinition::from_wire(class_name, class_value)?,
            );
        }
        Ok(Self {
            name: body.name,
            classes,
        })
    }

    /// Look up a class definition by name.
    pub fn class(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.get(name)
    }

    /// The schema a reference definition targets: its explicit `schema`
    /// field, or this schema when the field is absent.
    pub fn reference_target_schema<'a>(&'a self, def: &'a PropertyDefinition) -> &'a str {
        def.schema.as_deref().unwrap_or(&self.name)
    }

    /// Re-encode to the wire shape.
    pub fn to_wire(&self) -> Value {
        let classes: Map<String, Value> = self
            .classes
            .iter()
            .map(|(name, class)| (name.clone(), class.to_wire()))
            .collect();
        json!({ "name": self.name, "classes": classes })
    }

    /// Pretty-printed JSON representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_wire()).unwrap_or_default()
    }
}
