//! Schema tree model
//!
//! Parameter schemas arrive as OpenAPI v3 documents. [`RawSchema`] mirrors
//! that document shape for deserialization; [`SchemaNode`] is the closed
//! tree the renderer works on. [`SchemaNode::from_raw`] is the only place
//! that decides which shape a document has. A root document is checked with
//! [`RawSchema::is_blank`] before it is ever classified.

use miette::Diagnostic;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;

/// Display type for nodes without a declared or inferable type
pub const UNTYPED: &str = "untyped";

/// Error raised when a schema document does not match a renderable shape
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("unable to interpret additionalProperties at `{path}` when it does not allow extra keys")]
    #[diagnostic(
        code(docgen::schema::structural),
        help("use `properties` to describe a closed object")
    )]
    DisallowedAdditionalProperties { path: String },

    #[error("unable to interpret additionalProperties at `{path}` without a value schema")]
    #[diagnostic(
        code(docgen::schema::structural),
        help("give additionalProperties a schema describing the values of the map")
    )]
    MissingValueSchema { path: String },

    #[error("enum value at `{path}` is neither an integer nor a string: {value}")]
    #[diagnostic(code(docgen::schema::structural))]
    UnsupportedEnumValue { path: String, value: String },
}

/// `additionalProperties` is either a flag or a value schema
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allows(bool),
    Schema(Box<RawSchema>),
}

/// OpenAPI v3 schema document as written in a constraint template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    #[serde(default, rename = "type")]
    pub schema_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<JsonValue>>,

    #[serde(default)]
    pub properties: Option<BTreeMap<String, RawSchema>>,

    #[serde(default)]
    pub items: Option<Box<RawSchema>>,

    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, rename = "x-kubernetes-preserve-unknown-fields")]
    pub preserve_unknown_fields: Option<bool>,
}

impl RawSchema {
    /// A blank schema has no properties, no item schema and no declared type.
    /// Anything else it carries, `additionalProperties` included, is ignored.
    pub fn is_blank(&self) -> bool {
        self.properties.is_none()
            && self.items.is_none()
            && self.schema_type.as_deref().map_or(true, str::is_empty)
    }

    /// Whether the document carries the accept-unknown-fields marker
    pub fn preserves_unknown(&self) -> bool {
        self.preserve_unknown_fields == Some(true)
    }
}

/// Metadata every schema node carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMeta {
    /// Declared type, lower-cased; empty when the document gave none
    pub declared_type: String,
    /// Description with newlines folded to spaces
    pub description: String,
    /// Enum values rendered as strings
    pub allowed_values: Vec<String>,
}

impl SchemaMeta {
    pub fn typed(declared_type: impl Into<String>) -> Self {
        Self {
            declared_type: declared_type.into().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().replace('\n', " ");
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// A parameter schema, exactly one of five shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Terminal node with a declared type
    Scalar { meta: SchemaMeta },
    /// Closed object with named properties
    Object {
        meta: SchemaMeta,
        properties: BTreeMap<String, SchemaNode>,
    },
    /// List of items sharing one schema
    Array {
        meta: SchemaMeta,
        items: Box<SchemaNode>,
    },
    /// Open map whose values share one schema
    MapOf {
        meta: SchemaMeta,
        values: Box<SchemaNode>,
    },
    /// No type and no structure; may accept arbitrary content
    OpenUnstructured {
        meta: SchemaMeta,
        preserve_unknown: bool,
    },
}

impl SchemaNode {
    pub fn scalar(declared_type: &str) -> Self {
        SchemaNode::Scalar {
            meta: SchemaMeta::typed(declared_type),
        }
    }

    /// Classify a schema document. `path` names the document's location and
    /// is only used in error messages.
    pub fn from_raw(raw: &RawSchema, path: &str) -> Result<Self, SchemaError> {
        let meta = meta_from_raw(raw, path)?;

        if let Some(properties) = &raw.properties {
            let mut children = BTreeMap::new();
            for (key, child) in properties {
                let child_path = format!("{}.properties.{}", path, key);
                children.insert(key.clone(), SchemaNode::from_raw(child, &child_path)?);
            }
            return Ok(SchemaNode::Object {
                meta,
                properties: children,
            });
        }

        if let Some(items) = &raw.items {
            let items = SchemaNode::from_raw(items, &format!("{}.items", path))?;
            return Ok(SchemaNode::Array {
                meta,
                items: Box::new(items),
            });
        }

        match &raw.additional_properties {
            Some(AdditionalProperties::Schema(values)) => {
                let values =
                    SchemaNode::from_raw(values, &format!("{}.additionalProperties", path))?;
                Ok(SchemaNode::MapOf {
                    meta,
                    values: Box::new(values),
                })
            }
            Some(AdditionalProperties::Allows(false)) => {
                Err(SchemaError::DisallowedAdditionalProperties {
                    path: path.to_string(),
                })
            }
            Some(AdditionalProperties::Allows(true)) => Err(SchemaError::MissingValueSchema {
                path: path.to_string(),
            }),
            None if !meta.declared_type.is_empty() => Ok(SchemaNode::Scalar { meta }),
            None => Ok(SchemaNode::OpenUnstructured {
                meta,
                preserve_unknown: raw.preserves_unknown(),
            }),
        }
    }

    pub fn meta(&self) -> &SchemaMeta {
        match self {
            SchemaNode::Scalar { meta }
            | SchemaNode::Object { meta, .. }
            | SchemaNode::Array { meta, .. }
            | SchemaNode::MapOf { meta, .. }
            | SchemaNode::OpenUnstructured { meta, .. } => meta,
        }
    }

    /// Type shown in comments and terminal values. An undeclared type is
    /// inferred from the shape: properties mean object, items mean array.
    pub fn display_type(&self) -> &str {
        let declared = self.meta().declared_type.as_str();
        if !declared.is_empty() {
            return declared;
        }
        match self {
            SchemaNode::Object { .. } => "object",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Scalar { .. }
            | SchemaNode::MapOf { .. }
            | SchemaNode::OpenUnstructured { .. } => UNTYPED,
        }
    }

    /// Terminal nodes are written on the same line as their key
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SchemaNode::Scalar { .. } | SchemaNode::OpenUnstructured { .. }
        )
    }
}

fn meta_from_raw(raw: &RawSchema, path: &str) -> Result<SchemaMeta, SchemaError> {
    let mut allowed_values = Vec::new();
    for value in raw.enum_values.iter().flatten() {
        match value {
            JsonValue::String(s) => allowed_values.push(s.clone()),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => allowed_values.push(n.to_string()),
            other => {
                return Err(SchemaError::UnsupportedEnumValue {
                    path: path.to_string(),
                    value: other.to_string(),
                })
            }
        }
    }

    Ok(SchemaMeta::typed(raw.schema_type.clone().unwrap_or_default())
        .with_description(raw.description.clone().unwrap_or_default())
        .with_allowed_values(allowed_values))
}
