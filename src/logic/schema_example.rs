//! Representative example values for response schemas.
//!
//! OpenAPI schemas are lowered into [`SchemaNode`] trees (see
//! [`crate::logic::openapi_document`]) and [`synthesize_example`] walks such a tree to
//! produce one concrete JSON value of the matching shape.

use serde_json::{Map, Value};

/// One node of a schema tree: explicit example/default values plus the declared type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub kind: SchemaType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SchemaType {
    /// Properties in declaration order; `None` marks a property without a usable schema
    Object {
        properties: Vec<(String, Option<SchemaNode>)>,
    },
    Array {
        items: Option<Box<SchemaNode>>,
    },
    Integer,
    Number,
    Boolean,
    String {
        enumeration: Vec<Value>,
    },
    /// Untyped, composite or otherwise unsupported schemas
    #[default]
    Unknown,
}

impl SchemaNode {
    pub fn new(kind: SchemaType) -> Self {
        Self {
            example: None,
            default: None,
            kind,
        }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::new(SchemaType::Object {
            properties: properties
                .into_iter()
                .map(|(name, node)| (name.into(), Some(node)))
                .collect(),
        })
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::new(SchemaType::Array {
            items: Some(Box::new(items)),
        })
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String {
            enumeration: Vec::new(),
        })
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Produce one example value for `schema`, or `None` when the type carries no shape.
///
/// Explicit `example` wins over `default`, which wins over type-driven synthesis.
pub fn synthesize_example(schema: &SchemaNode) -> Option<Value> {
    if let Some(example) = &schema.example {
        return Some(example.clone());
    }

    if let Some(default) = &schema.default {
        return Some(default.clone());
    }

    match &schema.kind {
        SchemaType::Object { properties } => {
            let mut object = Map::new();
            for (name, property) in properties {
                let Some(property) = property else {
                    continue;
                };
                object.insert(
                    name.clone(),
                    synthesize_example(property).unwrap_or(Value::Null),
                );
            }
            Some(Value::Object(object))
        }
        SchemaType::Array { items } => {
            let item = items.as_deref().and_then(synthesize_example);
            Some(Value::Array(item.into_iter().collect()))
        }
        SchemaType::Integer | SchemaType::Number => Some(Value::from(0)),
        SchemaType::Boolean => Some(Value::Bool(false)),
        SchemaType::String { enumeration } => Some(
            enumeration
                .first()
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
        ),
        SchemaType::Unknown => None,
    }
}
