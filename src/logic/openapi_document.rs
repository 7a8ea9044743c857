//! Parsing, validation and local `$ref` resolution for uploaded OpenAPI 3 documents.

use itertools::Itertools;
use openapiv3::{
    Components, Example, Header, OpenAPI, Operation, Parameter, PathItem, ReferenceOr, Response,
    Schema, SchemaKind, Type,
};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::config::ImportConfig;
use crate::logic::schema_example::{SchemaNode, SchemaType};

const LOCAL_PATHS: &str = "#/paths/";
const COMPONENT_SCHEMAS: &str = "#/components/schemas/";
const COMPONENT_RESPONSES: &str = "#/components/responses/";
const COMPONENT_PARAMETERS: &str = "#/components/parameters/";
const COMPONENT_HEADERS: &str = "#/components/headers/";
const COMPONENT_EXAMPLES: &str = "#/components/examples/";

/// Upper bound on `$ref` -> `$ref` chains, so alias loops terminate
const MAX_REFERENCE_HOPS: usize = 32;

/// Keys whose values map user-chosen names to OpenAPI objects
const NAME_MAPS: &[&str] = &[
    "paths",
    "properties",
    "patternProperties",
    "schemas",
    "responses",
    "parameters",
    "examples",
    "headers",
    "content",
    "encoding",
    "requestBodies",
    "securitySchemes",
    "links",
    "callbacks",
];

/// Keys holding literal data, never OpenAPI structure
const LITERAL_KEYS: &[&str] = &["example", "default", "enum", "value"];

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("document is not valid UTF-8")]
    Encoding,
    #[error("document is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("external reference not allowed: {0}")]
    ExternalReference(String),
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    #[error("unsupported openapi version {0:?}, expected 3.x")]
    UnsupportedVersion(String),
    #[error("path {0:?} must start with '/'")]
    InvalidPath(String),
    #[error("path {0:?} has an unbalanced template brace")]
    UnbalancedTemplate(String),
    #[error("{method} {path}: {reason}")]
    InvalidOperation {
        method: String,
        path: String,
        reason: String,
    },
    #[error("{0}")]
    Structure(String),
}

/// Bounds applied while lowering one response schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaLimits {
    pub max_depth: usize,
    /// Nodes expanded in total; a `$ref` used twice is expanded twice
    pub max_nodes: usize,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for SchemaLimits {
    fn from(config: &ImportConfig) -> Self {
        Self {
            max_depth: config.max_schema_depth,
            max_nodes: config.max_schema_nodes,
        }
    }
}

/// A parsed and validated OpenAPI 3 document that only references itself
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    spec: OpenAPI,
}

impl OpenApiDocument {
    /// Parse YAML or JSON text and validate it.
    ///
    /// Text starting with `{` is read as JSON, anything else as YAML.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DocumentError::Encoding)?;

        let raw: Value = if text.trim_start().starts_with('{') {
            serde_json::from_str(text).map_err(|e| DocumentError::Syntax(e.to_string()))?
        } else {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| DocumentError::Syntax(e.to_string()))?;
            yaml_to_json(yaml)?
        };

        if !raw.is_object() {
            return Err(DocumentError::Structure(
                "document root must be a mapping".to_string(),
            ));
        }

        check_references(&raw, &raw, false)?;

        // The typed model silently drops path keys without a leading '/'
        if let Some(paths) = raw.get("paths").and_then(Value::as_object) {
            if let Some(path) = paths
                .keys()
                .find(|key| !key.starts_with('/') && !key.starts_with("x-"))
            {
                return Err(DocumentError::InvalidPath(path.clone()));
            }
        }

        let spec: OpenAPI =
            serde_json::from_value(raw).map_err(|e| DocumentError::Structure(e.to_string()))?;

        if !spec.openapi.starts_with("3.") {
            return Err(DocumentError::UnsupportedVersion(spec.openapi));
        }

        let document = Self { spec };
        document.validate_operations()?;
        Ok(document)
    }

    /// Same as [`OpenApiDocument::parse`] but rejects documents above `limit` bytes first
    pub fn parse_with_limit(bytes: &[u8], limit: usize) -> Result<Self, DocumentError> {
        if bytes.len() > limit {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
        Self::parse(bytes)
    }

    pub fn spec(&self) -> &OpenAPI {
        &self.spec
    }

    /// Every operation declares a response, and its path parameters match the template
    fn validate_operations(&self) -> Result<(), DocumentError> {
        for (path, item) in &self.spec.paths.paths {
            let item = match item {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { reference } => self
                    .resolve_path_item(item)
                    .ok_or_else(|| DocumentError::UnresolvedReference(reference.clone()))?,
            };
            let template = template_parameters(path)?;

            for (method, operation) in operations_of(item) {
                let invalid = |reason: String| DocumentError::InvalidOperation {
                    method: method.to_string(),
                    path: path.clone(),
                    reason,
                };

                let responses = &operation.responses;
                if responses.responses.is_empty() && responses.default.is_none() {
                    return Err(invalid("no responses declared".to_string()));
                }

                let declared: BTreeSet<&str> = item
                    .parameters
                    .iter()
                    .chain(&operation.parameters)
                    .filter_map(|parameter| match self.resolve_parameter(parameter)? {
                        Parameter::Path { parameter_data, .. } => {
                            Some(parameter_data.name.as_str())
                        }
                        _ => None,
                    })
                    .collect();

                if let Some(name) = template.difference(&declared).next() {
                    return Err(invalid(format!("path parameter {:?} is not declared", name)));
                }
                if let Some(name) = declared.difference(&template).next() {
                    return Err(invalid(format!(
                        "path parameter {:?} does not appear in the path",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Follow `#/paths/...` references to the path item they name
    pub fn resolve_path_item<'a>(
        &'a self,
        mut item: &'a ReferenceOr<PathItem>,
    ) -> Option<&'a PathItem> {
        for _ in 0..MAX_REFERENCE_HOPS {
            match item {
                ReferenceOr::Item(value) => return Some(value),
                ReferenceOr::Reference { reference } => {
                    let key = reference
                        .strip_prefix(LOCAL_PATHS)?
                        .replace("~1", "/")
                        .replace("~0", "~");
                    item = self.spec.paths.paths.get(key.as_str())?;
                }
            }
        }
        None
    }

    pub fn resolve_response<'a>(
        &'a self,
        item: &'a ReferenceOr<Response>,
    ) -> Option<&'a Response> {
        self.follow(item, COMPONENT_RESPONSES, |components, name| {
            components.responses.get(name)
        })
    }

    pub fn resolve_parameter<'a>(
        &'a self,
        item: &'a ReferenceOr<Parameter>,
    ) -> Option<&'a Parameter> {
        self.follow(item, COMPONENT_PARAMETERS, |components, name| {
            components.parameters.get(name)
        })
    }

    pub fn resolve_header<'a>(&'a self, item: &'a ReferenceOr<Header>) -> Option<&'a Header> {
        self.follow(item, COMPONENT_HEADERS, |components, name| {
            components.headers.get(name)
        })
    }

    pub fn resolve_example<'a>(&'a self, item: &'a ReferenceOr<Example>) -> Option<&'a Example> {
        self.follow(item, COMPONENT_EXAMPLES, |components, name| {
            components.examples.get(name)
        })
    }

    pub fn resolve_schema<'a>(&'a self, item: &'a ReferenceOr<Schema>) -> Option<&'a Schema> {
        self.follow(item, COMPONENT_SCHEMAS, |components, name| {
            components.schemas.get(name)
        })
    }

    fn schema_by_reference(&self, reference: &str) -> Option<&Schema> {
        let name = reference.strip_prefix(COMPONENT_SCHEMAS)?;
        let item = self.components()?.schemas.get(name)?;
        self.resolve_schema(item)
    }

    fn components(&self) -> Option<&Components> {
        self.spec.components.as_ref()
    }

    fn follow<'a, T>(
        &'a self,
        mut item: &'a ReferenceOr<T>,
        prefix: &str,
        lookup: impl Fn(&'a Components, &str) -> Option<&'a ReferenceOr<T>>,
    ) -> Option<&'a T> {
        for _ in 0..MAX_REFERENCE_HOPS {
            match item {
                ReferenceOr::Item(value) => return Some(value),
                ReferenceOr::Reference { reference } => {
                    let name = reference.strip_prefix(prefix)?;
                    item = lookup(self.components()?, name)?;
                }
            }
        }
        None
    }

    /// Lower an OpenAPI schema into a [`SchemaNode`] tree for example synthesis.
    ///
    /// A schema reached again through its own `$ref` chain lowers to
    /// [`SchemaType::Unknown`], as does anything nested deeper than `limits.max_depth`
    /// or expanded after `limits.max_nodes` nodes.
    pub fn lower_schema(
        &self,
        schema: &ReferenceOr<Schema>,
        limits: SchemaLimits,
    ) -> Option<SchemaNode> {
        SchemaLowering {
            document: self,
            max_depth: limits.max_depth,
            remaining: limits.max_nodes,
            active: Vec::new(),
        }
        .lower_reference_or(schema, 0)
    }
}

struct SchemaLowering<'a> {
    document: &'a OpenApiDocument,
    max_depth: usize,
    remaining: usize,
    /// `$ref` targets currently being expanded
    active: Vec<&'a str>,
}

impl<'a> SchemaLowering<'a> {
    fn lower_reference_or(
        &mut self,
        schema: &'a ReferenceOr<Schema>,
        depth: usize,
    ) -> Option<SchemaNode> {
        match schema {
            ReferenceOr::Item(schema) => Some(self.lower(schema, depth)),
            ReferenceOr::Reference { reference } => self.lower_reference(reference, depth),
        }
    }

    fn lower_boxed(
        &mut self,
        schema: &'a ReferenceOr<Box<Schema>>,
        depth: usize,
    ) -> Option<SchemaNode> {
        match schema {
            ReferenceOr::Item(schema) => Some(self.lower(schema, depth)),
            ReferenceOr::Reference { reference } => self.lower_reference(reference, depth),
        }
    }

    fn lower_reference(&mut self, reference: &'a str, depth: usize) -> Option<SchemaNode> {
        if self.active.contains(&reference) {
            return Some(SchemaNode::default());
        }
        let schema = self.document.schema_by_reference(reference)?;

        self.active.push(reference);
        let node = self.lower(schema, depth);
        self.active.pop();

        Some(node)
    }

    fn lower(&mut self, schema: &'a Schema, depth: usize) -> SchemaNode {
        let kind = if depth >= self.max_depth || self.remaining == 0 {
            SchemaType::Unknown
        } else {
            self.remaining -= 1;
            match &schema.schema_kind {
                SchemaKind::Type(Type::Object(object)) => SchemaType::Object {
                    properties: object
                        .properties
                        .iter()
                        .map(|(name, property)| {
                            (name.clone(), self.lower_boxed(property, depth + 1))
                        })
                        .collect(),
                },
                SchemaKind::Type(Type::Array(array)) => SchemaType::Array {
                    items: array
                        .items
                        .as_ref()
                        .and_then(|items| self.lower_boxed(items, depth + 1))
                        .map(Box::new),
                },
                SchemaKind::Type(Type::Integer(_)) => SchemaType::Integer,
                SchemaKind::Type(Type::Number(_)) => SchemaType::Number,
                SchemaKind::Type(Type::Boolean(_)) => SchemaType::Boolean,
                SchemaKind::Type(Type::String(string)) => SchemaType::String {
                    enumeration: string
                        .enumeration
                        .iter()
                        .flatten()
                        .map(|value| Value::String(value.clone()))
                        .collect(),
                },
                _ => SchemaType::Unknown,
            }
        };

        SchemaNode {
            example: schema.schema_data.example.clone(),
            default: schema.schema_data.default.clone(),
            kind,
        }
    }
}

/// Declared operations of a path item, sorted by uppercase method name
pub(crate) fn operations_of(item: &PathItem) -> Vec<(&'static str, &Operation)> {
    [
        ("DELETE", &item.delete),
        ("GET", &item.get),
        ("HEAD", &item.head),
        ("OPTIONS", &item.options),
        ("PATCH", &item.patch),
        ("POST", &item.post),
        ("PUT", &item.put),
        ("TRACE", &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|operation| (method, operation)))
    .sorted_by_key(|(method, _)| *method)
    .collect()
}

/// Names of the `{name}` segments of a path template
fn template_parameters(path: &str) -> Result<BTreeSet<&str>, DocumentError> {
    static TEMPLATE_RE: OnceLock<Regex> = OnceLock::new();
    let template_re =
        TEMPLATE_RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("Invalid regex constant"));

    let stray = template_re.replace_all(path, "");
    if stray.contains(['{', '}']) {
        return Err(DocumentError::UnbalancedTemplate(path.to_string()));
    }

    Ok(template_re
        .captures_iter(path)
        .filter_map(|capture| capture.get(1))
        .map(|name| name.as_str())
        .collect())
}

/// Convert YAML into JSON, turning scalar mapping keys such as unquoted `200` into strings
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value, DocumentError> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| DocumentError::Syntax(format!("unsupported number {}", n)))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(DocumentError::Syntax(format!(
                            "unsupported mapping key {:?}",
                            other
                        )))
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Reject `$ref`s that leave the document or point at nothing inside it.
///
/// `names` is set while walking a map keyed by user-chosen names, where no key is literal data.
fn check_references(node: &Value, root: &Value, names: bool) -> Result<(), DocumentError> {
    match node {
        Value::Object(map) => {
            if let (false, Some(Value::String(reference))) = (names, map.get("$ref")) {
                let Some(pointer) = reference.strip_prefix('#') else {
                    return Err(DocumentError::ExternalReference(reference.clone()));
                };
                if root.pointer(pointer).is_none() {
                    return Err(DocumentError::UnresolvedReference(reference.clone()));
                }
            }
            map.iter().try_for_each(|(key, child)| {
                if names {
                    return check_references(child, root, false);
                }
                if LITERAL_KEYS.contains(&key.as_str()) || key.starts_with("x-") {
                    return Ok(());
                }
                check_references(child, root, NAME_MAPS.contains(&key.as_str()))
            })
        }
        Value::Array(items) => items
            .iter()
            .try_for_each(|child| check_references(child, root, false)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::schema_example::synthesize_example;
    use serde_json::json;

    const MINIMAL: &str = r#"
openapi: 3.0.3
info:
  title: Demo
  version: "1.0"
paths:
  /users:
    get:
      responses:
        "200":
          description: ok
"#;

    #[test]
    fn test_parses_yaml_and_json() {
        assert!(OpenApiDocument::parse(MINIMAL.as_bytes()).is_ok());

        let json = json!({
            "openapi": "3.0.0",
            "info": {"title": "Demo", "version": "1"},
            "paths": {"/a": {"get": {"responses": {"200": {"description": "ok"}}}}}
        });
        let document = OpenApiDocument::parse(json.to_string().as_bytes()).unwrap();
        assert_eq!(document.spec().paths.paths.len(), 1);
    }

    #[test]
    fn test_unquoted_response_codes() {
        let doc = "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  /a:\n    get:\n      \
                   responses:\n        200: {description: ok}\n        default: {description: error}\n";
        let document = OpenApiDocument::parse(doc.as_bytes()).unwrap();
        let operation = match &document.spec().paths.paths["/a"] {
            ReferenceOr::Item(item) => item.get.as_ref().unwrap(),
            ReferenceOr::Reference { .. } => panic!("unexpected path reference"),
        };
        assert_eq!(operation.responses.responses.len(), 1);
        assert!(operation.responses.default.is_some());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(matches!(
            OpenApiDocument::parse(b"openapi: [unclosed"),
            Err(DocumentError::Syntax(_))
        ));
        assert!(matches!(
            OpenApiDocument::parse(&[0xff, 0xfe, 0x00]),
            Err(DocumentError::Encoding)
        ));
        assert!(matches!(
            OpenApiDocument::parse(b"- just\n- a list\n"),
            Err(DocumentError::Structure(_))
        ));
        // info is required
        assert!(matches!(
            OpenApiDocument::parse(b"openapi: 3.0.0\npaths: {}\n"),
            Err(DocumentError::Structure(_))
        ));
    }

    #[test]
    fn test_rejects_swagger_2() {
        let doc = "openapi: 2.0.0\ninfo: {title: t, version: v}\npaths: {}\n";
        assert_eq!(
            OpenApiDocument::parse(doc.as_bytes()).unwrap_err(),
            DocumentError::UnsupportedVersion("2.0.0".to_string())
        );
    }

    #[test]
    fn test_rejects_relative_paths() {
        let doc = "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  users: {}\n";
        assert_eq!(
            OpenApiDocument::parse(doc.as_bytes()).unwrap_err(),
            DocumentError::InvalidPath("users".to_string())
        );
    }

    #[test]
    fn test_rejects_external_and_dangling_references() {
        let external = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "other.yaml#/components/schemas/User"
"##;
        assert_eq!(
            OpenApiDocument::parse(external.as_bytes()).unwrap_err(),
            DocumentError::ExternalReference("other.yaml#/components/schemas/User".to_string())
        );

        let dangling = external.replace("other.yaml#", "#");
        assert_eq!(
            OpenApiDocument::parse(dangling.as_bytes()).unwrap_err(),
            DocumentError::UnresolvedReference("#/components/schemas/User".to_string())
        );
    }

    #[test]
    fn test_size_limit() {
        assert_eq!(
            OpenApiDocument::parse_with_limit(MINIMAL.as_bytes(), 10).unwrap_err(),
            DocumentError::TooLarge {
                size: MINIMAL.len(),
                limit: 10
            }
        );
    }

    #[test]
    fn test_lowering_resolves_component_schemas() {
        let doc = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths: {}
components:
  schemas:
    User:
      type: object
      properties:
        id: {type: integer}
        role: {$ref: "#/components/schemas/Role"}
    Role:
      type: string
      enum: [admin, member]
"##;
        let document = OpenApiDocument::parse(doc.as_bytes()).unwrap();
        let user = ReferenceOr::ref_("#/components/schemas/User");
        let node = document.lower_schema(&user, SchemaLimits::default()).unwrap();
        assert_eq!(
            synthesize_example(&node),
            Some(json!({"id": 0, "role": "admin"}))
        );
    }

    #[test]
    fn test_self_referencing_schema_terminates() {
        let doc = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths: {}
components:
  schemas:
    Node:
      type: object
      properties:
        name: {type: string}
        parent: {$ref: "#/components/schemas/Node"}
        children:
          type: array
          items: {$ref: "#/components/schemas/Node"}
"##;
        let document = OpenApiDocument::parse(doc.as_bytes()).unwrap();
        let node = document
            .lower_schema(
                &ReferenceOr::ref_("#/components/schemas/Node"),
                SchemaLimits::default(),
            )
            .unwrap();
        assert_eq!(
            synthesize_example(&node),
            Some(json!({"name": "", "parent": null, "children": []}))
        );
    }

    #[test]
    fn test_depth_limit_cuts_nesting() {
        let doc = r#"
openapi: 3.0.0
info: {title: t, version: v}
paths: {}
components:
  schemas:
    Outer:
      type: object
      properties:
        inner:
          type: object
          properties:
            value: {type: integer}
"#;
        let document = OpenApiDocument::parse(doc.as_bytes()).unwrap();
        let outer = ReferenceOr::ref_("#/components/schemas/Outer");
        let limits = SchemaLimits {
            max_depth: 2,
            ..Default::default()
        };
        let node = document.lower_schema(&outer, limits).unwrap();
        assert_eq!(
            synthesize_example(&node),
            Some(json!({"inner": {"value": null}}))
        );
    }

    fn fan_out_document(levels: usize) -> String {
        let mut doc = String::from(
            "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths: {}\ncomponents:\n  schemas:\n",
        );
        for level in 0..levels {
            doc.push_str(&format!(
                "    S{0}:\n      type: object\n      properties:\n        \
                 left: {{$ref: \"#/components/schemas/S{1}\"}}\n        \
                 right: {{$ref: \"#/components/schemas/S{1}\"}}\n",
                level,
                level + 1
            ));
        }
        doc.push_str(&format!("    S{}:\n      type: integer\n", levels));
        doc
    }

    fn count_nodes(node: &SchemaNode) -> usize {
        1 + match &node.kind {
            SchemaType::Object { properties } => properties
                .iter()
                .filter_map(|(_, property)| property.as_ref())
                .map(count_nodes)
                .sum(),
            SchemaType::Array { items } => items.as_deref().map_or(0, count_nodes),
            _ => 0,
        }
    }

    #[test]
    fn test_shared_references_expand_fully_within_budget() {
        let document = OpenApiDocument::parse(fan_out_document(3).as_bytes()).unwrap();
        let node = document
            .lower_schema(&ReferenceOr::ref_("#/components/schemas/S0"), SchemaLimits::default())
            .unwrap();
        assert_eq!(count_nodes(&node), 15);
        assert_eq!(
            synthesize_example(&node).unwrap()["left"]["right"]["left"],
            json!(0)
        );
    }

    #[test]
    fn test_node_budget_bounds_fan_out() {
        // 2^31 nodes without a budget
        let document = OpenApiDocument::parse(fan_out_document(30).as_bytes()).unwrap();
        let limits = SchemaLimits {
            max_depth: 64,
            max_nodes: 500,
        };
        let node = document
            .lower_schema(&ReferenceOr::ref_("#/components/schemas/S0"), limits)
            .unwrap();

        // Every expanded object adds at most two unexpanded leaves
        assert!(count_nodes(&node) <= 3 * 500);
        assert!(synthesize_example(&node).is_some());
    }

    fn operation_error(doc: &str) -> DocumentError {
        OpenApiDocument::parse(doc.as_bytes()).unwrap_err()
    }

    #[test]
    fn test_rejects_operation_without_responses() {
        let doc = "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  /a:\n    get:\n      \
                   responses: {}\n";
        assert_eq!(
            operation_error(doc),
            DocumentError::InvalidOperation {
                method: "GET".to_string(),
                path: "/a".to_string(),
                reason: "no responses declared".to_string(),
            }
        );

        let default_only = doc.replace("{}", "{default: {description: error}}");
        assert!(OpenApiDocument::parse(default_only.as_bytes()).is_ok());
    }

    #[test]
    fn test_path_parameters_must_match_template() {
        let undeclared = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a/{id}:
    get:
      responses:
        "200": {description: ok}
"##;
        assert_eq!(
            operation_error(undeclared),
            DocumentError::InvalidOperation {
                method: "GET".to_string(),
                path: "/a/{id}".to_string(),
                reason: "path parameter \"id\" is not declared".to_string(),
            }
        );

        let extra = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a:
    get:
      parameters:
        - {name: id, in: path, required: true, schema: {type: string}}
      responses:
        "200": {description: ok}
"##;
        assert!(matches!(
            operation_error(extra),
            DocumentError::InvalidOperation { reason, .. }
                if reason == "path parameter \"id\" does not appear in the path"
        ));

        assert_eq!(
            operation_error(
                r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "v"}, "paths": {"/a/{id": {}}}"#
            ),
            DocumentError::UnbalancedTemplate("/a/{id".to_string())
        );
    }

    #[test]
    fn test_path_parameters_from_item_and_components() {
        let doc = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /orgs/{org}/users/{id}:
    parameters:
      - {name: org, in: path, required: true, schema: {type: string}}
    get:
      parameters:
        - $ref: "#/components/parameters/UserId"
        - {name: verbose, in: query, schema: {type: boolean}}
      responses:
        "200": {description: ok}
components:
  parameters:
    UserId: {name: id, in: path, required: true, schema: {type: integer}}
"##;
        assert!(OpenApiDocument::parse(doc.as_bytes()).is_ok());
    }

    #[test]
    fn test_path_item_references() {
        let doc = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a:
    get:
      responses:
        "200": {description: ok}
  /b:
    $ref: "#/paths/~1a"
components:
  schemas:
    Thing: {type: string}
"##;
        let document = OpenApiDocument::parse(doc.as_bytes()).unwrap();
        let b = &document.spec().paths.paths["/b"];
        assert!(document.resolve_path_item(b).unwrap().get.is_some());

        let not_a_path = doc.replace("#/paths/~1a", "#/components/schemas/Thing");
        assert_eq!(
            operation_error(&not_a_path),
            DocumentError::UnresolvedReference("#/components/schemas/Thing".to_string())
        );
    }

    #[test]
    fn test_literal_values_are_not_references() {
        let doc = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              example: {"$ref": "https://example.com/a", "id": 1}
              examples:
                one:
                  value: {"$ref": "other.yaml"}
              schema:
                type: object
                default: {"$ref": "#/nowhere"}
                properties:
                  default: {$ref: "#/components/schemas/Id"}
components:
  schemas:
    Id: {type: integer}
"##;
        assert!(OpenApiDocument::parse(doc.as_bytes()).is_ok());

        // Names that look like literal keys are still checked
        let dangling_property = doc.replace(
            "default: {$ref: \"#/components/schemas/Id\"}",
            "default: {$ref: \"#/components/schemas/Missing\"}",
        );
        assert_eq!(
            operation_error(&dangling_property),
            DocumentError::UnresolvedReference("#/components/schemas/Missing".to_string())
        );

        let dangling_default_response = r##"
openapi: 3.0.0
info: {title: t, version: v}
paths:
  /a:
    get:
      responses:
        default: {$ref: "#/components/responses/Error"}
"##;
        assert_eq!(
            operation_error(dangling_default_response),
            DocumentError::UnresolvedReference("#/components/responses/Error".to_string())
        );
    }
}
