use itertools::Itertools;
use openapiv3::{MediaType, Operation, ParameterSchemaOrContent, Response, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::logic::openapi_document::{operations_of, OpenApiDocument, SchemaLimits};
use crate::logic::schema_example::synthesize_example;
use crate::model::{ExtractedOperation, DEFAULT_RESPONSE_STATUS};

/// Walks a validated document and turns every (path, method) into an [`ExtractedOperation`].
///
/// Output order is always paths sorted lexicographically, then methods sorted
/// lexicographically by their uppercase name, whatever order the document used.
pub struct OperationExtractor<'a> {
    document: &'a OpenApiDocument,
    limits: SchemaLimits,
}

/// A declared response together with its sort key and numeric status, if any
struct KeyedResponse<'a> {
    key: String,
    status: Option<i32>,
    response: &'a Response,
}

impl<'a> OperationExtractor<'a> {
    pub fn new(document: &'a OpenApiDocument, limits: SchemaLimits) -> Self {
        Self { document, limits }
    }

    pub fn extract(&self) -> Vec<ExtractedOperation> {
        let document = self.document;
        let paths = &document.spec().paths.paths;

        paths
            .keys()
            .sorted()
            .filter_map(|path| Some((path, document.resolve_path_item(&paths[path])?)))
            .flat_map(|(path, item)| {
                operations_of(item)
                    .into_iter()
                    .map(move |(method, operation)| self.build_operation(path, method, operation))
            })
            .collect()
    }

    fn build_operation(
        &self,
        path: &str,
        method: &str,
        operation: &'a Operation,
    ) -> ExtractedOperation {
        let (response_status, response_body) = self.status_and_body(operation);
        ExtractedOperation {
            method: method.to_string(),
            path: path.to_string(),
            response_status,
            response_body,
            response_headers: self.headers(operation),
        }
    }

    /// Non-"default" responses sorted by their code key; unresolvable ones are skipped
    fn sorted_responses(&self, operation: &'a Operation) -> Vec<KeyedResponse<'a>> {
        operation
            .responses
            .responses
            .iter()
            .filter_map(|(code, item)| {
                let response = self.document.resolve_response(item)?;
                let (key, status) = match code {
                    StatusCode::Code(code) => (code.to_string(), Some(i32::from(*code))),
                    StatusCode::Range(range) => (format!("{}XX", range), None),
                };
                Some(KeyedResponse {
                    key,
                    status,
                    response,
                })
            })
            .sorted_by(|a, b| a.key.cmp(&b.key))
            .collect()
    }

    /// Status and body of the first response, in code order, that yields a body
    fn status_and_body(&self, operation: &'a Operation) -> (i32, String) {
        self.sorted_responses(operation)
            .into_iter()
            .find_map(|keyed| {
                let body = self.response_body(keyed.response);
                (!body.is_empty())
                    .then(|| (keyed.status.unwrap_or(DEFAULT_RESPONSE_STATUS), body))
            })
            .unwrap_or((DEFAULT_RESPONSE_STATUS, String::new()))
    }

    fn response_body(&self, response: &Response) -> String {
        response
            .content
            .keys()
            .sorted()
            .find_map(|content_type| self.media_body(&response.content[content_type]))
            .unwrap_or_default()
    }

    fn media_body(&self, media: &MediaType) -> Option<String> {
        let value = media
            .example
            .clone()
            .or_else(|| self.first_named_example(media))
            .or_else(|| {
                let schema = self
                    .document
                    .lower_schema(media.schema.as_ref()?, self.limits)?;
                synthesize_example(&schema)
            })?;

        serde_json::to_string(&value)
            .ok()
            .filter(|body| !body.is_empty())
    }

    fn first_named_example(&self, media: &MediaType) -> Option<Value> {
        media
            .examples
            .keys()
            .sorted()
            .find_map(|name| self.document.resolve_example(&media.examples[name])?.value.clone())
    }

    /// JSON-encoded header map of the primary response, or empty when it declares none
    fn headers(&self, operation: &'a Operation) -> String {
        let Some(primary) = self.sorted_responses(operation).into_iter().next() else {
            return String::new();
        };

        let headers: BTreeMap<&str, String> = primary
            .response
            .headers
            .iter()
            .filter_map(|(name, item)| {
                let header = self.document.resolve_header(item)?;
                let schema = match &header.format {
                    ParameterSchemaOrContent::Schema(schema) => {
                        self.document.resolve_schema(schema)
                    }
                    ParameterSchemaOrContent::Content(_) => None,
                };

                let value = header
                    .example
                    .as_ref()
                    .or_else(|| schema.and_then(|s| s.schema_data.example.as_ref()))
                    .map(display_value)
                    .filter(|value| !value.is_empty())
                    .or_else(|| {
                        let default = schema?.schema_data.default.as_ref()?;
                        serde_json::to_string(default).ok()
                    })
                    .filter(|value| !value.is_empty())?;

                Some((name.as_str(), value))
            })
            .collect();

        if headers.is_empty() {
            return String::new();
        }

        serde_json::to_string(&headers).unwrap_or_default()
    }
}

/// Strings are used as-is, every other value is JSON-encoded
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Extract every operation of `document` in deterministic order
pub fn extract_operations(
    document: &OpenApiDocument,
    limits: SchemaLimits,
) -> Vec<ExtractedOperation> {
    OperationExtractor::new(document, limits).extract()
}
