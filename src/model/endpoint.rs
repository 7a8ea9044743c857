use serde::{Deserialize, Serialize};

use crate::model::{generate_id, now, Id, Timestamp};

pub const DEFAULT_RESPONSE_STATUS: i32 = 200;

fn default_response_status() -> i32 {
    DEFAULT_RESPONSE_STATUS
}

/// Method, path and canned response of a mock endpoint, as submitted by a caller
/// or extracted from an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub method: String,
    pub path: String,
    #[serde(default = "default_response_status")]
    pub response_status: i32,
    #[serde(default)]
    pub response_body: String,
    /// JSON-encoded map of header name to value, or empty
    #[serde(default)]
    pub response_headers: String,
}

impl EndpointDefinition {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            response_status: DEFAULT_RESPONSE_STATUS,
            response_body: String::new(),
            response_headers: String::new(),
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.response_status = status;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.response_headers = headers.into();
        self
    }

    /// Uppercase the method, default a zero status and check the remaining fields.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.method = self.method.trim().to_uppercase();
        if self.method.is_empty() {
            return Err("method is required".to_string());
        }
        if !self.path.starts_with('/') {
            return Err(format!("path must start with '/': {:?}", self.path));
        }
        if self.response_status == 0 {
            self.response_status = DEFAULT_RESPONSE_STATUS;
        }
        if !(100..=599).contains(&self.response_status) {
            return Err(format!("invalid response status {}", self.response_status));
        }
        Ok(self)
    }
}

/// A persisted mock endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: Id,
    pub project_id: Id,
    pub method: String,
    pub path: String,
    pub response_status: i32,
    pub response_body: String,
    pub response_headers: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: Id,
    pub updated_by: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<Id>,
}

impl Endpoint {
    pub fn new(project_id: Id, actor_id: Id, definition: EndpointDefinition) -> Self {
        let created_at = now();
        Self {
            id: generate_id(),
            project_id,
            method: definition.method,
            path: definition.path,
            response_status: definition.response_status,
            response_body: definition.response_body,
            response_headers: definition.response_headers,
            created_at,
            updated_at: created_at,
            created_by: actor_id.clone(),
            updated_by: actor_id,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }

    pub fn definition(&self) -> EndpointDefinition {
        EndpointDefinition {
            method: self.method.clone(),
            path: self.path.clone(),
            response_status: self.response_status,
            response_body: self.response_body.clone(),
            response_headers: self.response_headers.clone(),
        }
    }
}

/// Partial update of an endpoint; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointUpdate {
    pub method: Option<String>,
    pub path: Option<String>,
    pub response_status: Option<i32>,
    pub response_body: Option<String>,
    pub response_headers: Option<String>,
}

impl EndpointUpdate {
    pub fn apply_to(self, definition: EndpointDefinition) -> EndpointDefinition {
        EndpointDefinition {
            method: self.method.unwrap_or(definition.method),
            path: self.path.unwrap_or(definition.path),
            response_status: self.response_status.unwrap_or(definition.response_status),
            response_body: self.response_body.unwrap_or(definition.response_body),
            response_headers: self.response_headers.unwrap_or(definition.response_headers),
        }
    }
}
