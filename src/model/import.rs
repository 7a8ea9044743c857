use serde::{Deserialize, Serialize};

use crate::model::{Endpoint, EndpointDefinition};

/// One (method, path) operation lifted out of an uploaded OpenAPI document.
///
/// It has the same shape as a submitted definition but is never persisted
/// without going through classification first.
pub type ExtractedOperation = EndpointDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    New,
    Existing,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationPreview {
    #[serde(flatten)]
    pub operation: ExtractedOperation,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Dry-run classification of an uploaded document against a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub total_operations: usize,
    pub new_count: usize,
    pub existing_count: usize,
    /// Operations repeated within the uploaded document
    pub skipped_count: usize,
    pub operations: Vec<OperationPreview>,
}

impl ImportPreview {
    pub fn push(&mut self, preview: OperationPreview) {
        match preview.status {
            OperationStatus::New => self.new_count += 1,
            OperationStatus::Existing => self.existing_count += 1,
            OperationStatus::Duplicate => self.skipped_count += 1,
        }
        self.operations.push(preview);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEndpoint {
    pub method: String,
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateResult {
    pub created: Vec<Endpoint>,
    pub skipped: Vec<SkippedEndpoint>,
}
