use anyhow::Result;
use std::collections::HashSet;

use crate::model::{ExtractedOperation, Id, ImportPreview, OperationPreview, OperationStatus};
use crate::store::traits::EndpointStore;

pub const REASON_DUPLICATE_IN_DOCUMENT: &str = "duplicate operation in uploaded document";
pub const REASON_ALREADY_EXISTS: &str = "endpoint already exists";

/// Classifies extracted operations against the live endpoints of one project
pub struct ImportClassifier;

impl ImportClassifier {
    /// Label every operation as new, existing or duplicate, in input order.
    ///
    /// The first occurrence of a (method, path) pair is checked against the store;
    /// later occurrences are duplicates without a lookup. A failed lookup aborts
    /// the whole preview.
    pub async fn classify<S: EndpointStore + ?Sized>(
        store: &S,
        project_id: &Id,
        operations: Vec<ExtractedOperation>,
    ) -> Result<ImportPreview> {
        let mut preview = ImportPreview {
            total_operations: operations.len(),
            ..Default::default()
        };
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for operation in operations {
            let key = (operation.method.clone(), operation.path.clone());

            let (status, reason) = if !seen.insert(key) {
                (OperationStatus::Duplicate, Some(REASON_DUPLICATE_IN_DOCUMENT))
            } else if store
                .find_endpoint(project_id, &operation.method, &operation.path)
                .await?
                .is_some()
            {
                (OperationStatus::Existing, Some(REASON_ALREADY_EXISTS))
            } else {
                (OperationStatus::New, None)
            };

            preview.push(OperationPreview {
                operation,
                status,
                reason: reason.map(str::to_string),
            });
        }

        log::info!(
            "Classified {} operations for project {}: {} new, {} existing, {} duplicate",
            preview.total_operations,
            project_id,
            preview.new_count,
            preview.existing_count,
            preview.skipped_count
        );

        Ok(preview)
    }
}
