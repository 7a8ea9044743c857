use crate::config::ImportConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::logic::bulk_create::BulkCreator;
use crate::logic::classification::ImportClassifier;
use crate::logic::openapi_document::{OpenApiDocument, SchemaLimits};
use crate::logic::operation_extractor::extract_operations;
use crate::logic::project_ops::ProjectOperations;
use crate::model::{BulkCreateResult, EndpointDefinition, Id, ImportPreview, User};
use crate::store::traits::Store;

/// Preview and commit steps of importing an OpenAPI document into a project
pub struct OpenApiImport;

impl OpenApiImport {
    /// Parse `document`, extract its operations and classify them against the project.
    ///
    /// Nothing is written. The project is resolved before the document is looked at.
    pub async fn preview<S: Store>(
        store: &S,
        config: &ImportConfig,
        project_id: &Id,
        actor: &User,
        document: &[u8],
    ) -> ServiceResult<ImportPreview> {
        let project = ProjectOperations::resolve_for_actor(store, project_id, actor).await?;

        let document = OpenApiDocument::parse_with_limit(document, config.max_document_bytes)
            .map_err(|e| ServiceError::InvalidDocument(e.to_string()))?;
        let operations = extract_operations(&document, SchemaLimits::from(config));

        Ok(ImportClassifier::classify(store, &project.id, operations).await?)
    }

    /// Persist the accepted definitions; per-item failures land in `skipped`
    pub async fn bulk_create<S: Store>(
        store: &S,
        project_id: &Id,
        actor: &User,
        definitions: Vec<EndpointDefinition>,
    ) -> ServiceResult<BulkCreateResult> {
        if definitions.is_empty() {
            return Err(ServiceError::BadRequest("no endpoints provided".to_string()));
        }

        let project = ProjectOperations::resolve_for_actor(store, project_id, actor).await?;
        Ok(BulkCreator::create_all(store, &project.id, &actor.id, definitions).await)
    }
}
