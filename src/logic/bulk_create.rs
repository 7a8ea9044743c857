use crate::model::{BulkCreateResult, Endpoint, EndpointDefinition, Id, SkippedEndpoint};
use crate::store::traits::{DuplicateEndpoint, EndpointStore};

pub const REASON_ROUTE_TAKEN: &str = "endpoint with same method and path already exists";

/// Persists submitted endpoint definitions one by one, recording per-item failures
pub struct BulkCreator;

impl BulkCreator {
    /// Create every definition in submitted order.
    ///
    /// Nothing here fails the batch: invalid definitions, routes already taken
    /// and store errors all end up in `skipped` with their reason. Items that
    /// fail validation or the existence re-check never reach `create_endpoint`.
    pub async fn create_all<S: EndpointStore + ?Sized>(
        store: &S,
        project_id: &Id,
        actor_id: &Id,
        definitions: Vec<EndpointDefinition>,
    ) -> BulkCreateResult {
        let mut result = BulkCreateResult::default();

        for definition in definitions {
            let (method, path) = (definition.method.clone(), definition.path.clone());
            match Self::create_one(store, project_id, actor_id, definition).await {
                Ok(endpoint) => result.created.push(endpoint),
                Err(reason) => {
                    log::warn!("Skipped {} {} in project {}: {}", method, path, project_id, reason);
                    result.skipped.push(SkippedEndpoint {
                        method,
                        path,
                        reason,
                    });
                }
            }
        }

        log::info!(
            "Bulk create for project {}: {} created, {} skipped",
            project_id,
            result.created.len(),
            result.skipped.len()
        );

        result
    }

    async fn create_one<S: EndpointStore + ?Sized>(
        store: &S,
        project_id: &Id,
        actor_id: &Id,
        definition: EndpointDefinition,
    ) -> Result<Endpoint, String> {
        let definition = definition.normalized()?;

        let existing = store
            .find_endpoint(project_id, &definition.method, &definition.path)
            .await
            .map_err(|e| e.to_string())?;
        if existing.is_some() {
            return Err(REASON_ROUTE_TAKEN.to_string());
        }

        let endpoint = Endpoint::new(project_id.clone(), actor_id.clone(), definition);
        store.create_endpoint(endpoint).await.map_err(|e| {
            // A concurrent request can win the race between the check and the insert
            if e.is::<DuplicateEndpoint>() {
                REASON_ROUTE_TAKEN.to_string()
            } else {
                e.to_string()
            }
        })
    }
}
