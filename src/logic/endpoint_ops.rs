use crate::error::{ServiceError, ServiceResult};
use crate::logic::bulk_create::REASON_ROUTE_TAKEN;
use crate::logic::project_ops::ProjectOperations;
use crate::model::{now, Endpoint, EndpointDefinition, EndpointUpdate, Id, User};
use crate::store::traits::{DuplicateEndpoint, Store};

/// Single-endpoint CRUD scoped to projects the actor can see
pub struct EndpointOperations;

impl EndpointOperations {
    pub async fn create<S: Store>(
        store: &S,
        project_id: &Id,
        actor: &User,
        definition: EndpointDefinition,
    ) -> ServiceResult<Endpoint> {
        let project = ProjectOperations::resolve_for_actor(store, project_id, actor).await?;
        let definition = definition.normalized().map_err(ServiceError::BadRequest)?;

        if store
            .find_endpoint(&project.id, &definition.method, &definition.path)
            .await?
            .is_some()
        {
            return Err(route_taken());
        }

        store
            .create_endpoint(Endpoint::new(project.id, actor.id.clone(), definition))
            .await
            .map_err(conflict_or_internal)
    }

    pub async fn list<S: Store>(
        store: &S,
        project_id: &Id,
        actor: &User,
    ) -> ServiceResult<Vec<Endpoint>> {
        let project = ProjectOperations::resolve_for_actor(store, project_id, actor).await?;
        Ok(store.list_endpoints_for_project(&project.id).await?)
    }

    /// Endpoints in projects the actor cannot see are reported as not found
    pub async fn get<S: Store>(
        store: &S,
        endpoint_id: &Id,
        actor: &User,
    ) -> ServiceResult<Endpoint> {
        let endpoint = store
            .get_endpoint(endpoint_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("endpoint"))?;

        match ProjectOperations::resolve_for_actor(store, &endpoint.project_id, actor).await {
            Ok(_) => Ok(endpoint),
            Err(ServiceError::NotFound(_)) => Err(ServiceError::not_found("endpoint")),
            Err(e) => Err(e),
        }
    }

    pub async fn update<S: Store>(
        store: &S,
        endpoint_id: &Id,
        actor: &User,
        update: EndpointUpdate,
    ) -> ServiceResult<Endpoint> {
        let mut endpoint = Self::get(store, endpoint_id, actor).await?;
        let definition = update
            .apply_to(endpoint.definition())
            .normalized()
            .map_err(ServiceError::BadRequest)?;

        if !endpoint.matches(&definition.method, &definition.path) {
            let clash = store
                .find_endpoint(&endpoint.project_id, &definition.method, &definition.path)
                .await?;
            if clash.is_some_and(|other| other.id != endpoint.id) {
                return Err(route_taken());
            }
        }

        endpoint.method = definition.method;
        endpoint.path = definition.path;
        endpoint.response_status = definition.response_status;
        endpoint.response_body = definition.response_body;
        endpoint.response_headers = definition.response_headers;
        endpoint.updated_at = now();
        endpoint.updated_by = actor.id.clone();

        store
            .update_endpoint(endpoint.clone())
            .await
            .map_err(conflict_or_internal)?;
        Ok(endpoint)
    }

    pub async fn delete<S: Store>(store: &S, endpoint_id: &Id, actor: &User) -> ServiceResult<()> {
        let endpoint = Self::get(store, endpoint_id, actor).await?;
        if !store.delete_endpoint(&endpoint.id, &actor.id).await? {
            return Err(ServiceError::not_found("endpoint"));
        }
        Ok(())
    }
}

fn route_taken() -> ServiceError {
    ServiceError::Conflict(REASON_ROUTE_TAKEN.to_string())
}

fn conflict_or_internal(e: anyhow::Error) -> ServiceError {
    if e.is::<DuplicateEndpoint>() {
        route_taken()
    } else {
        ServiceError::Internal(e)
    }
}
