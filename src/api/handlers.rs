use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ImportConfig;
use crate::error::ServiceError;
use crate::logic::{
    EndpointOperations, OpenApiImport, OrganisationOperations, ProjectOperations, UserOperations,
};
use crate::model::{
    BulkCreateResult, Endpoint, EndpointDefinition, EndpointUpdate, Id, ImportPreview,
    NewOrganisation, NewProject, NewUser, Organisation, Project, User, UserContext, UserProfile,
};
use crate::store::traits::Store;

/// Shared handler state: the store plus the import limits
pub struct AppState<S> {
    pub store: Arc<S>,
    pub import: ImportConfig,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, import: ImportConfig) -> Self {
        Self { store, import }
    }
}

// Derived Clone would require S: Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            import: self.import.clone(),
        }
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: ImportPreview,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub result: BulkCreateResult,
}

/// Map a service failure onto the HTTP status and error body returned to the caller
pub fn error_response(error: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        ServiceError::InvalidDocument(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(e) => {
            log::error!("Internal error: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal server error")),
            );
        }
    };
    (status, Json(ErrorResponse::new(&error.to_string())))
}

async fn resolve_actor<S: Store>(state: &AppState<S>, context: &UserContext) -> ApiResult<User> {
    UserOperations::resolve_actor(&*state.store, context)
        .await
        .map_err(error_response)
}

// User handlers
pub async fn register_user<S: Store>(
    State(state): State<AppState<S>>,
    RequestJson(new_user): RequestJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = UserOperations::register(&*state.store, new_user)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_current_user<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
) -> ApiResult<Json<UserProfile>> {
    let actor = resolve_actor(&state, &context).await?;
    UserOperations::profile(&*state.store, actor)
        .await
        .map(Json)
        .map_err(error_response)
}

// Organisation handlers
pub async fn create_organisation<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    RequestJson(new_organisation): RequestJson<NewOrganisation>,
) -> ApiResult<(StatusCode, Json<Organisation>)> {
    let actor = resolve_actor(&state, &context).await?;
    let organisation = OrganisationOperations::create(&*state.store, &actor, new_organisation)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

pub async fn list_organisations<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
) -> ApiResult<Json<ListResponse<Organisation>>> {
    let actor = resolve_actor(&state, &context).await?;
    OrganisationOperations::list(&*state.store, &actor)
        .await
        .map(|items| Json(items.into()))
        .map_err(error_response)
}

// Project handlers
pub async fn create_project<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    RequestJson(new_project): RequestJson<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let actor = resolve_actor(&state, &context).await?;
    let project = ProjectOperations::create(&*state.store, &actor, new_project)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
) -> ApiResult<Json<ListResponse<Project>>> {
    let actor = resolve_actor(&state, &context).await?;
    ProjectOperations::list(&*state.store, &actor)
        .await
        .map(|items| Json(items.into()))
        .map_err(error_response)
}

pub async fn get_project<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
) -> ApiResult<Json<Project>> {
    let actor = resolve_actor(&state, &context).await?;
    ProjectOperations::resolve_for_actor(&*state.store, &project_id, &actor)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_project<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
) -> ApiResult<StatusCode> {
    let actor = resolve_actor(&state, &context).await?;
    ProjectOperations::delete(&*state.store, &project_id, &actor)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

// Endpoint handlers
pub async fn create_endpoint<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
    RequestJson(definition): RequestJson<EndpointDefinition>,
) -> ApiResult<(StatusCode, Json<Endpoint>)> {
    let actor = resolve_actor(&state, &context).await?;
    let endpoint = EndpointOperations::create(&*state.store, &project_id, &actor, definition)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(endpoint)))
}

pub async fn list_endpoints<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
) -> ApiResult<Json<ListResponse<Endpoint>>> {
    let actor = resolve_actor(&state, &context).await?;
    EndpointOperations::list(&*state.store, &project_id, &actor)
        .await
        .map(|items| Json(items.into()))
        .map_err(error_response)
}

pub async fn get_endpoint<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(endpoint_id): Path<Id>,
) -> ApiResult<Json<Endpoint>> {
    let actor = resolve_actor(&state, &context).await?;
    EndpointOperations::get(&*state.store, &endpoint_id, &actor)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_endpoint<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(endpoint_id): Path<Id>,
    RequestJson(update): RequestJson<EndpointUpdate>,
) -> ApiResult<Json<Endpoint>> {
    let actor = resolve_actor(&state, &context).await?;
    EndpointOperations::update(&*state.store, &endpoint_id, &actor, update)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_endpoint<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(endpoint_id): Path<Id>,
) -> ApiResult<StatusCode> {
    let actor = resolve_actor(&state, &context).await?;
    EndpointOperations::delete(&*state.store, &endpoint_id, &actor)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

// OpenAPI import handlers
pub async fn preview_openapi_import<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
    request: Request,
) -> ApiResult<Json<PreviewResponse>> {
    let actor = resolve_actor(&state, &context).await?;
    let document = read_document(request).await?;

    OpenApiImport::preview(&*state.store, &state.import, &project_id, &actor, &document)
        .await
        .map(|preview| Json(PreviewResponse { preview }))
        .map_err(error_response)
}

pub async fn bulk_create_endpoints<S: Store>(
    State(state): State<AppState<S>>,
    context: UserContext,
    Path(project_id): Path<Id>,
    RequestJson(request): RequestJson<BulkCreateRequest>,
) -> ApiResult<Json<BulkCreateResponse>> {
    let actor = resolve_actor(&state, &context).await?;
    OpenApiImport::bulk_create(&*state.store, &project_id, &actor, request.endpoints)
        .await
        .map(|result| Json(BulkCreateResponse { result }))
        .map_err(error_response)
}

/// Uploaded document bytes: the multipart `file` field, or the raw body otherwise
async fn read_document(request: Request) -> ApiResult<Bytes> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        return Bytes::from_request(request, &())
            .await
            .map_err(|e| bad_request(&e.to_string()));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| bad_request(&e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&e.to_string()))?
    {
        if field.name() == Some("file") {
            return field.bytes().await.map_err(|e| bad_request(&e.to_string()));
        }
    }

    Err(bad_request("missing multipart field \"file\""))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}
