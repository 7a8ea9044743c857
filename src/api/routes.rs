use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, mock_handlers, AppState};
use crate::config::ImportConfig;
use crate::store::traits::Store;

/// Room for multipart framing around an uploaded document
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router<S: Store + 'static>(import: &ImportConfig) -> Router<AppState<S>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users and organisations
        .route("/users", post(handlers::register_user::<S>))
        .route("/user", get(handlers::get_current_user::<S>))
        .route(
            "/organisations",
            post(handlers::create_organisation::<S>).get(handlers::list_organisations::<S>),
        )
        // Projects
        .route(
            "/projects",
            post(handlers::create_project::<S>).get(handlers::list_projects::<S>),
        )
        .route(
            "/projects/:project_id",
            get(handlers::get_project::<S>).delete(handlers::delete_project::<S>),
        )
        // Endpoints
        .route(
            "/projects/:project_id/endpoints",
            post(handlers::create_endpoint::<S>).get(handlers::list_endpoints::<S>),
        )
        .route(
            "/endpoints/:endpoint_id",
            get(handlers::get_endpoint::<S>)
                .put(handlers::update_endpoint::<S>)
                .delete(handlers::delete_endpoint::<S>),
        )
        // OpenAPI import
        .route(
            "/projects/:project_id/openapi/preview",
            post(handlers::preview_openapi_import::<S>).layer(DefaultBodyLimit::max(
                import.max_document_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/projects/:project_id/endpoints/bulk",
            post(handlers::bulk_create_endpoints::<S>),
        )
        // Mock serving
        .route("/mock/:code", any(mock_handlers::serve_mock::<S>))
        .route("/mock/:code/*path", any(mock_handlers::serve_mock::<S>))
        .layer(ServiceBuilder::new().layer(cors))
}
