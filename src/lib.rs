pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

use std::sync::Arc;
use tokio::net::TcpListener;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{ServiceError, ServiceResult};

// Export logic types
pub use logic::{
    extract_operations, synthesize_example, BulkCreator, DocumentError, EndpointOperations,
    ImportClassifier, OpenApiDocument, OpenApiImport, OrganisationOperations, ProjectOperations,
    SchemaNode, SchemaType, UserOperations,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use crate::api::AppState;
use crate::config::{AppConfig, ImportConfig, StorageBackend};

/// The full HTTP application over `store`, with state attached
pub fn build_app<S: Store + 'static>(store: Arc<S>, import: &ImportConfig) -> axum::Router {
    routes::create_router::<S>(import).with_state(AppState::new(store, import.clone()))
}

/// Serve `app` on an already bound listener until the server stops
pub async fn serve(listener: TcpListener, app: axum::Router) -> anyhow::Result<()> {
    axum::serve(listener, app).await?;
    Ok(())
}

/// Open the configured store and build the application for it
pub async fn app_from_config(config: &AppConfig) -> anyhow::Result<axum::Router> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let max_connections = config.database.max_connections.unwrap_or(20);
            let store = PostgresStore::new(&database_url, max_connections).await?;

            log::info!("Running database migrations...");
            store.migrate().await?;

            Ok(build_app(Arc::new(store), &config.import))
        }
        StorageBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(build_app(Arc::new(MemoryStore::new()), &config.import))
        }
    }
}
