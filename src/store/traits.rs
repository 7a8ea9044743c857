use crate::model::{Endpoint, Id, Organisation, Project, User};
use anyhow::Result;

/// Raised by [`EndpointStore::create_endpoint`] and [`EndpointStore::update_endpoint`]
/// when another live endpoint already holds the same (method, path) in the project.
#[derive(Debug, thiserror::Error)]
#[error("endpoint with same method and path already exists")]
pub struct DuplicateEndpoint;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> Result<()>;
    async fn get_user(&self, id: &Id) -> Result<Option<User>>;
    /// Case-insensitive lookup
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait::async_trait]
pub trait OrganisationStore: Send + Sync {
    async fn create_organisation(&self, organisation: Organisation) -> Result<()>;
    async fn get_organisation(&self, id: &Id) -> Result<Option<Organisation>>;
    async fn add_member(&self, organisation_id: &Id, user_id: &Id) -> Result<()>;
    async fn is_member(&self, organisation_id: &Id, user_id: &Id) -> Result<bool>;
    async fn list_organisations_for_user(&self, user_id: &Id) -> Result<Vec<Organisation>>;
}

/// Project lookups only ever return live (non-deleted) projects
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, project: Project) -> Result<()>;
    async fn get_project(&self, id: &Id) -> Result<Option<Project>>;
    async fn get_project_by_code(&self, code: &str) -> Result<Option<Project>>;
    async fn list_projects_for_organisation(&self, organisation_id: &Id) -> Result<Vec<Project>>;
    /// Soft delete the project together with all of its endpoints
    async fn delete_project(&self, id: &Id, deleted_by: &Id) -> Result<bool>;
}

/// Endpoint lookups only ever return live (non-deleted) endpoints
#[async_trait::async_trait]
pub trait EndpointStore: Send + Sync {
    async fn find_endpoint(
        &self,
        project_id: &Id,
        method: &str,
        path: &str,
    ) -> Result<Option<Endpoint>>;
    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint>;
    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>>;
    async fn list_endpoints_for_project(&self, project_id: &Id) -> Result<Vec<Endpoint>>;
    async fn update_endpoint(&self, endpoint: Endpoint) -> Result<()>;
    async fn delete_endpoint(&self, id: &Id, deleted_by: &Id) -> Result<bool>;
}

pub trait Store: UserStore + OrganisationStore + ProjectStore + EndpointStore + Send + Sync {}
impl<T: UserStore + OrganisationStore + ProjectStore + EndpointStore + Send + Sync> Store for T {}
