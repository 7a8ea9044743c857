use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{now, Endpoint, Id, Organisation, Project, User};
use crate::store::traits::{
    DuplicateEndpoint, EndpointStore, OrganisationStore, ProjectStore, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Id, User>,
    organisations: BTreeMap<Id, Organisation>,
    /// (organisation_id, user_id)
    members: BTreeSet<(Id, Id)>,
    projects: BTreeMap<Id, Project>,
    endpoints: BTreeMap<Id, Endpoint>,
}

impl Tables {
    fn live_route_taken(
        &self,
        project_id: &Id,
        method: &str,
        path: &str,
        except: Option<&Id>,
    ) -> bool {
        self.endpoints.values().any(|e| {
            e.is_live()
                && &e.project_id == project_id
                && e.matches(method, path)
                && Some(&e.id) != except
        })
    }
}

/// In-process store with the same live-row and uniqueness rules as [`super::PostgresStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<()> {
        let mut tables = self.tables.write();
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            anyhow::bail!("user with email {} already exists", user.email);
        }
        tables.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, id: &Id) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait::async_trait]
impl OrganisationStore for MemoryStore {
    async fn create_organisation(&self, organisation: Organisation) -> Result<()> {
        self.tables
            .write()
            .organisations
            .insert(organisation.id.clone(), organisation);
        Ok(())
    }

    async fn get_organisation(&self, id: &Id) -> Result<Option<Organisation>> {
        Ok(self.tables.read().organisations.get(id).cloned())
    }

    async fn add_member(&self, organisation_id: &Id, user_id: &Id) -> Result<()> {
        self.tables
            .write()
            .members
            .insert((organisation_id.clone(), user_id.clone()));
        Ok(())
    }

    async fn is_member(&self, organisation_id: &Id, user_id: &Id) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .members
            .contains(&(organisation_id.clone(), user_id.clone())))
    }

    async fn list_organisations_for_user(&self, user_id: &Id) -> Result<Vec<Organisation>> {
        let tables = self.tables.read();
        let mut organisations: Vec<Organisation> = tables
            .members
            .iter()
            .filter(|(_, member)| member == user_id)
            .filter_map(|(organisation_id, _)| tables.organisations.get(organisation_id).cloned())
            .collect();
        organisations.sort_by_key(|o| o.created_at);
        Ok(organisations)
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, project: Project) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.projects.values().any(|p| p.code == project.code) {
            anyhow::bail!("project code {} already in use", project.code);
        }
        tables.projects.insert(project.id.clone(), project);
        Ok(())
    }

    async fn get_project(&self, id: &Id) -> Result<Option<Project>> {
        Ok(self
            .tables
            .read()
            .projects
            .get(id)
            .filter(|p| p.is_live())
            .cloned())
    }

    async fn get_project_by_code(&self, code: &str) -> Result<Option<Project>> {
        Ok(self
            .tables
            .read()
            .projects
            .values()
            .find(|p| p.is_live() && p.code == code)
            .cloned())
    }

    async fn list_projects_for_organisation(&self, organisation_id: &Id) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .tables
            .read()
            .projects
            .values()
            .filter(|p| p.is_live() && &p.organisation_id == organisation_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    async fn delete_project(&self, id: &Id, deleted_by: &Id) -> Result<bool> {
        let deleted_at = now();
        let mut tables = self.tables.write();

        let Some(project) = tables.projects.get_mut(id).filter(|p| p.is_live()) else {
            return Ok(false);
        };
        project.deleted_at = Some(deleted_at);
        project.deleted_by = Some(deleted_by.clone());
        project.updated_at = deleted_at;

        for endpoint in tables
            .endpoints
            .values_mut()
            .filter(|e| e.is_live() && &e.project_id == id)
        {
            endpoint.deleted_at = Some(deleted_at);
            endpoint.deleted_by = Some(deleted_by.clone());
            endpoint.updated_at = deleted_at;
            endpoint.updated_by = deleted_by.clone();
        }

        Ok(true)
    }
}

#[async_trait::async_trait]
impl EndpointStore for MemoryStore {
    async fn find_endpoint(
        &self,
        project_id: &Id,
        method: &str,
        path: &str,
    ) -> Result<Option<Endpoint>> {
        Ok(self
            .tables
            .read()
            .endpoints
            .values()
            .find(|e| e.is_live() && &e.project_id == project_id && e.matches(method, path))
            .cloned())
    }

    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint> {
        let mut tables = self.tables.write();
        if tables.live_route_taken(&endpoint.project_id, &endpoint.method, &endpoint.path, None) {
            return Err(DuplicateEndpoint.into());
        }
        tables.endpoints.insert(endpoint.id.clone(), endpoint.clone());
        Ok(endpoint)
    }

    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>> {
        Ok(self
            .tables
            .read()
            .endpoints
            .get(id)
            .filter(|e| e.is_live())
            .cloned())
    }

    async fn list_endpoints_for_project(&self, project_id: &Id) -> Result<Vec<Endpoint>> {
        let mut endpoints: Vec<Endpoint> = self
            .tables
            .read()
            .endpoints
            .values()
            .filter(|e| e.is_live() && &e.project_id == project_id)
            .cloned()
            .collect();
        endpoints.sort_by(|a, b| (&a.path, &a.method).cmp(&(&b.path, &b.method)));
        Ok(endpoints)
    }

    async fn update_endpoint(&self, endpoint: Endpoint) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.live_route_taken(
            &endpoint.project_id,
            &endpoint.method,
            &endpoint.path,
            Some(&endpoint.id),
        ) {
            return Err(DuplicateEndpoint.into());
        }
        if let Some(stored) = tables.endpoints.get_mut(&endpoint.id).filter(|e| e.is_live()) {
            *stored = endpoint;
        }
        Ok(())
    }

    async fn delete_endpoint(&self, id: &Id, deleted_by: &Id) -> Result<bool> {
        let mut tables = self.tables.write();
        let Some(endpoint) = tables.endpoints.get_mut(id).filter(|e| e.is_live()) else {
            return Ok(false);
        };
        let deleted_at = now();
        endpoint.deleted_at = Some(deleted_at);
        endpoint.deleted_by = Some(deleted_by.clone());
        endpoint.updated_at = deleted_at;
        endpoint.updated_by = deleted_by.clone();
        Ok(true)
    }
}
