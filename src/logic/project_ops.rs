use crate::error::{ServiceError, ServiceResult};
use crate::model::{generate_project_code, Id, NewProject, Project, User};
use crate::store::traits::Store;

/// Attempts at drawing an unused project code before giving up
const MAX_CODE_ATTEMPTS: usize = 10;

pub struct ProjectOperations;

impl ProjectOperations {
    pub async fn create<S: Store>(
        store: &S,
        actor: &User,
        new_project: NewProject,
    ) -> ServiceResult<Project> {
        let name = new_project.name.trim();
        if name.is_empty() {
            return Err(ServiceError::BadRequest("project name is required".to_string()));
        }

        store
            .get_organisation(&new_project.organisation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("organisation"))?;

        if !store.is_member(&new_project.organisation_id, &actor.id).await? {
            return Err(ServiceError::BadRequest(
                "user does not belong to the specified organisation".to_string(),
            ));
        }

        let code = Self::unused_code(store).await?;
        let project = Project::new(
            name.to_string(),
            code,
            new_project.organisation_id,
            actor.id.clone(),
        );
        store.create_project(project.clone()).await?;

        log::info!("Created project {} with code {}", project.id, project.code);
        Ok(project)
    }

    async fn unused_code<S: Store>(store: &S) -> ServiceResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_project_code();
            if store.get_project_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            log::debug!("Project code {} already taken, drawing another", code);
        }
        Err(anyhow::anyhow!(
            "could not allocate a project code after {} attempts",
            MAX_CODE_ATTEMPTS
        )
        .into())
    }

    /// Projects of every organisation the actor belongs to
    pub async fn list<S: Store>(store: &S, actor: &User) -> ServiceResult<Vec<Project>> {
        let mut projects = Vec::new();
        for organisation in store.list_organisations_for_user(&actor.id).await? {
            projects.extend(store.list_projects_for_organisation(&organisation.id).await?);
        }
        Ok(projects)
    }

    /// The live project with `project_id`, provided the actor belongs to its organisation.
    ///
    /// Projects outside the actor's organisations are reported as not found.
    pub async fn resolve_for_actor<S: Store>(
        store: &S,
        project_id: &Id,
        actor: &User,
    ) -> ServiceResult<Project> {
        let project = store
            .get_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("project"))?;

        if !store.is_member(&project.organisation_id, &actor.id).await? {
            return Err(ServiceError::not_found("project"));
        }

        Ok(project)
    }

    /// Soft delete the project and every endpoint in it
    pub async fn delete<S: Store>(store: &S, project_id: &Id, actor: &User) -> ServiceResult<()> {
        let project = Self::resolve_for_actor(store, project_id, actor).await?;
        if !store.delete_project(&project.id, &actor.id).await? {
            return Err(ServiceError::not_found("project"));
        }
        log::info!("Deleted project {}", project.id);
        Ok(())
    }
}
