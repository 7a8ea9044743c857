use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::{now, Endpoint, Id, Organisation, Project, User};
use crate::store::traits::{
    DuplicateEndpoint, EndpointStore, OrganisationStore, ProjectStore, UserStore,
};

const UNIQUE_VIOLATION: &str = "23505";

const ENDPOINT_COLUMNS: &str = "id, project_id, method, path, response_status, response_body, \
    response_headers, created_at, updated_at, created_by, updated_by, deleted_at, deleted_by";

const PROJECT_COLUMNS: &str =
    "id, name, code, organisation_id, owner_id, created_at, updated_at, deleted_at, deleted_by";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn organisation_from_row(row: &PgRow) -> Result<Organisation> {
    Ok(Organisation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn project_from_row(row: &PgRow) -> Result<Project> {
    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        organisation_id: row.try_get("organisation_id")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        deleted_by: row.try_get("deleted_by")?,
    })
}

fn endpoint_from_row(row: &PgRow) -> Result<Endpoint> {
    Ok(Endpoint {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        method: row.try_get("method")?,
        path: row.try_get("path")?,
        response_status: row.try_get("response_status")?,
        response_body: row.try_get("response_body")?,
        response_headers: row.try_get("response_headers")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        deleted_at: row.try_get("deleted_at")?,
        deleted_by: row.try_get("deleted_by")?,
    })
}

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(())
    }

    async fn get_user(&self, id: &Id) -> Result<Option<User>> {
        let row =
            sqlx::query("SELECT id, email, name, created_at, updated_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch user")?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, created_at, updated_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl OrganisationStore for PostgresStore {
    async fn create_organisation(&self, organisation: Organisation) -> Result<()> {
        sqlx::query(
            "INSERT INTO organisations (id, name, owner_id, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&organisation.id)
        .bind(&organisation.name)
        .bind(&organisation.owner_id)
        .bind(organisation.created_at)
        .bind(organisation.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create organisation")?;

        Ok(())
    }

    async fn get_organisation(&self, id: &Id) -> Result<Option<Organisation>> {
        let row = sqlx::query(
            "SELECT id, name, owner_id, created_at, updated_at FROM organisations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch organisation")?;

        row.as_ref().map(organisation_from_row).transpose()
    }

    async fn add_member(&self, organisation_id: &Id, user_id: &Id) -> Result<()> {
        sqlx::query(
            "INSERT INTO organisation_members (organisation_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(organisation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to add organisation member")?;

        Ok(())
    }

    async fn is_member(&self, organisation_id: &Id, user_id: &Id) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM organisation_members WHERE organisation_id = $1 AND user_id = $2) AS member",
        )
        .bind(organisation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check organisation membership")?;

        Ok(row.try_get("member")?)
    }

    async fn list_organisations_for_user(&self, user_id: &Id) -> Result<Vec<Organisation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.name, o.owner_id, o.created_at, o.updated_at
            FROM organisations o
            JOIN organisation_members m ON m.organisation_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list organisations")?;

        rows.iter().map(organisation_from_row).collect()
    }
}

#[async_trait::async_trait]
impl ProjectStore for PostgresStore {
    async fn create_project(&self, project: Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, code, organisation_id, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.code)
        .bind(&project.organisation_id)
        .bind(&project.owner_id)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create project")?;

        Ok(())
    }

    async fn get_project(&self, id: &Id) -> Result<Option<Project>> {
        let query = format!(
            "SELECT {} FROM projects WHERE id = $1 AND deleted_at IS NULL",
            PROJECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch project")?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn get_project_by_code(&self, code: &str) -> Result<Option<Project>> {
        let query = format!(
            "SELECT {} FROM projects WHERE code = $1 AND deleted_at IS NULL",
            PROJECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch project by code")?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_projects_for_organisation(&self, organisation_id: &Id) -> Result<Vec<Project>> {
        let query = format!(
            "SELECT {} FROM projects WHERE organisation_id = $1 AND deleted_at IS NULL ORDER BY created_at",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(organisation_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        rows.iter().map(project_from_row).collect()
    }

    async fn delete_project(&self, id: &Id, deleted_by: &Id) -> Result<bool> {
        let deleted_at = now();
        let mut tx = self.pool.begin().await.context("Failed to start transaction")?;

        sqlx::query(
            r#"
            UPDATE endpoints SET deleted_at = $1, deleted_by = $2, updated_at = $1, updated_by = $2
            WHERE project_id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(deleted_at)
        .bind(deleted_by)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete project endpoints")?;

        let result = sqlx::query(
            r#"
            UPDATE projects SET deleted_at = $1, deleted_by = $2, updated_at = $1
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(deleted_at)
        .bind(deleted_by)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete project")?;

        tx.commit().await.context("Failed to commit project deletion")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl EndpointStore for PostgresStore {
    async fn find_endpoint(
        &self,
        project_id: &Id,
        method: &str,
        path: &str,
    ) -> Result<Option<Endpoint>> {
        let query = format!(
            "SELECT {} FROM endpoints WHERE project_id = $1 AND method = $2 AND path = $3 AND deleted_at IS NULL",
            ENDPOINT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(project_id)
            .bind(method)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up endpoint")?;

        row.as_ref().map(endpoint_from_row).transpose()
    }

    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint> {
        let result = sqlx::query(
            r#"
            INSERT INTO endpoints (id, project_id, method, path, response_status, response_body,
                response_headers, created_at, updated_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&endpoint.id)
        .bind(&endpoint.project_id)
        .bind(&endpoint.method)
        .bind(&endpoint.path)
        .bind(endpoint.response_status)
        .bind(&endpoint.response_body)
        .bind(&endpoint.response_headers)
        .bind(endpoint.created_at)
        .bind(endpoint.updated_at)
        .bind(&endpoint.created_by)
        .bind(&endpoint.updated_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(endpoint),
            Err(e) if is_unique_violation(&e) => Err(DuplicateEndpoint.into()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to create endpoint")),
        }
    }

    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>> {
        let query = format!(
            "SELECT {} FROM endpoints WHERE id = $1 AND deleted_at IS NULL",
            ENDPOINT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch endpoint")?;

        row.as_ref().map(endpoint_from_row).transpose()
    }

    async fn list_endpoints_for_project(&self, project_id: &Id) -> Result<Vec<Endpoint>> {
        let query = format!(
            "SELECT {} FROM endpoints WHERE project_id = $1 AND deleted_at IS NULL ORDER BY path, method",
            ENDPOINT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list endpoints")?;

        rows.iter().map(endpoint_from_row).collect()
    }

    async fn update_endpoint(&self, endpoint: Endpoint) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE endpoints
            SET method = $1, path = $2, response_status = $3, response_body = $4,
                response_headers = $5, updated_at = $6, updated_by = $7
            WHERE id = $8 AND deleted_at IS NULL
            "#,
        )
        .bind(&endpoint.method)
        .bind(&endpoint.path)
        .bind(endpoint.response_status)
        .bind(&endpoint.response_body)
        .bind(&endpoint.response_headers)
        .bind(endpoint.updated_at)
        .bind(&endpoint.updated_by)
        .bind(&endpoint.id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DuplicateEndpoint.into()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to update endpoint")),
        }
    }

    async fn delete_endpoint(&self, id: &Id, deleted_by: &Id) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE endpoints SET deleted_at = $1, deleted_by = $2, updated_at = $1, updated_by = $2
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(now())
        .bind(deleted_by)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to delete endpoint")?;

        Ok(result.rows_affected() > 0)
    }
}
