use crate::error::{ServiceError, ServiceResult};
use crate::model::{NewOrganisation, NewUser, Organisation, User, UserContext, UserProfile};
use crate::store::traits::Store;

/// User registration and actor resolution
pub struct UserOperations;

impl UserOperations {
    pub async fn register<S: Store>(store: &S, new_user: NewUser) -> ServiceResult<User> {
        let email = new_user.email.trim().to_string();
        if email.is_empty() {
            return Err(ServiceError::BadRequest("email is required".to_string()));
        }

        if store.get_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("user already exists".to_string()));
        }

        let name = new_user
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let user = User::new(email, name);
        store.create_user(user.clone()).await?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// The stored user behind a request's claimed identity
    pub async fn resolve_actor<S: Store>(store: &S, context: &UserContext) -> ServiceResult<User> {
        store
            .get_user(&context.user_id)
            .await?
            .ok_or(ServiceError::Unauthorized)
    }

    pub async fn profile<S: Store>(store: &S, actor: User) -> ServiceResult<UserProfile> {
        let organisations = store.list_organisations_for_user(&actor.id).await?;
        Ok(UserProfile {
            user: actor,
            organisations,
        })
    }
}

pub struct OrganisationOperations;

impl OrganisationOperations {
    /// Create an organisation owned by `actor`, who also becomes its first member
    pub async fn create<S: Store>(
        store: &S,
        actor: &User,
        new_organisation: NewOrganisation,
    ) -> ServiceResult<Organisation> {
        let name = new_organisation.name.trim();
        if name.is_empty() {
            return Err(ServiceError::BadRequest("organisation name is required".to_string()));
        }

        let organisation = Organisation::new(name.to_string(), actor.id.clone());
        store.create_organisation(organisation.clone()).await?;
        store.add_member(&organisation.id, &actor.id).await?;

        Ok(organisation)
    }

    pub async fn list<S: Store>(store: &S, actor: &User) -> ServiceResult<Vec<Organisation>> {
        Ok(store.list_organisations_for_user(&actor.id).await?)
    }
}
