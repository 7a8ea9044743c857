use serde::{Deserialize, Serialize};

use crate::model::{generate_id, now, Id, Organisation, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
}

/// A user together with the organisations they are a member of
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub organisations: Vec<Organisation>,
}

impl User {
    pub fn new(email: String, name: Option<String>) -> Self {
        let created_at = now();
        Self {
            id: generate_id(),
            email,
            name,
            created_at,
            updated_at: created_at,
        }
    }
}
