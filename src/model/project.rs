use serde::{Deserialize, Serialize};

use crate::model::{generate_id, now, Id, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    /// Short code used by the mock-serving route
    pub code: String,
    pub organisation_id: Id,
    pub owner_id: Id,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<Id>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub organisation_id: Id,
}

impl Project {
    pub fn new(name: String, code: String, organisation_id: Id, owner_id: Id) -> Self {
        let created_at = now();
        Self {
            id: generate_id(),
            name,
            code,
            organisation_id,
            owner_id,
            created_at,
            updated_at: created_at,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
