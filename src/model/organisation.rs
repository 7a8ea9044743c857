use serde::{Deserialize, Serialize};

use crate::model::{generate_id, now, Id, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: Id,
    pub name: String,
    pub owner_id: Id,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganisation {
    pub name: String,
}

impl Organisation {
    pub fn new(name: String, owner_id: Id) -> Self {
        let created_at = now();
        Self {
            id: generate_id(),
            name,
            owner_id,
            created_at,
            updated_at: created_at,
        }
    }
}
