use serde::{Deserialize, Serialize};

use crate::model::Id;

/// Identity of the caller, taken from the `X-User-Id` request header.
///
/// The id is only a claim until it has been resolved against the user store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Id,
}

impl UserContext {
    pub fn new(user_id: impl Into<Id>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
