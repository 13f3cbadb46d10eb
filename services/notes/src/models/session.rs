//! Session identity carried inside a verified session token

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthenticatedUser;

/// Who is making the request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&AuthenticatedUser> for SessionIdentity {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}
