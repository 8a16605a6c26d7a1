//! Customer profiles attached to user accounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Personal details of a customer; every customer owns exactly one user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    /// Account created together with the profile
    pub user_id: Uuid,
    #[schema(example = "Marta")]
    pub name: String,
    #[schema(example = "Puig")]
    pub surname: String,
    #[schema(example = "+34 600 000 000")]
    pub phone_number: Option<String>,
    #[schema(example = "marta@example.com")]
    pub email: Option<String>,
    pub is_active: bool,
}

/// Editable profile fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub surname: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    /// A new, active profile for `user_id`.
    pub fn from_draft(id: Uuid, user_id: Uuid, draft: CustomerDraft) -> Self {
        Self {
            id,
            user_id,
            name: draft.name,
            surname: draft.surname,
            phone_number: draft.phone_number,
            email: draft.email,
            is_active: true,
        }
    }
}
