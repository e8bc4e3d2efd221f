//! Register user model.

use register_core::permissions::ActingUser;
use register_core::roles::UserRole;
use register_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub service_owner: bool,
    pub organisation_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The permission-layer view of this user.
    pub fn acting(&self) -> ActingUser {
        ActingUser {
            id: self.id,
            organisation_id: self.organisation_id,
            role: self.role,
            service_owner: self.service_owner,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub service_owner: bool,
    pub organisation_id: Option<DbId>,
}
