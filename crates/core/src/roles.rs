//! User roles and organisation-to-profession relationship roles.
//!
//! `UserRole` maps to the `user_role` PostgreSQL enum and `OrganisationRole`
//! to `organisation_role`; variant names must stay in sync with the
//! migrations that create those enums.

use serde::{Deserialize, Serialize};

/// Role tier of a register user. Combined with the `service_owner` flag this
/// selects the user's permission set (see [`crate::permissions`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Administrator,
    Registrar,
    Editor,
}

/// Role an organisation plays for a profession.
///
/// The first five are "tier one": they count toward permission scoping and
/// archival cascades. `EnforcementBody` and `AwardingBody` are "tier two"
/// and are excluded from both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "organisation_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrganisationRole {
    PrimaryRegulator,
    CharteredBody,
    QualifyingBody,
    AdditionalRegulator,
    OversightBody,
    EnforcementBody,
    AwardingBody,
}

impl OrganisationRole {
    /// Whether this role counts toward permission scoping and archival
    /// cascades.
    pub fn is_tier_one(self) -> bool {
        !matches!(
            self,
            OrganisationRole::EnforcementBody | OrganisationRole::AwardingBody
        )
    }
}
