//! Profession entity and version models, plus the organisation relation.

use register_core::permissions::ProfessionOrganisation;
use register_core::roles::OrganisationRole;
use register_core::status::VersionStatus;
use register_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `professions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Profession {
    pub id: DbId,
    pub name: String,
    pub slug: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `profession_versions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProfessionVersion {
    pub id: DbId,
    pub profession_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub alternate_names: Option<String>,
    pub description: Option<String>,
    pub regulation_summary: Option<String>,
    pub regulation_type: Option<String>,
    pub reserved_activities: Option<String>,
    pub legislation: Option<String>,
    pub qualification: Option<String>,
    pub registration_requirements: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `profession_to_organisations` join table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProfessionToOrganisation {
    pub id: DbId,
    pub profession_id: DbId,
    pub organisation_id: DbId,
    pub role: OrganisationRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProfessionToOrganisation {
    /// The permission-layer view of this relation.
    pub fn scoping(&self) -> ProfessionOrganisation {
        ProfessionOrganisation {
            organisation_id: self.organisation_id,
            role: self.role,
        }
    }
}

/// DTO for creating a new profession entity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfession {
    pub name: String,
}

/// Editable content of a profession version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionVersionContent {
    pub alternate_names: Option<String>,
    pub description: Option<String>,
    pub regulation_summary: Option<String>,
    pub regulation_type: Option<String>,
    pub reserved_activities: Option<String>,
    pub legislation: Option<String>,
    pub qualification: Option<String>,
    pub registration_requirements: Option<String>,
}

/// Copy-on-write seed for a fresh profession version row. Content columns
/// only; identity, timestamps, and status are assigned by the insert.
#[derive(Debug, Clone)]
pub struct NewProfessionVersion {
    pub profession_id: DbId,
    pub user_id: DbId,
    pub alternate_names: Option<String>,
    pub description: Option<String>,
    pub regulation_summary: Option<String>,
    pub regulation_type: Option<String>,
    pub reserved_activities: Option<String>,
    pub legislation: Option<String>,
    pub qualification: Option<String>,
    pub registration_requirements: Option<String>,
}

impl NewProfessionVersion {
    /// Derive a new version from a previous one, attributed to `user_id`.
    pub fn derived_from(previous: &ProfessionVersion, user_id: DbId) -> Self {
        Self {
            profession_id: previous.profession_id,
            user_id,
            alternate_names: previous.alternate_names.clone(),
            description: previous.description.clone(),
            regulation_summary: previous.regulation_summary.clone(),
            regulation_type: previous.regulation_type.clone(),
            reserved_activities: previous.reserved_activities.clone(),
            legislation: previous.legislation.clone(),
            qualification: previous.qualification.clone(),
            registration_requirements: previous.registration_requirements.clone(),
        }
    }

    /// An empty first version for a brand-new profession.
    pub fn blank(profession_id: DbId, user_id: DbId) -> Self {
        Self {
            profession_id,
            user_id,
            alternate_names: None,
            description: None,
            regulation_summary: None,
            regulation_type: None,
            reserved_activities: None,
            legislation: None,
            qualification: None,
            registration_requirements: None,
        }
    }
}

/// A profession seen through one of its versions.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProfessionWithVersion {
    pub id: DbId,
    pub name: String,
    pub slug: Option<String>,
    pub version_id: Option<DbId>,
    pub status: Option<VersionStatus>,
    pub alternate_names: Option<String>,
    pub description: Option<String>,
    pub regulation_summary: Option<String>,
    pub regulation_type: Option<String>,
    pub reserved_activities: Option<String>,
    pub legislation: Option<String>,
    pub qualification: Option<String>,
    pub registration_requirements: Option<String>,
}

impl ProfessionWithVersion {
    /// Flatten a profession and one of its versions. The version must belong
    /// to the profession.
    pub fn from_parts(profession: &Profession, version: &ProfessionVersion) -> Self {
        Self {
            id: profession.id,
            name: profession.name.clone(),
            slug: profession.slug.clone(),
            version_id: Some(version.id),
            status: Some(version.status),
            alternate_names: version.alternate_names.clone(),
            description: version.description.clone(),
            regulation_summary: version.regulation_summary.clone(),
            regulation_type: version.regulation_type.clone(),
            reserved_activities: version.reserved_activities.clone(),
            legislation: version.legislation.clone(),
            qualification: version.qualification.clone(),
            registration_requirements: version.registration_requirements.clone(),
        }
    }

    /// The bare-entity composite.
    pub fn without_version(profession: &Profession) -> Self {
        Self {
            id: profession.id,
            name: profession.name.clone(),
            slug: profession.slug.clone(),
            version_id: None,
            status: None,
            alternate_names: None,
            description: None,
            regulation_summary: None,
            regulation_type: None,
            reserved_activities: None,
            legislation: None,
            qualification: None,
            registration_requirements: None,
        }
    }

    /// Compose with the most recently updated live version, if any.
    pub fn with_latest_live_version(
        profession: &Profession,
        versions: &[ProfessionVersion],
    ) -> Self {
        match latest_with(versions, |v| v.status == VersionStatus::Live) {
            Some(version) => Self::from_parts(profession, version),
            None => Self::without_version(profession),
        }
    }

    /// Compose with the most recently updated version regardless of status.
    pub fn with_latest_version(profession: &Profession, versions: &[ProfessionVersion]) -> Self {
        match latest_with(versions, |_| true) {
            Some(version) => Self::from_parts(profession, version),
            None => Self::without_version(profession),
        }
    }

    /// Whether this composite belongs on current listing surfaces: its
    /// version is live or draft.
    pub fn is_current(&self) -> bool {
        self.status.is_some_and(|s| s.is_live_or_draft())
    }
}

/// A profession version joined with its owning entity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessionVersionWithEntity {
    pub id: DbId,
    pub profession_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub alternate_names: Option<String>,
    pub description: Option<String>,
    pub regulation_summary: Option<String>,
    pub regulation_type: Option<String>,
    pub reserved_activities: Option<String>,
    pub legislation: Option<String>,
    pub qualification: Option<String>,
    pub registration_requirements: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub profession_name: String,
    pub profession_slug: Option<String>,
}

fn latest_with<'a>(
    versions: &'a [ProfessionVersion],
    predicate: impl Fn(&ProfessionVersion) -> bool,
) -> Option<&'a ProfessionVersion> {
    versions
        .iter()
        .filter(|v| predicate(v))
        .max_by_key(|v| v.updated_at)
}

/// Keep only professions whose composed version is live or draft. Used when
/// attaching dependent professions to an organisation view.
pub fn filter_current(professions: Vec<ProfessionWithVersion>) -> Vec<ProfessionWithVersion> {
    professions.into_iter().filter(|p| p.is_current()).collect()
}
