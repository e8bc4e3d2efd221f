//! Organisation entity and version models.

use register_core::status::VersionStatus;
use register_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `organisations` table. Identity only; versioned content
/// lives in [`OrganisationVersion`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Organisation {
    pub id: DbId,
    pub name: String,
    /// Assigned on first publish, stable afterwards.
    pub slug: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `organisation_versions` table.
///
/// Immutable once persisted apart from status transitions; `user_id` is the
/// creator and never changes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrganisationVersion {
    pub id: DbId,
    pub organisation_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub alternate_name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new organisation entity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganisation {
    pub name: String,
}

/// Editable content of an organisation version, applied while the version is
/// still unconfirmed or draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganisationVersionContent {
    pub alternate_name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// Copy-on-write seed for a fresh organisation version row.
///
/// Enumerates exactly the columns that carry over: content only. Identity,
/// timestamps, and status never copy — the insert assigns a new id, fresh
/// timestamps, and `unconfirmed`.
#[derive(Debug, Clone)]
pub struct NewOrganisationVersion {
    pub organisation_id: DbId,
    pub user_id: DbId,
    pub alternate_name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

impl NewOrganisationVersion {
    /// Derive a new version from a previous one, attributed to `user_id`.
    pub fn derived_from(previous: &OrganisationVersion, user_id: DbId) -> Self {
        Self {
            organisation_id: previous.organisation_id,
            user_id,
            alternate_name: previous.alternate_name.clone(),
            address: previous.address.clone(),
            url: previous.url.clone(),
            email: previous.email.clone(),
            telephone: previous.telephone.clone(),
        }
    }

    /// An empty first version for a brand-new organisation.
    pub fn blank(organisation_id: DbId, user_id: DbId) -> Self {
        Self {
            organisation_id,
            user_id,
            alternate_name: None,
            address: None,
            url: None,
            email: None,
            telephone: None,
        }
    }
}

/// An organisation seen through the lens of one of its versions: stable
/// identity fields plus the version's content, status, and id.
///
/// The version fields are `None` for entities viewed without any version
/// (a draft-only organisation has no live version, which is a valid and
/// common state, not an error).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrganisationWithVersion {
    pub id: DbId,
    pub name: String,
    pub slug: Option<String>,
    pub version_id: Option<DbId>,
    pub status: Option<VersionStatus>,
    pub alternate_name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

impl OrganisationWithVersion {
    /// Flatten an organisation and one of its versions.
    ///
    /// The version must belong to the organisation; passing a foreign
    /// version is a programming error, not a runtime-checked condition.
    pub fn from_parts(organisation: &Organisation, version: &OrganisationVersion) -> Self {
        Self {
            id: organisation.id,
            name: organisation.name.clone(),
            slug: organisation.slug.clone(),
            version_id: Some(version.id),
            status: Some(version.status),
            alternate_name: version.alternate_name.clone(),
            address: version.address.clone(),
            url: version.url.clone(),
            email: version.email.clone(),
            telephone: version.telephone.clone(),
        }
    }

    /// The bare-entity composite, used when no suitable version exists.
    pub fn without_version(organisation: &Organisation) -> Self {
        Self {
            id: organisation.id,
            name: organisation.name.clone(),
            slug: organisation.slug.clone(),
            version_id: None,
            status: None,
            alternate_name: None,
            address: None,
            url: None,
            email: None,
            telephone: None,
        }
    }

    /// Compose with the most recently updated live version, or without
    /// version fields when none is live.
    pub fn with_latest_live_version(
        organisation: &Organisation,
        versions: &[OrganisationVersion],
    ) -> Self {
        match latest_with(versions, |v| v.status == VersionStatus::Live) {
            Some(version) => Self::from_parts(organisation, version),
            None => Self::without_version(organisation),
        }
    }

    /// Compose with the most recently updated version regardless of status.
    pub fn with_latest_version(
        organisation: &Organisation,
        versions: &[OrganisationVersion],
    ) -> Self {
        match latest_with(versions, |_| true) {
            Some(version) => Self::from_parts(organisation, version),
            None => Self::without_version(organisation),
        }
    }
}

/// An organisation version joined with its owning entity, plus the number
/// of tier-one professions whose latest confirmed version is live or draft.
/// Loaded in
/// one round trip so archival and permission decisions need no follow-up
/// query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganisationVersionWithEntity {
    pub id: DbId,
    pub organisation_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub alternate_name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub organisation_name: String,
    pub organisation_slug: Option<String>,
    pub current_dependents: i64,
}

fn latest_with<'a>(
    versions: &'a [OrganisationVersion],
    predicate: impl Fn(&OrganisationVersion) -> bool,
) -> Option<&'a OrganisationVersion> {
    versions
        .iter()
        .filter(|v| predicate(v))
        .max_by_key(|v| v.updated_at)
}
