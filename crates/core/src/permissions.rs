//! Permission and visibility rules.
//!
//! Every check takes the acting user explicitly; nothing here reads request
//! or session state. Controllers resolve the authenticated user, build an
//! [`ActingUser`], and call these before any mutation.
//!
//! The permission table is an exhaustive match over
//! `(service_owner, role)`. Combinations that should not exist (an
//! organisation-scoped registrar) return `None`, which callers must treat
//! as zero permissions rather than an error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::roles::{OrganisationRole, UserRole};
use crate::types::DbId;

/// An admin action a user may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserPermission {
    ManageUsers,
    CreateOrganisation,
    DeleteOrganisation,
    EditOrganisation,
    PublishOrganisation,
    CreateProfession,
    DeleteProfession,
    EditProfession,
    PublishProfession,
    UploadDecisionData,
    DownloadDecisionData,
    ViewDecisionData,
}

/// The authenticated user performing an admin action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: DbId,
    /// `None` for service-owner staff who belong to no single organisation.
    pub organisation_id: Option<DbId>,
    pub role: UserRole,
    pub service_owner: bool,
}

/// One organisation relation of a profession, as needed by permission
/// scoping. The caller loads these from `profession_to_organisations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfessionOrganisation {
    pub organisation_id: DbId,
    pub role: OrganisationRole,
}

use UserPermission::*;

const SERVICE_OWNER_ADMINISTRATOR: &[UserPermission] = &[
    ManageUsers,
    CreateOrganisation,
    DeleteOrganisation,
    EditOrganisation,
    PublishOrganisation,
    CreateProfession,
    DeleteProfession,
    EditProfession,
    PublishProfession,
    UploadDecisionData,
    DownloadDecisionData,
    ViewDecisionData,
];

const SERVICE_OWNER_REGISTRAR: &[UserPermission] = &[
    CreateOrganisation,
    CreateProfession,
    DownloadDecisionData,
    ViewDecisionData,
];

const SERVICE_OWNER_EDITOR: &[UserPermission] = &[
    EditOrganisation,
    PublishOrganisation,
    EditProfession,
    PublishProfession,
    DownloadDecisionData,
    ViewDecisionData,
];

const ORGANISATION_ADMINISTRATOR: &[UserPermission] = &[
    ManageUsers,
    EditOrganisation,
    EditProfession,
    PublishProfession,
    UploadDecisionData,
    DownloadDecisionData,
    ViewDecisionData,
];

const ORGANISATION_EDITOR: &[UserPermission] = &[
    EditProfession,
    UploadDecisionData,
    DownloadDecisionData,
    ViewDecisionData,
];

/// The fixed permission set for a `(service_owner, role)` pair.
///
/// `(false, Registrar)` is a service-owner-only role and returns `None`.
pub fn permissions_for(service_owner: bool, role: UserRole) -> Option<&'static [UserPermission]> {
    match (service_owner, role) {
        (true, UserRole::Administrator) => Some(SERVICE_OWNER_ADMINISTRATOR),
        (true, UserRole::Registrar) => Some(SERVICE_OWNER_REGISTRAR),
        (true, UserRole::Editor) => Some(SERVICE_OWNER_EDITOR),
        (false, UserRole::Administrator) => Some(ORGANISATION_ADMINISTRATOR),
        (false, UserRole::Registrar) => None,
        (false, UserRole::Editor) => Some(ORGANISATION_EDITOR),
    }
}

/// Convenience wrapper over [`permissions_for`].
pub fn permissions_for_user(user: &ActingUser) -> Option<&'static [UserPermission]> {
    permissions_for(user.service_owner, user.role)
}

/// Whether `user` has a given permission. Missing table entries count as no
/// permissions.
pub fn has_permission(user: &ActingUser, permission: UserPermission) -> bool {
    permissions_for_user(user)
        .map(|set| set.contains(&permission))
        .unwrap_or(false)
}

/// The tier-one organisation ids of a profession, in input order.
pub fn tier_one_organisations(relations: &[ProfessionOrganisation]) -> Vec<DbId> {
    relations
        .iter()
        .filter(|r| r.role.is_tier_one())
        .map(|r| r.organisation_id)
        .collect()
}

/// Group a profession's organisations by role, tier-one roles only.
///
/// Tier-two roles never appear as keys.
pub fn group_by_role(
    relations: &[ProfessionOrganisation],
) -> BTreeMap<OrganisationRole, Vec<DbId>> {
    let mut grouped: BTreeMap<OrganisationRole, Vec<DbId>> = BTreeMap::new();
    for relation in relations {
        if relation.role.is_tier_one() {
            grouped
                .entry(relation.role)
                .or_default()
                .push(relation.organisation_id);
        }
    }
    grouped
}

/// Whether the user's own organisation holds a tier-one role for the
/// profession.
pub fn belongs_to_tier_one_organisation(
    user: &ActingUser,
    relations: &[ProfessionOrganisation],
) -> bool {
    match user.organisation_id {
        Some(own) => relations
            .iter()
            .any(|r| r.role.is_tier_one() && r.organisation_id == own),
        None => false,
    }
}

/// Whether the user may edit a profession: service owners always, otherwise
/// only members of one of the profession's tier-one organisations.
pub fn can_change_profession(user: &ActingUser, relations: &[ProfessionOrganisation]) -> bool {
    user.service_owner || belongs_to_tier_one_organisation(user, relations)
}

/// Reject unless the user is a service owner or belongs to the target
/// organisation. An absent target always fails for non-service-owners.
pub fn check_can_view_organisation(
    user: &ActingUser,
    organisation_id: Option<DbId>,
) -> Result<(), CoreError> {
    if user.service_owner {
        return Ok(());
    }
    match (user.organisation_id, organisation_id) {
        (Some(own), Some(target)) if own == target => Ok(()),
        _ => Err(CoreError::Forbidden(
            "User may not act on another organisation".into(),
        )),
    }
}

/// Reject unless the user is a service owner or a tier-one organisation
/// member of the profession.
pub fn check_can_view_profession(
    user: &ActingUser,
    relations: &[ProfessionOrganisation],
) -> Result<(), CoreError> {
    if can_change_profession(user, relations) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "User may not act on a profession outside their organisation".into(),
        ))
    }
}

/// Reject unless the user is a service owner or shares an organisation with
/// the target user.
pub fn check_can_view_user(
    user: &ActingUser,
    target_organisation_id: Option<DbId>,
) -> Result<(), CoreError> {
    check_can_view_organisation(user, target_organisation_id)
}
