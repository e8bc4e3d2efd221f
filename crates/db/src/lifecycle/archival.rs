//! Atomic archival and unarchival of versions, with the dependent check
//! and the organisation-to-profession cascade.

use sqlx::{PgConnection, PgPool};

use register_core::status::VersionStatus;
use register_core::types::DbId;

use crate::lifecycle::LifecycleError;
use crate::models::decision_dataset::{DecisionDatasetVersion, NewDecisionDatasetVersion};
use crate::models::organisation::{NewOrganisationVersion, OrganisationVersion};
use crate::models::profession::{NewProfessionVersion, ProfessionVersion};
use crate::repositories::{
    DecisionDatasetVersionRepo, OrganisationVersionRepo, ProfessionRepo, ProfessionVersionRepo,
};

/// Archives versions and cascades organisation archival to the tier-one
/// professions the organisation regulates.
///
/// Archival frees the entity's live slot rather than erasing it: the
/// entity's own live version (if any) is demoted to draft, then the target
/// version is archived. The cascade gives each affected profession a fresh
/// version attributed to the acting user and archives it, so the history
/// records who archived what and when. Cascade-created versions go straight
/// to archived; the draft-first rule applies to user-driven edits, not to
/// bookkeeping rows.
///
/// Unarchival is the inverse correction path: it derives a brand-new draft
/// from the archived version instead of resurrecting the old row.
pub struct ArchivalService;

impl ArchivalService {
    // ── Organisations ────────────────────────────────────────────────

    /// Whether an organisation may be archived. Blocked when any tier-one
    /// profession's latest version is live or draft; the blocking names are
    /// carried in the error so the caller can show them. Professions with
    /// no versions at all never block.
    pub async fn check_archivable_organisation(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<(), LifecycleError> {
        let names = ProfessionVersionRepo::blocking_dependent_names(pool, organisation_id).await?;
        if names.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::BlockedByDependents { names })
        }
    }

    /// Archive an organisation version, cascading to dependent professions.
    ///
    /// The dependent check runs again inside the transaction; a dependent
    /// published between the caller's check and this call still blocks.
    pub async fn archive_organisation(
        pool: &PgPool,
        version_id: DbId,
        acting_user_id: DbId,
    ) -> Result<OrganisationVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = OrganisationVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        Self::check_archivable_transition(version.status)?;

        let names =
            ProfessionVersionRepo::blocking_dependent_names_in_tx(&mut tx, version.organisation_id)
                .await?;
        if !names.is_empty() {
            return Err(LifecycleError::BlockedByDependents { names });
        }

        OrganisationVersionRepo::demote_live_in_tx(
            &mut tx,
            version.organisation_id,
            VersionStatus::Draft,
        )
        .await?;

        let dependents = ProfessionRepo::tier_one_professions_for_organisation_in_tx(
            &mut tx,
            version.organisation_id,
        )
        .await?;
        let mut cascaded = 0;
        for profession in &dependents {
            if Self::archive_profession_in_tx(&mut tx, profession.id, acting_user_id).await? {
                cascaded += 1;
            }
        }

        let archived =
            OrganisationVersionRepo::set_status_in_tx(&mut tx, version_id, VersionStatus::Archived)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        tx.commit().await?;
        tracing::info!(
            organisation_id = version.organisation_id,
            version_id,
            cascaded,
            "archived organisation version"
        );
        Ok(archived)
    }

    /// Create a new draft version from an archived organisation version.
    pub async fn unarchive_organisation(
        pool: &PgPool,
        version_id: DbId,
        acting_user_id: DbId,
    ) -> Result<OrganisationVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = OrganisationVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Draft)?;

        let seed = NewOrganisationVersion::derived_from(&version, acting_user_id);
        let created = OrganisationVersionRepo::create_in_tx(&mut tx, &seed).await?;
        let draft =
            OrganisationVersionRepo::set_status_in_tx(&mut tx, created.id, VersionStatus::Draft)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: created.id })?;

        tx.commit().await?;
        tracing::info!(
            organisation_id = version.organisation_id,
            from_version_id = version_id,
            new_version_id = draft.id,
            "unarchived organisation version"
        );
        Ok(draft)
    }

    // ── Professions ──────────────────────────────────────────────────

    /// Archive a profession version. Professions have no sub-dependents, so
    /// no cascade runs.
    pub async fn archive_profession(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<ProfessionVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = ProfessionVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        Self::check_archivable_transition(version.status)?;

        ProfessionVersionRepo::demote_live_in_tx(
            &mut tx,
            version.profession_id,
            VersionStatus::Draft,
        )
        .await?;
        let archived =
            ProfessionVersionRepo::set_status_in_tx(&mut tx, version_id, VersionStatus::Archived)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        tx.commit().await?;
        tracing::info!(
            profession_id = version.profession_id,
            version_id,
            "archived profession version"
        );
        Ok(archived)
    }

    /// Create a new draft version from an archived profession version.
    pub async fn unarchive_profession(
        pool: &PgPool,
        version_id: DbId,
        acting_user_id: DbId,
    ) -> Result<ProfessionVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = ProfessionVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Draft)?;

        let seed = NewProfessionVersion::derived_from(&version, acting_user_id);
        let created = ProfessionVersionRepo::create_in_tx(&mut tx, &seed).await?;
        let draft =
            ProfessionVersionRepo::set_status_in_tx(&mut tx, created.id, VersionStatus::Draft)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: created.id })?;

        tx.commit().await?;
        tracing::info!(
            profession_id = version.profession_id,
            from_version_id = version_id,
            new_version_id = draft.id,
            "unarchived profession version"
        );
        Ok(draft)
    }

    // ── Decision datasets ────────────────────────────────────────────

    /// Archive a decision dataset version.
    pub async fn archive_decision_dataset(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<DecisionDatasetVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = DecisionDatasetVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        Self::check_archivable_transition(version.status)?;

        DecisionDatasetVersionRepo::demote_live_in_tx(
            &mut tx,
            version.dataset_id,
            VersionStatus::Draft,
        )
        .await?;
        let archived = DecisionDatasetVersionRepo::set_status_in_tx(
            &mut tx,
            version_id,
            VersionStatus::Archived,
        )
        .await?
        .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        tx.commit().await?;
        tracing::info!(
            dataset_id = version.dataset_id,
            version_id,
            "archived decision dataset version"
        );
        Ok(archived)
    }

    /// Create a new draft version from an archived dataset version.
    pub async fn unarchive_decision_dataset(
        pool: &PgPool,
        version_id: DbId,
        acting_user_id: DbId,
    ) -> Result<DecisionDatasetVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = DecisionDatasetVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Draft)?;

        let seed = NewDecisionDatasetVersion::derived_from(&version, acting_user_id);
        let created = DecisionDatasetVersionRepo::create_in_tx(&mut tx, &seed).await?;
        let draft =
            DecisionDatasetVersionRepo::set_status_in_tx(&mut tx, created.id, VersionStatus::Draft)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: created.id })?;

        tx.commit().await?;
        tracing::info!(
            dataset_id = version.dataset_id,
            from_version_id = version_id,
            new_version_id = draft.id,
            "unarchived decision dataset version"
        );
        Ok(draft)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// A version can be archived from draft or live. The live case is
    /// handled by first demoting the entity's live slot to draft, so the
    /// target row is always draft by the time it is archived.
    fn check_archivable_transition(from: VersionStatus) -> Result<(), LifecycleError> {
        match from {
            VersionStatus::Draft | VersionStatus::Live => Ok(()),
            other => Err(LifecycleError::InvalidTransition {
                from: other,
                to: VersionStatus::Archived,
            }),
        }
    }

    /// Cascade step: give the profession a fresh version owned by the
    /// acting user and archive it, demoting any live version to draft
    /// first. Skips professions with no versions at all and returns whether
    /// anything was written.
    async fn archive_profession_in_tx(
        conn: &mut PgConnection,
        profession_id: DbId,
        acting_user_id: DbId,
    ) -> Result<bool, LifecycleError> {
        let Some(latest) =
            ProfessionVersionRepo::find_latest_any_in_tx(&mut *conn, profession_id).await?
        else {
            return Ok(false);
        };

        let seed = NewProfessionVersion::derived_from(&latest, acting_user_id);
        let created = ProfessionVersionRepo::create_in_tx(&mut *conn, &seed).await?;
        ProfessionVersionRepo::demote_live_in_tx(&mut *conn, profession_id, VersionStatus::Draft)
            .await?;
        ProfessionVersionRepo::set_status_in_tx(&mut *conn, created.id, VersionStatus::Archived)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: created.id })?;
        Ok(true)
    }
}
