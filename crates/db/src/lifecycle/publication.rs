//! Atomic promotion of a draft version to live.

use sqlx::{PgConnection, PgPool};

use register_core::slug::{slugify, with_suffix};
use register_core::status::VersionStatus;
use register_core::types::DbId;

use crate::lifecycle::LifecycleError;
use crate::models::decision_dataset::DecisionDatasetVersion;
use crate::models::organisation::OrganisationVersion;
use crate::models::profession::ProfessionVersion;
use crate::repositories::{
    DecisionDatasetVersionRepo, OrganisationRepo, OrganisationVersionRepo, ProfessionRepo,
    ProfessionVersionRepo,
};

/// Promotes draft versions to live, demoting whatever was previously live
/// for the same entity in the same transaction. The prior live version is
/// archived; it remains reachable through the entity's history and through
/// unarchival.
///
/// On the first-ever publication of an organisation or profession the
/// entity is also assigned its public slug, derived from its name, with a
/// numeric suffix on collision. Slugs are permanent once assigned.
pub struct PublicationService;

impl PublicationService {
    /// Publish an organisation version. Only a draft can go live.
    pub async fn publish_organisation(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<OrganisationVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = OrganisationVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Live)?;

        let demoted =
            OrganisationVersionRepo::demote_live_in_tx(&mut tx, version.organisation_id, VersionStatus::Archived)
                .await?;
        let published = OrganisationVersionRepo::set_status_in_tx(&mut tx, version_id, VersionStatus::Live)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        let organisation = OrganisationRepo::find_by_id_in_tx(&mut tx, version.organisation_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        if organisation.slug.is_none() {
            let slug = Self::assign_organisation_slug(&mut tx, organisation.id, &organisation.name)
                .await?;
            tracing::info!(
                organisation_id = organisation.id,
                slug = %slug,
                "assigned slug on first publication"
            );
        }

        tx.commit().await?;
        tracing::info!(
            organisation_id = version.organisation_id,
            version_id,
            demoted,
            "published organisation version"
        );
        Ok(published)
    }

    /// Publish a profession version. Only a draft can go live.
    pub async fn publish_profession(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<ProfessionVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = ProfessionVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Live)?;

        let demoted =
            ProfessionVersionRepo::demote_live_in_tx(&mut tx, version.profession_id, VersionStatus::Archived)
                .await?;
        let published = ProfessionVersionRepo::set_status_in_tx(&mut tx, version_id, VersionStatus::Live)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        let profession = ProfessionRepo::find_by_id_in_tx(&mut tx, version.profession_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        if profession.slug.is_none() {
            let slug =
                Self::assign_profession_slug(&mut tx, profession.id, &profession.name).await?;
            tracing::info!(
                profession_id = profession.id,
                slug = %slug,
                "assigned slug on first publication"
            );
        }

        tx.commit().await?;
        tracing::info!(
            profession_id = version.profession_id,
            version_id,
            demoted,
            "published profession version"
        );
        Ok(published)
    }

    /// Publish a decision dataset version. Datasets carry no slug; they are
    /// addressed through their owning profession and organisation.
    pub async fn publish_decision_dataset(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<DecisionDatasetVersion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let version = DecisionDatasetVersionRepo::find_by_id_in_tx(&mut tx, version_id)
            .await?
            .ok_or(LifecycleError::VersionNotFound { id: version_id })?;
        LifecycleError::check_transition(version.status, VersionStatus::Live)?;

        let demoted =
            DecisionDatasetVersionRepo::demote_live_in_tx(&mut tx, version.dataset_id, VersionStatus::Archived)
                .await?;
        let published =
            DecisionDatasetVersionRepo::set_status_in_tx(&mut tx, version_id, VersionStatus::Live)
                .await?
                .ok_or(LifecycleError::VersionNotFound { id: version_id })?;

        tx.commit().await?;
        tracing::info!(
            dataset_id = version.dataset_id,
            version_id,
            demoted,
            "published decision dataset version"
        );
        Ok(published)
    }

    /// Pick the first free slug for the name and claim it for the
    /// organisation, all inside the publication transaction.
    async fn assign_organisation_slug(
        conn: &mut PgConnection,
        organisation_id: DbId,
        name: &str,
    ) -> Result<String, LifecycleError> {
        // A name with no slug-safe characters falls back to a generic base;
        // suffix probing still disambiguates.
        let mut base = slugify(name);
        if base.is_empty() {
            base = "organisation".to_string();
        }
        let mut candidate = base.clone();
        let mut suffix = 2;
        while OrganisationRepo::slug_exists_in_tx(&mut *conn, &candidate).await? {
            candidate = with_suffix(&base, suffix);
            suffix += 1;
        }
        OrganisationRepo::set_slug_in_tx(&mut *conn, organisation_id, &candidate).await?;
        Ok(candidate)
    }

    /// As [`Self::assign_organisation_slug`], for professions.
    async fn assign_profession_slug(
        conn: &mut PgConnection,
        profession_id: DbId,
        name: &str,
    ) -> Result<String, LifecycleError> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = "profession".to_string();
        }
        let mut candidate = base.clone();
        let mut suffix = 2;
        while ProfessionRepo::slug_exists_in_tx(&mut *conn, &candidate).await? {
            candidate = with_suffix(&base, suffix);
            suffix += 1;
        }
        ProfessionRepo::set_slug_in_tx(&mut *conn, profession_id, &candidate).await?;
        Ok(candidate)
    }
}
