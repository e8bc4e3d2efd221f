//! Integration tests for the archival service.
//!
//! - The archivability check reports blocking dependent names
//! - Archiving an organisation cascades archived versions to its tier-one
//!   professions, attributed to the acting user
//! - Version-less dependents are left untouched
//! - Archiving a live version frees the live slot first
//! - Unarchival derives a fresh draft from the archived version

use register_core::roles::{OrganisationRole, UserRole};
use register_core::status::VersionStatus;
use register_db::lifecycle::{ArchivalService, LifecycleError, PublicationService};
use register_db::models::organisation::{CreateOrganisation, NewOrganisationVersion};
use register_db::models::profession::{CreateProfession, NewProfessionVersion};
use register_db::models::user::CreateUser;
use register_db::repositories::{
    OrganisationRepo, OrganisationVersionRepo, ProfessionRepo, ProfessionVersionRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_user(pool: &PgPool, suffix: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: format!("Registrar {suffix}"),
            email: format!("registrar_{suffix}@register.test"),
            role: UserRole::Registrar,
            service_owner: true,
            organisation_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Create an organisation with one confirmed draft version.
/// Returns (organisation_id, version_id).
async fn org_with_draft(pool: &PgPool, name: &str, user_id: i64) -> (i64, i64) {
    let org = OrganisationRepo::create(
        pool,
        &CreateOrganisation {
            name: name.to_string(),
        },
    )
    .await
    .unwrap();
    let version =
        OrganisationVersionRepo::create(pool, &NewOrganisationVersion::blank(org.id, user_id))
            .await
            .unwrap();
    let draft = OrganisationVersionRepo::confirm(pool, version.id)
        .await
        .unwrap()
        .unwrap();
    (org.id, draft.id)
}

/// Create a tier-one profession for the organisation. Optionally give it a
/// draft version and immediately archive it, so the profession has history
/// but does not block archival.
async fn tier_one_profession(
    pool: &PgPool,
    org_id: i64,
    name: &str,
    user_id: i64,
    with_archived_version: bool,
) -> i64 {
    let prof = ProfessionRepo::create(
        pool,
        &CreateProfession {
            name: name.to_string(),
        },
    )
    .await
    .unwrap();
    ProfessionRepo::add_organisation(pool, prof.id, org_id, OrganisationRole::PrimaryRegulator)
        .await
        .unwrap();
    if with_archived_version {
        let version =
            ProfessionVersionRepo::create(pool, &NewProfessionVersion::blank(prof.id, user_id))
                .await
                .unwrap();
        ProfessionVersionRepo::confirm(pool, version.id)
            .await
            .unwrap()
            .unwrap();
        ArchivalService::archive_profession(pool, version.id)
            .await
            .unwrap();
    }
    prof.id
}

async fn profession_version_count(pool: &PgPool, profession_id: i64) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM profession_versions WHERE profession_id = $1")
            .bind(profession_id)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Test: check reports draft-latest dependents by name, skips version-less
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_reports_blocking_names(pool: PgPool) {
    let user_id = setup_user(&pool, "check").await;
    let (org_id, version_id) = org_with_draft(&pool, "Dept X", user_id).await;
    PublicationService::publish_organisation(&pool, version_id)
        .await
        .unwrap();

    // Prof A has a draft version; Prof B has none.
    let prof_a = ProfessionRepo::create(
        &pool,
        &CreateProfession {
            name: "Prof A".to_string(),
        },
    )
    .await
    .unwrap();
    ProfessionRepo::add_organisation(&pool, prof_a.id, org_id, OrganisationRole::PrimaryRegulator)
        .await
        .unwrap();
    let a_version =
        ProfessionVersionRepo::create(&pool, &NewProfessionVersion::blank(prof_a.id, user_id))
            .await
            .unwrap();
    ProfessionVersionRepo::confirm(&pool, a_version.id)
        .await
        .unwrap()
        .unwrap();
    tier_one_profession(&pool, org_id, "Prof B", user_id, false).await;

    let result = ArchivalService::check_archivable_organisation(&pool, org_id).await;
    match result {
        Err(LifecycleError::BlockedByDependents { names }) => {
            assert_eq!(names, vec!["Prof A".to_string()]);
        }
        other => panic!("expected BlockedByDependents, got {other:?}"),
    }

    // Archival itself re-checks and refuses.
    let archive = ArchivalService::archive_organisation(&pool, version_id, user_id).await;
    assert!(matches!(
        archive,
        Err(LifecycleError::BlockedByDependents { .. })
    ));
}

// ---------------------------------------------------------------------------
// Test: an in-flight edit does not hide a live dependent from the check
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_live_dependent_blocks_despite_newer_unconfirmed_edit(pool: PgPool) {
    let user_id = setup_user(&pool, "inflight").await;
    let (org_id, version_id) = org_with_draft(&pool, "Dept X", user_id).await;
    PublicationService::publish_organisation(&pool, version_id)
        .await
        .unwrap();

    let prof = ProfessionRepo::create(
        &pool,
        &CreateProfession {
            name: "Prof A".to_string(),
        },
    )
    .await
    .unwrap();
    ProfessionRepo::add_organisation(&pool, prof.id, org_id, OrganisationRole::PrimaryRegulator)
        .await
        .unwrap();
    let first = ProfessionVersionRepo::create(&pool, &NewProfessionVersion::blank(prof.id, user_id))
        .await
        .unwrap();
    ProfessionVersionRepo::confirm(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    let live = PublicationService::publish_profession(&pool, first.id)
        .await
        .unwrap();

    // Start an edit on the live profession: a newer unconfirmed version.
    ProfessionVersionRepo::create(&pool, &NewProfessionVersion::derived_from(&live, user_id))
        .await
        .unwrap();

    let result = ArchivalService::check_archivable_organisation(&pool, org_id).await;
    match result {
        Err(LifecycleError::BlockedByDependents { names }) => {
            assert_eq!(names, vec!["Prof A".to_string()]);
        }
        other => panic!("expected BlockedByDependents, got {other:?}"),
    }

    let archive = ArchivalService::archive_organisation(&pool, version_id, user_id).await;
    assert!(matches!(
        archive,
        Err(LifecycleError::BlockedByDependents { .. })
    ));
}

// ---------------------------------------------------------------------------
// Test: archiving cascades to professions with history, skips the rest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archive_cascades_to_dependents(pool: PgPool) {
    let author = setup_user(&pool, "author").await;
    let archiver = setup_user(&pool, "archiver").await;
    let (org_id, version_id) = org_with_draft(&pool, "Dept X", author).await;

    // One dependent with an archived version, one with no versions at all.
    let with_history = tier_one_profession(&pool, org_id, "Prof A", author, true).await;
    let without_history = tier_one_profession(&pool, org_id, "Prof B", author, false).await;
    assert_eq!(profession_version_count(&pool, with_history).await, 1);

    ArchivalService::check_archivable_organisation(&pool, org_id)
        .await
        .expect("no live or draft dependents remain");
    let archived = ArchivalService::archive_organisation(&pool, version_id, archiver)
        .await
        .unwrap();
    assert_eq!(archived.status, VersionStatus::Archived);

    // The dependent with history got one new archived version, owned by the
    // archiving user.
    assert_eq!(profession_version_count(&pool, with_history).await, 2);
    let latest = ProfessionVersionRepo::list_by_profession(&pool, with_history)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(latest.status, VersionStatus::Archived);
    assert_eq!(latest.user_id, archiver);

    // The version-less dependent stays version-less.
    assert_eq!(profession_version_count(&pool, without_history).await, 0);
}

// ---------------------------------------------------------------------------
// Test: archiving a live version frees the live slot first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archive_live_version(pool: PgPool) {
    let user_id = setup_user(&pool, "live").await;
    let (org_id, version_id) = org_with_draft(&pool, "Dept X", user_id).await;
    PublicationService::publish_organisation(&pool, version_id)
        .await
        .unwrap();

    let archived = ArchivalService::archive_organisation(&pool, version_id, user_id)
        .await
        .unwrap();
    assert_eq!(archived.status, VersionStatus::Archived);

    let live_count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM organisation_versions \
         WHERE organisation_id = $1 AND status = 'live'",
    )
    .bind(org_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live_count.0, 0, "no live version remains after archival");

    // The public slug lookup no longer resolves.
    let gone = OrganisationVersionRepo::find_live_by_slug(&pool, "dept-x")
        .await
        .unwrap();
    assert!(gone.is_none());
}

// ---------------------------------------------------------------------------
// Test: unarchive derives a fresh draft, leaving the archived row alone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unarchive_creates_new_draft(pool: PgPool) {
    let author = setup_user(&pool, "unarchive_author").await;
    let restorer = setup_user(&pool, "unarchive_restorer").await;
    let (org_id, version_id) = org_with_draft(&pool, "Dept X", author).await;
    let archived = ArchivalService::archive_organisation(&pool, version_id, author)
        .await
        .unwrap();

    let draft = ArchivalService::unarchive_organisation(&pool, archived.id, restorer)
        .await
        .unwrap();
    assert_ne!(draft.id, archived.id, "unarchive creates a new row");
    assert_eq!(draft.status, VersionStatus::Draft);
    assert_eq!(draft.user_id, restorer);
    assert_eq!(draft.organisation_id, org_id);

    // The archived row is untouched.
    let still_archived = OrganisationVersionRepo::find_by_id(&pool, archived.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_archived.status, VersionStatus::Archived);
}

// ---------------------------------------------------------------------------
// Test: only archived versions can be unarchived
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unarchive_draft_is_rejected(pool: PgPool) {
    let user_id = setup_user(&pool, "unarchive_draft").await;
    let (_org_id, version_id) = org_with_draft(&pool, "Dept X", user_id).await;

    let result = ArchivalService::unarchive_organisation(&pool, version_id, user_id).await;
    assert!(matches!(
        result,
        Err(LifecycleError::InvalidTransition {
            from: VersionStatus::Draft,
            to: VersionStatus::Draft,
        })
    ));
}
