//! Integration tests for organisation version storage.
//!
//! Exercises the `OrganisationVersionRepo` against a real database:
//! - New versions start `unconfirmed` and belong to the acting user
//! - Content edits apply only while unconfirmed/draft
//! - `confirm` promotes exactly once
//! - `find_latest_for_organisation` surfaces only confirmed versions
//! - `find_by_id_with_entity` counts blocking tier-one dependents
//! - Listing composites include version-less entities

use register_core::roles::{OrganisationRole, UserRole};
use register_core::status::VersionStatus;
use register_db::models::organisation::{
    CreateOrganisation, NewOrganisationVersion, OrganisationVersionContent,
};
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

async fn setup_organisation(pool: &PgPool, name: &str) -> i64 {
    OrganisationRepo::create(
        pool,
        &CreateOrganisation {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn content(alternate_name: &str) -> OrganisationVersionContent {
    OrganisationVersionContent {
        alternate_name: Some(alternate_name.to_string()),
        address: Some("1 Victoria Street, London".to_string()),
        url: Some("https://example.gov.uk".to_string()),
        email: Some("contact@example.gov.uk".to_string()),
        telephone: None,
    }
}

// ---------------------------------------------------------------------------
// Test: create starts unconfirmed and attributes the acting user
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_starts_unconfirmed(pool: PgPool) {
    let user_id = setup_user(&pool, "create").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;

    let version =
        OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
            .await
            .unwrap();

    assert!(version.id > 0, "id should be auto-generated");
    assert_eq!(version.status, VersionStatus::Unconfirmed);
    assert_eq!(version.user_id, user_id);
    assert_eq!(version.organisation_id, org_id);
    assert_eq!(version.alternate_name, None);
}

// ---------------------------------------------------------------------------
// Test: save applies while unconfirmed or draft, never afterwards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_save_only_while_editable(pool: PgPool) {
    let user_id = setup_user(&pool, "save").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;

    let version =
        OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
            .await
            .unwrap();

    // Editable while unconfirmed.
    let saved = OrganisationVersionRepo::save(&pool, version.id, &content("EngC"))
        .await
        .unwrap()
        .expect("unconfirmed version should accept edits");
    assert_eq!(saved.alternate_name.as_deref(), Some("EngC"));

    // Still editable as draft.
    OrganisationVersionRepo::confirm(&pool, version.id)
        .await
        .unwrap()
        .unwrap();
    let saved = OrganisationVersionRepo::save(&pool, version.id, &content("EngC2"))
        .await
        .unwrap()
        .expect("draft version should accept edits");
    assert_eq!(saved.alternate_name.as_deref(), Some("EngC2"));

    // Archived rows are immutable.
    register_db::lifecycle::ArchivalService::archive_organisation(&pool, version.id, user_id)
        .await
        .unwrap();
    let refused = OrganisationVersionRepo::save(&pool, version.id, &content("EngC3"))
        .await
        .unwrap();
    assert!(refused.is_none(), "archived version must refuse edits");
}

// ---------------------------------------------------------------------------
// Test: confirm promotes unconfirmed -> draft exactly once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirm_promotes_exactly_once(pool: PgPool) {
    let user_id = setup_user(&pool, "confirm").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;
    let version =
        OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
            .await
            .unwrap();

    let confirmed = OrganisationVersionRepo::confirm(&pool, version.id)
        .await
        .unwrap()
        .expect("first confirm should succeed");
    assert_eq!(confirmed.status, VersionStatus::Draft);

    let again = OrganisationVersionRepo::confirm(&pool, version.id)
        .await
        .unwrap();
    assert!(again.is_none(), "a draft cannot be confirmed twice");
}

// ---------------------------------------------------------------------------
// Test: find_latest_for_organisation ignores unconfirmed rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_latest_skips_unconfirmed(pool: PgPool) {
    let user_id = setup_user(&pool, "latest").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;

    let v1 = OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
        .await
        .unwrap();
    OrganisationVersionRepo::confirm(&pool, v1.id)
        .await
        .unwrap()
        .unwrap();
    let v2 = OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
        .await
        .unwrap();

    // v2 is unconfirmed, so v1 is still the latest confirmed version.
    let latest = OrganisationVersionRepo::find_latest_for_organisation(&pool, org_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, v1.id);

    OrganisationVersionRepo::confirm(&pool, v2.id)
        .await
        .unwrap()
        .unwrap();
    let latest = OrganisationVersionRepo::find_latest_for_organisation(&pool, org_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, v2.id, "once confirmed, the newer version wins");
}

// ---------------------------------------------------------------------------
// Test: derived versions copy content but not identity or status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_derived_version_copies_content_only(pool: PgPool) {
    let author = setup_user(&pool, "author").await;
    let editor = setup_user(&pool, "editor").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;

    let v1 = OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, author))
        .await
        .unwrap();
    let v1 = OrganisationVersionRepo::save(&pool, v1.id, &content("EngC"))
        .await
        .unwrap()
        .unwrap();

    let v2 =
        OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::derived_from(&v1, editor))
            .await
            .unwrap();

    assert_ne!(v2.id, v1.id);
    assert_eq!(v2.status, VersionStatus::Unconfirmed);
    assert_eq!(v2.user_id, editor, "ownership moves to the acting user");
    assert_eq!(v2.alternate_name, v1.alternate_name);
    assert_eq!(v2.address, v1.address);
    assert_eq!(v2.email, v1.email);
}

// ---------------------------------------------------------------------------
// Test: find_by_id_with_entity counts tier-one dependents only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_with_entity_counts_tier_one_dependents(pool: PgPool) {
    let user_id = setup_user(&pool, "deps").await;
    let org_id = setup_organisation(&pool, "Engineering Council").await;
    let version =
        OrganisationVersionRepo::create(&pool, &NewOrganisationVersion::blank(org_id, user_id))
            .await
            .unwrap();

    // A tier-one profession with a draft version counts.
    let prof = ProfessionRepo::create(
        &pool,
        &CreateProfession {
            name: "Chartered Engineer".to_string(),
        },
    )
    .await
    .unwrap();
    ProfessionRepo::add_organisation(&pool, prof.id, org_id, OrganisationRole::PrimaryRegulator)
        .await
        .unwrap();
    let pv = ProfessionVersionRepo::create(&pool, &NewProfessionVersion::blank(prof.id, user_id))
        .await
        .unwrap();
    ProfessionVersionRepo::confirm(&pool, pv.id)
        .await
        .unwrap()
        .unwrap();

    // A tier-two relation never counts, even with a draft version.
    let enforcer = ProfessionRepo::create(
        &pool,
        &CreateProfession {
            name: "Enforced Trade".to_string(),
        },
    )
    .await
    .unwrap();
    ProfessionRepo::add_organisation(&pool, enforcer.id, org_id, OrganisationRole::EnforcementBody)
        .await
        .unwrap();
    let ev = ProfessionVersionRepo::create(
        &pool,
        &NewProfessionVersion::blank(enforcer.id, user_id),
    )
    .await
    .unwrap();
    ProfessionVersionRepo::confirm(&pool, ev.id)
        .await
        .unwrap()
        .unwrap();

    let with_entity = OrganisationVersionRepo::find_by_id_with_entity(&pool, org_id, version.id)
        .await
        .unwrap()
        .expect("version belongs to the organisation");
    assert_eq!(with_entity.organisation_name, "Engineering Council");
    assert_eq!(with_entity.current_dependents, 1);

    // Wrong pairing returns None rather than another organisation's version.
    let other_org = setup_organisation(&pool, "Other Council").await;
    let mismatch =
        OrganisationVersionRepo::find_by_id_with_entity(&pool, other_org, version.id)
            .await
            .unwrap();
    assert!(mismatch.is_none());
}

// ---------------------------------------------------------------------------
// Test: all_with_latest_version includes version-less entities
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_with_latest_version_includes_versionless(pool: PgPool) {
    let user_id = setup_user(&pool, "listing").await;
    let with_version = setup_organisation(&pool, "Engineering Council").await;
    let without_version = setup_organisation(&pool, "Bare Council").await;

    OrganisationVersionRepo::create(
        &pool,
        &NewOrganisationVersion::blank(with_version, user_id),
    )
    .await
    .unwrap();

    let listing = OrganisationVersionRepo::all_with_latest_version(&pool)
        .await
        .unwrap();
    assert_eq!(listing.len(), 2);

    let bare = listing
        .iter()
        .find(|o| o.id == without_version)
        .expect("version-less organisation should still be listed");
    assert_eq!(bare.version_id, None);
    assert_eq!(bare.status, None);

    let versioned = listing.iter().find(|o| o.id == with_version).unwrap();
    assert_eq!(versioned.status, Some(VersionStatus::Unconfirmed));
}
