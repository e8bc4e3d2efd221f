//! Repository for the `organisation_versions` table.

use sqlx::{PgConnection, PgPool};

use register_core::status::VersionStatus;
use register_core::types::DbId;

use crate::models::organisation::{
    NewOrganisationVersion, OrganisationVersion, OrganisationVersionContent,
    OrganisationVersionWithEntity, OrganisationWithVersion,
};
use crate::repositories::profession_repo::TIER_ONE_ROLES_SQL;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, user_id, status, alternate_name, \
    address, url, email, telephone, created_at, updated_at";

/// Columns for the entity-plus-version composite selects.
const COMPOSITE_COLUMNS: &str = "o.id, o.name, o.slug, v.id AS version_id, v.status, \
    v.alternate_name, v.address, v.url, v.email, v.telephone";

/// Provides CRUD and lifecycle-support operations for organisation versions.
pub struct OrganisationVersionRepo;

impl OrganisationVersionRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new version row from a copy-on-write seed. The row starts
    /// `unconfirmed`; identity and timestamps are assigned here, never copied.
    pub async fn create(
        pool: &PgPool,
        input: &NewOrganisationVersion,
    ) -> Result<OrganisationVersion, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in_tx(&mut conn, input).await
    }

    /// Transaction-scoped variant of [`Self::create`], used by the lifecycle
    /// services to compose version creation with status changes atomically.
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        input: &NewOrganisationVersion,
    ) -> Result<OrganisationVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO organisation_versions
                (organisation_id, user_id, alternate_name, address, url, email, telephone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(input.organisation_id)
            .bind(input.user_id)
            .bind(&input.alternate_name)
            .bind(&input.address)
            .bind(&input.url)
            .bind(&input.email)
            .bind(&input.telephone)
            .fetch_one(conn)
            .await
    }

    /// Find a version by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisation_versions WHERE id = $1");
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editable content of a version. Only unconfirmed and
    /// draft versions accept edits; live and archived rows are immutable.
    ///
    /// Returns `None` when the version does not exist or is past editing.
    pub async fn save(
        pool: &PgPool,
        id: DbId,
        content: &OrganisationVersionContent,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE organisation_versions SET
                alternate_name = $2,
                address = $3,
                url = $4,
                email = $5,
                telephone = $6
             WHERE id = $1 AND status IN ('unconfirmed', 'draft')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(id)
            .bind(&content.alternate_name)
            .bind(&content.address)
            .bind(&content.url)
            .bind(&content.email)
            .bind(&content.telephone)
            .fetch_optional(pool)
            .await
    }

    /// List every version of an organisation, most recent first. This is the
    /// full history, archived rows included.
    pub async fn list_by_organisation(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<OrganisationVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organisation_versions
             WHERE organisation_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    // ── Lifecycle support ────────────────────────────────────────────

    /// Promote an `unconfirmed` version to `draft`, making it eligible for
    /// publication. Returns `None` if the version is missing or already
    /// confirmed.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE organisation_versions SET status = 'draft'
             WHERE id = $1 AND status = 'unconfirmed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set a version's status inside the caller's transaction without any
    /// transition checking. Callers validate transitions first.
    pub async fn set_status_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        status: VersionStatus,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE organisation_versions SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(conn)
            .await
    }

    /// Demote whichever version of the organisation is currently live, if
    /// any, inside the caller's transaction. Keeps the one-live-version
    /// invariant when another version is about to go live.
    pub async fn demote_live_in_tx(
        conn: &mut PgConnection,
        organisation_id: DbId,
        to: VersionStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE organisation_versions SET status = $2 \
             WHERE organisation_id = $1 AND status = 'live'",
        )
        .bind(organisation_id)
        .bind(to)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Re-read a version inside the caller's transaction, for
    /// check-then-change sequences.
    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisation_versions WHERE id = $1");
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    // ── Composite reads ──────────────────────────────────────────────

    /// Fetch a version joined with its owning organisation, plus a count of
    /// tier-one professions whose latest version is live or draft. The count
    /// answers "would archiving this organisation be blocked" in the same
    /// round trip.
    ///
    /// Returns `None` when the version does not exist or does not belong to
    /// the given organisation.
    pub async fn find_by_id_with_entity(
        pool: &PgPool,
        organisation_id: DbId,
        version_id: DbId,
    ) -> Result<Option<OrganisationVersionWithEntity>, sqlx::Error> {
        let query = format!(
            "SELECT v.id, v.organisation_id, v.user_id, v.status, v.alternate_name,
                    v.address, v.url, v.email, v.telephone, v.created_at, v.updated_at,
                    o.name AS organisation_name, o.slug AS organisation_slug,
                    (SELECT COUNT(*) FROM (
                        SELECT DISTINCT ON (pv.profession_id) pv.status
                        FROM profession_to_organisations pto
                        JOIN profession_versions pv ON pv.profession_id = pto.profession_id
                        WHERE pto.organisation_id = o.id
                          AND pto.role IN ({TIER_ONE_ROLES_SQL})
                          AND pv.status <> 'unconfirmed'
                        ORDER BY pv.profession_id, pv.created_at DESC, pv.id DESC
                    ) latest WHERE latest.status IN ('live', 'draft')) AS current_dependents
             FROM organisation_versions v
             JOIN organisations o ON o.id = v.organisation_id
             WHERE v.organisation_id = $1 AND v.id = $2"
        );
        sqlx::query_as::<_, OrganisationVersionWithEntity>(&query)
            .bind(organisation_id)
            .bind(version_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent confirmed version of an organisation: live or draft,
    /// newest creation first. Unconfirmed and archived rows never surface
    /// here.
    pub async fn find_latest_for_organisation(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Option<OrganisationVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organisation_versions
             WHERE organisation_id = $1 AND status IN ('draft', 'live')
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, OrganisationVersion>(&query)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// All organisations that currently have a live version, composed with
    /// that version and ordered alphabetically. The public register listing.
    pub async fn all_live(pool: &PgPool) -> Result<Vec<OrganisationWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPOSITE_COLUMNS}
             FROM organisations o
             JOIN organisation_versions v ON v.organisation_id = o.id
             WHERE v.status = 'live'
             ORDER BY o.name ASC"
        );
        sqlx::query_as::<_, OrganisationWithVersion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Every organisation composed with its most recent version regardless
    /// of status. The administrative listing: draft-only and archived
    /// organisations appear alongside live ones, version-less entities with
    /// bare identity fields. Ordered newest entity first, ties broken by
    /// version recency, deterministically.
    pub async fn all_with_latest_version(
        pool: &PgPool,
    ) -> Result<Vec<OrganisationWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (o.id) {COMPOSITE_COLUMNS}
             FROM organisations o
             LEFT JOIN organisation_versions v ON v.organisation_id = o.id
             ORDER BY o.id DESC, v.created_at DESC, v.id DESC"
        );
        sqlx::query_as::<_, OrganisationWithVersion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Public lookup: an organisation by slug, composed with its live
    /// version. Absent when the slug is unknown or nothing is live.
    pub async fn find_live_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<OrganisationWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPOSITE_COLUMNS}
             FROM organisations o
             JOIN organisation_versions v ON v.organisation_id = o.id
             WHERE o.slug = $1 AND v.status = 'live'"
        );
        sqlx::query_as::<_, OrganisationWithVersion>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
