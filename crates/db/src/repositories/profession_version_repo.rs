//! Repository for the `profession_versions` table.

use sqlx::{PgConnection, PgPool};

use register_core::status::VersionStatus;
use register_core::types::DbId;

use crate::models::profession::{
    NewProfessionVersion, ProfessionVersion, ProfessionVersionContent, ProfessionVersionWithEntity,
    ProfessionWithVersion,
};
use crate::repositories::profession_repo::TIER_ONE_ROLES_SQL;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profession_id, user_id, status, alternate_names, description, \
    regulation_summary, regulation_type, reserved_activities, legislation, qualification, \
    registration_requirements, created_at, updated_at";

/// Columns for the entity-plus-version composite selects.
const COMPOSITE_COLUMNS: &str = "p.id, p.name, p.slug, v.id AS version_id, v.status, \
    v.alternate_names, v.description, v.regulation_summary, v.regulation_type, \
    v.reserved_activities, v.legislation, v.qualification, v.registration_requirements";

/// Provides CRUD and lifecycle-support operations for profession versions.
pub struct ProfessionVersionRepo;

impl ProfessionVersionRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new version row from a copy-on-write seed. The row starts
    /// `unconfirmed`.
    pub async fn create(
        pool: &PgPool,
        input: &NewProfessionVersion,
    ) -> Result<ProfessionVersion, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in_tx(&mut conn, input).await
    }

    /// Transaction-scoped variant of [`Self::create`], used by the lifecycle
    /// services (notably the archival cascade) to compose version creation
    /// with status changes atomically.
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        input: &NewProfessionVersion,
    ) -> Result<ProfessionVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO profession_versions
                (profession_id, user_id, alternate_names, description, regulation_summary,
                 regulation_type, reserved_activities, legislation, qualification,
                 registration_requirements)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(input.profession_id)
            .bind(input.user_id)
            .bind(&input.alternate_names)
            .bind(&input.description)
            .bind(&input.regulation_summary)
            .bind(&input.regulation_type)
            .bind(&input.reserved_activities)
            .bind(&input.legislation)
            .bind(&input.qualification)
            .bind(&input.registration_requirements)
            .fetch_one(conn)
            .await
    }

    /// Find a version by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profession_versions WHERE id = $1");
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editable content of a version. Only unconfirmed and
    /// draft versions accept edits.
    ///
    /// Returns `None` when the version does not exist or is past editing.
    pub async fn save(
        pool: &PgPool,
        id: DbId,
        content: &ProfessionVersionContent,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE profession_versions SET
                alternate_names = $2,
                description = $3,
                regulation_summary = $4,
                regulation_type = $5,
                reserved_activities = $6,
                legislation = $7,
                qualification = $8,
                registration_requirements = $9
             WHERE id = $1 AND status IN ('unconfirmed', 'draft')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(id)
            .bind(&content.alternate_names)
            .bind(&content.description)
            .bind(&content.regulation_summary)
            .bind(&content.regulation_type)
            .bind(&content.reserved_activities)
            .bind(&content.legislation)
            .bind(&content.qualification)
            .bind(&content.registration_requirements)
            .fetch_optional(pool)
            .await
    }

    /// List every version of a profession, most recent first.
    pub async fn list_by_profession(
        pool: &PgPool,
        profession_id: DbId,
    ) -> Result<Vec<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profession_versions
             WHERE profession_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(profession_id)
            .fetch_all(pool)
            .await
    }

    // ── Lifecycle support ────────────────────────────────────────────

    /// Promote an `unconfirmed` version to `draft`. Returns `None` if the
    /// version is missing or already confirmed.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE profession_versions SET status = 'draft'
             WHERE id = $1 AND status = 'unconfirmed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
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
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE profession_versions SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(conn)
            .await
    }

    /// Demote whichever version of the profession is currently live, if any,
    /// inside the caller's transaction.
    pub async fn demote_live_in_tx(
        conn: &mut PgConnection,
        profession_id: DbId,
        to: VersionStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profession_versions SET status = $2 \
             WHERE profession_id = $1 AND status = 'live'",
        )
        .bind(profession_id)
        .bind(to)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Re-read a version inside the caller's transaction.
    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profession_versions WHERE id = $1");
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The newest version of a profession regardless of status, inside the
    /// caller's transaction. The archival cascade copies from this.
    pub async fn find_latest_any_in_tx(
        conn: &mut PgConnection,
        profession_id: DbId,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profession_versions
             WHERE profession_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(profession_id)
            .fetch_optional(conn)
            .await
    }

    // ── Composite reads ──────────────────────────────────────────────

    /// Fetch a version joined with its owning profession.
    ///
    /// Returns `None` when the version does not exist or does not belong to
    /// the given profession.
    pub async fn find_by_id_with_entity(
        pool: &PgPool,
        profession_id: DbId,
        version_id: DbId,
    ) -> Result<Option<ProfessionVersionWithEntity>, sqlx::Error> {
        let query = format!(
            "SELECT v.id, v.profession_id, v.user_id, v.status, v.alternate_names,
                    v.description, v.regulation_summary, v.regulation_type,
                    v.reserved_activities, v.legislation, v.qualification,
                    v.registration_requirements, v.created_at, v.updated_at,
                    p.name AS profession_name, p.slug AS profession_slug
             FROM profession_versions v
             JOIN professions p ON p.id = v.profession_id
             WHERE v.profession_id = $1 AND v.id = $2"
        );
        sqlx::query_as::<_, ProfessionVersionWithEntity>(&query)
            .bind(profession_id)
            .bind(version_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent confirmed version of a profession: live or draft,
    /// newest creation first.
    pub async fn find_latest_for_profession(
        pool: &PgPool,
        profession_id: DbId,
    ) -> Result<Option<ProfessionVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profession_versions
             WHERE profession_id = $1 AND status IN ('draft', 'live')
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ProfessionVersion>(&query)
            .bind(profession_id)
            .fetch_optional(pool)
            .await
    }

    /// All professions that currently have a live version, composed with
    /// that version and ordered alphabetically.
    pub async fn all_live(pool: &PgPool) -> Result<Vec<ProfessionWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPOSITE_COLUMNS}
             FROM professions p
             JOIN profession_versions v ON v.profession_id = p.id
             WHERE v.status = 'live'
             ORDER BY p.name ASC"
        );
        sqlx::query_as::<_, ProfessionWithVersion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Every profession composed with its most recent version regardless of
    /// status. Ordered newest entity first, deterministically.
    pub async fn all_with_latest_version(
        pool: &PgPool,
    ) -> Result<Vec<ProfessionWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (p.id) {COMPOSITE_COLUMNS}
             FROM professions p
             LEFT JOIN profession_versions v ON v.profession_id = p.id
             ORDER BY p.id DESC, v.created_at DESC, v.id DESC"
        );
        sqlx::query_as::<_, ProfessionWithVersion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Public lookup: a profession by slug, composed with its live version.
    pub async fn find_live_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<ProfessionWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPOSITE_COLUMNS}
             FROM professions p
             JOIN profession_versions v ON v.profession_id = p.id
             WHERE p.slug = $1 AND v.status = 'live'"
        );
        sqlx::query_as::<_, ProfessionWithVersion>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Names of tier-one professions whose latest confirmed version is live
    /// or draft, for one organisation. These block the organisation's
    /// archival and are reported to the user by name. Alphabetical.
    ///
    /// Unconfirmed rows are skipped when picking the latest version: an
    /// in-flight edit on top of a live profession must not make it
    /// archivable.
    pub async fn blocking_dependent_names(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::blocking_dependent_names_in_tx(&mut conn, organisation_id).await
    }

    /// Transaction-scoped variant of [`Self::blocking_dependent_names`]: the
    /// archival service re-checks inside its transaction before mutating.
    pub async fn blocking_dependent_names_in_tx(
        conn: &mut PgConnection,
        organisation_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT p.name
             FROM professions p
             JOIN profession_to_organisations pto
               ON pto.profession_id = p.id
              AND pto.organisation_id = $1
              AND pto.role IN ({TIER_ONE_ROLES_SQL})
             JOIN LATERAL (
                SELECT pv.status FROM profession_versions pv
                WHERE pv.profession_id = p.id AND pv.status <> 'unconfirmed'
                ORDER BY pv.created_at DESC, pv.id DESC
                LIMIT 1
             ) latest ON TRUE
             WHERE latest.status IN ('live', 'draft')
             ORDER BY p.name ASC"
        );
        let rows: Vec<(String,)> = sqlx::query_as(&query)
            .bind(organisation_id)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
