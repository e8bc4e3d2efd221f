//! Repository for the `professions` table and its organisation relations.

use sqlx::{PgConnection, PgPool};

use register_core::roles::OrganisationRole;
use register_core::types::DbId;

use crate::models::profession::{CreateProfession, Profession, ProfessionToOrganisation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

const RELATION_COLUMNS: &str = "id, profession_id, organisation_id, role, created_at, updated_at";

/// SQL literal list of the tier-one organisation roles. Relations with these
/// roles tie a profession's lifecycle to the organisation's; tier-two roles
/// (enforcement and awarding bodies) do not.
pub(crate) const TIER_ONE_ROLES_SQL: &str = "'primary_regulator', 'chartered_body', \
    'qualifying_body', 'additional_regulator', 'oversight_body'";

/// Provides CRUD operations for profession entities and the
/// profession-to-organisation relation table.
pub struct ProfessionRepo;

impl ProfessionRepo {
    /// Insert a new profession entity. The slug stays unassigned until the
    /// first publication.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProfession,
    ) -> Result<Profession, sqlx::Error> {
        let query = format!(
            "INSERT INTO professions (name)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profession>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a profession by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professions WHERE id = $1");
        sqlx::query_as::<_, Profession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a profession by its public slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Profession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professions WHERE slug = $1");
        sqlx::query_as::<_, Profession>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all professions alphabetically.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Profession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professions ORDER BY name ASC");
        sqlx::query_as::<_, Profession>(&query).fetch_all(pool).await
    }

    /// Rename a profession. The slug is untouched once assigned.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_name(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<Profession>, sqlx::Error> {
        let query = format!(
            "UPDATE professions SET name = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profession>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Re-read a profession inside the caller's transaction.
    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Profession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professions WHERE id = $1");
        sqlx::query_as::<_, Profession>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Whether a slug is already taken, evaluated inside the caller's
    /// transaction so concurrent publications see each other's claims.
    pub async fn slug_exists_in_tx(
        conn: &mut PgConnection,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM professions WHERE slug = $1)")
                .bind(slug)
                .fetch_one(conn)
                .await?;
        Ok(row.0)
    }

    /// Assign a slug inside the caller's transaction. Only fills an empty
    /// slot; an already-slugged profession keeps its slug.
    pub async fn set_slug_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        slug: &str,
    ) -> Result<Option<Profession>, sqlx::Error> {
        let query = format!(
            "UPDATE professions SET slug = $2
             WHERE id = $1 AND slug IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profession>(&query)
            .bind(id)
            .bind(slug)
            .fetch_optional(conn)
            .await
    }

    /// Delete a profession by ID. Returns `true` if a row was removed.
    /// Version and relation rows cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM professions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Organisation relations ───────────────────────────────────────

    /// Attach an organisation to a profession under a role. A profession can
    /// relate to the same organisation under several distinct roles; the
    /// exact (profession, organisation, role) triple is unique.
    pub async fn add_organisation(
        pool: &PgPool,
        profession_id: DbId,
        organisation_id: DbId,
        role: OrganisationRole,
    ) -> Result<ProfessionToOrganisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO profession_to_organisations (profession_id, organisation_id, role)
             VALUES ($1, $2, $3)
             RETURNING {RELATION_COLUMNS}"
        );
        sqlx::query_as::<_, ProfessionToOrganisation>(&query)
            .bind(profession_id)
            .bind(organisation_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Detach one (organisation, role) relation from a profession.
    /// Returns `true` if a row was removed.
    pub async fn remove_organisation(
        pool: &PgPool,
        profession_id: DbId,
        organisation_id: DbId,
        role: OrganisationRole,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM profession_to_organisations \
             WHERE profession_id = $1 AND organisation_id = $2 AND role = $3",
        )
        .bind(profession_id)
        .bind(organisation_id)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All organisation relations of a profession.
    pub async fn organisations_for(
        pool: &PgPool,
        profession_id: DbId,
    ) -> Result<Vec<ProfessionToOrganisation>, sqlx::Error> {
        let query = format!(
            "SELECT {RELATION_COLUMNS} FROM profession_to_organisations
             WHERE profession_id = $1
             ORDER BY organisation_id ASC, role ASC"
        );
        sqlx::query_as::<_, ProfessionToOrganisation>(&query)
            .bind(profession_id)
            .fetch_all(pool)
            .await
    }

    /// All professions related to an organisation through a tier-one role.
    /// These are the professions whose lifecycle is tied to the
    /// organisation's.
    pub async fn tier_one_professions_for_organisation(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<Profession>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::tier_one_professions_for_organisation_in_tx(&mut conn, organisation_id).await
    }

    /// Transaction-scoped variant of
    /// [`Self::tier_one_professions_for_organisation`], used by the archival
    /// cascade.
    pub async fn tier_one_professions_for_organisation_in_tx(
        conn: &mut PgConnection,
        organisation_id: DbId,
    ) -> Result<Vec<Profession>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT p.id, p.name, p.slug, p.created_at, p.updated_at
             FROM professions p
             JOIN profession_to_organisations pto ON pto.profession_id = p.id
             WHERE pto.organisation_id = $1 AND pto.role IN ({TIER_ONE_ROLES_SQL})
             ORDER BY p.name ASC"
        );
        sqlx::query_as::<_, Profession>(&query)
            .bind(organisation_id)
            .fetch_all(conn)
            .await
    }
}
