//! Repository for the `organisations` table.

use sqlx::{PgConnection, PgPool};

use register_core::types::DbId;

use crate::models::organisation::{CreateOrganisation, Organisation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for organisation entities. Versioned content is
/// managed by [`crate::repositories::OrganisationVersionRepo`].
pub struct OrganisationRepo;

impl OrganisationRepo {
    /// Insert a new organisation entity. The slug stays unassigned until the
    /// first publication.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganisation,
    ) -> Result<Organisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO organisations (name)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organisation>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an organisation by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisations WHERE id = $1");
        sqlx::query_as::<_, Organisation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an organisation by its public slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisations WHERE slug = $1");
        sqlx::query_as::<_, Organisation>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all organisations alphabetically.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Organisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisations ORDER BY name ASC");
        sqlx::query_as::<_, Organisation>(&query)
            .fetch_all(pool)
            .await
    }

    /// Rename an organisation. The slug is untouched: it is permanent once
    /// assigned.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_name(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!(
            "UPDATE organisations SET name = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organisation>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Re-read an organisation inside the caller's transaction.
    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organisations WHERE id = $1");
        sqlx::query_as::<_, Organisation>(&query)
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
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM organisations WHERE slug = $1)")
                .bind(slug)
                .fetch_one(conn)
                .await?;
        Ok(row.0)
    }

    /// Assign a slug inside the caller's transaction. Only fills an empty
    /// slot; an already-slugged organisation keeps its slug.
    pub async fn set_slug_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        slug: &str,
    ) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!(
            "UPDATE organisations SET slug = $2
             WHERE id = $1 AND slug IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organisation>(&query)
            .bind(id)
            .bind(slug)
            .fetch_optional(conn)
            .await
    }

    /// Delete an organisation by ID. Returns `true` if a row was removed.
    /// Version rows cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organisations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
