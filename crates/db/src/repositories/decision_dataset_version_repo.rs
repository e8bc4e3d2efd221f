//! Repository for the `decision_dataset_versions` table.

use sqlx::{PgConnection, PgPool};

use register_core::status::VersionStatus;
use register_core::types::DbId;

use crate::models::decision_dataset::{
    DecisionDatasetVersion, DecisionDatasetVersionWithEntity, DecisionDatasetWithVersion,
    NewDecisionDatasetVersion,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, dataset_id, user_id, status, routes, created_at, updated_at";

/// Columns for the entity-plus-version composite selects.
const COMPOSITE_COLUMNS: &str = "d.id, d.profession_id, d.organisation_id, d.year, \
    v.id AS version_id, v.status, v.routes";

/// Provides CRUD and lifecycle-support operations for decision dataset
/// versions.
pub struct DecisionDatasetVersionRepo;

impl DecisionDatasetVersionRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new version row from a copy-on-write seed. The row starts
    /// `unconfirmed`.
    pub async fn create(
        pool: &PgPool,
        input: &NewDecisionDatasetVersion,
    ) -> Result<DecisionDatasetVersion, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in_tx(&mut conn, input).await
    }

    /// Transaction-scoped variant of [`Self::create`].
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        input: &NewDecisionDatasetVersion,
    ) -> Result<DecisionDatasetVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO decision_dataset_versions (dataset_id, user_id, routes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(input.dataset_id)
            .bind(input.user_id)
            .bind(&input.routes)
            .fetch_one(conn)
            .await
    }

    /// Find a version by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decision_dataset_versions WHERE id = $1");
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the decision routes of a version. Only unconfirmed and draft
    /// versions accept edits.
    ///
    /// Returns `None` when the version does not exist or is past editing.
    pub async fn save(
        pool: &PgPool,
        id: DbId,
        routes: &serde_json::Value,
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE decision_dataset_versions SET routes = $2
             WHERE id = $1 AND status IN ('unconfirmed', 'draft')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(id)
            .bind(routes)
            .fetch_optional(pool)
            .await
    }

    /// List every version of a dataset, most recent first.
    pub async fn list_by_dataset(
        pool: &PgPool,
        dataset_id: DbId,
    ) -> Result<Vec<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_dataset_versions
             WHERE dataset_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(dataset_id)
            .fetch_all(pool)
            .await
    }

    // ── Lifecycle support ────────────────────────────────────────────

    /// Promote an `unconfirmed` version to `draft`. Returns `None` if the
    /// version is missing or already confirmed.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE decision_dataset_versions SET status = 'draft'
             WHERE id = $1 AND status = 'unconfirmed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
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
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE decision_dataset_versions SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(conn)
            .await
    }

    /// Demote whichever version of the dataset is currently live, if any,
    /// inside the caller's transaction.
    pub async fn demote_live_in_tx(
        conn: &mut PgConnection,
        dataset_id: DbId,
        to: VersionStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE decision_dataset_versions SET status = $2 \
             WHERE dataset_id = $1 AND status = 'live'",
        )
        .bind(dataset_id)
        .bind(to)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Re-read a version inside the caller's transaction.
    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decision_dataset_versions WHERE id = $1");
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    // ── Composite reads ──────────────────────────────────────────────

    /// Fetch a version joined with its owning dataset.
    ///
    /// Returns `None` when the version does not exist or does not belong to
    /// the given dataset.
    pub async fn find_by_id_with_entity(
        pool: &PgPool,
        dataset_id: DbId,
        version_id: DbId,
    ) -> Result<Option<DecisionDatasetVersionWithEntity>, sqlx::Error> {
        let query = format!(
            "SELECT v.id, v.dataset_id, v.user_id, v.status, v.routes,
                    v.created_at, v.updated_at,
                    d.profession_id AS dataset_profession_id,
                    d.organisation_id AS dataset_organisation_id,
                    d.year AS dataset_year
             FROM decision_dataset_versions v
             JOIN decision_datasets d ON d.id = v.dataset_id
             WHERE v.dataset_id = $1 AND v.id = $2"
        );
        sqlx::query_as::<_, DecisionDatasetVersionWithEntity>(&query)
            .bind(dataset_id)
            .bind(version_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent confirmed version of a dataset: live or draft,
    /// newest creation first.
    pub async fn find_latest_for_dataset(
        pool: &PgPool,
        dataset_id: DbId,
    ) -> Result<Option<DecisionDatasetVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_dataset_versions
             WHERE dataset_id = $1 AND status IN ('draft', 'live')
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, DecisionDatasetVersion>(&query)
            .bind(dataset_id)
            .fetch_optional(pool)
            .await
    }

    /// All datasets that currently have a live version, composed with that
    /// version. Ordered by year descending then by owning profession and
    /// organisation.
    pub async fn all_live(pool: &PgPool) -> Result<Vec<DecisionDatasetWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPOSITE_COLUMNS}
             FROM decision_datasets d
             JOIN decision_dataset_versions v ON v.dataset_id = d.id
             WHERE v.status = 'live'
             ORDER BY d.year DESC, d.profession_id ASC, d.organisation_id ASC"
        );
        sqlx::query_as::<_, DecisionDatasetWithVersion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Every dataset composed with its most recent version regardless of
    /// status. Ordered newest entity first, deterministically.
    pub async fn all_with_latest_version(
        pool: &PgPool,
    ) -> Result<Vec<DecisionDatasetWithVersion>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (d.id) {COMPOSITE_COLUMNS}
             FROM decision_datasets d
             LEFT JOIN decision_dataset_versions v ON v.dataset_id = d.id
             ORDER BY d.id DESC, v.created_at DESC, v.id DESC"
        );
        sqlx::query_as::<_, DecisionDatasetWithVersion>(&query)
            .fetch_all(pool)
            .await
    }
}
