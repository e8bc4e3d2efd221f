//! Repository for the `decision_datasets` table.

use sqlx::PgPool;

use register_core::types::DbId;

use crate::models::decision_dataset::{CreateDecisionDataset, DecisionDataset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profession_id, organisation_id, year, created_at, updated_at";

/// Provides CRUD operations for decision dataset entities. One dataset per
/// (profession, organisation, year); datasets carry no slug, they are
/// addressed through their owning profession and organisation.
pub struct DecisionDatasetRepo;

impl DecisionDatasetRepo {
    /// Insert a new dataset entity.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDecisionDataset,
    ) -> Result<DecisionDataset, sqlx::Error> {
        let query = format!(
            "INSERT INTO decision_datasets (profession_id, organisation_id, year)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DecisionDataset>(&query)
            .bind(input.profession_id)
            .bind(input.organisation_id)
            .bind(input.year)
            .fetch_one(pool)
            .await
    }

    /// Find a dataset by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DecisionDataset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decision_datasets WHERE id = $1");
        sqlx::query_as::<_, DecisionDataset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the dataset for an exact (profession, organisation, year) triple.
    pub async fn find_by_key(
        pool: &PgPool,
        profession_id: DbId,
        organisation_id: DbId,
        year: i32,
    ) -> Result<Option<DecisionDataset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_datasets
             WHERE profession_id = $1 AND organisation_id = $2 AND year = $3"
        );
        sqlx::query_as::<_, DecisionDataset>(&query)
            .bind(profession_id)
            .bind(organisation_id)
            .bind(year)
            .fetch_optional(pool)
            .await
    }

    /// All datasets submitted by an organisation, newest year first.
    pub async fn list_by_organisation(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<DecisionDataset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_datasets
             WHERE organisation_id = $1
             ORDER BY year DESC, profession_id ASC"
        );
        sqlx::query_as::<_, DecisionDataset>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// All datasets for a profession, newest year first.
    pub async fn list_by_profession(
        pool: &PgPool,
        profession_id: DbId,
    ) -> Result<Vec<DecisionDataset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decision_datasets
             WHERE profession_id = $1
             ORDER BY year DESC, organisation_id ASC"
        );
        sqlx::query_as::<_, DecisionDataset>(&query)
            .bind(profession_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a dataset by ID. Returns `true` if a row was removed. Version
    /// rows cascade at the schema level.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM decision_datasets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
