//! Decision dataset entity and version models.
//!
//! A dataset is one (profession, organisation, year) triple; the uploaded
//! recognition-decision routes live in the version rows as JSON.

use register_core::status::VersionStatus;
use register_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `decision_datasets` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DecisionDataset {
    pub id: DbId,
    pub profession_id: DbId,
    pub organisation_id: DbId,
    pub year: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `decision_dataset_versions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DecisionDatasetVersion {
    pub id: DbId,
    pub dataset_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub routes: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new decision dataset entity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDecisionDataset {
    pub profession_id: DbId,
    pub organisation_id: DbId,
    pub year: i32,
}

/// Copy-on-write seed for a fresh dataset version row.
#[derive(Debug, Clone)]
pub struct NewDecisionDatasetVersion {
    pub dataset_id: DbId,
    pub user_id: DbId,
    pub routes: serde_json::Value,
}

impl NewDecisionDatasetVersion {
    /// Derive a new version from a previous one, attributed to `user_id`.
    pub fn derived_from(previous: &DecisionDatasetVersion, user_id: DbId) -> Self {
        Self {
            dataset_id: previous.dataset_id,
            user_id,
            routes: previous.routes.clone(),
        }
    }

    /// An empty first version for a brand-new dataset.
    pub fn blank(dataset_id: DbId, user_id: DbId) -> Self {
        Self {
            dataset_id,
            user_id,
            routes: serde_json::Value::Array(Vec::new()),
        }
    }
}

/// A dataset seen through one of its versions.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DecisionDatasetWithVersion {
    pub id: DbId,
    pub profession_id: DbId,
    pub organisation_id: DbId,
    pub year: i32,
    pub version_id: Option<DbId>,
    pub status: Option<VersionStatus>,
    pub routes: Option<serde_json::Value>,
}

impl DecisionDatasetWithVersion {
    /// Flatten a dataset and one of its versions. The version must belong to
    /// the dataset.
    pub fn from_parts(dataset: &DecisionDataset, version: &DecisionDatasetVersion) -> Self {
        Self {
            id: dataset.id,
            profession_id: dataset.profession_id,
            organisation_id: dataset.organisation_id,
            year: dataset.year,
            version_id: Some(version.id),
            status: Some(version.status),
            routes: Some(version.routes.clone()),
        }
    }

    /// The bare-entity composite.
    pub fn without_version(dataset: &DecisionDataset) -> Self {
        Self {
            id: dataset.id,
            profession_id: dataset.profession_id,
            organisation_id: dataset.organisation_id,
            year: dataset.year,
            version_id: None,
            status: None,
            routes: None,
        }
    }

    /// Compose with the most recently updated live version, if any.
    pub fn with_latest_live_version(
        dataset: &DecisionDataset,
        versions: &[DecisionDatasetVersion],
    ) -> Self {
        let live = versions
            .iter()
            .filter(|v| v.status == VersionStatus::Live)
            .max_by_key(|v| v.updated_at);
        match live {
            Some(version) => Self::from_parts(dataset, version),
            None => Self::without_version(dataset),
        }
    }
}

/// A dataset version joined with its owning entity. Datasets have no name
/// or slug; their identity is the (profession, organisation, year) triple.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DecisionDatasetVersionWithEntity {
    pub id: DbId,
    pub dataset_id: DbId,
    pub user_id: DbId,
    pub status: VersionStatus,
    pub routes: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub dataset_profession_id: DbId,
    pub dataset_organisation_id: DbId,
    pub dataset_year: i32,
}
