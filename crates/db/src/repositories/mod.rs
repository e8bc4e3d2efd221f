//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Version repositories also
//! expose `_in_tx` variants for the lifecycle services, which compose
//! several statements inside one transaction.

pub mod decision_dataset_repo;
pub mod decision_dataset_version_repo;
pub mod organisation_repo;
pub mod organisation_version_repo;
pub mod profession_repo;
pub mod profession_version_repo;
pub mod user_repo;

pub use decision_dataset_repo::DecisionDatasetRepo;
pub use decision_dataset_version_repo::DecisionDatasetVersionRepo;
pub use organisation_repo::OrganisationRepo;
pub use organisation_version_repo::OrganisationVersionRepo;
pub use profession_repo::ProfessionRepo;
pub use profession_version_repo::ProfessionVersionRepo;
pub use user_repo::UserRepo;
