//! Version lifecycle services.
//!
//! Publication and archival compose several repository writes inside one
//! transaction so the register never observably has zero or two live
//! versions for an entity between the demote and promote writes. Both
//! services validate the requested status transition against
//! [`register_core::status::VersionStatus::can_transition_to`] before
//! touching any row, and propagate database errors after rollback instead
//! of absorbing them.

pub mod archival;
pub mod publication;

pub use archival::ArchivalService;
pub use publication::PublicationService;

use register_core::status::VersionStatus;
use register_core::types::DbId;
use thiserror::Error;

/// Failures surfaced by the publication and archival services.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The target version does not exist (or vanished mid-transaction).
    #[error("version {id} not found")]
    VersionNotFound { id: DbId },

    /// The requested status change is not an edge of the lifecycle state
    /// machine.
    #[error("cannot transition version from {from} to {to}")]
    InvalidTransition {
        from: VersionStatus,
        to: VersionStatus,
    },

    /// Archival was blocked by dependent professions whose latest version
    /// is live or draft. The names are reported to the user.
    #[error("archival blocked by dependent professions: {}", .names.join(", "))]
    BlockedByDependents { names: Vec<String> },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl LifecycleError {
    fn check_transition(from: VersionStatus, to: VersionStatus) -> Result<(), Self> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(Self::InvalidTransition { from, to })
        }
    }
}
