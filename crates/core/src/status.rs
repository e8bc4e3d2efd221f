//! Version lifecycle state machine.
//!
//! Every organisation, profession, and decision dataset version carries one
//! of four statuses. The full edge set:
//!
//! ```text
//! unconfirmed --confirm--> draft
//! draft --publish--> live
//! live  --publish of another version--> archived
//! draft --archive--> archived
//! live  --archive--> draft (demoted; a fresh version then reaches archived)
//! archived --unarchive--> draft (as a newly created version)
//! ```
//!
//! No edge reaches `live` except from `draft`, and nothing is terminal:
//! `archived` always returns to `draft` via unarchive, which exists to
//! correct accidental archival.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a single version row.
///
/// Maps to the `version_status` PostgreSQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "version_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Unconfirmed,
    Draft,
    Live,
    Archived,
}

impl VersionStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: VersionStatus) -> bool {
        use VersionStatus::*;
        matches!(
            (self, next),
            (Unconfirmed, Draft)
                | (Draft, Live)
                | (Draft, Archived)
                | (Live, Archived)
                | (Live, Draft)
                | (Archived, Draft)
        )
    }

    /// Validate a transition, rejecting forbidden edges with a
    /// [`CoreError::Conflict`].
    pub fn check_transition(self, next: VersionStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Version status cannot move from {} to {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }

    /// The database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            VersionStatus::Unconfirmed => "unconfirmed",
            VersionStatus::Draft => "draft",
            VersionStatus::Live => "live",
            VersionStatus::Archived => "archived",
        }
    }

    /// Whether this version appears on admin listing surfaces
    /// (current, editable-or-public state).
    pub fn is_live_or_draft(self) -> bool {
        matches!(self, VersionStatus::Live | VersionStatus::Draft)
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::VersionStatus::*;

    #[test]
    fn confirm_moves_unconfirmed_to_draft() {
        assert!(Unconfirmed.can_transition_to(Draft));
    }

    #[test]
    fn publish_only_from_draft() {
        assert!(Draft.can_transition_to(Live));
        assert!(!Unconfirmed.can_transition_to(Live));
        assert!(!Archived.can_transition_to(Live));
        assert!(!Live.can_transition_to(Live));
    }

    #[test]
    fn archive_edges() {
        assert!(Draft.can_transition_to(Archived));
        assert!(Live.can_transition_to(Archived));
        assert!(!Archived.can_transition_to(Archived));
    }

    #[test]
    fn demote_and_unarchive_reach_draft() {
        assert!(Live.can_transition_to(Draft));
        assert!(Archived.can_transition_to(Draft));
    }

    #[test]
    fn no_backwards_edge_to_unconfirmed() {
        for from in [Unconfirmed, Draft, Live, Archived] {
            assert!(!from.can_transition_to(Unconfirmed));
        }
    }

    #[test]
    fn check_transition_reports_both_states() {
        let err = Archived.check_transition(Live).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("archived"), "got: {msg}");
        assert!(msg.contains("live"), "got: {msg}");
    }
}
