//! # Error Taxonomy
//!
//! One engine-wide error type with structured variants. Recoverable
//! business outcomes (an overlap conflict, an unknown state name) and
//! fatal corruption signals (an ambiguous history chain) are distinct
//! variants so callers pattern-match instead of inspecting messages;
//! [`RegistryError::is_fatal`] gives the coarse split.
//!
//! The engine never retries internally. Overlap conflicts are a
//! caller-visible business outcome, not a transient fault.

use thiserror::Error;

use crate::identity::{HistoryId, ObjectId};
use crate::time::Timestamp;
use crate::window::TimeWindow;

/// Engine-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The object id does not resolve in the object directory.
    #[error("object {0} is not registered")]
    UnknownObject(ObjectId),

    /// One or more state names are unknown, or known but not applicable
    /// to the object's kind. Every offending name is listed.
    #[error("unknown or inapplicable states: [{}]", .0.join(", "))]
    UnknownState(Vec<String>),

    /// The history record id does not exist.
    #[error("history record {0} does not exist")]
    UnknownHistory(HistoryId),

    /// An interval's lower bound is after its upper bound.
    #[error("interval lower bound {lower} is after upper bound {upper}")]
    OutOfOrderInterval {
        /// The rejected lower bound.
        lower: Timestamp,
        /// The rejected upper bound.
        upper: Timestamp,
    },

    /// The proposed interval would overlap an existing non-canceled
    /// interval for the same object and state. Carries both windows for
    /// diagnostics.
    #[error("proposed interval {proposed} overlaps existing interval {existing}")]
    OverlappingInterval {
        /// The window of the existing, conflicting interval.
        existing: TimeWindow,
        /// The window of the rejected new interval.
        proposed: TimeWindow,
    },

    /// An administratively-named state was expected to be active but is
    /// not. Raised only by the administrative cancel path; the generic
    /// path treats the same condition as a silent no-op.
    #[error("administrative states not active: [{}]", .0.join(", "))]
    AdminStateNotFound(Vec<String>),

    /// The object already carries an active administrative block.
    #[error("object {0} is already administratively blocked")]
    AlreadyBlocked(String),

    /// More than one history record claims the same successor — the chain
    /// is corrupted. Fatal: callers should alert and abort, never retry.
    #[error("history chain corrupted: multiple records claim successor {0}")]
    AmbiguousChain(HistoryId),

    /// A timestamp string could not be accepted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The storage backend failed. Fatal from the engine's point of view:
    /// the enclosing transaction is no longer trustworthy.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Whether this error signals corruption or backend failure rather
    /// than a recoverable business outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AmbiguousChain(_) | Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_lists_all_offenders() {
        let err = RegistryError::UnknownState(vec![
            "serverBogus".to_string(),
            "serverNonsense".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("serverBogus"));
        assert!(msg.contains("serverNonsense"));
    }

    #[test]
    fn overlap_carries_both_windows() {
        let t1 = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let t2 = Timestamp::parse("2026-02-01T00:00:00Z").unwrap();
        let existing = TimeWindow::open_from(t1);
        let proposed = TimeWindow::new(t2, None).unwrap();
        let err = RegistryError::OverlappingInterval {
            existing: existing.clone(),
            proposed: proposed.clone(),
        };
        match err {
            RegistryError::OverlappingInterval {
                existing: e,
                proposed: p,
            } => {
                assert_eq!(e, existing);
                assert_eq!(p, proposed);
            }
            other => panic!("expected OverlappingInterval, got: {other:?}"),
        }
    }

    #[test]
    fn fatality_split() {
        assert!(RegistryError::AmbiguousChain(HistoryId::new()).is_fatal());
        assert!(RegistryError::Storage("connection reset".to_string()).is_fatal());
        assert!(!RegistryError::UnknownObject(ObjectId::new()).is_fatal());
        assert!(!RegistryError::AlreadyBlocked("example.cz".to_string()).is_fatal());
        assert!(!RegistryError::AdminStateNotFound(vec!["serverBlocked".into()]).is_fatal());
    }

    #[test]
    fn out_of_order_mentions_both_bounds() {
        let lower = Timestamp::parse("2026-02-01T00:00:00Z").unwrap();
        let upper = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let msg = RegistryError::OutOfOrderInterval { lower, upper }.to_string();
        assert!(msg.contains("2026-02-01T00:00:00Z"));
        assert!(msg.contains("2026-01-01T00:00:00Z"));
    }
}
