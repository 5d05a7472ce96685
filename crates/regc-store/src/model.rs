//! # Row Model
//!
//! The rows the engine reads and writes. These are storage-shaped types:
//! no behavior beyond the activity predicates the interval algorithms
//! share, so the in-memory and PostgreSQL backends answer queries with
//! byte-for-byte identical semantics.

use serde::{Deserialize, Serialize};

use regc_core::{HistoryId, ObjectId, ObjectKind, RequestId, StateId, TimeWindow, Timestamp};

/// One row of the object directory: the projection of a registrable
/// object the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object identifier.
    pub id: ObjectId,
    /// Object type, used for catalog applicability checks.
    pub kind: ObjectKind,
    /// Human-readable handle (domain fqdn, contact handle, ...).
    pub handle: String,
}

/// One snapshot in an object's append-only history chain.
///
/// `valid_to` and `next_id` both null marks the current (open) record.
/// Consecutive records share a boundary: `valid_to` of one equals
/// `valid_from` of the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// History record identifier.
    pub id: HistoryId,
    /// The object this snapshot belongs to.
    pub object_id: ObjectId,
    /// Start of the snapshot's validity.
    pub valid_from: Timestamp,
    /// End of the snapshot's validity; `None` for the current record.
    pub valid_to: Option<Timestamp>,
    /// The succeeding record; `None` for the current record.
    pub next_id: Option<HistoryId>,
}

impl HistoryRow {
    /// Whether this is the object's current (open) record.
    pub fn is_current(&self) -> bool {
        self.valid_to.is_none() && self.next_id.is_none()
    }
}

/// One state fact: "object X has state S" during a half-open window.
///
/// Rows are never physically deleted. A fact that ends early is
/// soft-terminated by setting `canceled_at`; the window itself is left
/// untouched as a record of what was originally requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateIntervalRow {
    /// Request identifier, unique per row.
    pub id: RequestId,
    /// The object carrying the state.
    pub object_id: ObjectId,
    /// Catalog id of the state.
    pub state_id: StateId,
    /// Validity window `[lower, upper)`.
    pub window: TimeWindow,
    /// Set when the fact was terminated early.
    pub canceled_at: Option<Timestamp>,
    /// Operator-supplied free text; carried by administrative blocking
    /// intervals.
    pub reason: Option<String>,
}

impl StateIntervalRow {
    /// Build a fresh, non-canceled row with a new request id.
    pub fn new(
        object_id: ObjectId,
        state_id: StateId,
        window: TimeWindow,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            object_id,
            state_id,
            window,
            canceled_at: None,
            reason,
        }
    }

    /// Whether the fact was terminated early.
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// The instant the fact stops holding: the window's upper bound, or
    /// the cancelation instant, whichever comes first. `None` means the
    /// fact holds indefinitely.
    pub fn effective_upper(&self) -> Option<Timestamp> {
        match (self.window.upper(), self.canceled_at) {
            (Some(upper), Some(canceled)) => Some(upper.min(canceled)),
            (Some(upper), None) => Some(upper),
            (None, Some(canceled)) => Some(canceled),
            (None, None) => None,
        }
    }

    /// Whether the fact holds at `at` (cancelation respected).
    pub fn active_at(&self, at: Timestamp) -> bool {
        self.window.lower() <= at
            && match self.effective_upper() {
                Some(upper) => at < upper,
                None => true,
            }
    }

    /// Whether the fact held in the instant immediately before `at`.
    ///
    /// Under half-open semantics a fact with `effective_upper == at`
    /// still held just before `at` — this is the predicate the restore
    /// walk uses to reconstruct the posture right before a block began.
    pub fn held_just_before(&self, at: Timestamp) -> bool {
        self.window.lower() < at
            && match self.effective_upper() {
                Some(upper) => upper >= at,
                None => true,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn row(window: TimeWindow) -> StateIntervalRow {
        StateIntervalRow::new(ObjectId::new(), StateId::new(8), window, None)
    }

    #[test]
    fn current_history_row() {
        let current = HistoryRow {
            id: HistoryId::new(),
            object_id: ObjectId::new(),
            valid_from: ts("2026-01-01T00:00:00Z"),
            valid_to: None,
            next_id: None,
        };
        assert!(current.is_current());

        let closed = HistoryRow {
            valid_to: Some(ts("2026-02-01T00:00:00Z")),
            next_id: Some(HistoryId::new()),
            ..current.clone()
        };
        assert!(!closed.is_current());
    }

    #[test]
    fn open_row_is_active_forever() {
        let r = row(TimeWindow::open_from(ts("2026-01-01T00:00:00Z")));
        assert!(r.active_at(ts("2026-01-01T00:00:00Z")));
        assert!(r.active_at(ts("2099-01-01T00:00:00Z")));
        assert!(!r.active_at(ts("2025-12-31T23:59:59Z")));
    }

    #[test]
    fn cancelation_bounds_activity() {
        let mut r = row(TimeWindow::open_from(ts("2026-01-01T00:00:00Z")));
        r.canceled_at = Some(ts("2026-06-01T00:00:00Z"));
        assert!(r.active_at(ts("2026-05-31T23:59:59Z")));
        assert!(!r.active_at(ts("2026-06-01T00:00:00Z")));
        assert_eq!(r.effective_upper(), Some(ts("2026-06-01T00:00:00Z")));
    }

    #[test]
    fn effective_upper_takes_the_earlier_bound() {
        let window = TimeWindow::new(
            ts("2026-01-01T00:00:00Z"),
            Some(ts("2026-12-01T00:00:00Z")),
        )
        .unwrap();
        let mut r = row(window);
        r.canceled_at = Some(ts("2026-06-01T00:00:00Z"));
        assert_eq!(r.effective_upper(), Some(ts("2026-06-01T00:00:00Z")));

        r.canceled_at = Some(ts("2027-01-01T00:00:00Z"));
        assert_eq!(r.effective_upper(), Some(ts("2026-12-01T00:00:00Z")));
    }

    #[test]
    fn held_just_before_boundary() {
        let window = TimeWindow::new(
            ts("2026-01-01T00:00:00Z"),
            Some(ts("2026-02-01T00:00:00Z")),
        )
        .unwrap();
        let r = row(window);
        // The fact held right before its own upper bound.
        assert!(r.held_just_before(ts("2026-02-01T00:00:00Z")));
        assert!(r.held_just_before(ts("2026-01-15T00:00:00Z")));
        // Not before it started, and not at its own start.
        assert!(!r.held_just_before(ts("2026-01-01T00:00:00Z")));
        assert!(!r.held_just_before(ts("2025-12-01T00:00:00Z")));
        // Long after it ended.
        assert!(!r.held_just_before(ts("2026-03-01T00:00:00Z")));
    }

    #[test]
    fn held_just_before_respects_cancelation() {
        let mut r = row(TimeWindow::open_from(ts("2026-01-01T00:00:00Z")));
        r.canceled_at = Some(ts("2026-02-01T00:00:00Z"));
        assert!(r.held_just_before(ts("2026-02-01T00:00:00Z")));
        assert!(!r.held_just_before(ts("2026-02-01T00:00:01Z")));
    }

    #[test]
    fn serde_roundtrip() {
        let r = row(TimeWindow::open_from(ts("2026-01-01T00:00:00Z")));
        let json = serde_json::to_string(&r).unwrap();
        let parsed: StateIntervalRow = serde_json::from_str(&json).unwrap();
        assert_eq!(r, parsed);
    }
}
