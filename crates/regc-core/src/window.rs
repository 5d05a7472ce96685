//! # Half-Open Validity Windows
//!
//! [`TimeWindow`] models the validity span of a state fact: `[lower,
//! upper)`, with `upper = None` meaning open-ended. The overlap test here
//! is the single definition the no-overlap invariant relies on — two
//! windows `[a, b)` and `[c, d)` conflict iff `a < (d or ∞)` and
//! `c < (b or ∞)`. Touching endpoints (`b == c`) do not conflict.
//!
//! Construction validates ordering: a lower bound after the upper bound is
//! rejected, so an in-range `TimeWindow` is well-formed by construction.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::time::Timestamp;

/// A half-open validity window `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    lower: Timestamp,
    upper: Option<Timestamp>,
}

impl TimeWindow {
    /// Create a window, validating bound order.
    ///
    /// `upper == lower` is accepted and yields an empty window that
    /// conflicts with nothing.
    ///
    /// # Errors
    ///
    /// [`RegistryError::OutOfOrderInterval`] when `lower > upper`.
    pub fn new(lower: Timestamp, upper: Option<Timestamp>) -> Result<Self, RegistryError> {
        if let Some(upper) = upper {
            if lower > upper {
                return Err(RegistryError::OutOfOrderInterval { lower, upper });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Create an open-ended window starting at `lower`.
    pub fn open_from(lower: Timestamp) -> Self {
        Self { lower, upper: None }
    }

    /// The inclusive lower bound.
    pub fn lower(&self) -> Timestamp {
        self.lower
    }

    /// The exclusive upper bound, `None` when open-ended.
    pub fn upper(&self) -> Option<Timestamp> {
        self.upper
    }

    /// Whether the window is open-ended.
    pub fn is_open(&self) -> bool {
        self.upper.is_none()
    }

    /// The half-open overlap test.
    ///
    /// `[a, b)` and `[c, d)` conflict iff `a < (d or ∞)` and `c < (b or ∞)`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        let starts_before_other_ends = match other.upper {
            Some(d) => self.lower < d,
            None => true,
        };
        let other_starts_before_self_ends = match self.upper {
            Some(b) => other.lower < b,
            None => true,
        };
        starts_before_other_ends && other_starts_before_self_ends
    }

    /// Whether `at` falls inside the window (`lower <= at < upper`).
    pub fn contains(&self, at: Timestamp) -> bool {
        self.lower <= at
            && match self.upper {
                Some(upper) => at < upper,
                None => true,
            }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "[{}, {})", self.lower, upper),
            None => write!(f, "[{}, open)", self.lower),
        }
    }
}

/// Deserialized windows route through [`TimeWindow::new`] so out-of-order
/// bounds are rejected at the boundary, not discovered mid-algorithm.
impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lower: Timestamp,
            upper: Option<Timestamp>,
        }

        let raw = Raw::deserialize(deserializer)?;
        TimeWindow::new(raw.lower, raw.upper).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn rejects_out_of_order_bounds() {
        let result = TimeWindow::new(ts("2026-02-01T00:00:00Z"), Some(ts("2026-01-01T00:00:00Z")));
        assert!(matches!(
            result,
            Err(RegistryError::OutOfOrderInterval { .. })
        ));
    }

    #[test]
    fn accepts_equal_bounds() {
        let t = ts("2026-01-01T00:00:00Z");
        let empty = TimeWindow::new(t, Some(t)).unwrap();
        assert!(!empty.contains(t));
        assert!(!empty.overlaps(&TimeWindow::open_from(t)));
    }

    #[test]
    fn closed_windows_overlap_when_intersecting() {
        let a = TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-03-01T00:00:00Z"))).unwrap();
        let b = TimeWindow::new(ts("2026-02-01T00:00:00Z"), Some(ts("2026-04-01T00:00:00Z"))).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let a = TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-02-01T00:00:00Z"))).unwrap();
        let b = TimeWindow::new(ts("2026-02-01T00:00:00Z"), Some(ts("2026-03-01T00:00:00Z"))).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn disjoint_windows_do_not_overlap() {
        let a = TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-01-10T00:00:00Z"))).unwrap();
        let b = TimeWindow::new(ts("2026-02-01T00:00:00Z"), Some(ts("2026-02-10T00:00:00Z"))).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn two_open_windows_always_overlap() {
        let a = TimeWindow::open_from(ts("2026-01-01T00:00:00Z"));
        let b = TimeWindow::open_from(ts("2030-01-01T00:00:00Z"));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn closed_window_before_open_window_does_not_overlap() {
        let closed =
            TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-02-01T00:00:00Z"))).unwrap();
        let open = TimeWindow::open_from(ts("2026-02-01T00:00:00Z"));
        assert!(!closed.overlaps(&open));
        let open_earlier = TimeWindow::open_from(ts("2026-01-15T00:00:00Z"));
        assert!(closed.overlaps(&open_earlier));
    }

    #[test]
    fn contains_is_half_open() {
        let w = TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-02-01T00:00:00Z"))).unwrap();
        assert!(w.contains(ts("2026-01-01T00:00:00Z")));
        assert!(w.contains(ts("2026-01-31T23:59:59Z")));
        assert!(!w.contains(ts("2026-02-01T00:00:00Z")));
        assert!(!w.contains(ts("2025-12-31T23:59:59Z")));
    }

    #[test]
    fn open_window_contains_everything_after_lower() {
        let w = TimeWindow::open_from(ts("2026-01-01T00:00:00Z"));
        assert!(w.contains(ts("2099-01-01T00:00:00Z")));
        assert!(!w.contains(ts("2025-12-31T23:59:59Z")));
    }

    #[test]
    fn display_formats() {
        let open = TimeWindow::open_from(ts("2026-01-01T00:00:00Z"));
        assert_eq!(open.to_string(), "[2026-01-01T00:00:00Z, open)");
        let closed =
            TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-02-01T00:00:00Z"))).unwrap();
        assert_eq!(
            closed.to_string(),
            "[2026-01-01T00:00:00Z, 2026-02-01T00:00:00Z)"
        );
    }

    #[test]
    fn deserialize_rejects_out_of_order() {
        let json = r#"{"lower":"2026-02-01T00:00:00Z","upper":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeWindow>(json).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let w = TimeWindow::new(ts("2026-01-01T00:00:00Z"), Some(ts("2026-02-01T00:00:00Z"))).unwrap();
        let json = serde_json::to_string(&w).unwrap();
        let parsed: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, parsed);
    }
}
