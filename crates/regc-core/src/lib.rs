//! # regc-core — Registry Engine Core Types
//!
//! Shared vocabulary for the registry record-keeping engine:
//!
//! - **Identity** (`identity.rs`): one newtype per identifier kind —
//!   [`ObjectId`], [`HistoryId`], [`RequestId`], the numeric [`StateId`],
//!   and the [`ObjectKind`] enumeration of registrable object types.
//! - **Temporal** (`time.rs`): [`Timestamp`], a UTC-only timestamp truncated
//!   to seconds precision. All interval algebra is defined on this type.
//! - **Windows** (`window.rs`): [`TimeWindow`], a half-open `[lower, upper)`
//!   validity window with the overlap and containment tests the
//!   no-overlap invariant is built on.
//! - **Catalog** (`catalog.rs`): [`StateCatalog`], the reference table
//!   mapping state names to identifiers and metadata (manual vs. automatic,
//!   external visibility, object-type applicability), plus the
//!   request-scoped [`CatalogCache`].
//! - **Errors** (`error.rs`): [`RegistryError`], the engine-wide taxonomy
//!   separating recoverable business outcomes from fatal corruption
//!   signals.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod time;
pub mod window;

// ─── Identity re-exports ─────────────────────────────────────────────

pub use identity::{HistoryId, ObjectId, ObjectKind, RequestId, StateId};

// ─── Temporal re-exports ─────────────────────────────────────────────

pub use time::Timestamp;
pub use window::TimeWindow;

// ─── Catalog re-exports ──────────────────────────────────────────────

pub use catalog::{CatalogCache, StateCatalog, StateDef, SERVER_BLOCKED};

// ─── Error re-exports ────────────────────────────────────────────────

pub use error::RegistryError;
