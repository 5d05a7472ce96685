//! # regc-store — Storage Capability for the Registry Engine
//!
//! The engine never talks to a database directly. It is written against
//! two capabilities defined here:
//!
//! - [`RegistryBackend`] — opens transactions.
//! - [`RegistryTxn`] — one active transaction: the object advisory lock,
//!   the object directory, the state interval store, and read access to
//!   the history chain.
//!
//! Two backends implement them:
//!
//! - [`MemoryRegistry`] (`memory.rs`) — deterministic in-memory backend
//!   for tests and development. Committed rows live under a
//!   `parking_lot::RwLock`; transaction writes are buffered and applied
//!   on commit; advisory locks are per-object `tokio::sync::Mutex`es whose
//!   owned guards are held by the transaction and released when it ends.
//! - [`PgRegistry`] (`postgres.rs`) — PostgreSQL via SQLx. Advisory locks
//!   are `pg_advisory_xact_lock`, scoped to the wrapped
//!   `sqlx::Transaction`. Schema in `migrations/`.
//!
//! Transaction lifetime belongs to the caller: the engine takes
//! `&mut impl RegistryTxn` and never commits. Dropping a transaction
//! without committing discards all of its writes.

pub mod memory;
pub mod model;
pub mod postgres;
pub mod txn;

// ─── Model re-exports ────────────────────────────────────────────────

pub use model::{HistoryRow, ObjectRecord, StateIntervalRow};

// ─── Capability re-exports ───────────────────────────────────────────

pub use txn::{RegistryBackend, RegistryTxn, StoreError, StoreResult};

// ─── Backend re-exports ──────────────────────────────────────────────

pub use memory::{MemoryRegistry, MemoryTxn};
pub use postgres::{PgRegistry, PgTxn};
