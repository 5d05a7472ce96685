//! # Transaction Capability Traits
//!
//! [`RegistryTxn`] is the engine's entire view of storage: one active
//! transaction exposing the object advisory lock, the object directory,
//! the state interval store, and read access to the history chain.
//!
//! The advisory lock is an explicit method on the transaction — business
//! code calls `lock_object`, never raw lock SQL. The lock is exclusive,
//! keyed by object id, and held until the transaction commits or rolls
//! back. It must be acquired before any read-modify-write sequence on an
//! object's state intervals; it is the only cross-transaction ordering
//! mechanism in the engine.
//!
//! Reads observe the transaction's own pending writes: a cancelation
//! followed by an overlap scan within one transaction sees the canceled
//! row as canceled.
//!
//! Committing is *not* part of the trait. The engine takes
//! `&mut impl RegistryTxn` and leaves transaction lifetime to the caller;
//! `commit` is an inherent method on each concrete transaction type.

use async_trait::async_trait;
use thiserror::Error;

use regc_core::{HistoryId, ObjectId, RegistryError, RequestId, StateId, Timestamp};

use crate::model::{HistoryRow, ObjectRecord, StateIntervalRow};

/// Backend-level failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A row the operation requires does not exist.
    #[error("row not found: {0}")]
    NotFound(String),

    /// The backend itself failed (connection, constraint, corruption).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        RegistryError::Storage(err.to_string())
    }
}

/// Opens transactions against one registry store.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// The transaction type this backend yields.
    type Txn: RegistryTxn;

    /// Begin a new transaction.
    async fn begin(&self) -> StoreResult<Self::Txn>;
}

/// One active transaction against the registry store.
#[async_trait]
pub trait RegistryTxn: Send {
    /// Acquire the exclusive advisory lock for `object`.
    ///
    /// Blocks until the lock is granted; held until the transaction ends.
    /// Re-acquisition within the same transaction is a no-op.
    async fn lock_object(&mut self, object: ObjectId) -> StoreResult<()>;

    /// Resolve an object in the directory.
    async fn resolve_object(&mut self, object: ObjectId) -> StoreResult<Option<ObjectRecord>>;

    /// All interval rows for one `(object, state)` pair, canceled rows
    /// included.
    async fn intervals_for_state(
        &mut self,
        object: ObjectId,
        state: StateId,
    ) -> StoreResult<Vec<StateIntervalRow>>;

    /// All interval rows for one object across every state.
    async fn intervals_for_object(&mut self, object: ObjectId)
        -> StoreResult<Vec<StateIntervalRow>>;

    /// Insert a batch of interval rows.
    async fn insert_intervals(&mut self, rows: &[StateIntervalRow]) -> StoreResult<()>;

    /// Soft-terminate one interval: set `canceled_at = at`.
    ///
    /// Fails with [`StoreError::NotFound`] if the row does not exist or is
    /// already canceled.
    async fn cancel_interval(&mut self, request: RequestId, at: Timestamp) -> StoreResult<()>;

    /// Fetch one history record by id.
    async fn history_by_id(&mut self, id: HistoryId) -> StoreResult<Option<HistoryRow>>;

    /// All history records whose `next_id` equals `id`.
    ///
    /// A well-formed chain yields zero or one row; more than one is the
    /// corruption signal the chain navigation turns into a fatal error.
    async fn history_claiming_next(&mut self, id: HistoryId) -> StoreResult<Vec<HistoryRow>>;

    /// All history records of one object, ordered by `valid_from`.
    async fn history_of(&mut self, object: ObjectId) -> StoreResult<Vec<HistoryRow>>;
}
