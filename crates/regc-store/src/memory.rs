//! # In-Memory Backend
//!
//! Deterministic, test-friendly implementation of the storage capability.
//! Committed rows live under a `parking_lot::RwLock` (never held across an
//! `.await`); a transaction buffers its writes and applies them on commit,
//! so dropping a transaction discards everything it did.
//!
//! Advisory locks are emulated with one `tokio::sync::Mutex` per object:
//! `lock_object` awaits the owned guard and the transaction keeps it until
//! commit or rollback, which gives the same blocking, transaction-scoped
//! exclusivity as the PostgreSQL advisory lock.
//!
//! The backend also exposes a seeding surface (`seed_object`,
//! `seed_history`, `seed_interval`) standing in for the out-of-scope
//! object-mutation layer, plus snapshot accessors for test assertions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use regc_core::{HistoryId, ObjectId, RequestId, StateId, Timestamp};

use crate::model::{HistoryRow, ObjectRecord, StateIntervalRow};
use crate::txn::{RegistryBackend, RegistryTxn, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    objects: HashMap<ObjectId, ObjectRecord>,
    intervals: Vec<StateIntervalRow>,
    history: Vec<HistoryRow>,
}

type LockTable = Mutex<HashMap<ObjectId, Arc<AsyncMutex<()>>>>;

/// In-memory registry store.
pub struct MemoryRegistry {
    tables: Arc<RwLock<Tables>>,
    locks: Arc<LockTable>,
}

impl MemoryRegistry {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register an object in the directory.
    pub fn seed_object(&self, record: ObjectRecord) {
        self.tables.write().objects.insert(record.id, record);
    }

    /// Append a raw history row.
    ///
    /// No chain invariants are enforced here — tests build deliberately
    /// corrupt chains through this method.
    pub fn seed_history(&self, row: HistoryRow) {
        self.tables.write().history.push(row);
    }

    /// Insert a raw interval row, bypassing the engine's overlap checks.
    pub fn seed_interval(&self, row: StateIntervalRow) {
        self.tables.write().intervals.push(row);
    }

    /// Number of committed interval rows.
    pub fn interval_count(&self) -> usize {
        self.tables.read().intervals.len()
    }

    /// Snapshot of all committed interval rows.
    pub fn intervals_snapshot(&self) -> Vec<StateIntervalRow> {
        self.tables.read().intervals.clone()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryRegistry {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            locks: Arc::clone(&self.locks),
        }
    }
}

#[async_trait]
impl RegistryBackend for MemoryRegistry {
    type Txn = MemoryTxn;

    async fn begin(&self) -> StoreResult<MemoryTxn> {
        Ok(MemoryTxn {
            tables: Arc::clone(&self.tables),
            locks: Arc::clone(&self.locks),
            held: HashMap::new(),
            pending: Vec::new(),
        })
    }
}

enum PendingWrite {
    Insert(StateIntervalRow),
    Cancel(RequestId, Timestamp),
}

/// One in-memory transaction: buffered writes plus held advisory locks.
pub struct MemoryTxn {
    tables: Arc<RwLock<Tables>>,
    locks: Arc<LockTable>,
    held: HashMap<ObjectId, OwnedMutexGuard<()>>,
    pending: Vec<PendingWrite>,
}

impl MemoryTxn {
    /// Committed rows matching `pred`, with this transaction's pending
    /// writes overlaid (read-your-writes).
    fn overlaid(&self, pred: impl Fn(&StateIntervalRow) -> bool) -> Vec<StateIntervalRow> {
        let mut rows: Vec<StateIntervalRow> = {
            let tables = self.tables.read();
            tables.intervals.iter().filter(|r| pred(r)).cloned().collect()
        };
        for write in &self.pending {
            match write {
                PendingWrite::Insert(row) => {
                    if pred(row) {
                        rows.push(row.clone());
                    }
                }
                PendingWrite::Cancel(id, at) => {
                    for row in rows.iter_mut() {
                        if row.id == *id {
                            row.canceled_at = Some(*at);
                        }
                    }
                }
            }
        }
        rows
    }

    /// Apply buffered writes and release all held locks.
    pub async fn commit(self) -> StoreResult<()> {
        let MemoryTxn {
            tables,
            locks: _locks,
            held,
            pending,
        } = self;
        {
            let mut tables = tables.write();
            for write in pending {
                match write {
                    PendingWrite::Insert(row) => tables.intervals.push(row),
                    PendingWrite::Cancel(id, at) => {
                        let row = tables
                            .intervals
                            .iter_mut()
                            .find(|r| r.id == id)
                            .ok_or_else(|| {
                                StoreError::Backend(format!(
                                    "canceled row {id} vanished before commit"
                                ))
                            })?;
                        row.canceled_at = Some(at);
                    }
                }
            }
        }
        drop(held);
        Ok(())
    }

    /// Discard buffered writes and release all held locks.
    pub fn rollback(self) {}
}

#[async_trait]
impl RegistryTxn for MemoryTxn {
    async fn lock_object(&mut self, object: ObjectId) -> StoreResult<()> {
        if self.held.contains_key(&object) {
            return Ok(());
        }
        let mutex = {
            let mut locks = self.locks.lock();
            Arc::clone(
                locks
                    .entry(object)
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        let guard = mutex.lock_owned().await;
        self.held.insert(object, guard);
        tracing::debug!(%object, "advisory lock acquired");
        Ok(())
    }

    async fn resolve_object(&mut self, object: ObjectId) -> StoreResult<Option<ObjectRecord>> {
        Ok(self.tables.read().objects.get(&object).cloned())
    }

    async fn intervals_for_state(
        &mut self,
        object: ObjectId,
        state: StateId,
    ) -> StoreResult<Vec<StateIntervalRow>> {
        Ok(self.overlaid(|r| r.object_id == object && r.state_id == state))
    }

    async fn intervals_for_object(
        &mut self,
        object: ObjectId,
    ) -> StoreResult<Vec<StateIntervalRow>> {
        Ok(self.overlaid(|r| r.object_id == object))
    }

    async fn insert_intervals(&mut self, rows: &[StateIntervalRow]) -> StoreResult<()> {
        for row in rows {
            self.pending.push(PendingWrite::Insert(row.clone()));
        }
        Ok(())
    }

    async fn cancel_interval(&mut self, request: RequestId, at: Timestamp) -> StoreResult<()> {
        let known = self.overlaid(|r| r.id == request);
        let row = known
            .first()
            .ok_or_else(|| StoreError::NotFound(format!("state interval {request}")))?;
        if row.is_canceled() {
            return Err(StoreError::NotFound(format!(
                "state interval {request} is already canceled"
            )));
        }
        self.pending.push(PendingWrite::Cancel(request, at));
        Ok(())
    }

    async fn history_by_id(&mut self, id: HistoryId) -> StoreResult<Option<HistoryRow>> {
        Ok(self
            .tables
            .read()
            .history
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn history_claiming_next(&mut self, id: HistoryId) -> StoreResult<Vec<HistoryRow>> {
        Ok(self
            .tables
            .read()
            .history
            .iter()
            .filter(|r| r.next_id == Some(id))
            .cloned()
            .collect())
    }

    async fn history_of(&mut self, object: ObjectId) -> StoreResult<Vec<HistoryRow>> {
        let mut rows: Vec<HistoryRow> = self
            .tables
            .read()
            .history
            .iter()
            .filter(|r| r.object_id == object)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.valid_from);
        Ok(rows)
    }
}
