//! # PostgreSQL Backend
//!
//! Persistence via SQLx. All engine operations run inside the wrapped
//! `sqlx::Transaction`; the advisory lock is `pg_advisory_xact_lock`,
//! which PostgreSQL releases at transaction end (commit or rollback), so
//! lock lifetime matches the capability contract without any bookkeeping
//! here.
//!
//! Table constraints cover only per-row shape; the temporal invariants
//! (no-overlap, at-most-one-open) are enforced at the application layer
//! under the advisory lock, not in SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use regc_core::{HistoryId, ObjectId, RequestId, StateId, TimeWindow, Timestamp};

use crate::model::{HistoryRow, ObjectRecord, StateIntervalRow};
use crate::txn::{RegistryBackend, RegistryTxn, StoreError, StoreResult};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// PostgreSQL-backed registry store.
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and return a store over a fresh pool.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!("connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run the embedded schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!("registry schema migrations applied");
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RegistryBackend for PgRegistry {
    type Txn = PgTxn;

    async fn begin(&self) -> StoreResult<PgTxn> {
        let tx = self.pool.begin().await?;
        Ok(PgTxn { tx })
    }
}

/// One PostgreSQL transaction.
pub struct PgTxn {
    tx: Transaction<'static, Postgres>,
}

impl PgTxn {
    /// Commit the transaction, releasing advisory locks.
    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Roll the transaction back, releasing advisory locks.
    pub async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Fold an object UUID into the 64-bit advisory lock keyspace.
fn advisory_key(object: ObjectId) -> i64 {
    let b = object.as_uuid().as_bytes();
    i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

#[async_trait]
impl RegistryTxn for PgTxn {
    async fn lock_object(&mut self, object: ObjectId) -> StoreResult<()> {
        // pg_advisory_xact_lock is reentrant within one transaction, which
        // satisfies the no-op re-acquisition contract without bookkeeping.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(advisory_key(object))
            .execute(&mut *self.tx)
            .await?;
        tracing::debug!(%object, "advisory lock acquired");
        Ok(())
    }

    async fn resolve_object(&mut self, object: ObjectId) -> StoreResult<Option<ObjectRecord>> {
        let row = sqlx::query_as::<_, ObjectDb>(
            "SELECT id, kind, handle FROM object_registry WHERE id = $1",
        )
        .bind(*object.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(ObjectDb::into_record).transpose()
    }

    async fn intervals_for_state(
        &mut self,
        object: ObjectId,
        state: StateId,
    ) -> StoreResult<Vec<StateIntervalRow>> {
        let rows = sqlx::query_as::<_, IntervalDb>(
            "SELECT id, object_id, state_id, valid_from, valid_to, canceled_at, reason
             FROM object_state WHERE object_id = $1 AND state_id = $2 ORDER BY valid_from",
        )
        .bind(*object.as_uuid())
        .bind(state.value())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(IntervalDb::into_row).collect()
    }

    async fn intervals_for_object(
        &mut self,
        object: ObjectId,
    ) -> StoreResult<Vec<StateIntervalRow>> {
        let rows = sqlx::query_as::<_, IntervalDb>(
            "SELECT id, object_id, state_id, valid_from, valid_to, canceled_at, reason
             FROM object_state WHERE object_id = $1 ORDER BY valid_from",
        )
        .bind(*object.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(IntervalDb::into_row).collect()
    }

    async fn insert_intervals(&mut self, rows: &[StateIntervalRow]) -> StoreResult<()> {
        for row in rows {
            sqlx::query(
                "INSERT INTO object_state (id, object_id, state_id, valid_from, valid_to, canceled_at, reason)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(*row.id.as_uuid())
            .bind(*row.object_id.as_uuid())
            .bind(row.state_id.value())
            .bind(row.window.lower().into_datetime())
            .bind(row.window.upper().map(Timestamp::into_datetime))
            .bind(row.canceled_at.map(Timestamp::into_datetime))
            .bind(row.reason.as_deref())
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    async fn cancel_interval(&mut self, request: RequestId, at: Timestamp) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE object_state SET canceled_at = $2 WHERE id = $1 AND canceled_at IS NULL",
        )
        .bind(*request.as_uuid())
        .bind(at.into_datetime())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("state interval {request}")));
        }
        Ok(())
    }

    async fn history_by_id(&mut self, id: HistoryId) -> StoreResult<Option<HistoryRow>> {
        let row = sqlx::query_as::<_, HistoryDb>(
            "SELECT id, object_id, valid_from, valid_to, next_id
             FROM object_history WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(HistoryDb::into_row))
    }

    async fn history_claiming_next(&mut self, id: HistoryId) -> StoreResult<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryDb>(
            "SELECT id, object_id, valid_from, valid_to, next_id
             FROM object_history WHERE next_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(HistoryDb::into_row).collect())
    }

    async fn history_of(&mut self, object: ObjectId) -> StoreResult<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryDb>(
            "SELECT id, object_id, valid_from, valid_to, next_id
             FROM object_history WHERE object_id = $1 ORDER BY valid_from",
        )
        .bind(*object.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(HistoryDb::into_row).collect())
    }
}

// ─── Internal row types for SQLx mapping ─────────────────────────────

#[derive(sqlx::FromRow)]
struct ObjectDb {
    id: Uuid,
    kind: String,
    handle: String,
}

impl ObjectDb {
    fn into_record(self) -> StoreResult<ObjectRecord> {
        let kind = self
            .kind
            .parse()
            .map_err(|e: String| StoreError::Backend(e))?;
        Ok(ObjectRecord {
            id: ObjectId::from_uuid(self.id),
            kind,
            handle: self.handle,
        })
    }
}

#[derive(sqlx::FromRow)]
struct IntervalDb {
    id: Uuid,
    object_id: Uuid,
    state_id: i32,
    valid_from: DateTime<Utc>,
    valid_to: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    reason: Option<String>,
}

impl IntervalDb {
    fn into_row(self) -> StoreResult<StateIntervalRow> {
        let window = TimeWindow::new(
            Timestamp::from_utc(self.valid_from),
            self.valid_to.map(Timestamp::from_utc),
        )
        .map_err(|e| StoreError::Backend(format!("stored window out of order: {e}")))?;
        Ok(StateIntervalRow {
            id: RequestId::from_uuid(self.id),
            object_id: ObjectId::from_uuid(self.object_id),
            state_id: StateId::new(self.state_id),
            window,
            canceled_at: self.canceled_at.map(Timestamp::from_utc),
            reason: self.reason,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryDb {
    id: Uuid,
    object_id: Uuid,
    valid_from: DateTime<Utc>,
    valid_to: Option<DateTime<Utc>>,
    next_id: Option<Uuid>,
}

impl HistoryDb {
    fn into_row(self) -> HistoryRow {
        HistoryRow {
            id: HistoryId::from_uuid(self.id),
            object_id: ObjectId::from_uuid(self.object_id),
            valid_from: Timestamp::from_utc(self.valid_from),
            valid_to: self.valid_to.map(Timestamp::from_utc),
            next_id: self.next_id.map(HistoryId::from_uuid),
        }
    }
}
