//! # State Request Creation
//!
//! Validates and inserts one or more co-starting state intervals for an
//! object. The whole request shares one `[lower, upper)` window and is
//! all-or-nothing: a conflict on any requested state aborts the request
//! before a single row is inserted.
//!
//! The overlap scan runs under the object advisory lock, which closes the
//! check-then-act race between concurrent creators: whoever holds the
//! lock sees every previously committed row, and nobody else can insert
//! between the scan and the batch insert.

use regc_core::{ObjectId, RegistryError, RequestId, StateCatalog, TimeWindow, Timestamp};
use regc_store::{RegistryTxn, StateIntervalRow};

/// One multi-state creation request.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest<'a> {
    /// State names to set; every name gets its own interval row.
    pub states: &'a [&'a str],
    /// Start of validity; now when omitted.
    pub lower: Option<Timestamp>,
    /// End of validity; open-ended when omitted.
    pub upper: Option<Timestamp>,
    /// Operator note attached to every created row.
    pub reason: Option<&'a str>,
}

/// Create one interval per requested state, all sharing one window.
/// Returns the new request ids, one per state, in catalog-name order.
///
/// # Errors
///
/// - [`RegistryError::OutOfOrderInterval`] — `lower > upper`.
/// - [`RegistryError::UnknownObject`] — object directory miss.
/// - [`RegistryError::UnknownState`] — any name unknown or not applicable
///   to the object's kind; all offenders listed.
/// - [`RegistryError::OverlappingInterval`] — the window intersects an
///   existing non-canceled interval for the same `(object, state)`.
pub async fn create<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    req: CreateRequest<'_>,
) -> Result<Vec<RequestId>, RegistryError> {
    let window = TimeWindow::new(req.lower.unwrap_or_else(Timestamp::now), req.upper)?;

    let record = txn
        .resolve_object(object)
        .await?
        .ok_or(RegistryError::UnknownObject(object))?;
    let resolved = catalog.resolve(req.states, record.kind)?;

    txn.lock_object(object).await?;

    // Scan before inserting anything: the request either creates every
    // interval or none.
    for (name, state_id) in &resolved {
        let existing = txn.intervals_for_state(object, *state_id).await?;
        for row in existing.iter().filter(|r| !r.is_canceled()) {
            if row.window.overlaps(&window) {
                tracing::debug!(
                    %object,
                    state = %name,
                    existing = %row.window,
                    proposed = %window,
                    "state request rejected: overlapping interval"
                );
                return Err(RegistryError::OverlappingInterval {
                    existing: row.window,
                    proposed: window,
                });
            }
        }
    }

    let rows: Vec<StateIntervalRow> = resolved
        .values()
        .map(|state_id| {
            StateIntervalRow::new(object, *state_id, window, req.reason.map(str::to_string))
        })
        .collect();
    txn.insert_intervals(&rows).await?;

    let ids: Vec<RequestId> = rows.iter().map(|r| r.id).collect();
    tracing::info!(
        %object,
        handle = %record.handle,
        states = ?resolved.keys().collect::<Vec<_>>(),
        window = %window,
        "state intervals created"
    );
    Ok(ids)
}
