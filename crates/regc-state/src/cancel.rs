//! # State Request Cancelation
//!
//! Soft-terminates currently-active intervals by setting `canceled_at`.
//! Rows are never deleted.
//!
//! Two paths with deliberately different failure semantics:
//!
//! - [`cancel`] — generic: canceling a state that is not active is a
//!   silent no-op. Used by orchestration that clears "whatever is there".
//! - [`cancel_admin`] — administrative: every named state must be active,
//!   otherwise [`RegistryError::AdminStateNotFound`] lists the misses and
//!   nothing is canceled. Administrative callers expect their target
//!   state to exist.
//!
//! Both paths touch only states flagged manual in the catalog; automatic
//! states are immune even when named explicitly.

use regc_core::{ObjectId, RegistryError, RequestId, StateCatalog, StateDef, Timestamp};
use regc_store::RegistryTxn;

/// Cancel every currently-active interval of the object's manual states,
/// restricted to `states` when given. Returns the canceled request ids;
/// an empty list is success, not an error.
///
/// # Errors
///
/// - [`RegistryError::UnknownObject`] — object directory miss.
/// - [`RegistryError::UnknownState`] — a named state is not in the
///   catalog for the object's kind.
pub async fn cancel<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    states: Option<&[&str]>,
) -> Result<Vec<RequestId>, RegistryError> {
    let targets = target_defs(txn, catalog, object, states).await?;
    txn.lock_object(object).await?;

    let now = Timestamp::now();
    let mut canceled = Vec::new();
    for def in &targets {
        for row in txn.intervals_for_state(object, def.id).await? {
            if row.active_at(now) {
                txn.cancel_interval(row.id, now).await?;
                canceled.push(row.id);
            }
        }
    }

    tracing::info!(%object, count = canceled.len(), "state intervals canceled");
    Ok(canceled)
}

/// Cancel the named administrative states, failing if any of them has no
/// currently-active interval. Nothing is canceled on failure.
///
/// # Errors
///
/// Everything [`cancel`] raises, plus
/// [`RegistryError::AdminStateNotFound`] listing every named state
/// without an active interval (automatic states land here too — they are
/// never administratively cancelable).
pub async fn cancel_admin<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    states: &[&str],
) -> Result<Vec<RequestId>, RegistryError> {
    let targets = target_defs(txn, catalog, object, Some(states)).await?;
    txn.lock_object(object).await?;

    let now = Timestamp::now();

    // Gather first: the request either cancels every named state or none.
    let mut to_cancel = Vec::new();
    let mut missing = Vec::new();
    for name in states {
        let Some(def) = targets.iter().find(|d| d.name == *name) else {
            // Known in the catalog (target_defs resolved it) but filtered
            // out as automatic: not administratively cancelable.
            missing.push((*name).to_string());
            continue;
        };
        let active: Vec<RequestId> = txn
            .intervals_for_state(object, def.id)
            .await?
            .into_iter()
            .filter(|r| r.active_at(now))
            .map(|r| r.id)
            .collect();
        if active.is_empty() {
            missing.push((*name).to_string());
        } else {
            to_cancel.extend(active);
        }
    }
    if !missing.is_empty() {
        tracing::debug!(%object, states = ?missing, "administrative cancel: states not active");
        return Err(RegistryError::AdminStateNotFound(missing));
    }

    for id in &to_cancel {
        txn.cancel_interval(*id, now).await?;
    }
    tracing::info!(%object, count = to_cancel.len(), "administrative states canceled");
    Ok(to_cancel)
}

/// Resolve the manual state definitions targeted by a cancelation.
async fn target_defs<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    states: Option<&[&str]>,
) -> Result<Vec<StateDef>, RegistryError> {
    let record = txn
        .resolve_object(object)
        .await?
        .ok_or(RegistryError::UnknownObject(object))?;

    let defs = match states {
        Some(names) => {
            // Resolve validates existence and kind applicability; the
            // manual filter below is what makes automatic states immune.
            catalog.resolve(names, record.kind)?;
            names
                .iter()
                .filter_map(|n| catalog.def(n))
                .filter(|d| d.manual)
                .copied()
                .collect()
        }
        None => catalog
            .manual_states(record.kind)
            .into_iter()
            .copied()
            .collect(),
    };
    Ok(defs)
}
