//! # Administrative Block
//!
//! Applying a block replaces the object's entire manual posture: whatever
//! manual states were active are canceled, and the requested block set —
//! always including `serverBlocked` — is created as one co-starting,
//! open-ended interval set. The restore controller later reconstructs the
//! canceled posture from the interval history, so nothing is lost by the
//! replacement.

use regc_core::{ObjectId, RegistryError, StateCatalog, Timestamp, SERVER_BLOCKED};
use regc_state::request::{self, CreateRequest};
use regc_state::cancel;
use regc_store::RegistryTxn;

/// Apply an administrative block to `object`.
///
/// `extra_states` are the additional administrative states to set next to
/// `serverBlocked`; the set must be non-empty and every name must be a
/// catalog-known administrative block state. `reason` is the operator's
/// free-text justification, persisted on the created rows.
///
/// Returns the object's human-readable handle.
///
/// # Errors
///
/// - [`RegistryError::UnknownState`] — empty `extra_states`, or a name
///   that is not an administrative block state (offenders listed).
/// - [`RegistryError::UnknownObject`] — object directory miss.
/// - [`RegistryError::AlreadyBlocked`] — a `serverBlocked` interval is
///   currently active (checked under the object lock).
/// - [`RegistryError::OverlappingInterval`] — a conflicting interval
///   exists; the cancelations from this call are discarded with the
///   caller's transaction.
pub async fn block<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    extra_states: &[&str],
    reason: Option<&str>,
) -> Result<String, RegistryError> {
    if extra_states.is_empty() {
        return Err(RegistryError::UnknownState(Vec::new()));
    }
    let offenders: Vec<String> = extra_states
        .iter()
        .filter(|name| !catalog.is_administrative_block(name))
        .map(|name| (*name).to_string())
        .collect();
    if !offenders.is_empty() {
        return Err(RegistryError::UnknownState(offenders));
    }

    let record = txn
        .resolve_object(object)
        .await?
        .ok_or(RegistryError::UnknownObject(object))?;
    let blocked_id = catalog.resolve(&[SERVER_BLOCKED], record.kind)?[SERVER_BLOCKED];

    txn.lock_object(object).await?;

    let now = Timestamp::now();
    let already = txn
        .intervals_for_state(object, blocked_id)
        .await?
        .into_iter()
        .any(|r| r.active_at(now));
    if already {
        tracing::debug!(%object, handle = %record.handle, "block rejected: already blocked");
        return Err(RegistryError::AlreadyBlocked(record.handle));
    }

    // Clear the current manual posture. The generic path is deliberate:
    // most of these states may legitimately be absent.
    let canceled = cancel::cancel(txn, catalog, object, None).await?;

    let mut states: Vec<&str> = vec![SERVER_BLOCKED];
    states.extend(extra_states.iter().filter(|s| **s != SERVER_BLOCKED).copied());
    request::create(
        txn,
        catalog,
        object,
        CreateRequest {
            states: &states,
            lower: None,
            upper: None,
            reason,
        },
    )
    .await?;

    tracing::info!(
        %object,
        handle = %record.handle,
        blocked_with = ?states,
        displaced = canceled.len(),
        "administrative block applied"
    );
    Ok(record.handle)
}
