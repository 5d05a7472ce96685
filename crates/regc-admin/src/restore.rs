//! # Administrative Restore
//!
//! The exact inverse of blocking. The object may have been blocked,
//! unblocked, and blocked again; only the **current uninterrupted
//! streak** of `serverBlocked` intervals matters. The walk runs over the
//! object's `serverBlocked` intervals newest-first, finds the currently
//! active one, and keeps stepping backward while each interval is a
//! gapless continuation (`lower` equal to its predecessor's `upper`) of
//! the one before it. The posture to restore is whatever manual states
//! held in the instant immediately before the streak's first interval
//! began.
//!
//! Streaks separated by a gap are never merged: a predecessor that is
//! open-ended or was canceled ended by fiat, not at a shared boundary, so
//! it cannot have a follow-up.

use std::collections::BTreeSet;

use regc_core::{ObjectId, RegistryError, StateCatalog, Timestamp, SERVER_BLOCKED};
use regc_state::cancel;
use regc_state::request::{self, CreateRequest};
use regc_store::{RegistryTxn, StateIntervalRow};

/// Lift the current administrative block of `object`, reapplying the
/// manual states that were active immediately before the blocking streak
/// began. `reason` is persisted on the reapplied rows.
///
/// # Errors
///
/// - [`RegistryError::UnknownObject`] — object directory miss.
/// - [`RegistryError::UnknownState`] — `serverBlocked` is not in the
///   catalog for the object's kind.
/// - [`RegistryError::AdminStateNotFound`] — no `serverBlocked` interval
///   is currently active (nothing to restore).
pub async fn restore<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    reason: Option<&str>,
) -> Result<(), RegistryError> {
    let record = txn
        .resolve_object(object)
        .await?
        .ok_or(RegistryError::UnknownObject(object))?;
    let blocked_id = catalog.resolve(&[SERVER_BLOCKED], record.kind)?[SERVER_BLOCKED];

    txn.lock_object(object).await?;
    let now = Timestamp::now();

    let mut blocks = txn.intervals_for_state(object, blocked_id).await?;
    blocks.sort_by(|a, b| b.window.lower().cmp(&a.window.lower()));

    let streak_start = find_streak_start(&blocks, now);

    // The posture right before the streak began, reconstructed from the
    // interval history: every manual state whose fact still held in the
    // instant before the first block's lower bound.
    let mut prior: BTreeSet<String> = BTreeSet::new();
    if let Some(start) = streak_start {
        let before = start.window.lower();
        for row in txn.intervals_for_object(object).await? {
            if row.state_id == blocked_id || !row.held_just_before(before) {
                continue;
            }
            if let Some(def) = catalog.def_by_id(row.state_id) {
                if def.manual {
                    prior.insert(def.name.to_string());
                }
            }
        }
    }

    // The administrative path: restoring an unblocked object is an error.
    cancel::cancel_admin(txn, catalog, object, &[SERVER_BLOCKED]).await?;
    // Retire the rest of the block-era posture (the extra block states).
    cancel::cancel(txn, catalog, object, None).await?;

    if !prior.is_empty() {
        let names: Vec<&str> = prior.iter().map(String::as_str).collect();
        request::create(
            txn,
            catalog,
            object,
            CreateRequest {
                states: &names,
                lower: None,
                upper: None,
                reason,
            },
        )
        .await?;
    }

    tracing::info!(
        %object,
        handle = %record.handle,
        restored = ?prior,
        "administrative block lifted"
    );
    Ok(())
}

/// Find the earliest interval of the current uninterrupted blocking
/// streak. `blocks` must be sorted by `lower` descending.
fn find_streak_start(blocks: &[StateIntervalRow], now: Timestamp) -> Option<&StateIntervalRow> {
    let mut idx = blocks.iter().position(|r| r.active_at(now))?;
    loop {
        let Some(prev) = blocks.get(idx + 1) else {
            break;
        };
        let gapless = !prev.is_canceled() && prev.window.upper() == Some(blocks[idx].window.lower());
        if !gapless {
            break;
        }
        idx += 1;
    }
    Some(&blocks[idx])
}
