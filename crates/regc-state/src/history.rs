//! # History Chain Navigation
//!
//! The history chain is an append-only linked list materialized as rows
//! with nullable `next_id` pointers. Navigation always resolves
//! neighbours by query — the structure is shared and concurrently
//! mutated, so in-memory pointer chasing would go stale.
//!
//! `previous_of` doubles as the chain integrity probe: a well-formed
//! chain has at most one record claiming any given successor, and finding
//! two is a corruption signal surfaced as the fatal
//! [`RegistryError::AmbiguousChain`].

use std::collections::BTreeSet;

use regc_core::{HistoryId, ObjectId, RegistryError, StateCatalog, Timestamp};
use regc_store::{HistoryRow, RegistryTxn};

/// The record immediately preceding `id` in its object's chain, or
/// `None` if `id` is the first record.
///
/// # Errors
///
/// - [`RegistryError::UnknownHistory`] — `id` does not exist.
/// - [`RegistryError::AmbiguousChain`] — more than one record claims `id`
///   as its successor. Fatal: the store is corrupted; do not retry.
pub async fn previous_of<T: RegistryTxn>(
    txn: &mut T,
    id: HistoryId,
) -> Result<Option<HistoryId>, RegistryError> {
    if txn.history_by_id(id).await?.is_none() {
        return Err(RegistryError::UnknownHistory(id));
    }

    let claiming = txn.history_claiming_next(id).await?;
    match claiming.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single.id)),
        many => {
            tracing::error!(
                history = %id,
                claimants = many.len(),
                "history chain corrupted: multiple records claim the same successor"
            );
            Err(RegistryError::AmbiguousChain(id))
        }
    }
}

/// The record immediately following `id`, or `None` if `id` is current.
///
/// # Errors
///
/// [`RegistryError::UnknownHistory`] — `id` does not exist.
pub async fn next_of<T: RegistryTxn>(
    txn: &mut T,
    id: HistoryId,
) -> Result<Option<HistoryId>, RegistryError> {
    let row = txn
        .history_by_id(id)
        .await?
        .ok_or(RegistryError::UnknownHistory(id))?;
    Ok(row.next_id)
}

/// The snapshot of `object` valid at `at`, or `None` if the object did
/// not exist yet (or no record covers the instant).
pub async fn record_at<T: RegistryTxn>(
    txn: &mut T,
    object: ObjectId,
    at: Timestamp,
) -> Result<Option<HistoryRow>, RegistryError> {
    let rows = txn.history_of(object).await?;
    Ok(rows.into_iter().find(|r| {
        r.valid_from <= at
            && match r.valid_to {
                Some(to) => at < to,
                None => true,
            }
    }))
}

/// Names of the manual, externally-visible states of `object` whose
/// interval contains `at`.
///
/// A canceled interval stops holding at its cancelation instant, so a
/// query at or after `canceled_at` does not report the state.
pub async fn states_at<T: RegistryTxn>(
    txn: &mut T,
    catalog: &StateCatalog,
    object: ObjectId,
    at: Timestamp,
) -> Result<BTreeSet<String>, RegistryError> {
    let rows = txn.intervals_for_object(object).await?;
    let mut names = BTreeSet::new();
    for row in rows {
        if !row.active_at(at) {
            continue;
        }
        if let Some(def) = catalog.def_by_id(row.state_id) {
            if def.manual && def.external {
                names.insert(def.name.to_string());
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regc_core::{ObjectKind, TimeWindow};
    use regc_store::{MemoryRegistry, ObjectRecord, RegistryBackend, StateIntervalRow};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn history_row(
        object: ObjectId,
        from: &str,
        to: Option<&str>,
        next: Option<HistoryId>,
    ) -> HistoryRow {
        HistoryRow {
            id: HistoryId::new(),
            object_id: object,
            valid_from: ts(from),
            valid_to: to.map(ts),
            next_id: next,
        }
    }

    /// Seed a three-record chain and return it oldest-first.
    fn seed_chain(store: &MemoryRegistry, object: ObjectId) -> Vec<HistoryRow> {
        let current = history_row(object, "2026-03-01T00:00:00Z", None, None);
        let middle = history_row(
            object,
            "2026-02-01T00:00:00Z",
            Some("2026-03-01T00:00:00Z"),
            Some(current.id),
        );
        let first = history_row(
            object,
            "2026-01-01T00:00:00Z",
            Some("2026-02-01T00:00:00Z"),
            Some(middle.id),
        );
        for row in [&first, &middle, &current] {
            store.seed_history(row.clone());
        }
        vec![first, middle, current]
    }

    #[tokio::test]
    async fn previous_of_walks_backward() {
        let store = MemoryRegistry::new();
        let object = ObjectId::new();
        let chain = seed_chain(&store, object);
        let mut txn = store.begin().await.unwrap();

        assert_eq!(previous_of(&mut txn, chain[0].id).await.unwrap(), None);
        assert_eq!(
            previous_of(&mut txn, chain[1].id).await.unwrap(),
            Some(chain[0].id)
        );
        assert_eq!(
            previous_of(&mut txn, chain[2].id).await.unwrap(),
            Some(chain[1].id)
        );
    }

    #[tokio::test]
    async fn previous_next_roundtrip() {
        let store = MemoryRegistry::new();
        let object = ObjectId::new();
        let chain = seed_chain(&store, object);
        let mut txn = store.begin().await.unwrap();

        let prev = previous_of(&mut txn, chain[2].id).await.unwrap().unwrap();
        let forward = next_of(&mut txn, prev).await.unwrap().unwrap();
        assert_eq!(forward, chain[2].id);
        assert_eq!(
            previous_of(&mut txn, forward).await.unwrap(),
            Some(prev),
            "previous_of(next_of(previous_of(h))) == previous_of(h)"
        );
    }

    #[tokio::test]
    async fn previous_of_unknown_record() {
        let store = MemoryRegistry::new();
        let mut txn = store.begin().await.unwrap();
        let err = previous_of(&mut txn, HistoryId::new()).await.unwrap_err();
        assert!(matches!(err, RegistryError::UnknownHistory(_)));
    }

    #[tokio::test]
    async fn ambiguous_chain_is_fatal() {
        let store = MemoryRegistry::new();
        let object = ObjectId::new();
        let target = HistoryId::new();
        store.seed_history(HistoryRow {
            id: target,
            object_id: object,
            valid_from: ts("2026-03-01T00:00:00Z"),
            valid_to: None,
            next_id: None,
        });
        // Two records both claim `target` as successor.
        store.seed_history(history_row(
            object,
            "2026-01-01T00:00:00Z",
            Some("2026-03-01T00:00:00Z"),
            Some(target),
        ));
        store.seed_history(history_row(
            object,
            "2026-02-01T00:00:00Z",
            Some("2026-03-01T00:00:00Z"),
            Some(target),
        ));

        let mut txn = store.begin().await.unwrap();
        let err = previous_of(&mut txn, target).await.unwrap_err();
        assert_eq!(err, RegistryError::AmbiguousChain(target));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn record_at_selects_covering_snapshot() {
        let store = MemoryRegistry::new();
        let object = ObjectId::new();
        let chain = seed_chain(&store, object);
        let mut txn = store.begin().await.unwrap();

        let mid = record_at(&mut txn, object, ts("2026-02-15T00:00:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mid.id, chain[1].id);

        let now = record_at(&mut txn, object, ts("2027-01-01T00:00:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(now.id, chain[2].id);

        let before = record_at(&mut txn, object, ts("2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        assert!(before.is_none());
    }

    #[tokio::test]
    async fn states_at_filters_visibility_and_time() {
        let store = MemoryRegistry::new();
        let catalog = StateCatalog::builtin();
        let object = ObjectId::new();
        store.seed_object(ObjectRecord {
            id: object,
            kind: ObjectKind::Contact,
            handle: "CID-HOLDER".to_string(),
        });

        let manual_external = catalog.def("mojeIdVerified").unwrap().id;
        let automatic_internal = catalog.def("inManualVerification").unwrap().id;
        store.seed_interval(StateIntervalRow::new(
            object,
            manual_external,
            TimeWindow::open_from(ts("2026-01-01T00:00:00Z")),
            None,
        ));
        store.seed_interval(StateIntervalRow::new(
            object,
            automatic_internal,
            TimeWindow::open_from(ts("2026-01-01T00:00:00Z")),
            None,
        ));
        // A canceled manual state: held once, no longer reported.
        let mut canceled = StateIntervalRow::new(
            object,
            catalog.def("identifiedContact").unwrap().id,
            TimeWindow::open_from(ts("2026-01-01T00:00:00Z")),
            None,
        );
        canceled.canceled_at = Some(ts("2026-02-01T00:00:00Z"));
        store.seed_interval(canceled);

        let mut txn = store.begin().await.unwrap();

        let during = states_at(&mut txn, &catalog, object, ts("2026-01-15T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(
            during.into_iter().collect::<Vec<_>>(),
            vec!["identifiedContact".to_string(), "mojeIdVerified".to_string()]
        );

        let after_cancel = states_at(&mut txn, &catalog, object, ts("2026-03-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(
            after_cancel.into_iter().collect::<Vec<_>>(),
            vec!["mojeIdVerified".to_string()]
        );

        let before = states_at(&mut txn, &catalog, object, ts("2025-01-01T00:00:00Z"))
            .await
            .unwrap();
        assert!(before.is_empty());
    }
}
