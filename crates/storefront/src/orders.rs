//! Locally cached order history.
//!
//! The backend owns orders; the client keeps a newest-first list of
//! summaries under the `userOrders` key so the order screen renders without
//! a network call. Entries are re-verified against the backend by
//! [`OrderHistory::reconcile`]: deleted orders disappear, drifted
//! status/total values are corrected in place, and ambiguous failures leave
//! entries untouched.

use std::sync::Arc;

use extramile_core::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::commerce::{Order, OrderSource};
use crate::storage::{KeyValueStore, USER_ORDERS_KEY};

// =============================================================================
// Stored summaries
// =============================================================================

/// Locally cached summary of a placed order.
///
/// Serialized camelCase to match the `userOrders` blob layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrderSummary {
    /// Server-assigned order ID.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Grand total, decimal string, exactly as the server reported it.
    pub total: String,
    /// Last known status.
    pub status: OrderStatus,
    /// Creation timestamp as reported by the server.
    pub date_created: String,
}

impl From<&Order> for StoredOrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.number.clone(),
            total: order.total.clone(),
            status: order.status.clone(),
            date_created: order.date_created.clone(),
        }
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// How a reconciliation pass reports itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Background upkeep: log at DEBUG, never interrupt the user.
    Quiet,
    /// User-initiated cleanup: log at INFO; the caller surfaces the report.
    Interactive,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries verified against the backend.
    pub checked: usize,
    /// Entries whose status or total was corrected in place.
    pub updated: usize,
    /// Entries dropped because the backend no longer has the order.
    pub removed: usize,
}

impl ReconcileReport {
    /// Whether the pass changed the local sequence.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.updated > 0 || self.removed > 0
    }

    /// Human-readable summary, or `None` when nothing changed.
    #[must_use]
    pub fn summary_message(&self) -> Option<String> {
        match (self.removed, self.updated) {
            (0, 0) => None,
            (r, 0) => Some(format!("Removed {r} deleted order(s) from your local list.")),
            (0, u) => Some(format!("Updated {u} order status(es) from the server.")),
            (r, u) => Some(format!(
                "Removed {r} deleted order(s) and updated {u} order status(es)."
            )),
        }
    }
}

// =============================================================================
// OrderHistory
// =============================================================================

/// Authoritative holder of the locally cached order list.
///
/// Cheaply cloneable handle over shared state. The persistence and remote
/// collaborators are injected so tests can substitute fakes.
///
/// Concurrency: operations serialize only their in-memory swap; a
/// reconciliation pass works on a snapshot taken at pass start and can race
/// a user mutation on the persisted key. Whole-value writes mean the last
/// writer wins, with no merge.
#[derive(Clone)]
pub struct OrderHistory {
    orders: Arc<Mutex<Vec<StoredOrderSummary>>>,
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn OrderSource>,
}

impl OrderHistory {
    /// Restore the order list from the store at startup.
    ///
    /// An absent key yields an empty list; a corrupt blob is logged and
    /// discarded.
    pub async fn load(store: Arc<dyn KeyValueStore>, source: Arc<dyn OrderSource>) -> Self {
        let orders = match store.get(USER_ORDERS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<StoredOrderSummary>>(&raw) {
                Ok(orders) => orders,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable order history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read order history");
                Vec::new()
            }
        };

        Self {
            orders: Arc::new(Mutex::new(orders)),
            store,
            source,
        }
    }

    /// Snapshot of the cached summaries, newest first.
    pub async fn orders(&self) -> Vec<StoredOrderSummary> {
        self.orders.lock().await.clone()
    }

    /// Record a freshly placed order at the front of the list.
    pub async fn record_new_order(&self, order: &Order) {
        let next = {
            let mut orders = self.orders.lock().await;
            orders.insert(0, StoredOrderSummary::from(order));
            orders.clone()
        };
        self.persist(&next).await;
    }

    /// Drop one order from the list (used when a user-initiated view hits a
    /// deleted order). Absent IDs are a no-op.
    pub async fn remove_order(&self, id: OrderId) {
        let next = {
            let mut orders = self.orders.lock().await;
            let before = orders.len();
            orders.retain(|o| o.id != id);
            if orders.len() == before {
                return;
            }
            orders.clone()
        };
        info!(order_id = %id, "Removed order deleted on the server");
        self.persist(&next).await;
    }

    /// Correct one summary's status/total in place after a successful detail
    /// fetch. Persists only when something actually changed.
    pub async fn update_order_fields(&self, id: OrderId, status: OrderStatus, total: String) {
        let next = {
            let mut orders = self.orders.lock().await;
            let Some(entry) = orders.iter_mut().find(|o| o.id == id) else {
                return;
            };
            if entry.status == status && entry.total == total {
                return;
            }
            entry.status = status;
            entry.total = total;
            orders.clone()
        };
        self.persist(&next).await;
    }

    /// Re-verify every cached summary against the backend.
    ///
    /// Entries are fetched sequentially in list order. Per entry:
    /// - found, unchanged: kept as-is
    /// - found, status/total drifted: updated in place (counted)
    /// - not found: dropped (counted)
    /// - any other failure: kept unchanged - never delete on an ambiguous
    ///   error
    ///
    /// The in-memory list is replaced and persisted only when the pass
    /// removed or updated something, so re-running against an unchanged
    /// backend is a no-op.
    pub async fn reconcile(&self, mode: ReconcileMode) -> ReconcileReport {
        let snapshot = self.orders().await;
        let mut kept = Vec::with_capacity(snapshot.len());
        let mut report = ReconcileReport::default();

        for summary in snapshot {
            report.checked += 1;
            match self.source.fetch_order(summary.id).await {
                Ok(remote) => {
                    if remote.status == summary.status && remote.total == summary.total {
                        kept.push(summary);
                    } else {
                        report.updated += 1;
                        log_for(
                            mode,
                            format_args!(
                                "Order {} drifted: {} -> {}, {} -> {}",
                                summary.id,
                                summary.status,
                                remote.status,
                                summary.total,
                                remote.total
                            ),
                        );
                        kept.push(StoredOrderSummary {
                            status: remote.status,
                            total: remote.total,
                            ..summary
                        });
                    }
                }
                Err(e) if e.is_not_found() => {
                    report.removed += 1;
                    log_for(
                        mode,
                        format_args!("Order {} no longer exists on the server", summary.id),
                    );
                }
                Err(e) => {
                    // Ambiguous failure: keep the entry for now
                    warn!(order_id = %summary.id, error = %e, "Skipping order during reconciliation");
                    kept.push(summary);
                }
            }
        }

        if report.changed() {
            self.persist(&kept).await;
            *self.orders.lock().await = kept;
        }

        report
    }

    /// Persist the full list. Failures are logged, never surfaced.
    async fn persist(&self, orders: &[StoredOrderSummary]) {
        match serde_json::to_string(orders) {
            Ok(raw) => {
                if let Err(e) = self.store.set(USER_ORDERS_KEY, &raw).await {
                    warn!(error = %e, "Failed to persist order history");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode order history"),
        }
    }
}

fn log_for(mode: ReconcileMode, message: std::fmt::Arguments<'_>) {
    match mode {
        ReconcileMode::Quiet => debug!("{message}"),
        ReconcileMode::Interactive => info!("{message}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::commerce::CommerceError;
    use crate::storage::MemoryStore;

    use super::*;

    /// Scripted backend: maps order IDs to a status/total pair, `None`
    /// meaning deleted, anything absent meaning server fault.
    #[derive(Default)]
    struct ScriptedSource {
        orders: HashMap<i64, Option<(&'static str, &'static str)>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn with(orders: impl IntoIterator<Item = (i64, Option<(&'static str, &'static str)>)>) -> Self {
            Self {
                orders: orders.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl OrderSource for ScriptedSource {
        async fn fetch_order(&self, id: OrderId) -> Result<Order, CommerceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match self.orders.get(&id.as_i64()) {
                Some(Some((status, total))) => Ok(order(id.as_i64(), status, total)),
                Some(None) => Err(CommerceError::NotFound(format!("Order not found: {id}"))),
                None => Err(CommerceError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn order(id: i64, status: &str, total: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "number": id.to_string(),
            "status": status,
            "total": total,
            "date_created": "2024-05-01T12:30:00",
        }))
        .unwrap()
    }

    fn summary(id: i64, status: &str, total: &str) -> StoredOrderSummary {
        StoredOrderSummary::from(&order(id, status, total))
    }

    async fn history_with(
        summaries: Vec<StoredOrderSummary>,
        source: Arc<ScriptedSource>,
    ) -> (OrderHistory, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_entries([(
            USER_ORDERS_KEY,
            serde_json::to_string(&summaries).unwrap(),
        )]));
        let history = OrderHistory::load(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            source as Arc<dyn OrderSource>,
        )
        .await;
        (history, store)
    }

    #[tokio::test]
    async fn test_load_absent_key_is_empty() {
        let history = OrderHistory::load(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedSource::default()),
        )
        .await;
        assert!(history.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_new_order_prepends_and_persists() {
        let (history, store) =
            history_with(vec![summary(1, "completed", "10.00")], Arc::new(ScriptedSource::default()))
                .await;

        history.record_new_order(&order(2, "pending", "45.98")).await;

        let orders = history.orders().await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::new(2));
        assert_eq!(orders[1].id, OrderId::new(1));

        let persisted: Vec<StoredOrderSummary> =
            serde_json::from_str(&store.get(USER_ORDERS_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(persisted, orders);
    }

    #[tokio::test]
    async fn test_stored_blob_layout() {
        let (history, store) = history_with(vec![], Arc::new(ScriptedSource::default())).await;
        history.record_new_order(&order(7, "pending", "19.99")).await;

        let raw = store.get(USER_ORDERS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value[0];
        assert_eq!(entry["id"], 7);
        assert_eq!(entry["orderNumber"], "7");
        assert_eq!(entry["total"], "19.99");
        assert_eq!(entry["status"], "pending");
        assert_eq!(entry["dateCreated"], "2024-05-01T12:30:00");
    }

    #[tokio::test]
    async fn test_reconcile_removes_deleted_orders() {
        let source = Arc::new(ScriptedSource::with([
            (1, Some(("completed", "10.00"))),
            (2, None),
        ]));
        let (history, store) = history_with(
            vec![summary(1, "completed", "10.00"), summary(2, "pending", "5.00")],
            source,
        )
        .await;

        let report = history.reconcile(ReconcileMode::Quiet).await;

        assert_eq!(report, ReconcileReport { checked: 2, updated: 0, removed: 1 });
        let orders = history.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, OrderId::new(1));

        let persisted: Vec<StoredOrderSummary> =
            serde_json::from_str(&store.get(USER_ORDERS_KEY).await.unwrap().unwrap()).unwrap();
        assert!(!persisted.iter().any(|o| o.id == OrderId::new(2)));
    }

    #[tokio::test]
    async fn test_reconcile_updates_drifted_entries() {
        let source = Arc::new(ScriptedSource::with([
            (1, Some(("completed", "12.00"))),
            (2, Some(("pending", "5.00"))),
        ]));
        let (history, _store) = history_with(
            vec![summary(1, "processing", "10.00"), summary(2, "pending", "5.00")],
            source,
        )
        .await;

        let report = history.reconcile(ReconcileMode::Interactive).await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.removed, 0);
        let orders = history.orders().await;
        assert_eq!(orders[0].status, OrderStatus::Completed);
        assert_eq!(orders[0].total, "12.00");
        // Untouched entry is byte-identical
        assert_eq!(orders[1], summary(2, "pending", "5.00"));
    }

    #[tokio::test]
    async fn test_reconcile_keeps_entries_on_transient_errors() {
        // ID 1 is not scripted, so the source returns a 500 for it
        let source = Arc::new(ScriptedSource::with([(2, Some(("pending", "5.00")))]));
        let (history, store) = history_with(
            vec![summary(1, "processing", "10.00"), summary(2, "pending", "5.00")],
            source,
        )
        .await;
        let before = store.get(USER_ORDERS_KEY).await.unwrap().unwrap();

        let report = history.reconcile(ReconcileMode::Quiet).await;

        assert_eq!(report, ReconcileReport { checked: 2, updated: 0, removed: 0 });
        assert_eq!(history.orders().await.len(), 2);
        // Nothing changed, so nothing was rewritten
        assert_eq!(store.get(USER_ORDERS_KEY).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let source = Arc::new(ScriptedSource::with([
            (1, Some(("completed", "12.00"))),
            (2, None),
            (3, Some(("pending", "7.00"))),
        ]));
        let (history, store) = history_with(
            vec![
                summary(1, "processing", "10.00"),
                summary(2, "pending", "5.00"),
                summary(3, "pending", "7.00"),
            ],
            Arc::clone(&source),
        )
        .await;

        let first = history.reconcile(ReconcileMode::Quiet).await;
        assert!(first.changed());
        let after_first = store.get(USER_ORDERS_KEY).await.unwrap().unwrap();

        let second = history.reconcile(ReconcileMode::Quiet).await;
        assert_eq!(second, ReconcileReport { checked: 2, updated: 0, removed: 0 });
        // Byte-for-byte identical after the second run
        assert_eq!(store.get(USER_ORDERS_KEY).await.unwrap().unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_reconcile_fetches_sequentially_in_order() {
        let source = Arc::new(ScriptedSource::with([
            (1, Some(("pending", "1.00"))),
            (2, Some(("pending", "2.00"))),
            (3, Some(("pending", "3.00"))),
        ]));
        let (history, _store) = history_with(
            vec![
                summary(1, "pending", "1.00"),
                summary(2, "pending", "2.00"),
                summary(3, "pending", "3.00"),
            ],
            Arc::clone(&source),
        )
        .await;

        let report = history.reconcile(ReconcileMode::Quiet).await;
        assert_eq!(report.checked, 3);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_remove_order_persists() {
        let (history, store) = history_with(
            vec![summary(1, "pending", "1.00"), summary(2, "pending", "2.00")],
            Arc::new(ScriptedSource::default()),
        )
        .await;

        history.remove_order(OrderId::new(1)).await;

        assert_eq!(history.orders().await.len(), 1);
        let persisted: Vec<StoredOrderSummary> =
            serde_json::from_str(&store.get(USER_ORDERS_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, OrderId::new(2));
    }

    #[tokio::test]
    async fn test_update_order_fields_skips_unchanged() {
        let (history, store) = history_with(
            vec![summary(1, "pending", "1.00")],
            Arc::new(ScriptedSource::default()),
        )
        .await;
        let before = store.get(USER_ORDERS_KEY).await.unwrap().unwrap();

        history
            .update_order_fields(OrderId::new(1), OrderStatus::Pending, "1.00".to_string())
            .await;
        assert_eq!(store.get(USER_ORDERS_KEY).await.unwrap().unwrap(), before);

        history
            .update_order_fields(OrderId::new(1), OrderStatus::Completed, "1.50".to_string())
            .await;
        let orders = history.orders().await;
        assert_eq!(orders[0].status, OrderStatus::Completed);
        assert_eq!(orders[0].total, "1.50");
        assert_ne!(store.get(USER_ORDERS_KEY).await.unwrap().unwrap(), before);
    }

    #[test]
    fn test_summary_message_wording() {
        let none = ReconcileReport::default();
        assert_eq!(none.summary_message(), None);

        let removed = ReconcileReport { checked: 3, updated: 0, removed: 2 };
        assert_eq!(
            removed.summary_message().unwrap(),
            "Removed 2 deleted order(s) from your local list."
        );

        let updated = ReconcileReport { checked: 3, updated: 1, removed: 0 };
        assert_eq!(
            updated.summary_message().unwrap(),
            "Updated 1 order status(es) from the server."
        );

        let both = ReconcileReport { checked: 3, updated: 1, removed: 2 };
        assert_eq!(
            both.summary_message().unwrap(),
            "Removed 2 deleted order(s) and updated 1 order status(es)."
        );
    }
}
