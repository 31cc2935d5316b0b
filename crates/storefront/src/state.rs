//! Application composition root.

use std::sync::Arc;

use tracing::info;

use crate::cart::CartManager;
use crate::commerce::{CommerceClient, OrderSource};
use crate::config::StorefrontConfig;
use crate::orders::{OrderHistory, ReconcileMode, ReconcileReport};
use crate::storage::{FileStore, KeyValueStore};

/// The wired-up storefront: client, store, cart, and order history.
///
/// Collaborators are constructed here and injected explicitly - there is no
/// ambient singleton. The handle is cheaply cloneable; all members share
/// state through their own `Arc` internals.
#[derive(Clone)]
pub struct App {
    config: StorefrontConfig,
    client: CommerceClient,
    cart: CartManager,
    orders: OrderHistory,
}

impl App {
    /// Build the application from configuration: construct the commerce
    /// client and file store, restore the cart, and load the order history.
    pub async fn new(config: StorefrontConfig) -> Self {
        let client = CommerceClient::new(&config);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));

        let cart = CartManager::restore(Arc::clone(&store)).await;
        let orders = OrderHistory::load(store, Arc::new(client.clone()) as Arc<dyn OrderSource>).await;

        Self {
            config,
            client,
            cart,
            orders,
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub const fn client(&self) -> &CommerceClient {
        &self.client
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    /// Get a reference to the order history.
    #[must_use]
    pub const fn orders(&self) -> &OrderHistory {
        &self.orders
    }

    /// Schedule the one-shot background reconciliation pass.
    ///
    /// Runs quietly after the configured delay and does not repeat. It may
    /// race user-initiated mutations on the persisted order list; writes
    /// replace the whole value, so the last writer wins (accepted, see
    /// DESIGN.md).
    pub fn spawn_quiet_reconcile(&self) -> tokio::task::JoinHandle<ReconcileReport> {
        let orders = self.orders.clone();
        let delay = self.config.reconcile_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let report = orders.reconcile(ReconcileMode::Quiet).await;
            if report.changed() {
                info!(
                    removed = report.removed,
                    updated = report.updated,
                    "Background order reconciliation corrected local history"
                );
            }
            report
        })
    }
}
