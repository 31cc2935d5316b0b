//! Client-side shopping cart.
//!
//! The cart is an ordered list of line items (one per product, insertion
//! order) plus derived totals. State transitions are a closed set of tagged
//! actions applied by a pure [`reduce`] function; `total` and `item_count`
//! are recomputed from scratch on every transition instead of being patched
//! incrementally, so they can never drift from the items they summarize.
//!
//! Durability: [`CartManager`] persists the raw item list after every
//! mutation. Only the item list is durable - a restored cart recomputes its
//! derived fields and never trusts persisted totals.

use std::sync::Arc;

use extramile_core::{ProductId, parse_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::commerce::Product;
use crate::storage::{CART_KEY, KeyValueStore};

// =============================================================================
// State
// =============================================================================

/// One (product, quantity) pairing within the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Snapshot of the product at add time.
    pub product: Product,
    /// Units of the product; always >= 1 while the line exists.
    pub quantity: u32,
}

/// The cart: line items plus derived totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    /// Line items in insertion order, at most one per product ID.
    pub items: Vec<CartLineItem>,
    /// Sum of price x quantity across items. Unparseable prices count as
    /// zero so malformed catalog data can never make the cart unusable.
    pub total: Decimal,
    /// Sum of quantities across items.
    pub item_count: u64,
}

impl CartState {
    /// Build a state from raw items, computing the derived fields.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let total = items
            .iter()
            .map(|item| {
                parse_amount(&item.product.price).unwrap_or_default()
                    * Decimal::from(item.quantity)
            })
            .sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();

        Self {
            items,
            total,
            item_count,
        }
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line item for a product, if present.
    #[must_use]
    pub fn line_item(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// The closed set of cart transitions.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add `quantity` units of a product, merging into an existing line.
    /// Quantities are caller-validated positive integers.
    Add { product: Product, quantity: u32 },
    /// Remove a product's line item entirely (no-op if absent).
    Remove { product_id: ProductId },
    /// Set a line item's quantity; `0` removes the line, and a product not
    /// already in the cart is left alone (no line is created).
    SetQuantity { product_id: ProductId, quantity: u32 },
    /// Reset to the empty cart.
    Clear,
    /// Replace the items wholesale (startup restore path).
    Load { items: Vec<CartLineItem> },
}

/// Pure transition function from one cart state to the next.
///
/// Every arm rebuilds the derived fields via [`CartState::from_items`].
#[must_use]
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    match action {
        CartAction::Add { product, quantity } => {
            let mut items = state.items.clone();
            if let Some(existing) = items.iter_mut().find(|item| item.product.id == product.id) {
                existing.quantity += quantity;
            } else {
                items.push(CartLineItem { product, quantity });
            }
            CartState::from_items(items)
        }

        CartAction::Remove { product_id } => CartState::from_items(
            state
                .items
                .iter()
                .filter(|item| item.product.id != product_id)
                .cloned()
                .collect(),
        ),

        CartAction::SetQuantity {
            product_id,
            quantity,
        } => {
            if quantity == 0 {
                return reduce(state, CartAction::Remove { product_id });
            }
            let items = state
                .items
                .iter()
                .map(|item| {
                    if item.product.id == product_id {
                        CartLineItem {
                            product: item.product.clone(),
                            quantity,
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect();
            CartState::from_items(items)
        }

        CartAction::Clear => CartState::default(),

        CartAction::Load { items } => CartState::from_items(items),
    }
}

// =============================================================================
// CartManager
// =============================================================================

/// Authoritative holder of the in-memory cart.
///
/// Cheaply cloneable handle; all mutations go through the reducer and then
/// persist the raw item list to the injected store. Persistence failures
/// are logged and swallowed - the in-memory state stays correct for the
/// session and is never rolled back.
#[derive(Clone)]
pub struct CartManager {
    state: Arc<Mutex<CartState>>,
    store: Arc<dyn KeyValueStore>,
}

impl CartManager {
    /// Restore the cart from the store at startup.
    ///
    /// An absent snapshot yields an empty cart; a corrupt one is logged and
    /// discarded rather than propagated. Derived fields are recomputed from
    /// the restored item list.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let items = match store.get(CART_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable cart snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot");
                Vec::new()
            }
        };

        Self {
            state: Arc::new(Mutex::new(reduce(
                &CartState::default(),
                CartAction::Load { items },
            ))),
            store,
        }
    }

    /// Add `quantity` units of a product (merged into an existing line).
    pub async fn add_to_cart(&self, product: Product, quantity: u32) -> CartState {
        self.dispatch(CartAction::Add { product, quantity }).await
    }

    /// Remove a product's line item; a product not in the cart is a no-op.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> CartState {
        self.dispatch(CartAction::Remove { product_id }).await
    }

    /// Set a line item's quantity; `<= 0` removes the line.
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> CartState {
        self.dispatch(CartAction::SetQuantity {
            product_id,
            quantity,
        })
        .await
    }

    /// Reset to the empty cart (persists the empty list).
    pub async fn clear_cart(&self) -> CartState {
        self.dispatch(CartAction::Clear).await
    }

    /// Read-only lookup of a line item.
    pub async fn get_cart_item(&self, product_id: ProductId) -> Option<CartLineItem> {
        self.state.lock().await.line_item(product_id).cloned()
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> CartState {
        self.state.lock().await.clone()
    }

    /// Apply an action, persist the resulting item list, return the snapshot.
    async fn dispatch(&self, action: CartAction) -> CartState {
        let next = {
            let mut state = self.state.lock().await;
            let next = reduce(&state, action);
            *state = next.clone();
            next
        };

        self.persist(&next.items).await;
        next
    }

    /// Persist the raw item list. Failures are logged, never surfaced.
    async fn persist(&self, items: &[CartLineItem]) {
        match serde_json::to_string(items) {
            Ok(raw) => {
                if let Err(e) = self.store.set(CART_KEY, &raw).await {
                    warn!(error = %e, "Failed to persist cart");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode cart"),
        }
    }
}
