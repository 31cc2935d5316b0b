//! Domain types for the WooCommerce REST API.
//!
//! These types model the subset of the v3 payloads the storefront consumes.
//! Monetary values stay string-encoded exactly as the backend sends them;
//! totals that are compared for drift or persisted locally must round-trip
//! byte-for-byte.

use extramile_core::{CategoryId, OrderId, OrderStatus, ProductId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Image Types
// =============================================================================

/// Product or category image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Attachment ID.
    #[serde(default)]
    pub id: Option<i64>,
    /// Image URL.
    pub src: String,
    /// Image name.
    #[serde(default)]
    pub name: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: String,
}

// =============================================================================
// Category Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Category image, if one is set.
    #[serde(default)]
    pub image: Option<Image>,
    /// Number of published products in the category. Zero-count categories
    /// are filtered by callers, not by this client.
    #[serde(default)]
    pub count: u64,
}

/// Reference to a category from a product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product in the store.
///
/// Cart line items embed a snapshot of this record, so it must serialize
/// losslessly through the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Current price (sale price while a sale is active), decimal string.
    #[serde(default)]
    pub price: String,
    /// Regular price, decimal string.
    #[serde(default)]
    pub regular_price: String,
    /// Sale price, decimal string (empty when not on sale).
    #[serde(default)]
    pub sale_price: String,
    /// Whether the product is currently on sale.
    #[serde(default)]
    pub on_sale: bool,
    /// SKU code.
    #[serde(default)]
    pub sku: String,
    /// Stock status slug (`instock`, `outofstock`, `onbackorder`).
    #[serde(default)]
    pub stock_status: String,
    /// Short HTML description.
    #[serde(default)]
    pub short_description: String,
    /// Full HTML description.
    #[serde(default)]
    pub description: String,
    /// Average review rating, decimal string.
    #[serde(default)]
    pub average_rating: String,
    /// Product images, first is the featured one.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Categories this product belongs to.
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl Product {
    /// The featured image, when the product has any image at all.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

// =============================================================================
// Address Types
// =============================================================================

/// Billing address submitted with an order (includes contact details).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Shipping address submitted with an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

// =============================================================================
// Order Types
// =============================================================================

/// Line item input when creating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItemInput {
    /// Product to order.
    pub product_id: ProductId,
    /// Quantity to order.
    pub quantity: u32,
    /// Display name snapshot (informational; the server reprices anyway).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price snapshot, decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// Request body for creating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    /// Payment gateway slug (e.g., `cod`).
    pub payment_method: String,
    /// Human-readable payment method title.
    pub payment_method_title: String,
    /// Whether the order should be marked paid immediately.
    pub set_paid: bool,
    /// Billing address and contact details.
    pub billing: BillingAddress,
    /// Shipping address.
    pub shipping: ShippingAddress,
    /// Items to order.
    pub line_items: Vec<OrderLineItemInput>,
}

/// A line item on an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Line item ID.
    pub id: i64,
    /// Product display name at order time.
    pub name: String,
    /// Product ordered.
    pub product_id: ProductId,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price. The backend sends this one as a JSON number, unlike the
    /// string-encoded totals.
    #[serde(default)]
    pub price: f64,
    /// Line total, decimal string.
    #[serde(default)]
    pub total: String,
}

/// A full order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Human-readable order number.
    pub number: String,
    /// Current status.
    pub status: OrderStatus,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: String,
    /// Grand total, decimal string.
    pub total: String,
    /// Total tax, decimal string.
    #[serde(default)]
    pub total_tax: String,
    /// Creation timestamp (site-local, `2024-05-01T12:30:00`).
    pub date_created: String,
    /// Billing address and contact details.
    #[serde(default)]
    pub billing: BillingAddress,
    /// Shipping address.
    #[serde(default)]
    pub shipping: ShippingAddress,
    /// Payment gateway slug.
    #[serde(default)]
    pub payment_method: String,
    /// Human-readable payment method title.
    #[serde(default)]
    pub payment_method_title: String,
    /// Items on the order.
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
}
