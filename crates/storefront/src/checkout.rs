//! Checkout and order-detail services.
//!
//! Checkout validates the customer form locally, creates the order
//! remotely, then records a local summary and clears the cart - in that
//! order, so a failed order creation leaves the cart intact.
//!
//! The order-detail view enriches each line item with the product's
//! featured image. Enrichment is best-effort: a failed product lookup
//! degrades the view (missing image) instead of failing the fetch.

use extramile_core::{Email, EmailError, OrderId};
use tracing::{info, instrument, warn};

use crate::cart::CartManager;
use crate::commerce::{
    BillingAddress, CommerceClient, CommerceError, CreateOrder, Image, Order, OrderLineItemInput,
    ShippingAddress,
};
use crate::orders::OrderHistory;

/// Payment gateway used for all orders.
const PAYMENT_METHOD: &str = "cod";
const PAYMENT_METHOD_TITLE: &str = "Cash on Delivery";

/// Errors from checkout and order-detail operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A required form field is empty. Detected before any network call.
    #[error("please fill in the {0}")]
    MissingField(&'static str),

    /// The email address is structurally invalid.
    #[error("please enter a valid email address")]
    InvalidEmail(#[from] EmailError),

    /// Checkout was attempted with an empty cart.
    #[error("your cart is empty")]
    EmptyCart,

    /// The remote call failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

// =============================================================================
// Customer form
// =============================================================================

/// Customer details collected at checkout.
///
/// The same name/address block is submitted as both billing and shipping;
/// email and phone ride on the billing side only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postcode: String::new(),
            country: "BD".to_string(),
        }
    }
}

impl CustomerInfo {
    /// Validate the form: every required field non-blank, email structurally
    /// valid. Fields are checked in display order so the first missing one
    /// is the one reported.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError::MissingField`] or
    /// [`CheckoutError::InvalidEmail`] encountered.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required: [(&str, &'static str); 8] = [
            (&self.first_name, "first name"),
            (&self.last_name, "last name"),
            (&self.email, "email"),
            (&self.phone, "phone"),
            (&self.address, "address"),
            (&self.city, "city"),
            (&self.state, "state"),
            (&self.postcode, "postcode"),
        ];

        for (value, label) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(label));
            }
        }

        Email::parse(&self.email)?;
        Ok(())
    }

    fn billing(&self) -> BillingAddress {
        BillingAddress {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address_1: self.address.clone(),
            address_2: None,
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            country: self.country.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    fn shipping(&self) -> ShippingAddress {
        ShippingAddress {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address_1: self.address.clone(),
            address_2: None,
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            country: self.country.clone(),
        }
    }
}

// =============================================================================
// Place order
// =============================================================================

/// Place a cash-on-delivery order from the current cart.
///
/// Sequence: validate the form, snapshot the cart (rejecting an empty one),
/// create the order remotely, record the summary at the front of the order
/// history, and only then clear the cart.
///
/// # Errors
///
/// Validation failures abort before any network call or state mutation.
/// A remote failure leaves both the cart and the order history untouched.
#[instrument(skip_all)]
pub async fn place_order(
    client: &CommerceClient,
    cart: &CartManager,
    history: &OrderHistory,
    info: &CustomerInfo,
) -> Result<Order, CheckoutError> {
    info.validate()?;

    let snapshot = cart.state().await;
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let request = CreateOrder {
        payment_method: PAYMENT_METHOD.to_string(),
        payment_method_title: PAYMENT_METHOD_TITLE.to_string(),
        set_paid: false,
        billing: info.billing(),
        shipping: info.shipping(),
        line_items: snapshot
            .items
            .iter()
            .map(|item| OrderLineItemInput {
                product_id: item.product.id,
                quantity: item.quantity,
                name: Some(item.product.name.clone()),
                price: Some(item.product.price.clone()),
            })
            .collect(),
    };

    let order = client.create_order(&request).await?;
    info!(order_id = %order.id, order_number = %order.number, "Order placed");

    history.record_new_order(&order).await;
    cart.clear_cart().await;

    Ok(order)
}

// =============================================================================
// Order detail
// =============================================================================

/// A line item prepared for display, possibly enriched with an image.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItemView {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    /// Unit price as the backend reported it.
    pub price: f64,
    /// Line total, decimal string.
    pub total: String,
    /// Featured image of the product, when the lookup succeeded.
    pub image: Option<Image>,
}

/// A full order prepared for display.
///
/// `missing_images` counts line items whose image lookup failed; the view
/// is an explicit partial result rather than a silent one.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetailView {
    pub order: Order,
    pub lines: Vec<OrderLineItemView>,
    pub missing_images: usize,
}

/// Fetch one order for display, refreshing the local summary on the way.
///
/// Each line item is enriched with its product's featured image; a failed
/// product lookup leaves that line's image empty and counts it in
/// `missing_images`. A not-found order is removed from the local history
/// before the error is propagated - it is the only signal that the order
/// was deleted server-side.
///
/// # Errors
///
/// Returns [`CheckoutError::Commerce`] when the order fetch itself fails.
#[instrument(skip(client, history), fields(order_id = %id))]
pub async fn fetch_order_detail(
    client: &CommerceClient,
    history: &OrderHistory,
    id: OrderId,
) -> Result<OrderDetailView, CheckoutError> {
    let order = match client.get_order(id).await {
        Ok(order) => order,
        Err(e) if e.is_not_found() => {
            history.remove_order(id).await;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let mut lines = Vec::with_capacity(order.line_items.len());
    let mut missing_images = 0;
    for item in &order.line_items {
        let image = match client.get_product(item.product_id).await {
            Ok(product) => product.featured_image().cloned(),
            Err(e) => {
                warn!(product_id = %item.product_id, error = %e, "Could not enrich line item");
                None
            }
        };
        if image.is_none() {
            missing_images += 1;
        }
        lines.push(OrderLineItemView {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            total: item.total.clone(),
            image,
        });
    }

    // Keep the stored summary in sync without waiting for a full
    // reconciliation pass
    history
        .update_order_fields(id, order.status.clone(), order.total.clone())
        .await;

    Ok(OrderDetailView {
        order,
        lines,
        missing_images,
    })
}
