//! Checkout command.

use extramile_storefront::checkout::{CustomerInfo, place_order};
use extramile_storefront::{App, AppError};

/// Place a cash-on-delivery order from the current cart.
pub async fn place(app: &App, info: CustomerInfo) -> Result<(), AppError> {
    let order = place_order(app.client(), app.cart(), app.orders(), &info).await?;

    tracing::info!("Order placed successfully!");
    tracing::info!(
        "Your order #{} has been placed. Total: {}",
        order.number,
        order.total
    );
    Ok(())
}
