//! Cart commands.

use extramile_core::ProductId;
use extramile_storefront::cart::CartState;
use extramile_storefront::{App, AppError};

/// Show the cart contents and derived totals.
pub async fn show(app: &App) {
    print_cart(&app.cart().state().await);
}

/// Add a product to the cart, fetching its current catalog record first.
pub async fn add(app: &App, product_id: i64, quantity: u32) -> Result<(), AppError> {
    // Quantities are caller-validated at this edge; the cart assumes >= 1
    let quantity = quantity.max(1);

    let product = app.client().get_product(ProductId::new(product_id)).await?;
    let name = product.name.clone();
    let state = app.cart().add_to_cart(product, quantity).await;

    tracing::info!("Added {} x{}", name, quantity);
    print_cart(&state);
    Ok(())
}

/// Remove a product's line item.
pub async fn remove(app: &App, product_id: i64) {
    let state = app.cart().remove_from_cart(ProductId::new(product_id)).await;
    print_cart(&state);
}

/// Set a line item's quantity (0 removes it).
pub async fn set_quantity(app: &App, product_id: i64, quantity: u32) {
    let state = app
        .cart()
        .update_quantity(ProductId::new(product_id), quantity)
        .await;
    print_cart(&state);
}

/// Empty the cart.
pub async fn clear(app: &App) {
    app.cart().clear_cart().await;
    tracing::info!("Cart cleared");
}

fn print_cart(state: &CartState) {
    if state.is_empty() {
        tracing::info!("Your cart is empty");
        return;
    }

    for item in &state.items {
        tracing::info!(
            "  [{}] {} x{} @ {}",
            item.product.id,
            item.product.name,
            item.quantity,
            item.product.price
        );
    }
    tracing::info!("{} item(s), total {}", state.item_count, state.total);
}
