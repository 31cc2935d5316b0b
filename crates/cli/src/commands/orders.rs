//! Order history commands.

use chrono::NaiveDateTime;
use extramile_core::OrderId;
use extramile_storefront::checkout::fetch_order_detail;
use extramile_storefront::orders::{ReconcileMode, StoredOrderSummary};
use extramile_storefront::{App, AppError};

/// List cached orders, then quietly re-verify them against the server the
/// way the order screen did on load.
pub async fn list(app: &App) {
    let orders = app.orders().orders().await;
    print_orders(&orders);

    let report = app.orders().reconcile(ReconcileMode::Quiet).await;
    if report.changed() {
        tracing::info!("Order list refreshed from the server:");
        print_orders(&app.orders().orders().await);
    }
}

/// Show one order with its line items.
pub async fn show(app: &App, id: i64) -> Result<(), AppError> {
    let view = fetch_order_detail(app.client(), app.orders(), OrderId::new(id)).await?;
    let order = &view.order;

    tracing::info!("Order #{}", order.number);
    tracing::info!("  Status: {}", order.status);
    tracing::info!("  Date: {}", format_date(&order.date_created));
    if !order.payment_method_title.is_empty() {
        tracing::info!("  Payment: {}", order.payment_method_title);
    }

    let billing = &order.billing;
    tracing::info!("  Billing: {} {}", billing.first_name, billing.last_name);
    tracing::info!(
        "    {}, {}, {} {}",
        billing.address_1,
        billing.city,
        billing.state,
        billing.postcode
    );

    tracing::info!("  Items:");
    for line in &view.lines {
        tracing::info!(
            "    {} x{} @ {:.2} = {}{}",
            line.name,
            line.quantity,
            line.price,
            line.total,
            if line.image.is_some() { "" } else { " (no image)" }
        );
    }
    if view.missing_images > 0 {
        tracing::debug!("{} line item(s) missing images", view.missing_images);
    }
    tracing::info!("  Total: {}", order.total);
    Ok(())
}

/// Verify every cached order against the server and report the outcome.
pub async fn reconcile(app: &App) {
    let report = app.orders().reconcile(ReconcileMode::Interactive).await;

    match report.summary_message() {
        Some(message) => tracing::info!("Cleanup complete. {}", message),
        None => tracing::info!("All your orders are up to date with the server."),
    }
}

fn print_orders(orders: &[StoredOrderSummary]) {
    if orders.is_empty() {
        tracing::info!("No orders found. Your orders will appear here after you make a purchase.");
        return;
    }

    tracing::info!(
        "{} {}:",
        orders.len(),
        if orders.len() == 1 { "order" } else { "orders" }
    );
    for order in orders {
        tracing::info!(
            "  #{} [{}] {} - {}",
            order.order_number,
            order.status,
            order.total,
            format_date(&order.date_created)
        );
    }
}

/// Format a backend timestamp for display, falling back to the raw string.
fn format_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_or_else(|_| raw.to_string(), |dt| dt.format("%b %e, %Y").to_string())
}
