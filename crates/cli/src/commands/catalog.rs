//! Catalog browsing commands.

use extramile_core::{CategoryId, ProductId};
use extramile_storefront::commerce::ProductQuery;
use extramile_storefront::{App, AppError};

/// List product categories with their product counts.
pub async fn categories(app: &App) -> Result<(), AppError> {
    let categories = app.client().list_categories(None).await?;

    // hide_empty already filters server-side; guard against backends that
    // ignore it
    let visible: Vec<_> = categories.into_iter().filter(|c| c.count > 0).collect();

    if visible.is_empty() {
        tracing::info!("No categories found");
        return Ok(());
    }

    tracing::info!("{} categories:", visible.len());
    for category in visible {
        tracing::info!(
            "  [{}] {} ({} products)",
            category.id,
            category.name,
            category.count
        );
    }
    Ok(())
}

/// List products, optionally filtered by category or search term.
pub async fn products(
    app: &App,
    category: Option<i64>,
    search: Option<String>,
    page: Option<u32>,
) -> Result<(), AppError> {
    let query = ProductQuery {
        category: category.map(CategoryId::new),
        search,
        page,
        per_page: None,
    };

    let products = app.client().list_products(&query).await?;

    if products.is_empty() {
        tracing::info!("No products found");
        return Ok(());
    }

    tracing::info!("{} products:", products.len());
    for product in products {
        let sale = if product.on_sale { " (on sale)" } else { "" };
        tracing::info!("  [{}] {} - {}{}", product.id, product.name, product.price, sale);
    }
    Ok(())
}

/// Show one product in detail.
pub async fn product(app: &App, id: i64) -> Result<(), AppError> {
    let product = app.client().get_product(ProductId::new(id)).await?;

    tracing::info!("{} [{}]", product.name, product.id);
    if product.on_sale {
        tracing::info!("  Price: {} (regular {})", product.price, product.regular_price);
    } else {
        tracing::info!("  Price: {}", product.price);
    }
    if !product.sku.is_empty() {
        tracing::info!("  SKU: {}", product.sku);
    }
    tracing::info!("  Stock: {}", product.stock_status);
    if !product.categories.is_empty() {
        let names: Vec<&str> = product.categories.iter().map(|c| c.name.as_str()).collect();
        tracing::info!("  Categories: {}", names.join(", "));
    }
    if let Some(image) = product.featured_image() {
        tracing::info!("  Image: {}", image.src);
    }
    Ok(())
}
