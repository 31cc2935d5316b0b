//! WooCommerce REST client implementation.
//!
//! Uses `reqwest` with Basic-auth consumer credentials. Catalog reads are
//! cached with `moka` (5-minute TTL); order operations always hit the wire.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use extramile_core::{CategoryId, OrderId, ProductId};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::StorefrontConfig;

use super::types::{Category, CreateOrder, Order, Product};
use super::{CommerceError, OrderSource};

/// Default page size for product listings.
const DEFAULT_PRODUCTS_PER_PAGE: u32 = 20;
/// Page size for category listings; stores rarely exceed this.
const CATEGORIES_PER_PAGE: u32 = 100;
/// How long catalog responses stay cached.
const CACHE_TTL: Duration = Duration::from_secs(300);
/// How much of an error body is kept in messages and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Cached value types for catalog reads.
#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
    Product(Box<Product>),
}

/// Filter for product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Free-text search term.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size (default 20).
    pub per_page: Option<u32>,
}

impl ProductQuery {
    /// Query for all published products in a category.
    #[must_use]
    pub fn in_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Query for a free-text search.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "per_page",
                self.per_page.unwrap_or(DEFAULT_PRODUCTS_PER_PAGE).to_string(),
            ),
            ("page", self.page.unwrap_or(1).to_string()),
            ("status", "publish".to_string()),
        ];
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }

    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}",
            self.category.map_or_else(String::new, |c| c.to_string()),
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PRODUCTS_PER_PAGE),
        )
    }
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the WooCommerce REST API.
///
/// Provides typed access to categories, products, and orders. Catalog reads
/// are cached for 5 minutes; orders are mutable state and never cached.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .expect("Failed to build HTTP client");

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: config.api_url.clone(),
                consumer_key: config.consumer_key.clone(),
                consumer_secret: config.consumer_secret.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Make an authenticated GET request.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CommerceError> {
        let url = format!("{}/{}", self.inner.base_url, path);
        let response = self
            .inner
            .client
            .get(&url)
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .query(params)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Make an authenticated POST request with a JSON body.
    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        let url = format!("{}/{}", self.inner.base_url, path);
        let response = self
            .inner
            .client
            .post(&url)
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Map a response to a typed result.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CommerceError> {
        let status = response.status();

        // Check for rate limiting before consuming the body
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound(error_message(&response_text)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Commerce API returned non-success status"
            );
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse commerce API response"
                );
                Err(CommerceError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List product categories.
    ///
    /// Empty categories are excluded server-side via `hide_empty`; callers
    /// still filter `count == 0` defensively.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: Option<u32>) -> Result<Vec<Category>, CommerceError> {
        let page = page.unwrap_or(1);
        let cache_key = format!("categories:{page}");

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let params = [
            ("per_page", CATEGORIES_PER_PAGE.to_string()),
            ("page", page.to_string()),
            ("hide_empty", "true".to_string()),
        ];

        let categories: Vec<Category> = self.get_json("products/categories", &params).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List published products matching a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CommerceError> {
        let cache_key = query.cache_key();

        // Check cache (only for queries without a search term)
        if query.search.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products", &query.to_params()).await?;

        if query.search.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get_json(&format!("products/{id}"), &[])
            .await
            .map_err(|e| not_found_context(e, format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Order Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if order creation fails. The cart is the caller's
    /// responsibility and must not be cleared unless this succeeds.
    #[instrument(skip(self, order))]
    pub async fn create_order(&self, order: &CreateOrder) -> Result<Order, CommerceError> {
        self.post_json("orders", order).await
    }

    /// Get a single order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the order was deleted
    /// server-side, or another variant for transport/server failures.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.get_json(&format!("orders/{id}"), &[])
            .await
            .map_err(|e| not_found_context(e, format!("Order not found: {id}")))
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl OrderSource for CommerceClient {
    async fn fetch_order(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.get_order(id).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Replace a not-found error's server message with caller context.
fn not_found_context(err: CommerceError, message: String) -> CommerceError {
    if err.is_not_found() {
        CommerceError::NotFound(message)
    } else {
        err
    }
}

/// Extract a human-readable message from an error body.
///
/// WooCommerce error bodies look like
/// `{"code": "...", "message": "Invalid ID.", "data": {...}}`.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| truncate(body, ERROR_BODY_LIMIT), |b| b.message)
}

fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
