//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest` with Basic-auth consumer credentials
//! - The backend is the source of truth - no local catalog sync, direct
//!   API calls with in-memory caching via `moka` (5 minute TTL)
//! - Orders and carts are never cached; only catalog reads are
//!
//! # Example
//!
//! ```rust,ignore
//! use extramile_storefront::commerce::CommerceClient;
//!
//! let client = CommerceClient::new(&config);
//!
//! // Browse the catalog
//! let categories = client.list_categories(None).await?;
//! let products = client.list_products(&ProductQuery::in_category(categories[0].id)).await?;
//!
//! // Place and re-fetch an order
//! let order = client.create_order(&new_order).await?;
//! let refreshed = client.get_order(order.id).await?;
//! ```

mod client;
pub mod types;

pub use client::{CommerceClient, ProductQuery};
pub use types::*;

use async_trait::async_trait;
use extramile_core::OrderId;
use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (connect, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found. For orders this is load-bearing: it is the only
    /// signal that an order was deleted server-side.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },
}

impl CommerceError {
    /// Whether this error means the resource definitively does not exist.
    ///
    /// Reconciliation deletes local entries only on this; every other
    /// failure is treated as ambiguous and leaves local state untouched.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Remote source of order records.
///
/// The order history cache verifies its entries through this seam so tests
/// can substitute a fake backend.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch one order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the order does not exist, or
    /// another variant for transport/server failures.
    async fn fetch_order(&self, id: OrderId) -> Result<Order, CommerceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_error_display() {
        let err = CommerceError::NotFound("order 42".to_string());
        assert_eq!(err.to_string(), "Not found: order 42");

        let err = CommerceError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");

        let err = CommerceError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (HTTP 500): Internal Server Error"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(CommerceError::NotFound(String::new()).is_not_found());
        assert!(
            !CommerceError::Api {
                status: 503,
                message: String::new(),
            }
            .is_not_found()
        );
    }
}
