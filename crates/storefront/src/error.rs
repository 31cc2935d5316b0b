//! Unified error handling.
//!
//! Subsystems keep their own error enums; `AppError` unifies them at the
//! boundary where a caller has to decide what to show the user. Persistence
//! failures never appear here - they are logged and swallowed at the point
//! of writing.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::commerce::CommerceError;
use crate::config::ConfigError;
use crate::storage::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Commerce API operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// The blocking-notification text for this error.
    ///
    /// Validation messages pass through verbatim; everything remote maps to
    /// a retry-by-re-invocation message without internal details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::MissingField(_)
                | CheckoutError::InvalidEmail(_)
                | CheckoutError::EmptyCart => {
                    let msg = err.to_string();
                    let mut chars = msg.chars();
                    chars.next().map_or_else(String::new, |first| {
                        format!("{}{}", first.to_uppercase(), chars.as_str())
                    })
                }
                CheckoutError::Commerce(e) => commerce_message(e),
            },
            Self::Commerce(e) => commerce_message(e),
            Self::Config(e) => e.to_string(),
            Self::Storage(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn commerce_message(err: &CommerceError) -> String {
    match err {
        CommerceError::NotFound(msg) if msg.starts_with("Order") => {
            "This order has been deleted from the server. It will be removed from your local list."
                .to_string()
        }
        CommerceError::NotFound(msg) => msg.clone(),
        CommerceError::RateLimited(_) => "The store is busy. Please try again in a moment.".to_string(),
        CommerceError::Http(_) | CommerceError::Parse(_) | CommerceError::Api { .. } => {
            "Failed to reach the store. Please try again.".to_string()
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
