//! Integration tests for Extra Mile.
//!
//! Tests drive the real `CommerceClient` against a `mockito` HTTP server
//! standing in for the WooCommerce backend, with the in-memory key-value
//! store standing in for device storage.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p extramile-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `commerce_client` - REST client behavior: auth, caching, error mapping
//! - `checkout_flow` - order placement end to end
//! - `order_reconciliation` - order history self-healing against the server

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use extramile_storefront::config::StorefrontConfig;
use secrecy::SecretString;

/// Consumer key used by every test.
pub const TEST_CONSUMER_KEY: &str = "ck_test_key";
/// Consumer secret used by every test.
pub const TEST_CONSUMER_SECRET: &str = "cs_test_secret";

/// Build a configuration pointing at a mock server.
///
/// The data dir is unique per call so file-store tests never collide.
#[must_use]
pub fn test_config(server_url: &str) -> StorefrontConfig {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let data_dir = std::env::temp_dir().join(format!(
        "extramile-it-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed),
    ));

    StorefrontConfig {
        api_url: server_url.trim_end_matches('/').to_string(),
        consumer_key: TEST_CONSUMER_KEY.to_string(),
        consumer_secret: SecretString::from(TEST_CONSUMER_SECRET),
        data_dir,
        http_timeout: Duration::from_secs(5),
        reconcile_delay: Duration::from_millis(10),
    }
}

/// Remove a test data dir, ignoring races with dirs that were never created.
pub fn cleanup_data_dir(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir);
}

/// The `Authorization` header value the client is expected to send.
#[must_use]
pub fn expected_basic_auth() -> String {
    use base64::Engine as _;
    let credentials = format!("{TEST_CONSUMER_KEY}:{TEST_CONSUMER_SECRET}");
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}
