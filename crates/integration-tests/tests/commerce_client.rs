//! Integration tests for the commerce REST client.
//!
//! Verifies request shape (auth header, query parameters), response
//! parsing, catalog caching, and error mapping against a mock backend.

#![allow(clippy::unwrap_used)]

use extramile_core::{OrderId, ProductId};
use extramile_integration_tests::{expected_basic_auth, test_config};
use extramile_storefront::commerce::{CommerceClient, CommerceError, ProductQuery};
use mockito::Matcher;
use serde_json::json;

// =============================================================================
// Request Shape
// =============================================================================

#[tokio::test]
async fn test_list_categories_sends_auth_and_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products/categories")
        .match_header("authorization", expected_basic_auth().as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "100".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("hide_empty".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": 7, "name": "Pickles", "slug": "pickles", "count": 12},
                {"id": 8, "name": "Empty", "slug": "empty", "count": 0},
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let categories = client.list_categories(None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Pickles");
    assert_eq!(categories[0].count, 12);
}

#[tokio::test]
async fn test_list_products_passes_filter() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "publish".into()),
            Matcher::UrlEncoded("category".into(), "7".into()),
            Matcher::UrlEncoded("search".into(), "pickle".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([{"id": 10, "name": "Mango Pickle", "price": "19.99"}]).to_string(),
        )
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let mut query = ProductQuery::in_category(extramile_core::CategoryId::new(7));
    query.search = Some("pickle".to_string());

    let products = client.list_products(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new(10));
}

#[tokio::test]
async fn test_create_order_posts_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/orders")
        .match_header("authorization", expected_basic_auth().as_str())
        .match_body(Matcher::PartialJson(json!({
            "payment_method": "cod",
            "set_paid": false,
            "line_items": [{"product_id": 10, "quantity": 2}],
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 727,
                "number": "727",
                "status": "pending",
                "total": "39.98",
                "date_created": "2024-05-01T12:30:00",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let request = serde_json::from_value(json!({
        "payment_method": "cod",
        "payment_method_title": "Cash on Delivery",
        "set_paid": false,
        "billing": {"first_name": "Rahim", "email": "rahim@example.com"},
        "shipping": {"first_name": "Rahim"},
        "line_items": [{"product_id": 10, "quantity": 2}],
    }))
    .unwrap();

    let order = client.create_order(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(order.id, OrderId::new(727));
    assert_eq!(order.number, "727");
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_missing_product_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/products/99")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": "woocommerce_rest_product_invalid_id",
                "message": "Invalid ID.",
                "data": {"status": 404},
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let err = client.get_product(ProductId::new(99)).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: Product not found: 99");
}

#[tokio::test]
async fn test_rate_limit_maps_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/orders/1")
        .with_status(429)
        .with_header("Retry-After", "30")
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let err = client.get_order(OrderId::new(1)).await.unwrap_err();

    assert!(matches!(err, CommerceError::RateLimited(30)));
}

#[tokio::test]
async fn test_server_fault_maps_to_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/orders/1")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let err = client.get_order(OrderId::new(1)).await.unwrap_err();

    assert!(matches!(err, CommerceError::Api { status: 500, .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_malformed_body_maps_to_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/orders/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>definitely not json</html>")
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let err = client.get_order(OrderId::new(1)).await.unwrap_err();

    assert!(matches!(err, CommerceError::Parse(_)));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_product_reads_are_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products/10")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": 10, "name": "Mango Pickle", "price": "19.99"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let first = client.get_product(ProductId::new(10)).await.unwrap();
    let second = client.get_product(ProductId::new(10)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cache_invalidation_refetches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products/10")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": 10, "name": "Mango Pickle", "price": "19.99"}).to_string())
        .expect(2)
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    client.get_product(ProductId::new(10)).await.unwrap();
    client.invalidate_all().await;
    client.get_product(ProductId::new(10)).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_results_are_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products")
        .match_query(Matcher::UrlEncoded("search".into(), "pickle".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([]).to_string())
        .expect(2)
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    let query = ProductQuery::search("pickle");
    client.list_products(&query).await.unwrap();
    client.list_products(&query).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_orders_are_never_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/orders/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 1,
                "number": "1",
                "status": "processing",
                "total": "10.00",
                "date_created": "2024-05-01T12:30:00",
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = CommerceClient::new(&test_config(&server.url()));
    client.get_order(OrderId::new(1)).await.unwrap();
    client.get_order(OrderId::new(1)).await.unwrap();

    mock.assert_async().await;
}
