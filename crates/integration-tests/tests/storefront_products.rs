//! Integration tests for the product listing and search.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_integration_tests::{TestContext, product_json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/health").await;

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_root_redirects_to_products() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/").await;

    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/products");
}

#[tokio::test]
async fn test_listing_renders_catalog() {
    let ctx = TestContext::new().await;
    ctx.stock_catalog(&[
        product_json(1, "Coffee Beans", "9.99", 10),
        product_json(2, "Teapot", "24.50", 0),
    ])
    .await;

    let resp = ctx.get("/products").await;
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();

    assert!(html.contains("Coffee Beans"));
    assert!(html.contains("$9.99"));
    assert!(html.contains("In Stock (10)"));
    assert!(html.contains("$24.50"));
    assert!(html.contains("Out of Stock"));
    assert!(html.contains("disabled"));
}

#[tokio::test]
async fn test_listing_requests_zero_based_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "1"))
        .and(query_param("size", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [product_json(13, "Page Two Item", "1.00", 1)],
            "totalPages": 2,
            "totalElements": 13,
            "number": 1,
            "size": 12,
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let html = ctx.get("/products?page=1").await.text().await.unwrap();

    assert!(html.contains("Page Two Item"));
    assert!(html.contains(r#"href="/products?page=0""#));
    assert!(html.contains(r#"aria-current="page">2<"#));
}

#[tokio::test]
async fn test_search_fragment() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products/search"))
        .and(query_param("keyword", "tea"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(2, "Teapot", "24.50", 3)])),
        )
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let resp = ctx.get("/products/search?q=tea").await;
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();

    assert!(html.trim_start().starts_with(r#"<div id="product-grid">"#));
    assert!(html.contains("Teapot"));
    assert!(!html.contains("<html"));
}

#[tokio::test]
async fn test_blank_search_lists_products() {
    let ctx = TestContext::new().await;
    ctx.stock_catalog(&[product_json(1, "Coffee Beans", "9.99", 10)])
        .await;

    let html = ctx.get("/products/search?q=%20%20").await.text().await.unwrap();

    assert!(html.contains("Coffee Beans"));
}

#[tokio::test]
async fn test_backend_outage_shows_notice() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.backend)
        .await;

    let resp = ctx.get("/products").await;

    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("Products are unavailable"));
}

#[tokio::test]
async fn test_security_headers() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/health").await;

    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
}
