//! Integration tests for Shopfront.
//!
//! Each test gets its own storefront, bound to an ephemeral port, in front
//! of a `wiremock` server standing in for the backend API. Requests go
//! through a cookie-keeping `reqwest` client, so the session (and with it
//! the cart and credential) carries across calls like in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::time::Duration;

use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use shopfront_storefront::config::{ApiConfig, StorefrontConfig};
use shopfront_storefront::state::AppState;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the fake auth service hands out.
pub const TEST_TOKEN: &str = "jwt-test-token";

/// A running storefront plus its fake backend.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub backend: MockServer,
}

impl TestContext {
    /// Start a fake backend and a storefront pointed at it.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be started.
    pub async fn new() -> Self {
        let backend = MockServer::start().await;

        let api = ApiConfig::new(&backend.uri(), Duration::from_secs(5)).expect("valid api url");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let storefront_url = format!("http://{addr}");

        let config = StorefrontConfig::with_api(storefront_url.clone(), api);
        let state = AppState::new(config).expect("app state");
        let app = shopfront_storefront::app(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("storefront server");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("http client");

        Self {
            client,
            storefront_url,
            backend,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// `GET` a storefront page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// `POST` a urlencoded form to the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        self.client
            .post(self.url(path))
            .header("content-type", "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(body)
            .send()
            .await
            .expect("POST request")
    }

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&self, product_id: i64) -> Response {
        let id = product_id.to_string();
        self.post_form("/cart/add", &[("product_id", id.as_str())])
            .await
    }

    /// Sign in as `username` against a fake auth service.
    pub async fn login(&self, username: &str) -> Response {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": TEST_TOKEN,
                "type": "Bearer",
                "username": username,
            })))
            .mount(&self.backend)
            .await;

        self.post_form("/auth/login", &[("username", username), ("password", "secret")])
            .await
    }

    /// Serve `products` from the fake catalog, both as a listing and by ID.
    pub async fn stock_catalog(&self, products: &[Value]) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": products,
                "totalPages": 1,
                "totalElements": products.len(),
                "number": 0,
                "size": 12,
            })))
            .mount(&self.backend)
            .await;

        for product in products {
            let id = &product["id"];
            Mock::given(method("GET"))
                .and(path(format!("/products/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(product))
                .mount(&self.backend)
                .await;
        }

        Mock::given(method("GET"))
            .and(path_regex(r"^/products/\d+$"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "Product not found"
            })))
            .with_priority(10)
            .mount(&self.backend)
            .await;
    }

    /// Bodies of every order the storefront sent to the backend.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled or a body is not JSON.
    pub async fn submitted_orders(&self) -> Vec<Value> {
        self.backend
            .received_requests()
            .await
            .expect("request recording enabled")
            .into_iter()
            .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/orders")
            .map(|r| serde_json::from_slice(&r.body).expect("order body is JSON"))
            .collect()
    }
}

/// Product JSON as the backend sends it.
#[must_use]
pub fn product_json(id: i64, name: &str, price: &str, stock: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} from the test catalog"),
        "price": price,
        "stock": stock,
        "category": "Test",
        "imageUrl": null,
    })
}
