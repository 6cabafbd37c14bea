//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use shopfront_core::{Page, Product};
use tower_sessions::Session;
use tracing::instrument;

use super::{PageContext, SEARCH_DEBOUNCE_MS};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Longest description shown on a product card.
const DESCRIPTION_PREVIEW_CHARS: usize = 80;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product
                .description
                .as_deref()
                .map(truncate_description)
                .unwrap_or_default(),
            price: product.price.to_string(),
            stock: product.stock,
            in_stock: product.is_in_stock(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
        }
    }
}

/// Cut a description to the card preview length, marking the cut with `...`.
fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{preview}...")
    } else {
        description.to_string()
    }
}

/// One link in the pagination bar.
#[derive(Clone)]
pub struct PageLink {
    /// Zero-based page index sent back to the server.
    pub index: u32,
    /// One-based number shown to the visitor.
    pub label: u32,
    pub current: bool,
}

/// Product grid data shared by the page and the HTMX fragment.
#[derive(Clone, Default)]
pub struct ProductGrid {
    pub products: Vec<ProductView>,
    pub pages: Vec<PageLink>,
    pub query: String,
    pub error: Option<String>,
}

impl ProductGrid {
    fn from_page(page: &Page<Product>, query: String) -> Self {
        let pages = if page.is_paginated() {
            (0..page.total_pages)
                .map(|index| PageLink {
                    index,
                    label: index + 1,
                    current: index == page.number,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            products: page.content.iter().map(ProductView::from).collect(),
            pages,
            query,
            error: None,
        }
    }

    fn unavailable(query: String) -> Self {
        Self {
            query,
            error: Some("Products are unavailable right now. Please try again.".to_string()),
            ..Self::default()
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Search term; blank means "list everything".
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub grid: ProductGrid,
    pub debounce_ms: u64,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: ProductGrid,
}

/// Fetch the grid for a listing or search request.
///
/// Backend failures are logged and shown as an empty grid with a notice.
async fn load_grid(state: &AppState, query: ProductsQuery) -> ProductGrid {
    let term = query.q.unwrap_or_default().trim().to_string();

    let result = if term.is_empty() {
        state
            .catalog()
            .list_products(query.page.unwrap_or(0), state.config().page_size)
            .await
    } else {
        state
            .catalog()
            .search_products(&term)
            .await
            .map(Page::single)
    };

    match result {
        Ok(page) => ProductGrid::from_page(&page, term),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            ProductGrid::unavailable(term)
        }
    }
}

/// Display product listing page.
#[instrument(skip(state, session, auth))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    ProductsIndexTemplate {
        ctx: PageContext::load(&session, &auth).await,
        grid: load_grid(&state, query).await,
        debounce_ms: SEARCH_DEBOUNCE_MS,
    }
}

/// Product grid for the search box (HTMX).
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    ProductGridTemplate {
        grid: load_grid(&state, query).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{Price, ProductId};

    use super::*;

    fn product(stock: u32, description: Option<&str>) -> Product {
        Product {
            id: ProductId::new(3),
            name: "Mug".to_string(),
            description: description.map(String::from),
            price: Price::new(Decimal::new(1250, 2)).unwrap(),
            stock,
            category: Some("Kitchen".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short"), "short");

        let exact = "a".repeat(80);
        assert_eq!(truncate_description(&exact), exact);

        let long = "b".repeat(81);
        assert_eq!(truncate_description(&long), format!("{}...", "b".repeat(80)));
    }

    #[test]
    fn test_truncate_description_multibyte() {
        let long = "é".repeat(100);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), 83);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_product_view() {
        let view = ProductView::from(&product(0, None));
        assert_eq!(view.price, "$12.50");
        assert_eq!(view.description, "");
        assert!(!view.in_stock);

        assert!(ProductView::from(&product(4, Some("Tall"))).in_stock);
    }

    #[test]
    fn test_grid_page_links() {
        let page = Page {
            content: vec![product(1, None)],
            total_pages: 3,
            total_elements: 25,
            number: 1,
            size: 12,
        };

        let grid = ProductGrid::from_page(&page, String::new());

        assert_eq!(grid.pages.len(), 3);
        assert_eq!(grid.pages[0].label, 1);
        assert!(grid.pages[1].current);
        assert!(!grid.pages[2].current);
    }

    #[test]
    fn test_single_page_has_no_links() {
        let grid = ProductGrid::from_page(&Page::single(vec![product(1, None)]), "mug".to_string());
        assert!(grid.pages.is_empty());
        assert_eq!(grid.query, "mug");
    }
}
