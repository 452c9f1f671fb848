//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bakalah_core::{Language, Product};
use tracing::{instrument, warn};

use super::layout::{Layout, PriceLine};
use crate::filters;
use crate::middleware::CurrentLanguage;
use crate::state::AppState;

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub grade: String,
    pub colors: Vec<String>,
    pub badge: Option<String>,
    pub gallery: Vec<String>,
    pub prices: Vec<PriceLine>,
}

impl ProductDetailView {
    #[must_use]
    pub fn new(product: &Product, lang: Language) -> Self {
        let details = &product.details;
        Self {
            id: product.id.to_string(),
            name: product.name(lang).to_string(),
            description: product.description(lang).to_string(),
            grade: details.grade.clone(),
            colors: details.colors.clone(),
            badge: details.badge(lang).map(ToString::to_string),
            gallery: details.gallery().into_iter().map(String::from).collect(),
            prices: details
                .price_options()
                .iter()
                .map(|option| PriceLine::new(option, &details.currency))
                .collect(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: ProductDetailView,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Render the not-found page with a 404 status.
#[must_use]
pub fn not_found(lang: Language) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            layout: Layout::new(lang),
        },
    )
        .into_response()
}

/// Resolve a product: static list first, then the current snapshot, then
/// the remote API. Remote failures count as not found.
async fn find_product(state: &AppState, id: &str) -> Option<Product> {
    if let Some(product) = state.catalog().find_local(id) {
        return Some(product);
    }

    match state.products().get_product(id).await {
        Ok(product) => product,
        Err(e) => {
            warn!(error = %e, product_id = %id, "Failed to fetch product from API");
            None
        }
    }
}

/// Display a product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentLanguage(lang): CurrentLanguage,
    Path(id): Path<String>,
) -> Response {
    match find_product(&state, &id).await {
        Some(product) => ProductTemplate {
            layout: Layout::new(lang),
            product: ProductDetailView::new(&product, lang),
        }
        .into_response(),
        None => not_found(lang),
    }
}
