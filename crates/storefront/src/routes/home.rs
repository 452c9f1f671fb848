//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use bakalah_core::{Language, Product};
use tracing::instrument;

use super::layout::{Layout, format_price, product_href};
use crate::filters;
use crate::middleware::CurrentLanguage;
use crate::state::AppState;

/// Product card data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub href: String,
    pub name: String,
    pub grade: String,
    pub colors: String,
    pub image: Option<String>,
    pub badge: Option<String>,
    /// Price of the first option, or `None` for inquiry-only products.
    pub price: Option<String>,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, lang: Language) -> Self {
        let details = &product.details;
        Self {
            href: product_href(product),
            name: product.name(lang).to_string(),
            grade: details.grade.clone(),
            colors: details.colors.join(", "),
            image: details.gallery().first().map(ToString::to_string),
            badge: details.badge(lang).map(ToString::to_string),
            price: details
                .price_options()
                .first()
                .map(|option| format_price(option.price, &details.currency)),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// Products from the current catalog snapshot, in catalog order.
    pub products: Vec<ProductCardView>,
    /// Whether the remote catalog is currently unavailable.
    pub using_fallback: bool,
}

/// Display the home page: hero, about, product grid, contact.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    CurrentLanguage(lang): CurrentLanguage,
) -> impl IntoResponse {
    let snapshot = state.catalog().snapshot();

    HomeTemplate {
        layout: Layout::new(lang),
        products: snapshot
            .catalog
            .products()
            .iter()
            .map(|p| ProductCardView::new(p, lang))
            .collect(),
        using_fallback: snapshot.using_fallback,
    }
}
