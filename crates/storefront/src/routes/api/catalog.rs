//! Catalog JSON endpoint.

use axum::{Json, extract::State};
use bakalah_core::Product;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Response body for `GET /api/catalog`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    pub using_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Return the current catalog snapshot.
#[instrument(skip(state))]
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let snapshot = state.catalog().snapshot();
    Json(CatalogResponse {
        products: snapshot.catalog.products().to_vec(),
        using_fallback: snapshot.using_fallback,
        refreshed_at: snapshot.refreshed_at,
    })
}
