//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use bakalah_core::{SourceError, reconcile};
use tracing::{instrument, warn};

use super::layout::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::session::SESSION_EXPIRED;
use crate::state::AppState;

/// Catalog counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub static_count: usize,
    pub remote_count: usize,
    pub total: usize,
    pub skipped: usize,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub summary: CatalogSummary,
    /// The product API could not be read; only bundled products are counted.
    pub using_fallback: bool,
}

/// Display the dashboard.
///
/// Counts the catalog exactly as the storefront would show it right now.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<DashboardTemplate> {
    let static_list = state.static_products();
    let reconciled = reconcile(static_list, &state.api().catalog_source(&auth)).await;

    match &reconciled.error {
        // The client has already revoked the session; the login page says why.
        Some(SourceError::Status(401)) => {
            return Err(AppError::SessionExpired(SESSION_EXPIRED.to_string()));
        }
        Some(e) => warn!(error = %e, "Dashboard showing bundled products only"),
        None => {}
    }

    let total = reconciled.catalog.len();
    Ok(DashboardTemplate {
        layout: Layout::admin(&state, "/admin"),
        summary: CatalogSummary {
            static_count: static_list.len(),
            remote_count: total.saturating_sub(static_list.len()),
            total,
            skipped: reconciled.skipped,
        },
        using_fallback: reconciled.using_fallback,
    })
}
