//! Language switch route handler.

use axum::{extract::Path, response::Redirect};
use bakalah_core::Language;
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::middleware::set_language;

/// Store the visitor's language choice and go back to the home page.
///
/// Unknown codes leave the stored choice unchanged.
#[instrument(skip(session))]
pub async fn switch(session: Session, Path(code): Path<String>) -> Result<Redirect> {
    match code.parse::<Language>() {
        Ok(lang) => set_language(&session, lang).await?,
        Err(e) => debug!(error = %e, "Ignoring language switch"),
    }
    Ok(Redirect::to("/"))
}
