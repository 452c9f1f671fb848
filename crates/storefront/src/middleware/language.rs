//! Visitor language resolution.
//!
//! The language for a request is the first of:
//! 1. a valid `?lang=` query parameter,
//! 2. the choice stored in the session by `/lang/{code}`,
//! 3. the best supported match in `Accept-Language`,
//! 4. English.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use bakalah_core::Language;
use tower_sessions::Session;

use super::session::session_keys;

/// Extractor for the language the current request should render in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentLanguage(lang): CurrentLanguage) -> impl IntoResponse {
///     translations(lang).hero.title
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentLanguage(pub Language);

impl<S> FromRequestParts<S> for CurrentLanguage
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = parts.uri.query().and_then(query_language);

        let stored = match (from_query, parts.extensions.get::<Session>()) {
            (None, Some(session)) => session
                .get::<Language>(session_keys::LANGUAGE)
                .await
                .ok()
                .flatten(),
            _ => None,
        };

        let accept = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok());

        Ok(Self(resolve(from_query, stored, accept)))
    }
}

/// Store the visitor's language choice in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_language(
    session: &Session,
    lang: Language,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::LANGUAGE, lang).await
}

/// Read a supported `lang` parameter from a query string.
fn query_language(query: &str) -> Option<Language> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "lang")
        .and_then(|(_, value)| value.parse().ok())
}

fn resolve(query: Option<Language>, stored: Option<Language>, accept: Option<&str>) -> Language {
    query
        .or(stored)
        .or_else(|| accept.and_then(Language::from_accept_language))
        .unwrap_or_default()
}
