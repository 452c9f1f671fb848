//! Authentication extractor for admin.
//!
//! [`RequireAdmin`] runs the session guard's mount check before the handler
//! body executes, so nothing protected is rendered for a session whose
//! token has expired or been revoked.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{Method, StatusCode, header::ACCEPT, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::api::AuthContext;
use crate::error::{AppError, LOGIN_PATH};
use crate::session::{CheckTrigger, StorageError};
use crate::state::AppState;

/// Extractor that requires an authenticated admin session.
///
/// Yields the credentials for calling the product API on the admin's
/// behalf.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     State(state): State<AppState>,
///     RequireAdmin(auth): RequireAdmin,
/// ) -> Result<impl IntoResponse> {
///     let products = state.api().list_products(&auth).await?;
///     // ...
/// }
/// ```
pub struct RequireAdmin(pub AuthContext);

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: Option<String> },
    /// Unauthorized JSON response (for script requests).
    Unauthorized { reason: Option<String> },
    /// The session could not be read.
    Session(StorageError),
}

/// Login page URL that returns to `next` after a successful login.
#[must_use]
pub fn login_redirect(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("{LOGIN_PATH}?next={}", urlencoding::encode(next)),
        None => LOGIN_PATH.to_string(),
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                Redirect::to(&login_redirect(next.as_deref())).into_response()
            }
            Self::Unauthorized { reason } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false, "reason": reason })),
            )
                .into_response(),
            Self::Session(err) => AppError::Session(err).into_response(),
        }
    }
}

fn wants_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Where to return after login. Only `GET` requests can be replayed.
fn return_path(parts: &Parts) -> Option<String> {
    (parts.method == Method::GET).then(|| {
        parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string)
    })
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let reject = |reason: Option<&str>| {
            if wants_json(parts) {
                AdminAuthRejection::Unauthorized {
                    reason: reason.map(String::from),
                }
            } else {
                AdminAuthRejection::RedirectToLogin {
                    next: return_path(parts),
                }
            }
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Err(reject(None));
        };

        let guard = state.guard(session);
        let status = guard
            .check(CheckTrigger::Mount)
            .await
            .map_err(AdminAuthRejection::Session)?;
        if !status.is_authenticated() {
            return Err(reject(status.reason()));
        }

        match guard.auth_context().await {
            Ok(Some(auth)) => Ok(Self(auth)),
            Ok(None) => Err(reject(None)),
            Err(err) => Err(AdminAuthRejection::Session(err)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(method: Method, uri: &str, accept: Option<&str>) -> Parts {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        assert_eq!(login_redirect(None), "/admin/login");
        assert_eq!(
            login_redirect(Some("/admin/products?page=2")),
            "/admin/login?next=%2Fadmin%2Fproducts%3Fpage%3D2"
        );
    }

    #[test]
    fn test_return_path_only_for_get() {
        let get = parts(Method::GET, "/admin/products/7/edit", None);
        assert_eq!(return_path(&get).as_deref(), Some("/admin/products/7/edit"));

        let post = parts(Method::POST, "/admin/products/7", None);
        assert_eq!(return_path(&post), None);
    }

    #[test]
    fn test_wants_json() {
        assert!(wants_json(&parts(Method::GET, "/", Some("application/json"))));
        assert!(!wants_json(&parts(Method::GET, "/", Some("text/html"))));
        assert!(!wants_json(&parts(Method::GET, "/", None)));
    }

    #[test]
    fn test_unauthorized_rejection_is_json_401() {
        let response = AdminAuthRejection::Unauthorized {
            reason: Some("gone".to_string()),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
