//! Authenticated client for the remote product API.
//!
//! Every call carries an [`AuthContext`]. A 401 from any endpoint is
//! reported once to the [`AuthObserver`] registered at construction, so the
//! session is torn down on its next check, and surfaces to handlers as
//! [`ApiError::Unauthorized`].
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(config.product_api_url.clone(), Arc::new(watches.clone()));
//! let products = client.list_products(&auth).await?;
//! ```

pub mod auth;

use std::sync::Arc;
use std::time::Duration;

use bakalah_core::{
    CatalogSource, Product, ProductDraft, SourceError, decode_product, decode_products,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::session::{AuthObserver, SESSION_EXPIRED, SessionKey};

pub use auth::AuthApi;

const PRODUCTS_PATH: &str = "api/products";
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the product API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status other than 401.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// The API rejected the session token. Carries the message to show on
    /// the login page.
    #[error("{0}")]
    Unauthorized(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Transport(e.to_string()),
            ApiError::Url(e) => Self::Transport(e.to_string()),
            ApiError::Api { status, .. } => Self::Status(status.as_u16()),
            ApiError::Unauthorized(_) => Self::Status(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Decode(message) => Self::Malformed(message),
        }
    }
}

/// Credentials for one call: which session is calling, and its token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session: SessionKey,
    pub token: SecretString,
}

/// Error body shape used by the product API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn error_body(response: Response) -> ErrorBody {
    response.json().await.unwrap_or_default()
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Client for the product API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    observer: Arc<dyn AuthObserver>,
}

impl ApiClient {
    /// Create a client that reports rejected tokens to `observer`.
    #[must_use]
    pub fn new(base_url: Url, observer: Arc<dyn AuthObserver>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                observer,
            }),
        }
    }

    fn endpoint(&self, id: Option<&str>) -> Result<Url, ApiError> {
        let path = match id {
            Some(id) => format!("{PRODUCTS_PATH}/{}", urlencoding::encode(id)),
            None => PRODUCTS_PATH.to_string(),
        };
        Ok(self.inner.base_url.join(&path)?)
    }

    /// Send an authenticated request and sort out failure statuses.
    async fn send(&self, auth: &AuthContext, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(auth.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let reason = non_blank(error_body(response).await.message)
                .unwrap_or_else(|| SESSION_EXPIRED.to_string());
            self.inner.observer.on_unauthorized(&auth.session, &reason);
            return Err(ApiError::Unauthorized(reason));
        }

        if !status.is_success() {
            let body = error_body(response).await;
            let message = non_blank(body.message)
                .or_else(|| non_blank(body.error))
                .unwrap_or_else(|| "Something went wrong".to_string());
            return Err(ApiError::Api { status, message });
        }

        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn decode_one(response: Response) -> Result<Product, ApiError> {
        decode_product(Self::decode(response).await?)
            .ok_or_else(|| ApiError::Decode("response is not a product".to_string()))
    }

    /// Fetch the raw product list body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a failure status, or a body
    /// that is not JSON.
    #[instrument(skip_all)]
    pub async fn list_raw(&self, auth: &AuthContext) -> Result<Value, ApiError> {
        let request = self.inner.client.get(self.endpoint(None)?);
        let response = self.send(auth, request).await?;
        Self::decode(response).await
    }

    /// List remote products. Entries that are not valid products are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a failure status, or a body
    /// that is not a JSON array.
    #[instrument(skip_all)]
    pub async fn list_products(&self, auth: &AuthContext) -> Result<Vec<Product>, ApiError> {
        let Value::Array(items) = self.list_raw(auth).await? else {
            return Err(ApiError::Decode(
                "expected a JSON array of products".to_string(),
            ));
        };

        let (products, skipped) = decode_products(items);
        if skipped > 0 {
            warn!(skipped, "Ignored remote entries that are not valid products");
        }
        debug!(count = products.len(), "Listed remote products");
        Ok(products)
    }

    /// Fetch one product. Returns `Ok(None)` when the API answers 404.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, any other failure status, or a
    /// body that does not decode as a product.
    #[instrument(skip(self, auth))]
    pub async fn get_product(
        &self,
        auth: &AuthContext,
        id: &str,
    ) -> Result<Option<Product>, ApiError> {
        let request = self.inner.client.get(self.endpoint(Some(id))?);
        match self.send(auth, request).await {
            Ok(response) => Ok(Some(Self::decode_one(response).await?)),
            Err(ApiError::Api { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create a product. The API assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a failure status, or a body
    /// that does not decode as a product.
    #[instrument(skip_all)]
    pub async fn create_product(
        &self,
        auth: &AuthContext,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        let request = self.inner.client.post(self.endpoint(None)?).json(draft);
        let response = self.send(auth, request).await?;
        Self::decode_one(response).await
    }

    /// Replace a product's details.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a failure status, or a body
    /// that does not decode as a product.
    #[instrument(skip(self, auth, draft))]
    pub async fn update_product(
        &self,
        auth: &AuthContext,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        let request = self.inner.client.put(self.endpoint(Some(id))?).json(draft);
        let response = self.send(auth, request).await?;
        Self::decode_one(response).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a failure status.
    #[instrument(skip(self, auth))]
    pub async fn delete_product(&self, auth: &AuthContext, id: &str) -> Result<(), ApiError> {
        let request = self.inner.client.delete(self.endpoint(Some(id))?);
        self.send(auth, request).await?;
        Ok(())
    }

    /// The product list as a catalog source for one session.
    #[must_use]
    pub const fn catalog_source<'a>(&'a self, auth: &'a AuthContext) -> SessionCatalog<'a> {
        SessionCatalog { client: self, auth }
    }
}

/// The product list, fetched with one session's token.
pub struct SessionCatalog<'a> {
    client: &'a ApiClient,
    auth: &'a AuthContext,
}

impl CatalogSource for SessionCatalog<'_> {
    async fn fetch_products(&self) -> Result<Value, SourceError> {
        self.client
            .list_raw(self.auth)
            .await
            .map_err(SourceError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::get};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl AuthObserver for Recorder {
        fn on_unauthorized(&self, _session: &SessionKey, reason: &str) {
            self.0.lock().unwrap().push(reason.to_string());
        }
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn auth() -> AuthContext {
        AuthContext {
            session: SessionKey::new("session-1"),
            token: SecretString::from("a.b.c"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_notifies_observer_with_server_message() {
        let url = serve(Router::new().route(
            "/api/products",
            get(|| async {
                (
                    AxumStatus::UNAUTHORIZED,
                    Json(json!({ "message": "Token has been revoked" })),
                )
            }),
        ))
        .await;
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(url, recorder.clone());

        let err = client.list_products(&auth()).await.unwrap_err();

        assert!(matches!(&err, ApiError::Unauthorized(m) if m == "Token has been revoked"));
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["Token has been revoked".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_without_message_uses_expiry_reason() {
        let url = serve(Router::new().route(
            "/api/products/{id}",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        ))
        .await;
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(url, recorder.clone());

        let err = client.get_product(&auth(), "7").await.unwrap_err();

        assert!(matches!(&err, ApiError::Unauthorized(m) if m == SESSION_EXPIRED));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_failures_carry_message_or_error() {
        let url = serve(
            Router::new()
                .route(
                    "/api/products",
                    get(|| async {
                        (
                            AxumStatus::UNPROCESSABLE_ENTITY,
                            Json(json!({ "error": "name is required" })),
                        )
                    }),
                )
                .route(
                    "/api/products/{id}",
                    get(|| async { AxumStatus::NOT_FOUND }),
                ),
        )
        .await;
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(url, recorder.clone());

        let err = client.list_products(&auth()).await.unwrap_err();
        assert!(matches!(
            &err,
            ApiError::Api { status, message }
                if *status == StatusCode::UNPROCESSABLE_ENTITY && message == "name is required"
        ));

        assert!(client.get_product(&auth(), "missing").await.unwrap().is_none());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_invalid_entries_and_sends_token() {
        let url = serve(Router::new().route(
            "/api/products",
            get(|headers: axum::http::HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .is_some_and(|v| v == "Bearer a.b.c");
                if !authorized {
                    return (AxumStatus::UNAUTHORIZED, Json(json!({})));
                }
                (
                    AxumStatus::OK,
                    Json(json!([
                        { "id": "9", "name": { "en": "Kemenyan" } },
                        { "name": { "en": "no id" } },
                        "garbage"
                    ])),
                )
            }),
        ))
        .await;
        let client = ApiClient::new(url, Arc::new(Recorder::default()));

        let products = client.list_products(&auth()).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "9");
    }

    #[test]
    fn test_error_maps_to_source_error() {
        let err: SourceError = ApiError::Unauthorized("gone".to_string()).into();
        assert_eq!(err, SourceError::Status(401));
        let err: SourceError = ApiError::Decode("bad".to_string()).into();
        assert_eq!(err, SourceError::Malformed("bad".to_string()));
    }
}
