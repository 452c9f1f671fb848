//! Login and logout against the product API.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use url::Url;

use super::{ApiError, REQUEST_TIMEOUT};
use crate::session::{AuthBackend, LoginError};

const LOGIN_PATH: &str = "api/auth/login";
const LOGOUT_PATH: &str = "api/auth/logout";

/// Request body for login.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response from a successful login.
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Error response from the login endpoint.
#[derive(Default, Deserialize)]
struct LoginErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Client for `/api/auth/*`.
#[derive(Clone)]
pub struct AuthApi {
    inner: Arc<AuthApiInner>,
}

struct AuthApiInner {
    client: reqwest::Client,
    base_url: Url,
}

impl AuthApi {
    /// Create a client for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(AuthApiInner { client, base_url }),
        }
    }
}

impl AuthBackend for AuthApi {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &SecretString) -> Result<String, LoginError> {
        let url = self
            .inner
            .base_url
            .join(LOGIN_PATH)
            .map_err(|_| LoginError::Unreachable)?;

        let response = self
            .inner
            .client
            .post(url)
            .json(&LoginRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "Login request failed");
                LoginError::Unreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: LoginErrorResponse = response.json().await.unwrap_or_default();
            let message = body
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Login failed".to_string());
            if status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN {
                warn!(%status, "Login endpoint returned an unexpected status");
            }
            return Err(LoginError::Rejected(message));
        }

        let body: LoginResponse = response.json().await.map_err(|error| {
            warn!(error = %error, "Login response had no token");
            LoginError::Rejected("Login failed".to_string())
        })?;
        Ok(body.token)
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        let url = self.inner.base_url.join(LOGOUT_PATH)?;
        // The response is ignored; only transport failures are reported.
        self.inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Ok(())
    }
}
