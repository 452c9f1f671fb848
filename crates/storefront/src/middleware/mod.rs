//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, in-memory store, language choice only)
//! 5. Security headers (CSP, framing, referrer)

pub mod language;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use language::{CurrentLanguage, set_language};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
