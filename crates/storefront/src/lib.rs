//! Bakalah Gaharu storefront library.
//!
//! The public, multilingual site: company information and the product
//! catalog. The catalog is the bundled static list merged with the remote
//! product API, refreshed in the background.
//!
//! This crate provides the storefront as a library so that it can be tested
//! and embedded; `main.rs` only wires configuration, logging and the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod product_api;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
