//! Bakalah Gaharu admin library.
//!
//! The product management panel. Admins log in with a username and password
//! checked by the remote product API; the bearer token it returns is kept in
//! the server-side session and guarded by [`session::SessionGuard`], which
//! tears the session down as soon as the token expires or the API rejects
//! it.
//!
//! This crate provides the admin panel as a library so that it can be tested
//! and embedded; `main.rs` only wires configuration, logging and the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::app;
pub use state::AppState;
