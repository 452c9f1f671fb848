//! Bakalah Core - Shared types library.
//!
//! This crate provides the types and logic shared by the Bakalah Gaharu
//! binaries:
//! - `storefront` - Public multilingual marketing site and catalog
//! - `admin` - Product management panel backed by the remote product API
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no HTTP
//! clients, no servers. Network access is abstracted behind
//! [`catalog::CatalogSource`] so each binary brings its own client.
//!
//! # Modules
//!
//! - [`types`] - Products, prices, localized text and languages
//! - [`catalog`] - Bundled static catalog and the static/remote reconciler

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::{
    Catalog, CatalogSource, Reconciled, SourceError, decode_product, decode_products, find_static,
    merge, reconcile, static_products,
};
pub use types::*;
