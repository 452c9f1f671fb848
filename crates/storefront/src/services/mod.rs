//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Current catalog snapshot and its background refresher

pub mod catalog;

pub use catalog::{CatalogRefresher, CatalogSnapshot, CatalogStore};
