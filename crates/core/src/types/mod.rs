//! Core types for the Bakalah Gaharu catalog.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod id;
pub mod language;
pub mod product;

pub use id::ProductId;
pub use language::{Language, LanguageError};
pub use product::{LocalizedText, PriceOption, Product, ProductDetails, ProductDraft};
