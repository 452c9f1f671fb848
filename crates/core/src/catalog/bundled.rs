//! Products bundled with the binaries.
//!
//! The static catalog is compiled in from `data/products.json` so the site
//! always has something to show, whatever the state of the remote API.

use std::sync::LazyLock;

use crate::types::Product;

const BUNDLED_JSON: &str = include_str!("../../data/products.json");

static STATIC_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    serde_json::from_str(BUNDLED_JSON).expect("bundled data/products.json must be a product array")
});

/// The statically bundled products, in their fixed display order.
#[must_use]
pub fn static_products() -> &'static [Product] {
    &STATIC_PRODUCTS
}
