//! Catalog reconciliation.
//!
//! The public catalog is the bundled static product list followed by any
//! remote products whose identifier is not already taken. The static list
//! ships with the binaries, so a catalog is always available with zero
//! network dependency; the remote list only ever adds to it.
//!
//! # Example
//!
//! ```rust,ignore
//! let provisional = Catalog::provisional(static_products());
//! render(&provisional);
//!
//! let Reconciled { catalog, using_fallback, .. } =
//!     reconcile(static_products(), &client).await;
//! render(&catalog);
//! ```

mod bundled;

use std::collections::HashSet;
use std::future::Future;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{PriceOption, Product, ProductDetails, ProductId};

pub use bundled::static_products;

/// Failure to obtain the remote product list.
///
/// Never escapes [`reconcile`]; it is reported alongside the fallback
/// catalog so callers can log it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The request could not be completed (DNS, refused, timeout, offline).
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The body was not JSON, or not a JSON array.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Something that can fetch the remote product list.
///
/// Implementations return the raw JSON body of `GET /api/products` so that
/// shape validation happens in one place, inside [`reconcile`].
pub trait CatalogSource: Send + Sync {
    /// Fetch the remote product list.
    fn fetch_products(&self) -> impl Future<Output = Result<Value, SourceError>> + Send;
}

/// An ordered, de-duplicated product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The catalog shown before (or instead of) any remote data: the static
    /// list, unchanged.
    #[must_use]
    pub fn provisional(static_list: &[Product]) -> Self {
        Self {
            products: static_list.to_vec(),
        }
    }

    /// Products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// Consume the catalog, returning its products.
    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The catalog to display.
    pub catalog: Catalog,
    /// True when the remote fetch failed and only static products are shown.
    pub using_fallback: bool,
    /// Remote entries dropped because they had no usable identifier.
    pub skipped: usize,
    /// Why the remote list was not used, when `using_fallback` is set.
    pub error: Option<SourceError>,
}

impl Reconciled {
    fn fallback(static_list: &[Product], error: SourceError) -> Self {
        Self {
            catalog: Catalog::provisional(static_list),
            using_fallback: true,
            skipped: 0,
            error: Some(error),
        }
    }
}

/// Merge remote products after the static list.
///
/// Static products always come first, in their given order. Each remote
/// product is appended only if its identifier has not been seen yet, so a
/// static entry wins every collision and remote duplicates keep their first
/// occurrence.
#[must_use]
pub fn merge(static_list: &[Product], remote: impl IntoIterator<Item = Product>) -> Catalog {
    let mut seen: HashSet<ProductId> = static_list.iter().map(|p| p.id.clone()).collect();
    let mut products = static_list.to_vec();

    for product in remote {
        if seen.insert(product.id.clone()) {
            products.push(product);
        }
    }

    Catalog { products }
}

/// Decode one remote entry as leniently as the storefront can display it.
///
/// Only a non-blank string `id` is required. Price entries that are not
/// complete price options are dropped, and any other field whose value has
/// the wrong shape falls back to its default, so an incomplete listing is
/// still listed.
#[must_use]
pub fn decode_product(item: Value) -> Option<Product> {
    let Value::Object(mut fields) = item else {
        return None;
    };
    match fields.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        _ => return None,
    }

    if let Some(Value::Array(prices)) = fields.get_mut("prices") {
        prices.retain(|entry| PriceOption::deserialize(entry).is_ok());
    }
    fields.retain(|key, value| {
        if key == "id" {
            return true;
        }
        let single: Map<String, Value> = [(key.clone(), value.clone())].into_iter().collect();
        ProductDetails::deserialize(Value::Object(single)).is_ok()
    });

    serde_json::from_value(Value::Object(fields)).ok()
}

/// Decode the elements of a remote payload one by one.
///
/// Elements without a usable identifier are counted and dropped rather than
/// failing the whole list. Returns the products and the number of dropped
/// elements.
#[must_use]
pub fn decode_products(items: Vec<Value>) -> (Vec<Product>, usize) {
    let mut skipped = 0;
    let products = items
        .into_iter()
        .filter_map(|item| {
            let product = decode_product(item);
            if product.is_none() {
                skipped += 1;
            }
            product
        })
        .collect();
    (products, skipped)
}

/// Build the catalog from the static list and one remote fetch.
///
/// - Remote fetch succeeds with a JSON array: static list plus non-colliding
///   remote products, `using_fallback = false`. An empty array is valid and
///   contributes nothing.
/// - Any failure (transport, non-success status, non-array payload): the
///   static list unchanged, `using_fallback = true`.
///
/// Never fails and never returns fewer products than the static list.
pub async fn reconcile<S: CatalogSource>(static_list: &[Product], source: &S) -> Reconciled {
    let payload = match source.fetch_products().await {
        Ok(payload) => payload,
        Err(error) => return Reconciled::fallback(static_list, error),
    };

    let Value::Array(items) = payload else {
        return Reconciled::fallback(
            static_list,
            SourceError::Malformed("expected a JSON array of products".to_string()),
        );
    };

    let (remote, skipped) = decode_products(items);

    Reconciled {
        catalog: merge(static_list, remote),
        using_fallback: false,
        skipped,
        error: None,
    }
}

/// Find a product in the static list by identifier.
///
/// Static products are authoritative; callers fall back to the remote API
/// only when this returns `None`.
#[must_use]
pub fn find_static<'a>(static_list: &'a [Product], id: &str) -> Option<&'a Product> {
    static_list.iter().find(|p| p.id.as_str() == id)
}
