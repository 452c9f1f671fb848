//! Product listings as exchanged with the remote product API.
//!
//! The wire format is camel-case JSON. Records written by older versions of
//! the API carry a single `price` + `unit` pair instead of a `prices` list;
//! those still decode and surface through [`ProductDetails::price_options`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::language::Language;

const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Text published in every supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ar: String,
}

impl LocalizedText {
    /// Create a text from its three translations.
    #[must_use]
    pub fn new(en: impl Into<String>, id: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            id: id.into(),
            ar: ar.into(),
        }
    }

    /// Get the text for a language, falling back to English when that
    /// translation is missing.
    #[must_use]
    pub fn get(&self, lang: Language) -> &str {
        let text = match lang {
            Language::En => &self.en,
            Language::Id => &self.id,
            Language::Ar => &self.ar,
        };
        if text.trim().is_empty() { &self.en } else { text }
    }

    /// True when no translation has any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.id.trim().is_empty() && self.ar.trim().is_empty()
    }
}

/// One purchasable size of a product. Amount, size and unit always travel
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOption {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub size: String,
    pub unit: String,
}

impl PriceOption {
    /// Create a price option.
    #[must_use]
    pub fn new(price: Decimal, size: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            price,
            size: size.into(),
            unit: unit.into(),
        }
    }
}

/// Everything about a product except its identifier.
///
/// This is the payload the admin panel sends when creating or updating a
/// listing; the remote API assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub prices: Vec<PriceOption>,
    /// Legacy single price.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    /// Legacy unit for the single price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<LocalizedText>,
}

impl ProductDetails {
    /// Price options, including a legacy single price as one option of size
    /// `"1"`.
    #[must_use]
    pub fn price_options(&self) -> Vec<PriceOption> {
        if !self.prices.is_empty() {
            return self.prices.clone();
        }
        match (self.price, &self.unit) {
            (Some(price), Some(unit)) => vec![PriceOption::new(price, "1", unit.clone())],
            _ => Vec::new(),
        }
    }

    /// A product without any price entry is incomplete. It is still listed;
    /// views show an inquiry note instead of a price.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.price_options().is_empty()
    }

    /// Images to show in a gallery: the image list when present, otherwise
    /// the primary image alone.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        let images: Vec<&str> = self
            .images
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !images.is_empty() {
            return images;
        }
        if self.image.trim().is_empty() {
            Vec::new()
        } else {
            vec![self.image.as_str()]
        }
    }

    /// Badge text for a language, if the product has a non-empty badge.
    #[must_use]
    pub fn badge(&self, lang: Language) -> Option<&str> {
        self.badge
            .as_ref()
            .filter(|b| !b.is_empty())
            .map(|b| b.get(lang))
    }
}

/// A product listing before the remote API has assigned it an identifier.
pub type ProductDraft = ProductDetails;

impl Default for ProductDetails {
    fn default() -> Self {
        Self {
            name: LocalizedText::default(),
            grade: String::new(),
            colors: Vec::new(),
            prices: Vec::new(),
            price: None,
            unit: None,
            currency: default_currency(),
            description: LocalizedText::default(),
            image: String::new(),
            images: Vec::new(),
            badge: None,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductDetails,
}

impl Product {
    /// Create a product from an identifier and its details.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, details: ProductDetails) -> Self {
        Self {
            id: id.into(),
            details,
        }
    }

    /// Localized name.
    #[must_use]
    pub fn name(&self, lang: Language) -> &str {
        self.details.name.get(lang)
    }

    /// Localized description.
    #[must_use]
    pub fn description(&self, lang: Language) -> &str {
        self.details.description.get(lang)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": "9",
            "name": { "en": "Kalimantan Chips", "id": "Serpihan Kalimantan", "ar": "" },
            "grade": "A",
            "colors": ["Black", "Brown"],
            "prices": [{ "price": 150, "size": "500", "unit": "g" }],
            "currency": "USD",
            "description": { "en": "Dense chips", "id": "Serpihan padat", "ar": "" },
            "image": "/images/products/chips.jpg"
        })
    }

    #[test]
    fn test_decode_remote_product() {
        let product: Product = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(product.id, ProductId::new("9"));
        assert_eq!(product.name(Language::Id), "Serpihan Kalimantan");
        assert_eq!(product.details.prices[0].price, Decimal::from(150));
        assert!(product.details.is_complete());
        assert!(product.details.badge(Language::En).is_none());
    }

    #[test]
    fn test_missing_translation_falls_back_to_english() {
        let product: Product = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(product.name(Language::Ar), "Kalimantan Chips");
        assert_eq!(product.description(Language::Ar), "Dense chips");
    }

    #[test]
    fn test_legacy_single_price() {
        let product: Product = serde_json::from_value(json!({
            "id": "old",
            "name": { "en": "Old listing" },
            "price": 80.5,
            "unit": "kg",
            "image": "/a.jpg"
        }))
        .unwrap();

        let options = product.details.price_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0], PriceOption::new(Decimal::new(805, 1), "1", "kg"));
        assert_eq!(product.details.currency, "USD");
    }

    #[test]
    fn test_product_without_prices_is_incomplete() {
        let product: Product = serde_json::from_value(json!({
            "id": "x",
            "name": { "en": "Ask us" }
        }))
        .unwrap();
        assert!(!product.details.is_complete());
        assert!(product.details.gallery().is_empty());
    }

    #[test]
    fn test_gallery_prefers_image_list() {
        let mut details = ProductDetails {
            image: "/main.jpg".to_string(),
            ..ProductDetails::default()
        };
        assert_eq!(details.gallery(), vec!["/main.jpg"]);

        details.images = vec!["/a.jpg".to_string(), "/b.jpg".to_string()];
        assert_eq!(details.gallery(), vec!["/a.jpg", "/b.jpg"]);
    }

    #[test]
    fn test_serialize_is_flat_camel_case() {
        let product: Product = serde_json::from_value(sample_json()).unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["id"], "9");
        assert_eq!(value["prices"][0]["price"], 150.0);
        assert!(value.get("details").is_none());
        assert!(value.get("price").is_none());
    }
}
