//! Page chrome shared by every storefront template.

use bakalah_core::{Language, PriceOption, Product};
use rust_decimal::Decimal;

use crate::i18n::{Translation, contact, translations};

/// One entry in the language menu.
#[derive(Clone)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub active: bool,
}

/// Language, direction and translated strings for a page.
#[derive(Clone)]
pub struct Layout {
    pub lang: &'static str,
    pub dir: &'static str,
    pub t: &'static Translation,
    pub languages: Vec<LanguageOption>,
    pub email: &'static str,
    pub phone: &'static str,
    pub phone_href: &'static str,
    pub address_lines: [&'static str; 3],
}

impl Layout {
    #[must_use]
    pub fn new(lang: Language) -> Self {
        Self {
            lang: lang.code(),
            dir: lang.dir(),
            t: translations(lang),
            languages: Language::ALL
                .into_iter()
                .map(|l| LanguageOption {
                    code: l.code(),
                    name: l.native_name(),
                    flag: l.flag(),
                    active: l == lang,
                })
                .collect(),
            email: contact::EMAIL,
            phone: contact::PHONE,
            phone_href: contact::PHONE_HREF,
            address_lines: contact::ADDRESS_LINES,
        }
    }
}

/// Format an amount in a currency, e.g. `USD 150` or `USD 80.5`.
#[must_use]
pub fn format_price(amount: Decimal, currency: &str) -> String {
    format!("{currency} {}", amount.round_dp(2).normalize())
}

/// Link to a product's detail page.
#[must_use]
pub fn product_href(product: &Product) -> String {
    format!("/products/{}", urlencoding::encode(product.id.as_str()))
}

/// One row of a product's price table.
#[derive(Clone)]
pub struct PriceLine {
    pub size: String,
    pub unit: String,
    pub amount: String,
}

impl PriceLine {
    #[must_use]
    pub fn new(option: &PriceOption, currency: &str) -> Self {
        Self {
            size: option.size.clone(),
            unit: option.unit.clone(),
            amount: format_price(option.price, currency),
        }
    }
}
