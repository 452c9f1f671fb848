//! Product management route handlers.
//!
//! Every write goes to the product API with the admin's token. The static
//! products bundled with the storefront are not editable here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bakalah_core::{LocalizedText, PriceOption, Product, ProductDraft};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::layout::Layout;
use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const PRODUCTS_PATH: &str = "/admin/products";

// =============================================================================
// Form handling
// =============================================================================

/// A product form that cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("All language names are required.")]
    MissingNames,

    #[error("All price fields must be filled out correctly.")]
    InvalidPrice,

    #[error("Product image is required for new products.")]
    MissingImage,

    #[error("Please fill in all required fields")]
    MissingRequired,
}

/// The product form as submitted.
///
/// Prices are entered one per line as `amount | size | unit`, colors as a
/// comma-separated list and gallery images one URL per line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name_en: String,
    pub name_id: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_id: String,
    pub description_ar: String,
    pub badge_en: String,
    pub badge_id: String,
    pub badge_ar: String,
    pub grade: String,
    pub colors: String,
    pub currency: String,
    pub image: String,
    pub images: String,
    pub prices: String,
}

fn trimmed_text(en: &str, id: &str, ar: &str) -> LocalizedText {
    LocalizedText::new(en.trim(), id.trim(), ar.trim())
}

fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

fn parse_price_line(line: &str) -> Option<PriceOption> {
    let mut fields = line.split('|').map(str::trim);
    let (amount, size, unit) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() || size.is_empty() || unit.is_empty() {
        return None;
    }
    let amount: Decimal = amount.parse().ok()?;
    (amount > Decimal::ZERO).then(|| PriceOption::new(amount, size, unit))
}

impl ProductForm {
    /// Prefill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let details = &product.details;
        let badge = details.badge.clone().unwrap_or_default();
        Self {
            name_en: details.name.en.clone(),
            name_id: details.name.id.clone(),
            name_ar: details.name.ar.clone(),
            description_en: details.description.en.clone(),
            description_id: details.description.id.clone(),
            description_ar: details.description.ar.clone(),
            badge_en: badge.en,
            badge_id: badge.id,
            badge_ar: badge.ar,
            grade: details.grade.clone(),
            colors: details.colors.join(", "),
            currency: details.currency.clone(),
            image: details.image.clone(),
            images: details.images.join("\n"),
            prices: details
                .price_options()
                .iter()
                .map(|p| format!("{} | {} | {}", format_amount(p.price), p.size, p.unit))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Validate the form and build the payload for the product API.
    ///
    /// `is_new` additionally requires a primary image.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found, checking names, then prices,
    /// then the image, then the remaining required fields.
    pub fn to_draft(&self, is_new: bool) -> std::result::Result<ProductDraft, FormError> {
        let name = trimmed_text(&self.name_en, &self.name_id, &self.name_ar);
        if name.en.is_empty() || name.id.is_empty() || name.ar.is_empty() {
            return Err(FormError::MissingNames);
        }

        let prices = self
            .prices
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| parse_price_line(line).ok_or(FormError::InvalidPrice))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let image = self.image.trim();
        if is_new && image.is_empty() {
            return Err(FormError::MissingImage);
        }

        let grade = self.grade.trim();
        if grade.is_empty() || prices.is_empty() {
            return Err(FormError::MissingRequired);
        }

        let badge = trimmed_text(&self.badge_en, &self.badge_id, &self.badge_ar);
        let currency = self.currency.trim();

        Ok(ProductDraft {
            name,
            grade: grade.to_string(),
            colors: self
                .colors
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
            prices,
            currency: if currency.is_empty() {
                ProductDraft::default().currency
            } else {
                currency.to_uppercase()
            },
            description: trimmed_text(
                &self.description_en,
                &self.description_id,
                &self.description_ar,
            ),
            image: image.to_string(),
            images: self
                .images
                .lines()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from)
                .collect(),
            badge: (!badge.is_empty()).then_some(badge),
            ..ProductDraft::default()
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product row for the listing table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub prices: String,
    pub image: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let details = &product.details;
        let options = details.price_options();
        let prices = if options.is_empty() {
            "-".to_string()
        } else {
            options
                .iter()
                .map(|p| {
                    format!(
                        "{} {} / {}{}",
                        details.currency,
                        format_amount(p.price),
                        p.size,
                        p.unit
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            id: product.id.to_string(),
            name: if details.name.en.trim().is_empty() {
                format!("Untitled ({})", product.id)
            } else {
                details.name.en.clone()
            },
            grade: details.grade.clone(),
            prices,
            image: details.gallery().first().copied().unwrap_or_default().to_string(),
        }
    }
}

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRow>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    /// `None` when creating.
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub error_message: Option<String>,
}

impl ProductFormTemplate {
    fn new(
        state: &AppState,
        product_id: Option<String>,
        form: ProductForm,
        error_message: Option<String>,
    ) -> Self {
        let path = product_id
            .as_ref()
            .map_or_else(|| format!("{PRODUCTS_PATH}/new"), |id| format!("{PRODUCTS_PATH}/{id}/edit"));
        Self {
            layout: Layout::admin(state, path),
            product_id,
            form,
            error_message,
        }
    }

    /// Form submission target.
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .as_ref()
            .map_or_else(|| PRODUCTS_PATH.to_string(), |id| format!("{PRODUCTS_PATH}/{id}"))
    }

    /// Whether the form edits an existing product.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.product_id.is_some()
    }
}

/// Flash parameters carried on the redirect after a write.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub created: Option<String>,
    pub updated: Option<String>,
    pub deleted: Option<String>,
}

impl NoticeQuery {
    fn message(&self) -> Option<String> {
        if self.created.is_some() {
            Some("Product created.".to_string())
        } else if self.updated.is_some() {
            Some("Product updated.".to_string())
        } else if self.deleted.is_some() {
            Some("Product deleted.".to_string())
        } else {
            None
        }
    }
}

/// Message for a failed save that did not end the session.
fn save_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Api { message, .. } => message.clone(),
        _ => "Failed to save product".to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product list from the product API.
///
/// API failures other than an expired session show an error banner over an
/// empty table.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Query(query): Query<NoticeQuery>,
) -> Result<ProductsIndexTemplate> {
    let (products, error_message) = match state.api().list_products(&auth).await {
        Ok(products) => (products.iter().map(ProductRow::from).collect(), None),
        Err(e @ ApiError::Unauthorized(_)) => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Failed to load products");
            (
                Vec::new(),
                Some("Failed to load products. Please try again.".to_string()),
            )
        }
    };

    Ok(ProductsIndexTemplate {
        layout: Layout::admin(&state, PRODUCTS_PATH),
        products,
        success_message: query.message(),
        error_message,
    })
}

/// Display an empty product form.
pub async fn new_product(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
) -> ProductFormTemplate {
    ProductFormTemplate::new(
        &state,
        None,
        ProductForm {
            currency: ProductDraft::default().currency,
            ..ProductForm::default()
        },
        None,
    )
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let draft = match form.to_draft(true) {
        Ok(draft) => draft,
        Err(e) => {
            return Ok(ProductFormTemplate::new(&state, None, form, Some(e.to_string())).into_response());
        }
    };

    match state.api().create_product(&auth, &draft).await {
        Ok(product) => {
            info!(product_id = %product.id, "Product created");
            Ok(Redirect::to(&format!("{PRODUCTS_PATH}?created=1")).into_response())
        }
        Err(e @ ApiError::Unauthorized(_)) => Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Failed to create product");
            let message = save_error_message(&e);
            Ok(ProductFormTemplate::new(&state, None, form, Some(message)).into_response())
        }
    }
}

/// Display the edit form for a product.
#[instrument(skip(state, auth))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate> {
    let product = state
        .api()
        .get_product(&auth, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductFormTemplate::new(
        &state,
        Some(id),
        ProductForm::from_product(&product),
        None,
    ))
}

/// Replace a product's details.
#[instrument(skip(state, auth, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let draft = match form.to_draft(false) {
        Ok(draft) => draft,
        Err(e) => {
            return Ok(
                ProductFormTemplate::new(&state, Some(id), form, Some(e.to_string()))
                    .into_response(),
            );
        }
    };

    match state.api().update_product(&auth, &id, &draft).await {
        Ok(_) => {
            info!(product_id = %id, "Product updated");
            Ok(Redirect::to(&format!("{PRODUCTS_PATH}?updated=1")).into_response())
        }
        Err(e @ ApiError::Unauthorized(_)) => Err(e.into()),
        Err(e) => {
            warn!(error = %e, product_id = %id, "Failed to update product");
            let message = save_error_message(&e);
            Ok(ProductFormTemplate::new(&state, Some(id), form, Some(message)).into_response())
        }
    }
}

/// Delete a product.
#[instrument(skip(state, auth))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    state.api().delete_product(&auth, &id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(Redirect::to(&format!("{PRODUCTS_PATH}?deleted=1")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            name_en: "Merauke Oud".to_string(),
            name_id: "Gaharu Merauke".to_string(),
            name_ar: "عود ميراوكي".to_string(),
            grade: "Super".to_string(),
            colors: "Black, Dark Brown, ".to_string(),
            currency: "usd".to_string(),
            image: "/images/products/merauke.jpg".to_string(),
            images: "/a.jpg\n\n /b.jpg ".to_string(),
            prices: "150 | 100 | g\n1200.50 | 1 | kg\n".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_valid_form_builds_draft() {
        let draft = valid_form().to_draft(true).unwrap();
        assert_eq!(draft.name.id, "Gaharu Merauke");
        assert_eq!(draft.colors, vec!["Black", "Dark Brown"]);
        assert_eq!(draft.currency, "USD");
        assert_eq!(draft.images, vec!["/a.jpg", "/b.jpg"]);
        assert_eq!(draft.prices.len(), 2);
        assert_eq!(draft.prices[1].price, Decimal::new(120_050, 2));
        assert_eq!(draft.prices[1].unit, "kg");
        assert!(draft.badge.is_none());
    }

    #[test]
    fn test_every_name_is_required() {
        let form = ProductForm {
            name_ar: "  ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.to_draft(false), Err(FormError::MissingNames));
    }

    #[test]
    fn test_price_lines_must_be_complete_and_positive() {
        for prices in ["0 | 1 | kg", "abc | 1 | kg", "10 | | kg", "10 | 1", "10 | 1 | kg | x"] {
            let form = ProductForm {
                prices: prices.to_string(),
                ..valid_form()
            };
            assert_eq!(form.to_draft(false), Err(FormError::InvalidPrice), "{prices}");
        }
    }

    #[test]
    fn test_image_required_only_for_new_products() {
        let form = ProductForm {
            image: String::new(),
            ..valid_form()
        };
        assert_eq!(form.to_draft(true), Err(FormError::MissingImage));
        assert!(form.to_draft(false).is_ok());
    }

    #[test]
    fn test_grade_and_a_price_are_required() {
        let form = ProductForm {
            grade: " ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.to_draft(false), Err(FormError::MissingRequired));

        let form = ProductForm {
            prices: "\n  \n".to_string(),
            ..valid_form()
        };
        assert_eq!(form.to_draft(false), Err(FormError::MissingRequired));
    }

    #[test]
    fn test_blank_currency_defaults_to_usd() {
        let form = ProductForm {
            currency: String::new(),
            ..valid_form()
        };
        assert_eq!(form.to_draft(false).unwrap().currency, "USD");
    }

    #[test]
    fn test_form_prefill_keeps_legacy_price() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "7",
            "name": { "en": "Chips", "id": "Serpihan", "ar": "رقائق" },
            "grade": "A",
            "price": 85.5,
            "unit": "kg",
            "badge": { "en": "New", "id": "Baru", "ar": "جديد" }
        }))
        .unwrap();

        let form = ProductForm::from_product(&product);
        assert_eq!(form.prices, "85.5 | 1 | kg");
        assert_eq!(form.badge_id, "Baru");

        let draft = form.to_draft(false).unwrap();
        assert_eq!(draft.prices, vec![PriceOption::new(Decimal::new(855, 1), "1", "kg")]);
        assert_eq!(draft.badge.unwrap().en, "New");
    }

    #[test]
    fn test_row_summarises_prices() {
        let product = Product::new("1", valid_form().to_draft(true).unwrap());
        let row = ProductRow::from(&product);
        assert_eq!(row.prices, "USD 150 / 100g, USD 1200.5 / 1kg");
        assert_eq!(row.image, "/a.jpg");
    }

    #[test]
    fn test_row_for_bare_record() {
        let product = bakalah_core::decode_product(serde_json::json!({ "id": "3" })).unwrap();
        let row = ProductRow::from(&product);
        assert_eq!(row.name, "Untitled (3)");
        assert_eq!(row.prices, "-");

        let form = ProductForm::from_product(&product);
        assert!(form.name_en.is_empty());
        assert_eq!(form.to_draft(false), Err(FormError::MissingNames));
    }
}
