// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Status a product starts with when the caller does not send one.
pub const DEFAULT_PRODUCT_STATUS: &str = "tidak";

/// Status value that marks a product as expired regardless of its date.
pub const EXPIRED_PRODUCT_STATUS: &str = "kadaluarsa";

/// Threshold used by the low-stock view when none is given.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Prices are stored as `NUMERIC(14, 2)`: at most 12 integer digits.
pub const PRICE_LIMIT: i64 = 1_000_000_000_000;

/// Decimal places a price may carry.
pub const PRICE_SCALE: u32 = 2;

// --- 1. Categories ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Minuman")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub id: Uuid,
    pub name: String,
    pub product_count: i64,
    pub total_stock: i64,
    pub avg_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

// --- 2. Products ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>, // orphans are tolerated on read
    pub qty: i32,
    pub supplier: String,
    pub price: Decimal,
    pub picture_url: Option<String>,
    pub status: String,
    pub exp_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == EXPIRED_PRODUCT_STATUS || self.exp_date.is_some_and(|d| d <= today)
    }
}

/// Product joined with the names the back office screens show.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub created_by_name: Option<String>,
    pub updated_by_name: Option<String>,
}

/// Pre- and post-image of an update, used for asset lifecycle decisions.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub previous: Product,
    pub current: Product,
}

// --- 3. Price history (append-only) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub changed_by: Option<Uuid>,
    pub changed_by_name: Option<String>,
    pub changed_at: DateTime<Utc>,
}

// ---
// Validated input shared by create and update
// ---
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub qty: i32,
    pub supplier: String,
    pub price: Decimal,
    pub picture_url: Option<String>,
    pub status: String,
    pub exp_date: Option<NaiveDate>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(
        required(message = "product.name_required"),
        length(min = 1, message = "product.name_required")
    )]
    #[schema(example = "Teh Botol")]
    pub name: Option<String>,

    pub category_id: Option<Uuid>,

    #[validate(required(message = "field.required"))]
    #[schema(example = 24)]
    pub qty: Option<i32>,

    #[validate(
        required(message = "product.supplier_required"),
        length(min = 1, message = "product.supplier_required")
    )]
    pub supplier: Option<String>,

    #[validate(required(message = "field.required"))]
    #[schema(value_type = Option<f64>, example = 5000)]
    pub price: Option<Decimal>,

    pub picture_url: Option<String>,
    pub status: Option<String>,
    pub exp_date: Option<NaiveDate>,
}

impl ProductPayload {
    /// Runs the derive rules, then the checks that need trimmed text and
    /// the storable price range, and yields the input.
    pub fn into_input(self) -> Result<ProductInput, ValidationErrors> {
        self.validate()?;

        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let supplier = self.supplier.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let mut errors = ValidationErrors::new();
        if name.is_none() {
            errors.add("name", field_error("length", "product.name_required"));
        }
        if supplier.is_none() {
            errors.add("supplier", field_error("length", "product.supplier_required"));
        }
        if self.qty.is_some_and(|q| q < 0) {
            errors.add("qty", not_negative());
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                errors.add("price", not_negative());
            } else if price >= Decimal::from(PRICE_LIMIT) {
                errors.add("price", field_error("range", "product.price_too_large"));
            } else if price.normalize().scale() > PRICE_SCALE {
                errors.add("price", field_error("scale", "product.price_scale"));
            }
        }

        let (Some(name), Some(qty), Some(supplier), Some(price)) = (name, self.qty, supplier, self.price)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductInput {
            name,
            category_id: self.category_id,
            qty,
            supplier,
            price,
            picture_url: self.picture_url.filter(|p| !p.trim().is_empty()),
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRODUCT_STATUS.to_string()),
            exp_date: self.exp_date,
        })
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn not_negative() -> ValidationError {
    let mut err = ValidationError::new("range");
    err.add_param("min".into(), &0);
    err.message = Some("field.not_negative".into());
    err
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(
        required(message = "category.name_required"),
        length(min = 1, message = "category.name_required")
    )]
    #[serde(alias = "categoryName", alias = "category_name")]
    #[schema(example = "Makanan Ringan")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub file_name: String,
    #[schema(example = "/uploads/teh_botol-1760000000000-3f2a.png")]
    pub file_url: String,
}

/// Shape of the multipart upload, for the API document only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ProductPayload {
        ProductPayload {
            name: Some("  Teh Botol ".into()),
            category_id: None,
            qty: Some(3),
            supplier: Some("Sosro".into()),
            price: Some(Decimal::from(5000)),
            picture_url: Some("".into()),
            status: None,
            exp_date: None,
        }
    }

    #[test]
    fn into_input_applies_defaults_and_trims() {
        let input = payload().into_input().unwrap();
        assert_eq!(input.name, "Teh Botol");
        assert_eq!(input.status, DEFAULT_PRODUCT_STATUS);
        assert_eq!(input.picture_url, None);
    }

    #[test]
    fn into_input_rejects_missing_and_negative_fields() {
        let mut p = payload();
        p.name = None;
        let errs = p.into_input().unwrap_err();
        assert!(errs.field_errors().contains_key("name"));

        let mut p = payload();
        p.price = Some(Decimal::from(-1));
        p.qty = Some(-5);
        let errs = p.into_input().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("qty"));
    }

    #[test]
    fn whitespace_only_text_is_missing() {
        let mut p = payload();
        p.name = Some("   ".into());
        p.supplier = Some(" \t ".into());
        let errs = p.into_input().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("supplier"));
    }

    #[test]
    fn price_must_fit_the_stored_precision() {
        let mut p = payload();
        p.price = Some(Decimal::from(PRICE_LIMIT));
        assert!(p.into_input().unwrap_err().field_errors().contains_key("price"));

        let mut p = payload();
        p.price = Some(Decimal::new(100_005, 3)); // 100.005
        assert!(p.into_input().unwrap_err().field_errors().contains_key("price"));

        let mut p = payload();
        p.price = Some(Decimal::new(100_500, 3)); // 100.500
        assert_eq!(p.into_input().unwrap().price, Decimal::new(10_050, 2));

        let mut p = payload();
        p.price = Some(Decimal::from(PRICE_LIMIT - 1));
        assert!(p.into_input().is_ok());
    }

    #[test]
    fn expired_by_date_or_status() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let input = payload().into_input().unwrap();
        let mut product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            category_id: None,
            qty: input.qty,
            supplier: input.supplier,
            price: input.price,
            picture_url: None,
            status: input.status,
            exp_date: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!product.is_expired(today));

        product.exp_date = Some(today);
        assert!(product.is_expired(today));

        product.exp_date = today.succ_opt();
        assert!(!product.is_expired(today));

        product.status = EXPIRED_PRODUCT_STATUS.into();
        assert!(product.is_expired(today));
    }
}
