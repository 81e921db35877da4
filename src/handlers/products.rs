// src/handlers/products.rs

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    common::{
        error::{ApiError, AppError, UploadRejection},
        extract::{AppJson, AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::inventory::{
        ImageUploadForm, LowStockQuery, PriceHistory, Product, ProductDetails, ProductListQuery,
        ProductPayload, UploadedAsset,
    },
};

/// Multipart field that carries the image.
const UPLOAD_FIELD: &str = "image";

// ---
// Reads
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductListQuery),
    responses((status = 200, description = "Products, newest first", body = [ProductDetails])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ProductListQuery>,
) -> Result<ApiResponse<Vec<ProductDetails>>, ApiError> {
    let products = app_state
        .inventory_service
        .list_products(query.category_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Products",
    params(LowStockQuery),
    responses((status = 200, description = "Products with qty <= threshold, lowest first", body = [ProductDetails])),
    security(("api_jwt" = []))
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<LowStockQuery>,
) -> Result<ApiResponse<Vec<ProductDetails>>, ApiError> {
    let products = app_state
        .inventory_service
        .low_stock(query.threshold)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    get,
    path = "/api/products/expired",
    tag = "Products",
    responses((status = 200, description = "Expired products, earliest date first", body = [ProductDetails])),
    security(("api_jwt" = []))
)]
pub async fn expired_products(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<ApiResponse<Vec<ProductDetails>>, ApiError> {
    let products = app_state
        .inventory_service
        .expired()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductDetails),
        (status = 404, description = "Unknown product")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<ProductDetails>, ApiError> {
    let product = app_state
        .inventory_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/price-history",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Price changes, newest first", body = [PriceHistory])),
    security(("api_jwt" = []))
)]
pub async fn price_history(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<PriceHistory>>, ApiError> {
    let history = app_state
        .inventory_service
        .price_history(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(history))
}

// ---
// Writes (administrators only)
// ---

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = app_state
        .inventory_service
        .create_product(payload, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(product)
        .with_message(app_state.i18n_store.message(&locale.0, "product.created")))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = ProductPayload,
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product replaced; a price change is recorded", body = Product),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown product or category")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = app_state
        .inventory_service
        .update_product(id, payload, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(product)
        .with_message(app_state.i18n_store.message(&locale.0, "product.updated")))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted together with its local image"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown product")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    app_state
        .inventory_service
        .delete_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.message(&locale.0, "product.deleted"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/products/upload",
    tag = "Products",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadedAsset),
        (status = 400, description = "No file, not an image or too large"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_image(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<UploadedAsset>, ApiError> {
    let asset = store_image(&app_state, multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(asset)
        .with_message(app_state.i18n_store.message(&locale.0, "upload.success")))
}

async fn store_image(
    app_state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedAsset, AppError> {
    let limit = app_state.config.max_upload_bytes;
    let mut multipart =
        multipart.map_err(|_| AppError::InvalidUpload(UploadRejection::Missing))?;

    let read_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::InvalidUpload(UploadRejection::TooLarge(limit))
        } else {
            AppError::MalformedBody(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // 1. Type
        let is_image = field
            .content_type()
            .is_some_and(|mime| mime.starts_with("image/"));
        if !is_image {
            return Err(AppError::InvalidUpload(UploadRejection::NotAnImage));
        }
        let original_name = field.file_name().unwrap_or("image").to_string();

        // 2. Size
        let bytes = field.bytes().await.map_err(read_error)?;
        if bytes.is_empty() {
            return Err(AppError::InvalidUpload(UploadRejection::Missing));
        }
        if bytes.len() > limit {
            return Err(AppError::InvalidUpload(UploadRejection::TooLarge(limit)));
        }

        // 3. Store
        return app_state
            .inventory_service
            .store_upload(&original_name, &bytes)
            .await;
    }

    Err(AppError::InvalidUpload(UploadRejection::Missing))
}
