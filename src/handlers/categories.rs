// src/handlers/categories.rs

use axum::extract::State;
use uuid::Uuid;

use crate::{
    common::{
        error::ApiError,
        extract::{AppJson, AppPath},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{i18n::Locale, rbac::RequireAdmin},
    models::inventory::{Category, CategoryPayload, CategoryStats, ProductDetails},
};

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses((status = 200, description = "All categories ordered by name", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    let categories = app_state
        .inventory_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/stats",
    tag = "Categories",
    responses((status = 200, description = "Product count, stock and price figures per category", body = [CategoryStats])),
    security(("api_jwt" = []))
)]
pub async fn category_stats(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<ApiResponse<Vec<CategoryStats>>, ApiError> {
    let stats = app_state
        .inventory_service
        .category_stats()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Unknown category")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Category>, ApiError> {
    let category = app_state
        .inventory_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(category))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Products of the category ordered by name", body = [ProductDetails]),
        (status = 404, description = "Unknown category")
    ),
    security(("api_jwt" = []))
)]
pub async fn category_products(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Vec<ProductDetails>>, ApiError> {
    let products = app_state
        .inventory_service
        .category_products(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(products))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Name missing or already in use"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<ApiResponse<Category>, ApiError> {
    let category = app_state
        .inventory_service
        .create_category(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(category)
        .with_message(app_state.i18n_store.message(&locale.0, "category.created")))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category renamed", body = Category),
        (status = 400, description = "Name missing or already in use"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown category")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<ApiResponse<Category>, ApiError> {
    let category = app_state
        .inventory_service
        .rename_category(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(category)
        .with_message(app_state.i18n_store.message(&locale.0, "category.updated")))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Category still has products"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown category")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    app_state
        .inventory_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.message(&locale.0, "category.deleted"),
    ))
}
