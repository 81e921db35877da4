// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

// multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Full HTTP surface under `/api`. Shared by the binary and the tests.
pub fn router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register));

    // Everything below needs a valid token; role checks live in the handlers.
    let me_routes = Router::new().route("/me", get(handlers::auth::me));

    let employee_routes = Router::new()
        .route("/", get(handlers::employees::list_employees))
        .route("/{id}/status", patch(handlers::employees::update_employee_status));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/low-stock", get(handlers::products::low_stock))
        .route("/expired", get(handlers::products::expired_products))
        .route(
            "/upload",
            post(handlers::products::upload_image).layer(DefaultBodyLimit::max(
                app_state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/{id}/price-history", get(handlers::products::price_history));

    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route("/stats", get(handlers::categories::category_stats))
        .route(
            "/{id}",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route("/{id}/products", get(handlers::categories::category_products));

    let protected_routes = Router::new()
        .nest("/auth", me_routes)
        .nest("/employees", employee_routes)
        .nest("/products", product_routes)
        .nest("/categories", category_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new().nest("/api", api).with_state(app_state)
}
