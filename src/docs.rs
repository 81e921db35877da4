// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::me,

        // --- Employees ---
        handlers::employees::list_employees,
        handlers::employees::update_employee_status,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::low_stock,
        handlers::products::expired_products,
        handlers::products::get_product,
        handlers::products::price_history,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::upload_image,

        // --- Categories ---
        handlers::categories::list_categories,
        handlers::categories::category_stats,
        handlers::categories::get_category,
        handlers::categories::category_products,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::StudentClass,
            models::auth::Major,
            models::auth::Administrator,
            models::auth::WorkforceMember,
            models::auth::Identity,
            models::auth::LoginPayload,
            models::auth::RegisterPayload,
            models::auth::UpdateStatusPayload,
            models::auth::LoginResponse,

            // --- Inventory ---
            models::inventory::Category,
            models::inventory::CategoryStats,
            models::inventory::Product,
            models::inventory::ProductDetails,
            models::inventory::PriceHistory,
            models::inventory::ProductPayload,
            models::inventory::CategoryPayload,
            models::inventory::UploadedAsset,
            models::inventory::ImageUploadForm,
        )
    ),
    tags(
        (name = "Auth", description = "Login, registration and the caller's profile"),
        (name = "Employees", description = "Workforce administration"),
        (name = "Products", description = "Products, stock views and price history"),
        (name = "Categories", description = "Product categories")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
