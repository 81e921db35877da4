// src/handlers/auth.rs

use axum::extract::State;

use crate::{
    common::{error::ApiError, extract::AppJson, response::ApiResponse},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{Identity, LoginPayload, LoginResponse, RegisterPayload, WorkforceMember},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token and profile of the caller", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "No identity matches the credentials")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let response = app_state
        .auth_service
        .login(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(response)
        .with_message(app_state.i18n_store.message(&locale.0, "auth.login_success")))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Workforce member registered", body = WorkforceMember),
        (status = 400, description = "Missing field, unknown class/major or duplicate username/NISN")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Result<ApiResponse<WorkforceMember>, ApiError> {
    let member = app_state
        .auth_service
        .register_workforce_member(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(member)
        .with_message(app_state.i18n_store.message(&locale.0, "auth.register_success")))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile of the authenticated caller", body = Identity),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<ApiResponse<Identity>, ApiError> {
    let profile = app_state
        .auth_service
        .profile(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(profile))
}
