// src/handlers/employees.rs

use axum::extract::State;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{i18n::Locale, rbac::RequireAdmin},
    models::auth::{UpdateStatusPayload, WorkforceMember},
};

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Workforce members ordered by name", body = [WorkforceMember]),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
) -> Result<ApiResponse<Vec<WorkforceMember>>, ApiError> {
    let members = app_state
        .auth_service
        .list_workforce()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(members))
}

#[utoipa::path(
    patch,
    path = "/api/employees/{id}/status",
    tag = "Employees",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "Workforce member id")),
    responses(
        (status = 200, description = "Status changed", body = WorkforceMember),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Unknown workforce member")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_employee_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateStatusPayload>,
) -> Result<ApiResponse<WorkforceMember>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    let is_active = payload.is_active.unwrap_or_default();

    let member = app_state
        .auth_service
        .set_workforce_active(id, is_active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(member)
        .with_message(app_state.i18n_store.message(&locale.0, "employee.status_updated")))
}
