// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Role,
};

/// A role a route can demand.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// Extractor that admits only callers holding `T::role()`. Must run behind
/// `auth_guard`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // 1. Who is calling
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::TokenMissing)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        // 2. Do they hold the role
        let required = T::role();
        if user.role != required {
            tracing::warn!(user_id = %user.id, role = %user.role, required = %required, "access denied");
            return Err(AppError::AccessDenied(required).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// Roles
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn role() -> Role {
        Role::Admin
    }
}

pub type RequireAdmin = RequireRole<AdminRole>;
