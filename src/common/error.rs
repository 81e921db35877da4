// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, FALLBACK_LANGUAGE},
    middleware::i18n::Locale,
    models::auth::Role,
};

/// Which record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    Category,
    Account,
}

impl Resource {
    fn message_key(&self) -> &'static str {
        match self {
            Resource::Product => "product.not_found",
            Resource::Category => "category.not_found",
            Resource::Account => "account.not_found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    Missing,
    NotAnImage,
    TooLarge(usize),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("invalid path or query parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("workforce code already exists")]
    DuplicateCode,

    #[error("category name already exists")]
    CategoryNameTaken,

    #[error("category still referenced by {0} products")]
    CategoryInUse(i64),

    #[error("{0:?} not found")]
    NotFound(Resource),

    #[error("token missing")]
    TokenMissing,

    #[error("token expired")]
    TokenExpired,

    #[error("token invalid")]
    TokenInvalid,

    #[error("access denied, requires role {0}")]
    AccessDenied(Role),

    #[error("upload rejected: {0:?}")]
    InvalidUpload(UploadRejection),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedBody(_)
            | AppError::InvalidParameter(_)
            | AppError::DuplicateUsername
            | AppError::DuplicateCode
            | AppError::CategoryNameTaken
            | AppError::CategoryInUse(_)
            | AppError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::TokenMissing
            | AppError::TokenExpired
            | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable(_) | AppError::DatabaseError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::BcryptError(_) | AppError::JwtError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable, machine-readable code sent as `error`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedBody(_)
            | AppError::InvalidParameter(_) => "VALIDATION_FAILED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::DuplicateUsername => "DUPLICATE_USERNAME",
            AppError::DuplicateCode => "DUPLICATE_CODE",
            AppError::CategoryNameTaken => "CATEGORY_NAME_TAKEN",
            AppError::CategoryInUse(_) => "CATEGORY_IN_USE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::AccessDenied(_) => "ACCESS_DENIED",
            AppError::InvalidUpload(_) => "INVALID_UPLOAD",
            AppError::StorageUnavailable(_) | AppError::DatabaseError(_) => "STORAGE_UNAVAILABLE",
            AppError::BcryptError(_) | AppError::JwtError(_) | AppError::InternalServerError(_) => {
                "UNEXPECTED"
            }
        }
    }

    /// Converts into the localized response body. Server-side failures are
    /// logged here with full detail and answered with a generic message.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let (message, details) = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(key) => store.message(lang, key),
                            None => store.message(lang, "field.required"),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (store.message(lang, "error.validation"), Some(json!(details)))
            }
            AppError::MalformedBody(reason) => (
                store.message(lang, "error.malformed_body"),
                Some(json!({ "body": [reason] })),
            ),
            AppError::InvalidParameter(reason) => (
                store.message(lang, "error.invalid_parameter"),
                Some(json!({ "parameters": [reason] })),
            ),
            AppError::InvalidCredentials => (store.message(lang, "auth.invalid_credentials"), None),
            AppError::DuplicateUsername => (store.message(lang, "auth.duplicate_username"), None),
            AppError::DuplicateCode => (store.message(lang, "auth.duplicate_code"), None),
            AppError::CategoryNameTaken => (store.message(lang, "category.name_taken"), None),
            AppError::CategoryInUse(count) => (
                store.format(lang, "category.in_use", &[("count", count.to_string())]),
                Some(json!({ "productCount": count })),
            ),
            AppError::NotFound(resource) => (store.message(lang, resource.message_key()), None),
            AppError::TokenMissing => (store.message(lang, "token.missing"), None),
            AppError::TokenExpired => (store.message(lang, "token.expired"), None),
            AppError::TokenInvalid => (store.message(lang, "token.invalid"), None),
            AppError::AccessDenied(role) => (
                store.format(lang, "access.denied", &[("role", role.to_string())]),
                None,
            ),
            AppError::InvalidUpload(UploadRejection::Missing) => (store.message(lang, "upload.missing"), None),
            AppError::InvalidUpload(UploadRejection::NotAnImage) => {
                (store.message(lang, "upload.not_image"), None)
            }
            AppError::InvalidUpload(UploadRejection::TooLarge(limit)) => (
                store.format(lang, "upload.too_large", &[("limit", limit.to_string())]),
                None,
            ),
            AppError::StorageUnavailable(_) | AppError::DatabaseError(_) => {
                (store.message(lang, "error.storage_unavailable"), None)
            }
            AppError::BcryptError(_) | AppError::JwtError(_) | AppError::InternalServerError(_) => {
                (store.message(lang, "error.unexpected"), None)
            }
        };

        ApiError {
            status,
            code,
            message,
            details,
        }
    }
}

// Extractor rejections and other paths without a locale land here.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale(FALLBACK_LANGUAGE.to_string()), I18nStore::builtin())
            .into_response()
    }
}

/// Localized error ready to be written as `{success: false, ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
            "error": self.code,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn taxonomy_maps_to_stable_statuses() {
        assert_eq!(AppError::DuplicateUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CategoryInUse(2).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccessDenied(Role::Admin).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound(Resource::Product).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::StorageUnavailable("timeout".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn category_in_use_carries_the_count() {
        let err = AppError::CategoryInUse(4).to_api_error(&locale("en"), I18nStore::builtin());
        assert!(err.message.contains("4 products"));
        assert_eq!(err.details, Some(json!({ "productCount": 4 })));
    }

    #[test]
    fn storage_failures_do_not_leak_detail() {
        let err = AppError::StorageUnavailable("connection refused to 10.0.0.3:5432".into())
            .to_api_error(&locale("id"), I18nStore::builtin());
        assert_eq!(err.message, "Penyimpanan sedang tidak tersedia");
        assert!(err.details.is_none());
    }
}
