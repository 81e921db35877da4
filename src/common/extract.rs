// src/common/extract.rs

use axum::extract::{FromRequest, FromRequestParts};

use crate::common::error::AppError;

/// `Json` whose rejection renders as our 400 envelope instead of axum's
/// plain-text 415/422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` with the same envelope on a malformed id.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
