// src/middleware/i18n.rs

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::FALLBACK_LANGUAGE;

/// Languages that have a message catalogue.
const SUPPORTED_LANGUAGES: &[&str] = &["en", "id"];

/// Caller's preferred language, reduced to a supported primary subtag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_accept_language(raw: &str) -> Self {
        let lang = accept_language::parse(raw)
            .into_iter()
            .filter_map(|tag| {
                // "id-ID" -> "id"
                let primary = tag.split('-').next().unwrap_or(&tag).to_ascii_lowercase();
                SUPPORTED_LANGUAGES.iter().find(|s| **s == primary).copied()
            })
            .next()
            .unwrap_or(FALLBACK_LANGUAGE);

        Locale(lang.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_else(|| Locale(FALLBACK_LANGUAGE.to_string()));

        Ok(locale)
    }
}
