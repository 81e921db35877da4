// src/services/token.rs

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, Role},
};

/// Issues and verifies stateless HS256 session tokens.
///
/// The signing secret is handed in at construction; nothing here reads
/// process-wide state, so tests can run codecs with different secrets side
/// by side.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: Uuid, role: Role) -> Result<String, AppError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(&self, subject: Uuid, role: Role, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// `TokenMissing` for an absent/blank token, `TokenExpired` once
    /// `now >= exp`, `TokenInvalid` for anything that fails to decode.
    pub fn verify_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(AppError::TokenMissing)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid,
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(AppError::TokenExpired);
        }

        Ok(data.claims)
    }
}
