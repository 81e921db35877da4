// src/services/auth.rs

use std::{sync::Arc, time::Duration};

use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::{
        db_utils::with_timeout,
        error::{AppError, Resource},
    },
    db::IdentityStore,
    models::auth::{
        Administrator, Identity, LoginPayload, LoginResponse, Major, NewWorkforceMember,
        RegisterPayload, StudentClass, WorkforceMember,
    },
    services::{password::PasswordHasher, token::TokenCodec},
};

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Identity registry: credential checks, registration and session issuance.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
    tokens: TokenCodec,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: PasswordHasher,
        tokens: TokenCodec,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            timeout,
        }
    }

    // ---
    // Credential checks
    // ---

    pub async fn authenticate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Administrator>, AppError> {
        let found = with_timeout(self.timeout, self.store.find_by_username(username)).await?;
        let Some(Identity::Administrator(admin)) = found else {
            return Ok(None);
        };

        if self.hasher.verify(password, &admin.password_hash).await? {
            Ok(Some(admin))
        } else {
            Ok(None)
        }
    }

    /// Inactive members never authenticate, even with the right password.
    pub async fn authenticate_workforce(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<WorkforceMember>, AppError> {
        let found = with_timeout(self.timeout, self.store.find_by_username(username)).await?;
        let Some(Identity::WorkforceMember(member)) = found else {
            return Ok(None);
        };
        if !member.is_active {
            return Ok(None);
        }

        if self.hasher.verify(password, &member.password_hash).await? {
            Ok(Some(member))
        } else {
            Ok(None)
        }
    }

    /// Administrator first, then workforce member; first match wins.
    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        payload.validate()?;
        let username = payload.username.unwrap_or_default();
        let password = payload.password.unwrap_or_default();

        let profile = match self.authenticate_admin(&username, &password).await? {
            Some(admin) => Identity::Administrator(admin),
            None => match self.authenticate_workforce(&username, &password).await? {
                Some(member) => Identity::WorkforceMember(member),
                None => {
                    tracing::warn!(username = %username, "login rejected");
                    return Err(AppError::InvalidCredentials);
                }
            },
        };

        let role = profile.role();
        let token = self.tokens.issue(profile.id(), role)?;
        tracing::info!(user_id = %profile.id(), role = %role, "login succeeded");

        Ok(LoginResponse {
            role,
            token,
            profile,
        })
    }

    // ---
    // Registration
    // ---

    pub async fn register_workforce_member(
        &self,
        payload: RegisterPayload,
    ) -> Result<WorkforceMember, AppError> {
        // 1. Required fields
        payload.validate()?;

        // 2. Required text fields, judged after trimming
        let nisn = non_blank(payload.nisn);
        let username = non_blank(payload.username);
        let full_name = non_blank(payload.full_name);

        let mut errors = ValidationErrors::new();
        for (field, value) in [("nisn", &nisn), ("username", &username), ("fullName", &full_name)] {
            if value.is_none() {
                errors.add(field, field_error("required", "field.required"));
            }
        }

        // 3. Closed enumerations
        let class = payload.student_class.as_deref().map(str::trim).map(str::parse::<StudentClass>);
        let major = payload.major.as_deref().map(str::trim).map(str::parse::<Major>);
        if !matches!(class, Some(Ok(_))) {
            errors.add("studentClass", field_error("class", "auth.invalid_class"));
        }
        if !matches!(major, Some(Ok(_))) {
            errors.add("major", field_error("major", "auth.invalid_major"));
        }

        let (Some(nisn), Some(username), Some(password), Some(full_name), Some(Ok(class)), Some(Ok(major))) =
            (nisn, username, payload.password, full_name, class, major)
        else {
            return Err(errors.into());
        };

        // 4. Digest, then the atomic check-and-insert
        let password_hash = self.hasher.hash(&password).await?;
        let member = NewWorkforceMember {
            nisn,
            username,
            password_hash,
            full_name,
            phone: non_blank(payload.phone),
            address: non_blank(payload.address),
            class,
            major,
        };

        let created = with_timeout(self.timeout, self.store.create_workforce_member(member)).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "workforce member registered");
        Ok(created)
    }

    /// Creates the administrator unless the username already exists.
    /// Returns `true` when a record was created.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<bool, AppError> {
        if with_timeout(self.timeout, self.store.find_by_username(username))
            .await?
            .is_some()
        {
            tracing::info!(username, "administrator seed already present");
            return Ok(false);
        }

        let password_hash = self.hasher.hash(password).await?;
        match with_timeout(
            self.timeout,
            self.store.create_admin(username, &password_hash, full_name),
        )
        .await
        {
            Ok(admin) => {
                tracing::info!(user_id = %admin.id, username, "administrator seeded");
                Ok(true)
            }
            // another instance seeded it first
            Err(AppError::DuplicateUsername) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ---
    // Profiles and workforce administration
    // ---

    pub async fn profile(&self, id: Uuid) -> Result<Identity, AppError> {
        with_timeout(self.timeout, self.store.find_by_id(id))
            .await?
            .ok_or(AppError::NotFound(Resource::Account))
    }

    pub async fn list_workforce(&self) -> Result<Vec<WorkforceMember>, AppError> {
        with_timeout(self.timeout, self.store.list_workforce_members()).await
    }

    pub async fn set_workforce_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<WorkforceMember, AppError> {
        let member = with_timeout(self.timeout, self.store.set_workforce_active(id, active))
            .await?
            .ok_or(AppError::NotFound(Resource::Account))?;

        tracing::info!(user_id = %member.id, is_active = active, "workforce member status changed");
        Ok(member)
    }
}
