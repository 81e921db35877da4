// src/db/identity_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::IdentityStore,
    models::auth::{Administrator, Identity, NewWorkforceMember, WorkforceMember},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_kind", rename_all = "lowercase")]
enum AccountKind {
    Admin,
    Employee,
}

// One row of `accounts`; workforce-only columns are NULL for administrators.
#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    kind: AccountKind,
    username: String,
    password_hash: String,
    full_name: String,
    nisn: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    class: Option<String>,
    major: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Identity {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        match row.kind {
            AccountKind::Admin => Ok(Identity::Administrator(Administrator {
                id: row.id,
                username: row.username,
                password_hash: row.password_hash,
                full_name: row.full_name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })),
            AccountKind::Employee => {
                let corrupt = || anyhow::anyhow!("account {} has invalid workforce columns", row.id);
                let class = row
                    .class
                    .as_deref()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(corrupt)?;
                let major = row
                    .major
                    .as_deref()
                    .and_then(|m| m.parse().ok())
                    .ok_or_else(corrupt)?;
                let nisn = row.nisn.clone().ok_or_else(corrupt)?;

                Ok(Identity::WorkforceMember(WorkforceMember {
                    id: row.id,
                    nisn,
                    username: row.username,
                    password_hash: row.password_hash,
                    full_name: row.full_name,
                    phone: row.phone,
                    address: row.address,
                    class,
                    major,
                    is_active: row.is_active,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }))
            }
        }
    }
}

fn into_member(row: AccountRow) -> Result<WorkforceMember, AppError> {
    match Identity::try_from(row)? {
        Identity::WorkforceMember(member) => Ok(member),
        Identity::Administrator(admin) => Err(anyhow::anyhow!(
            "account {} is not a workforce member",
            admin.id
        )
        .into()),
    }
}

// Unique violations on `accounts` are the backstop for concurrent
// registrations that both passed the pre-check.
fn map_account_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("accounts_nisn_key") => AppError::DuplicateCode,
                _ => AppError::DuplicateUsername,
            };
        }
    }
    e.into()
}

/// Postgres-backed identity registry storage over the single `accounts` table.
#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Administrator, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (kind, username, password_hash, full_name)
            VALUES ('admin', $1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_account_insert_error)?;

        match Identity::try_from(row)? {
            Identity::Administrator(admin) => Ok(admin),
            Identity::WorkforceMember(_) => {
                Err(anyhow::anyhow!("insert returned a non-admin account").into())
            }
        }
    }

    async fn create_workforce_member(
        &self,
        member: NewWorkforceMember,
    ) -> Result<WorkforceMember, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Username is shared by both identity classes
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE username = $1)")
                .bind(&member.username)
                .fetch_one(&mut *tx)
                .await?;
        if username_taken {
            return Err(AppError::DuplicateUsername);
        }

        // 2. Workforce code
        let code_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE nisn = $1)")
                .bind(&member.nisn)
                .fetch_one(&mut *tx)
                .await?;
        if code_taken {
            return Err(AppError::DuplicateCode);
        }

        // 3. Insert; the unique indexes reject a racing duplicate
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (
                kind, username, password_hash, full_name,
                nisn, phone, address, class, major, is_active
            )
            VALUES ('employee', $1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING *
            "#,
        )
        .bind(&member.username)
        .bind(&member.password_hash)
        .bind(&member.full_name)
        .bind(&member.nisn)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(member.class.as_str())
        .bind(member.major.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_account_insert_error)?;

        tx.commit().await?;

        into_member(row)
    }

    async fn list_workforce_members(&self) -> Result<Vec<WorkforceMember>, AppError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts WHERE kind = 'employee' ORDER BY full_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_member).collect()
    }

    async fn set_workforce_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<WorkforceMember>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1 AND kind = 'employee'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_member).transpose()
    }
}
