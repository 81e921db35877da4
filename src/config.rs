// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{IdentityRepository, IdentityStore, InventoryRepository, InventoryStore, MemoryStore},
    services::{
        asset_store::{AssetStore, LocalAssetStore},
        auth::AuthService,
        inventory_service::InventoryService,
        password::PasswordHasher,
        token::TokenCodec,
    },
};

/// Administrator created at startup when a username and password are set.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

/// Process configuration, read once from the environment.
#[derive(Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub storage_timeout: Duration,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: u32,
    pub admin_seed: Option<AdminSeed>,
}

// secrets stay out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database_url.as_ref().map(|_| "<set>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .field("storage_timeout", &self.storage_timeout)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        _ => Ok(default),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = optional("JWT_SECRET").context("JWT_SECRET must be set")?;

        let admin_seed = match (
            optional("SEED_ADMIN_USERNAME"),
            optional("SEED_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminSeed {
                full_name: optional("SEED_ADMIN_FULL_NAME").unwrap_or_else(|| username.clone()),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            jwt_secret,
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", 8)?,
            bind_addr: parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
            storage_timeout: Duration::from_secs(parsed("STORAGE_TIMEOUT_SECS", 5)?),
            upload_dir: PathBuf::from(optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".into())),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", Self::DEFAULT_MAX_UPLOAD_BYTES)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            admin_seed,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub token_codec: TokenCodec,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    /// Connects storage (Postgres when `DATABASE_URL` is set, otherwise the
    /// in-memory store), runs migrations and the optional admin seed.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (identity, inventory): (Arc<dyn IdentityStore>, Arc<dyn InventoryStore>) =
            match &config.database_url {
                Some(url) => {
                    let db_pool = PgPoolOptions::new()
                        .max_connections(config.db_max_connections)
                        .acquire_timeout(config.storage_timeout)
                        .connect(url)
                        .await
                        .context("cannot connect to the database")?;
                    tracing::info!("database connection established");

                    sqlx::migrate!()
                        .run(&db_pool)
                        .await
                        .context("database migrations failed")?;
                    tracing::info!("database migrations applied");

                    let identity: Arc<dyn IdentityStore> =
                        Arc::new(IdentityRepository::new(db_pool.clone()));
                    let inventory: Arc<dyn InventoryStore> =
                        Arc::new(InventoryRepository::new(db_pool));
                    (identity, inventory)
                }
                None => {
                    tracing::warn!("DATABASE_URL not set, using the in-memory store");
                    let memory = Arc::new(MemoryStore::new());
                    let identity: Arc<dyn IdentityStore> = memory.clone();
                    let inventory: Arc<dyn InventoryStore> = memory;
                    (identity, inventory)
                }
            };

        let assets = Arc::new(LocalAssetStore::new(config.upload_dir.clone()));
        let state = Self::with_stores(config, identity, inventory, assets);

        if let Some(seed) = &state.config.admin_seed {
            state
                .auth_service
                .ensure_admin(&seed.username, &seed.password, &seed.full_name)
                .await
                .map_err(|e| anyhow::anyhow!("admin seed failed: {e}"))?;
        }

        Ok(state)
    }

    /// Wires the services over the given stores. No I/O happens here.
    pub fn with_stores(
        config: Config,
        identity: Arc<dyn IdentityStore>,
        inventory: Arc<dyn InventoryStore>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let token_codec = TokenCodec::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours),
        );
        let auth_service = AuthService::new(
            identity,
            PasswordHasher::new(config.bcrypt_cost),
            token_codec.clone(),
            config.storage_timeout,
        );
        let inventory_service = InventoryService::new(inventory, assets, config.storage_timeout);

        Self {
            config: Arc::new(config),
            auth_service,
            inventory_service,
            token_codec,
            i18n_store: Arc::new(I18nStore::new()),
        }
    }
}
