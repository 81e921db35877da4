// src/db.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Administrator, Identity, NewWorkforceMember, WorkforceMember},
        inventory::{
            Category, CategoryStats, PriceHistory, Product, ProductDetails, ProductInput,
            ProductUpdate,
        },
    },
};

pub mod identity_repo;
pub use identity_repo::IdentityRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod memory;
pub use memory::MemoryStore;

/// Outcome of the guarded category delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDeletion {
    Deleted,
    NotFound,
    InUse(i64),
}

/// Storage owned by the identity registry.
///
/// Implementations must make `create_workforce_member` atomic: the
/// username/nisn checks and the insert cannot interleave with another
/// registration.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError>;

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Administrator, AppError>;

    async fn create_workforce_member(
        &self,
        member: NewWorkforceMember,
    ) -> Result<WorkforceMember, AppError>;

    async fn list_workforce_members(&self) -> Result<Vec<WorkforceMember>, AppError>;

    async fn set_workforce_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<WorkforceMember>, AppError>;
}

/// Storage owned by the inventory engine.
///
/// `delete_category_guarded` must count and delete under one lock/transaction;
/// `update_product_audited` must write the product and its price-history row
/// both-or-neither.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // --- categories ---
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    async fn create_category(&self, name: &str) -> Result<Category, AppError>;

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Option<Category>, AppError>;

    async fn delete_category_guarded(&self, id: Uuid) -> Result<CategoryDeletion, AppError>;

    async fn category_stats(&self) -> Result<Vec<CategoryStats>, AppError>;

    // --- products ---
    async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<ProductDetails>, AppError>;

    async fn products_in_category(&self, category_id: Uuid) -> Result<Vec<ProductDetails>, AppError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductDetails>, AppError>;

    async fn create_product(&self, input: &ProductInput, actor: Uuid) -> Result<Product, AppError>;

    async fn update_product_audited(
        &self,
        id: Uuid,
        input: &ProductInput,
        actor: Uuid,
    ) -> Result<Option<ProductUpdate>, AppError>;

    async fn delete_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn low_stock(&self, threshold: i32) -> Result<Vec<ProductDetails>, AppError>;

    async fn expired(&self, today: NaiveDate) -> Result<Vec<ProductDetails>, AppError>;

    async fn price_history(&self, product_id: Uuid) -> Result<Vec<PriceHistory>, AppError>;
}
