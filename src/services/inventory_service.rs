// src/services/inventory_service.rs

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::with_timeout,
        error::{AppError, Resource},
    },
    db::{CategoryDeletion, InventoryStore},
    models::inventory::{
        Category, CategoryPayload, CategoryStats, PriceHistory, Product, ProductDetails,
        ProductPayload, UploadedAsset, DEFAULT_LOW_STOCK_THRESHOLD,
    },
    services::asset_store::{generate_file_name, is_local_reference, AssetStore},
};

/// Inventory consistency engine: products, categories, price audit and the
/// image lifecycle.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    assets: Arc<dyn AssetStore>,
    timeout: Duration,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>, assets: Arc<dyn AssetStore>, timeout: Duration) -> Self {
        Self {
            store,
            assets,
            timeout,
        }
    }

    // --- CATEGORIES ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        with_timeout(self.timeout, self.store.list_categories()).await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        with_timeout(self.timeout, self.store.find_category(id))
            .await?
            .ok_or(AppError::NotFound(Resource::Category))
    }

    pub async fn create_category(&self, payload: CategoryPayload) -> Result<Category, AppError> {
        let name = category_name(payload)?;
        let category = with_timeout(self.timeout, self.store.create_category(&name)).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn rename_category(&self, id: Uuid, payload: CategoryPayload) -> Result<Category, AppError> {
        let name = category_name(payload)?;
        with_timeout(self.timeout, self.store.rename_category(id, &name))
            .await?
            .ok_or(AppError::NotFound(Resource::Category))
    }

    /// Refuses while any product still references the category.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        match with_timeout(self.timeout, self.store.delete_category_guarded(id)).await? {
            CategoryDeletion::Deleted => {
                tracing::info!(category_id = %id, "category deleted");
                Ok(())
            }
            CategoryDeletion::NotFound => Err(AppError::NotFound(Resource::Category)),
            CategoryDeletion::InUse(count) => {
                tracing::info!(category_id = %id, product_count = count, "category delete refused");
                Err(AppError::CategoryInUse(count))
            }
        }
    }

    pub async fn category_products(&self, id: Uuid) -> Result<Vec<ProductDetails>, AppError> {
        // 404 rather than an empty list for an unknown category
        self.get_category(id).await?;
        with_timeout(self.timeout, self.store.products_in_category(id)).await
    }

    pub async fn category_stats(&self) -> Result<Vec<CategoryStats>, AppError> {
        with_timeout(self.timeout, self.store.category_stats()).await
    }

    // --- PRODUCTS: READS ---

    pub async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<ProductDetails>, AppError> {
        with_timeout(self.timeout, self.store.list_products(category_id)).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetails, AppError> {
        with_timeout(self.timeout, self.store.find_product(id))
            .await?
            .ok_or(AppError::NotFound(Resource::Product))
    }

    pub async fn low_stock(&self, threshold: Option<i32>) -> Result<Vec<ProductDetails>, AppError> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        with_timeout(self.timeout, self.store.low_stock(threshold)).await
    }

    pub async fn expired(&self) -> Result<Vec<ProductDetails>, AppError> {
        self.expired_at(Utc::now().date_naive()).await
    }

    pub async fn expired_at(&self, today: NaiveDate) -> Result<Vec<ProductDetails>, AppError> {
        with_timeout(self.timeout, self.store.expired(today)).await
    }

    pub async fn price_history(&self, product_id: Uuid) -> Result<Vec<PriceHistory>, AppError> {
        with_timeout(self.timeout, self.store.price_history(product_id)).await
    }

    // --- PRODUCTS: WRITES ---

    pub async fn create_product(&self, payload: ProductPayload, actor: Uuid) -> Result<Product, AppError> {
        let input = payload.into_input()?;
        let product = with_timeout(self.timeout, self.store.create_product(&input, actor)).await?;
        tracing::info!(product_id = %product.id, actor = %actor, "product created");
        Ok(product)
    }

    /// Full replacement; a price change is audited in the same transaction
    /// and a replaced local image is removed afterwards.
    pub async fn update_product(
        &self,
        id: Uuid,
        payload: ProductPayload,
        actor: Uuid,
    ) -> Result<Product, AppError> {
        let input = payload.into_input()?;
        let update = with_timeout(self.timeout, self.store.update_product_audited(id, &input, actor))
            .await?
            .ok_or(AppError::NotFound(Resource::Product))?;

        if update.previous.price != update.current.price {
            tracing::info!(
                product_id = %id,
                old_price = %update.previous.price,
                new_price = %update.current.price,
                "price change recorded"
            );
        }

        if update.previous.picture_url != update.current.picture_url {
            if let Some(old) = update.previous.picture_url.as_deref() {
                self.release_asset(id, old).await;
            }
        }

        Ok(update.current)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let product = with_timeout(self.timeout, self.store.delete_product(id))
            .await?
            .ok_or(AppError::NotFound(Resource::Product))?;
        tracing::info!(product_id = %id, "product deleted");

        if let Some(picture) = product.picture_url.as_deref() {
            self.release_asset(id, picture).await;
        }
        Ok(())
    }

    // --- ASSETS ---

    pub async fn store_upload(&self, original_name: &str, bytes: &[u8]) -> Result<UploadedAsset, AppError> {
        let file_name = generate_file_name(original_name);
        let file_url = self.assets.save(&file_name, bytes).await?;
        Ok(UploadedAsset { file_name, file_url })
    }

    // Runs after the row change has committed, so a failure here is logged
    // and never turned into an error for the caller.
    async fn release_asset(&self, product_id: Uuid, reference: &str) {
        if !is_local_reference(reference) {
            return;
        }
        if let Err(e) = self.assets.delete(reference).await {
            tracing::error!(product_id = %product_id, reference, error = %e, "stale asset left behind");
        }
    }
}

fn category_name(payload: CategoryPayload) -> Result<String, AppError> {
    payload.validate()?;
    let name = payload.name.map(|n| n.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("length");
        err.message = Some("category.name_required".into());
        errors.add("name", err);
        return Err(errors.into());
    }
    Ok(name)
}
