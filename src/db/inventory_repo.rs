// src/db/inventory_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Resource},
    db::{CategoryDeletion, InventoryStore},
    models::inventory::{
        Category, CategoryStats, PriceHistory, Product, ProductDetails, ProductInput,
        ProductUpdate, EXPIRED_PRODUCT_STATUS,
    },
};

// Products joined with the names shown by the back office.
const PRODUCT_DETAILS_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.category_id, p.qty, p.supplier, p.price,
        p.picture_url, p.status, p.exp_date,
        p.created_by, p.updated_by, p.created_at, p.updated_at,
        c.name AS category_name,
        a.full_name AS created_by_name,
        a2.full_name AS updated_by_name
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN accounts a ON p.created_by = a.id
    LEFT JOIN accounts a2 ON p.updated_by = a2.id
"#;

fn map_category_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::CategoryNameTaken;
        }
    }
    e.into()
}

fn map_product_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation()
            && db_err.constraint() == Some("products_category_id_fkey")
        {
            return AppError::NotFound(Resource::Category);
        }
    }
    e.into()
}

/// Postgres-backed inventory storage.
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    // ---
    // Categories
    // ---

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_category_write_error)
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_write_error)
    }

    async fn delete_category_guarded(&self, id: Uuid) -> Result<CategoryDeletion, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the category row. A product insert referencing it needs a
        //    KEY SHARE lock on the same row, so it waits for us.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(CategoryDeletion::NotFound);
        }

        // 2. Count under the lock
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(CategoryDeletion::InUse(count));
        }

        // 3. Delete; FK RESTRICT stays as the last line
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CategoryDeletion::Deleted)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStats>, AppError> {
        let stats = sqlx::query_as::<_, CategoryStats>(
            r#"
            SELECT
                c.id,
                c.name,
                COUNT(p.id) AS product_count,
                COALESCE(SUM(p.qty), 0)::BIGINT AS total_stock,
                ROUND(COALESCE(AVG(p.price), 0), 2) AS avg_price,
                COALESCE(MIN(p.price), 0) AS min_price,
                COALESCE(MAX(p.price), 0) AS max_price
            FROM categories c
            LEFT JOIN products p ON c.id = p.category_id
            GROUP BY c.id, c.name
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    // ---
    // Products: reads
    // ---

    async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<ProductDetails>, AppError> {
        let sql = format!(
            "{PRODUCT_DETAILS_SELECT} WHERE ($1::uuid IS NULL OR p.category_id = $1) ORDER BY p.created_at DESC"
        );
        let products = sqlx::query_as::<_, ProductDetails>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn products_in_category(&self, category_id: Uuid) -> Result<Vec<ProductDetails>, AppError> {
        let sql = format!("{PRODUCT_DETAILS_SELECT} WHERE p.category_id = $1 ORDER BY p.name ASC");
        let products = sqlx::query_as::<_, ProductDetails>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductDetails>, AppError> {
        let sql = format!("{PRODUCT_DETAILS_SELECT} WHERE p.id = $1");
        let product = sqlx::query_as::<_, ProductDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn low_stock(&self, threshold: i32) -> Result<Vec<ProductDetails>, AppError> {
        let sql = format!("{PRODUCT_DETAILS_SELECT} WHERE p.qty <= $1 ORDER BY p.qty ASC, p.name ASC");
        let products = sqlx::query_as::<_, ProductDetails>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn expired(&self, today: NaiveDate) -> Result<Vec<ProductDetails>, AppError> {
        let sql = format!(
            "{PRODUCT_DETAILS_SELECT} WHERE p.exp_date <= $1 OR p.status = $2 \
             ORDER BY p.exp_date ASC NULLS LAST, p.name ASC"
        );
        let products = sqlx::query_as::<_, ProductDetails>(&sql)
            .bind(today)
            .bind(EXPIRED_PRODUCT_STATUS)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn price_history(&self, product_id: Uuid) -> Result<Vec<PriceHistory>, AppError> {
        let history = sqlx::query_as::<_, PriceHistory>(
            r#"
            SELECT
                ph.id, ph.product_id, ph.old_price, ph.new_price, ph.changed_by,
                a.full_name AS changed_by_name,
                ph.changed_at
            FROM product_price_history ph
            LEFT JOIN accounts a ON ph.changed_by = a.id
            WHERE ph.product_id = $1
            ORDER BY ph.changed_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }

    // ---
    // Products: writes
    // ---

    async fn create_product(&self, input: &ProductInput, actor: Uuid) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, category_id, qty, supplier, price,
                picture_url, status, exp_date, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.category_id)
        .bind(input.qty)
        .bind(&input.supplier)
        .bind(input.price)
        .bind(&input.picture_url)
        .bind(&input.status)
        .bind(input.exp_date)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(map_product_write_error)
    }

    async fn update_product_audited(
        &self,
        id: Uuid,
        input: &ProductInput,
        actor: Uuid,
    ) -> Result<Option<ProductUpdate>, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Pre-image under a row lock, so a concurrent update of the same
        //    product reads our post-image as its "old price".
        let previous = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        // 2. Full replacement of the editable fields
        let current = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2,
                category_id = $3,
                qty = $4,
                supplier = $5,
                price = $6,
                picture_url = $7,
                status = $8,
                exp_date = $9,
                updated_by = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.category_id)
        .bind(input.qty)
        .bind(&input.supplier)
        .bind(input.price)
        .bind(&input.picture_url)
        .bind(&input.status)
        .bind(input.exp_date)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_product_write_error)?;

        // 3. Audit row in the same transaction
        if previous.price != current.price {
            sqlx::query(
                r#"
                INSERT INTO product_price_history (product_id, old_price, new_price, changed_by)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(previous.price)
            .bind(current.price)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(ProductUpdate { previous, current }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("DELETE FROM products WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }
}
