// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Resource},
    db::{CategoryDeletion, IdentityStore, InventoryStore},
    models::{
        auth::{Administrator, Identity, NewWorkforceMember, WorkforceMember},
        inventory::{
            Category, CategoryStats, PriceHistory, Product, ProductDetails, ProductInput,
            ProductUpdate,
        },
    },
};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: Vec<Identity>,
    categories: HashMap<Uuid, Category>,
    // insertion order doubles as the tie-breaker for equal timestamps
    products: Vec<Product>,
    price_history: Vec<PriceHistory>,
}

impl MemoryState {
    fn account_name(&self, id: Option<Uuid>) -> Option<String> {
        let id = id?;
        self.accounts.iter().find(|a| a.id() == id).map(|a| match a {
            Identity::Administrator(admin) => admin.full_name.clone(),
            Identity::WorkforceMember(member) => member.full_name.clone(),
        })
    }

    fn details(&self, product: &Product) -> ProductDetails {
        ProductDetails {
            category_name: product
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(|c| c.name.clone()),
            created_by_name: self.account_name(product.created_by),
            updated_by_name: self.account_name(product.updated_by),
            product: product.clone(),
        }
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), AppError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => {
                Err(AppError::NotFound(Resource::Category))
            }
            _ => Ok(()),
        }
    }

    // Newest first, later inserts win ties.
    fn newest_first(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.iter().rev().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }
}

/// Process-local store with the same contracts as the Postgres repositories.
///
/// Every operation takes the lock once, so check-then-write sequences are
/// atomic with respect to each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.username() == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.id() == id).cloned())
    }

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<Administrator, AppError> {
        let mut state = self.state.write().await;
        if state.accounts.iter().any(|a| a.username() == username) {
            return Err(AppError::DuplicateUsername);
        }

        let now = Utc::now();
        let admin = Administrator {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            full_name: full_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(Identity::Administrator(admin.clone()));
        Ok(admin)
    }

    async fn create_workforce_member(
        &self,
        member: NewWorkforceMember,
    ) -> Result<WorkforceMember, AppError> {
        let mut state = self.state.write().await;

        if state.accounts.iter().any(|a| a.username() == member.username) {
            return Err(AppError::DuplicateUsername);
        }
        let code_taken = state.accounts.iter().any(|a| match a {
            Identity::WorkforceMember(w) => w.nisn == member.nisn,
            Identity::Administrator(_) => false,
        });
        if code_taken {
            return Err(AppError::DuplicateCode);
        }

        let now = Utc::now();
        let created = WorkforceMember {
            id: Uuid::new_v4(),
            nisn: member.nisn,
            username: member.username,
            password_hash: member.password_hash,
            full_name: member.full_name,
            phone: member.phone,
            address: member.address,
            class: member.class,
            major: member.major,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(Identity::WorkforceMember(created.clone()));
        Ok(created)
    }

    async fn list_workforce_members(&self) -> Result<Vec<WorkforceMember>, AppError> {
        let state = self.state.read().await;
        let mut members: Vec<WorkforceMember> = state
            .accounts
            .iter()
            .filter_map(|a| match a {
                Identity::WorkforceMember(w) => Some(w.clone()),
                Identity::Administrator(_) => None,
            })
            .collect();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(members)
    }

    async fn set_workforce_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<WorkforceMember>, AppError> {
        let mut state = self.state.write().await;
        let member = state.accounts.iter_mut().find_map(|a| match a {
            Identity::WorkforceMember(w) if w.id == id => Some(w),
            _ => None,
        });

        Ok(member.map(|w| {
            w.is_active = active;
            w.updated_at = Utc::now();
            w.clone()
        }))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        let mut state = self.state.write().await;
        if state.name_taken(name, None) {
            return Err(AppError::CategoryNameTaken);
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Option<Category>, AppError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Ok(None);
        }
        if state.name_taken(name, Some(id)) {
            return Err(AppError::CategoryNameTaken);
        }

        Ok(state.categories.get_mut(&id).map(|c| {
            c.name = name.to_string();
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_category_guarded(&self, id: Uuid) -> Result<CategoryDeletion, AppError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Ok(CategoryDeletion::NotFound);
        }

        let count = state
            .products
            .iter()
            .filter(|p| p.category_id == Some(id))
            .count() as i64;
        if count > 0 {
            return Ok(CategoryDeletion::InUse(count));
        }

        state.categories.remove(&id);
        Ok(CategoryDeletion::Deleted)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStats>, AppError> {
        let state = self.state.read().await;
        let mut stats: Vec<CategoryStats> = state
            .categories
            .values()
            .map(|c| {
                let prices: Vec<Decimal> = state
                    .products
                    .iter()
                    .filter(|p| p.category_id == Some(c.id))
                    .map(|p| p.price)
                    .collect();
                let total_stock: i64 = state
                    .products
                    .iter()
                    .filter(|p| p.category_id == Some(c.id))
                    .map(|p| i64::from(p.qty))
                    .sum();

                let count = prices.len() as i64;
                let avg_price = if count == 0 {
                    Decimal::ZERO
                } else {
                    (prices.iter().sum::<Decimal>() / Decimal::from(count)).round_dp(2)
                };

                CategoryStats {
                    id: c.id,
                    name: c.name.clone(),
                    product_count: count,
                    total_stock,
                    avg_price,
                    min_price: prices.iter().min().copied().unwrap_or(Decimal::ZERO),
                    max_price: prices.iter().max().copied().unwrap_or(Decimal::ZERO),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stats)
    }

    async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<ProductDetails>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|p| category_id.is_none() || p.category_id == category_id)
            .map(|p| state.details(p))
            .collect())
    }

    async fn products_in_category(&self, category_id: Uuid) -> Result<Vec<ProductDetails>, AppError> {
        let state = self.state.read().await;
        let mut products: Vec<ProductDetails> = state
            .products
            .iter()
            .filter(|p| p.category_id == Some(category_id))
            .map(|p| state.details(p))
            .collect();
        products.sort_by(|a, b| a.product.name.cmp(&b.product.name));
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductDetails>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.details(p)))
    }

    async fn create_product(&self, input: &ProductInput, actor: Uuid) -> Result<Product, AppError> {
        let mut state = self.state.write().await;
        state.ensure_category(input.category_id)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            category_id: input.category_id,
            qty: input.qty,
            supplier: input.supplier.clone(),
            price: input.price,
            picture_url: input.picture_url.clone(),
            status: input.status.clone(),
            exp_date: input.exp_date,
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product_audited(
        &self,
        id: Uuid,
        input: &ProductInput,
        actor: Uuid,
    ) -> Result<Option<ProductUpdate>, AppError> {
        let mut state = self.state.write().await;
        // product first, matching the row lock order in Postgres
        if !state.products.iter().any(|p| p.id == id) {
            return Ok(None);
        }
        state.ensure_category(input.category_id)?;

        let Some(slot) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let previous = slot.clone();
        let now = Utc::now();
        slot.name = input.name.clone();
        slot.category_id = input.category_id;
        slot.qty = input.qty;
        slot.supplier = input.supplier.clone();
        slot.price = input.price;
        slot.picture_url = input.picture_url.clone();
        slot.status = input.status.clone();
        slot.exp_date = input.exp_date;
        slot.updated_by = Some(actor);
        slot.updated_at = now;
        let current = slot.clone();

        if previous.price != current.price {
            state.price_history.push(PriceHistory {
                id: Uuid::new_v4(),
                product_id: id,
                old_price: previous.price,
                new_price: current.price,
                changed_by: Some(actor),
                changed_by_name: None,
                changed_at: now,
            });
        }

        Ok(Some(ProductUpdate { previous, current }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let mut state = self.state.write().await;
        let position = state.products.iter().position(|p| p.id == id);
        Ok(position.map(|i| state.products.remove(i)))
    }

    async fn low_stock(&self, threshold: i32) -> Result<Vec<ProductDetails>, AppError> {
        let state = self.state.read().await;
        let mut products: Vec<&Product> =
            state.products.iter().filter(|p| p.qty <= threshold).collect();
        products.sort_by(|a, b| a.qty.cmp(&b.qty).then_with(|| a.name.cmp(&b.name)));
        Ok(products.into_iter().map(|p| state.details(p)).collect())
    }

    async fn expired(&self, today: NaiveDate) -> Result<Vec<ProductDetails>, AppError> {
        let state = self.state.read().await;
        let mut products: Vec<&Product> = state
            .products
            .iter()
            .filter(|p| p.is_expired(today))
            .collect();
        // NULL dates last, like `ORDER BY exp_date ASC NULLS LAST`
        products.sort_by(|a, b| {
            match (a.exp_date, b.exp_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.name.cmp(&b.name))
        });
        Ok(products.into_iter().map(|p| state.details(p)).collect())
    }

    async fn price_history(&self, product_id: Uuid) -> Result<Vec<PriceHistory>, AppError> {
        let state = self.state.read().await;
        let mut history: Vec<PriceHistory> = state
            .price_history
            .iter()
            .rev()
            .filter(|h| h.product_id == product_id)
            .map(|h| PriceHistory {
                changed_by_name: state.account_name(h.changed_by),
                ..h.clone()
            })
            .collect();
        history.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(history)
    }
}
