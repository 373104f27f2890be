// src/db/memory.rs
//
// Implementação em memória dos repositórios, usada nos testes.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{MenuEntity, MenuStore, ProfileStore, SubscriptionStore},
    models::{
        billing::{PlanType, Subscription, SubscriptionStatus},
        menu::{
            Category, CategoryPayload, ComplementGroup, ComplementItem, ComplementPayload,
            GroupPayload, Product, ProductComplementGroup, ProductGroup, ProductPayload,
            ProductSpecificComplement,
        },
    },
};

#[derive(Default)]
struct MenuTables {
    categories: Vec<Category>,
    products: Vec<Product>,
    groups: Vec<ComplementGroup>,
    links: Vec<ProductComplementGroup>,
    items: Vec<ComplementItem>,
    overrides: Vec<ProductSpecificComplement>,
}

impl MenuTables {
    fn owns_product(&self, owner: Uuid, id: Uuid) -> bool {
        self.products.iter().any(|p| p.id == id && p.user_id == owner)
    }

    fn owns_group(&self, owner: Uuid, id: Uuid) -> bool {
        self.groups.iter().any(|g| g.id == id && g.user_id == owner)
    }

    fn view(&self, link: &ProductComplementGroup) -> Option<ProductGroup> {
        let group = self.groups.iter().find(|g| g.id == link.group_id)?;
        Some(ProductGroup {
            link_id: link.id,
            product_id: link.product_id,
            group_id: group.id,
            name: group.name.clone(),
            group_type: group.group_type,
            minimum_quantity: group.minimum_quantity,
            maximum_quantity: group.maximum_quantity,
            is_required: link.is_required,
            is_active: group.is_active,
            display_order: link.display_order,
        })
    }
}

fn next_order<I: Iterator<Item = i32>>(orders: I) -> i32 {
    orders.max().map_or(0, |max| max + 1)
}

#[derive(Default)]
pub struct InMemoryMenuStore {
    tables: Mutex<MenuTables>,
    fail_writes: Mutex<bool>,
}

impl InMemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz as próximas escritas falharem, simulando o banco fora do ar.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn override_rows(&self) -> Vec<ProductSpecificComplement> {
        self.tables.lock().unwrap().overrides.clone()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl MenuStore for InMemoryMenuStore {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t.categories.iter().filter(|c| c.user_id == owner).cloned().collect();
        list.sort_by_key(|c| c.display_order);
        Ok(list)
    }

    async fn insert_category(&self, owner: Uuid, input: &CategoryPayload) -> Result<Category, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let category = Category {
            id: Uuid::new_v4(),
            user_id: owner,
            name: input.name.clone(),
            display_order: next_order(t.categories.iter().filter(|c| c.user_id == owner).map(|c| c.display_order)),
            created_at: Utc::now(),
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, owner: Uuid, id: Uuid, input: &CategoryPayload) -> Result<Option<Category>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        Ok(t.categories.iter_mut().find(|c| c.id == id && c.user_id == owner).map(|c| {
            c.name = input.name.clone();
            c.clone()
        }))
    }

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let before = t.categories.len();
        t.categories.retain(|c| !(c.id == id && c.user_id == owner));
        let deleted = t.categories.len() < before;
        if deleted {
            t.products.retain(|p| p.category_id != id);
        }
        Ok(deleted)
    }

    async fn list_products(&self, owner: Uuid, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t
            .products
            .iter()
            .filter(|p| p.user_id == owner && category_id.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect();
        list.sort_by_key(|p| p.display_order);
        Ok(list)
    }

    async fn insert_product(&self, owner: Uuid, input: &ProductPayload) -> Result<Option<Product>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        if !t.categories.iter().any(|c| c.id == input.category_id && c.user_id == owner) {
            return Ok(None);
        }
        let product = Product {
            id: Uuid::new_v4(),
            user_id: owner,
            category_id: input.category_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            is_active: input.is_active,
            display_order: next_order(
                t.products.iter().filter(|p| p.category_id == input.category_id).map(|p| p.display_order),
            ),
            stock_enabled: input.stock_enabled,
            stock_quantity: input.stock_quantity,
            half_half_pricing: input.half_half_pricing,
            created_at: Utc::now(),
        };
        t.products.push(product.clone());
        Ok(Some(product))
    }

    async fn update_product(&self, owner: Uuid, id: Uuid, input: &ProductPayload) -> Result<Option<Product>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        if !t.categories.iter().any(|c| c.id == input.category_id && c.user_id == owner) {
            return Ok(None);
        }
        Ok(t.products.iter_mut().find(|p| p.id == id && p.user_id == owner).map(|p| {
            p.category_id = input.category_id;
            p.name = input.name.clone();
            p.description = input.description.clone();
            p.price = input.price;
            p.is_active = input.is_active;
            p.stock_enabled = input.stock_enabled;
            p.stock_quantity = input.stock_quantity;
            p.half_half_pricing = input.half_half_pricing;
            p.clone()
        }))
    }

    async fn set_product_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<Product>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        Ok(t.products.iter_mut().find(|p| p.id == id && p.user_id == owner).map(|p| {
            p.is_active = active;
            p.clone()
        }))
    }

    async fn delete_product(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let before = t.products.len();
        t.products.retain(|p| !(p.id == id && p.user_id == owner));
        Ok(t.products.len() < before)
    }

    async fn list_groups(&self, owner: Uuid) -> Result<Vec<ComplementGroup>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t.groups.iter().filter(|g| g.user_id == owner).cloned().collect();
        list.sort_by_key(|g| g.display_order);
        Ok(list)
    }

    async fn insert_group(&self, owner: Uuid, input: &GroupPayload) -> Result<ComplementGroup, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let group = ComplementGroup {
            id: Uuid::new_v4(),
            user_id: owner,
            name: input.name.clone(),
            group_type: input.group_type,
            minimum_quantity: input.minimum_quantity,
            maximum_quantity: input.maximum_quantity,
            is_required: input.is_required,
            is_active: input.is_active,
            image_url: input.image_url.clone(),
            display_order: next_order(t.groups.iter().filter(|g| g.user_id == owner).map(|g| g.display_order)),
            created_at: Utc::now(),
        };
        t.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(&self, owner: Uuid, id: Uuid, input: &GroupPayload) -> Result<Option<ComplementGroup>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        Ok(t.groups.iter_mut().find(|g| g.id == id && g.user_id == owner).map(|g| {
            g.name = input.name.clone();
            g.group_type = input.group_type;
            g.minimum_quantity = input.minimum_quantity;
            g.maximum_quantity = input.maximum_quantity;
            g.is_required = input.is_required;
            g.is_active = input.is_active;
            g.image_url = input.image_url.clone();
            g.clone()
        }))
    }

    async fn set_group_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementGroup>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        Ok(t.groups.iter_mut().find(|g| g.id == id && g.user_id == owner).map(|g| {
            g.is_active = active;
            g.clone()
        }))
    }

    async fn delete_group(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let before = t.groups.len();
        t.groups.retain(|g| !(g.id == id && g.user_id == owner));
        let deleted = t.groups.len() < before;
        if deleted {
            t.links.retain(|l| l.group_id != id);
            t.items.retain(|i| i.group_id != id);
        }
        Ok(deleted)
    }

    async fn list_product_groups(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError> {
        let t = self.tables.lock().unwrap();
        if !t.owns_product(owner, product_id) {
            return Ok(Vec::new());
        }
        let mut list: Vec<_> = t
            .links
            .iter()
            .filter(|l| l.product_id == product_id)
            .filter_map(|l| t.view(l))
            .collect();
        list.sort_by_key(|g| g.display_order);
        Ok(list)
    }

    async fn link_group(
        &self,
        owner: Uuid,
        product_id: Uuid,
        group_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductGroup>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        if !t.owns_product(owner, product_id) || !t.owns_group(owner, group_id) {
            return Ok(None);
        }
        if t.links.iter().any(|l| l.product_id == product_id && l.group_id == group_id) {
            return Err(AppError::InvalidInput("Este grupo já está vinculado ao produto.".to_string()));
        }
        let link = ProductComplementGroup {
            id: Uuid::new_v4(),
            product_id,
            group_id,
            is_required,
            display_order: next_order(t.links.iter().filter(|l| l.product_id == product_id).map(|l| l.display_order)),
        };
        t.links.push(link.clone());
        Ok(t.view(&link))
    }

    async fn set_link_required(
        &self,
        owner: Uuid,
        link_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductComplementGroup>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned: Vec<Uuid> = t.products.iter().filter(|p| p.user_id == owner).map(|p| p.id).collect();
        Ok(t.links.iter_mut().find(|l| l.id == link_id && owned.contains(&l.product_id)).map(|l| {
            l.is_required = is_required;
            l.clone()
        }))
    }

    async fn unlink_group(&self, owner: Uuid, link_id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned: Vec<Uuid> = t.products.iter().filter(|p| p.user_id == owner).map(|p| p.id).collect();
        let before = t.links.len();
        t.links.retain(|l| !(l.id == link_id && owned.contains(&l.product_id)));
        Ok(t.links.len() < before)
    }

    async fn list_complements(&self, owner: Uuid, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError> {
        let t = self.tables.lock().unwrap();
        if !t.owns_group(owner, group_id) {
            return Ok(Vec::new());
        }
        let mut list: Vec<_> = t.items.iter().filter(|i| i.group_id == group_id).cloned().collect();
        list.sort_by_key(|i| i.display_order);
        Ok(list)
    }

    async fn find_complement(&self, owner: Uuid, id: Uuid) -> Result<Option<ComplementItem>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.items.iter().find(|i| i.id == id && t.owns_group(owner, i.group_id)).cloned())
    }

    async fn insert_complement(
        &self,
        owner: Uuid,
        group_id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        if !t.owns_group(owner, group_id) {
            return Ok(None);
        }
        let item = ComplementItem {
            id: Uuid::new_v4(),
            group_id,
            product_id: input.product_id,
            name: input.name.clone(),
            price: input.price,
            is_active: input.is_active,
            display_order: next_order(t.items.iter().filter(|i| i.group_id == group_id).map(|i| i.display_order)),
            created_at: Utc::now(),
        };
        t.items.push(item.clone());
        Ok(Some(item))
    }

    async fn update_complement(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned: Vec<Uuid> = t.groups.iter().filter(|g| g.user_id == owner).map(|g| g.id).collect();
        Ok(t.items.iter_mut().find(|i| i.id == id && owned.contains(&i.group_id)).map(|i| {
            i.name = input.name.clone();
            i.price = input.price;
            i.is_active = input.is_active;
            i.product_id = input.product_id;
            i.clone()
        }))
    }

    async fn set_complement_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementItem>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned: Vec<Uuid> = t.groups.iter().filter(|g| g.user_id == owner).map(|g| g.id).collect();
        Ok(t.items.iter_mut().find(|i| i.id == id && owned.contains(&i.group_id)).map(|i| {
            i.is_active = active;
            i.clone()
        }))
    }

    async fn delete_complement(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned: Vec<Uuid> = t.groups.iter().filter(|g| g.user_id == owner).map(|g| g.id).collect();
        let before = t.items.len();
        t.items.retain(|i| !(i.id == id && owned.contains(&i.group_id)));
        let deleted = t.items.len() < before;
        if deleted {
            t.overrides.retain(|o| o.complement_id != id);
        }
        Ok(deleted)
    }

    async fn list_price_overrides(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductSpecificComplement>, AppError> {
        let t = self.tables.lock().unwrap();
        if !t.owns_product(owner, product_id) {
            return Ok(Vec::new());
        }
        Ok(t.overrides.iter().filter(|o| o.product_id == product_id).cloned().collect())
    }

    async fn upsert_price_override(
        &self,
        owner: Uuid,
        product_id: Uuid,
        complement_id: Uuid,
        group_id: Uuid,
        custom_price: Decimal,
    ) -> Result<Option<ProductSpecificComplement>, AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        if !t.owns_product(owner, product_id) {
            return Ok(None);
        }
        if let Some(row) = t
            .overrides
            .iter_mut()
            .find(|o| o.product_id == product_id && o.complement_id == complement_id)
        {
            row.custom_price = custom_price;
            row.updated_at = Utc::now();
            return Ok(Some(row.clone()));
        }
        let row = ProductSpecificComplement {
            id: Uuid::new_v4(),
            product_id,
            complement_id,
            group_id,
            custom_price,
            is_active: true,
            updated_at: Utc::now(),
        };
        t.overrides.push(row.clone());
        Ok(Some(row))
    }

    async fn set_display_orders(&self, owner: Uuid, entity: MenuEntity, orders: &[(Uuid, i32)]) -> Result<(), AppError> {
        self.check_writable()?;
        let mut t = self.tables.lock().unwrap();
        let owned_products: Vec<Uuid> = t.products.iter().filter(|p| p.user_id == owner).map(|p| p.id).collect();
        let owned_groups: Vec<Uuid> = t.groups.iter().filter(|g| g.user_id == owner).map(|g| g.id).collect();
        for &(id, order) in orders {
            let slot = match entity {
                MenuEntity::Category => t
                    .categories
                    .iter_mut()
                    .find(|c| c.id == id && c.user_id == owner)
                    .map(|c| &mut c.display_order),
                MenuEntity::Product => t
                    .products
                    .iter_mut()
                    .find(|p| p.id == id && p.user_id == owner)
                    .map(|p| &mut p.display_order),
                MenuEntity::ComplementGroup => t
                    .groups
                    .iter_mut()
                    .find(|g| g.id == id && g.user_id == owner)
                    .map(|g| &mut g.display_order),
                MenuEntity::ProductGroup => t
                    .links
                    .iter_mut()
                    .find(|l| l.id == id && owned_products.contains(&l.product_id))
                    .map(|l| &mut l.display_order),
                MenuEntity::ComplementItem => t
                    .items
                    .iter_mut()
                    .find(|i| i.id == id && owned_groups.contains(&i.group_id))
                    .map(|i| &mut i.display_order),
            };
            match slot {
                Some(slot) => *slot = order,
                None => return Err(AppError::NotFound("Item do cardápio")),
            }
        }
        Ok(())
    }
}

// ---
// Assinaturas
// ---

#[derive(Default)]
pub struct InMemorySubscriptionStore {
    rows: Mutex<HashMap<Uuid, Subscription>>,
    calls: AtomicUsize,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, subscription: Subscription) {
        self.rows.lock().unwrap().insert(subscription.user_id, subscription);
    }

    pub fn get(&self, user_id: Uuid) -> Option<Subscription> {
        self.rows.lock().unwrap().get(&user_id).cloned()
    }

    /// Quantas operações chegaram ao repositório.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError> {
        self.touch();
        Ok(self.get(user_id))
    }

    async fn refresh_status(
        &self,
        user_id: Uuid,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&user_id).map(|row| {
            row.status = status;
            row.current_period_end = current_period_end;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn upsert_pending(
        &self,
        user_id: Uuid,
        stripe_customer_id: &str,
        plan_type: PlanType,
    ) -> Result<Subscription, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let row = rows.entry(user_id).or_insert_with(|| Subscription {
            id: Uuid::new_v4(),
            user_id,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            status: SubscriptionStatus::Pending,
            plan_type: None,
            current_period_end: None,
            created_at: now,
            updated_at: now,
        });
        row.stripe_customer_id = Some(stripe_customer_id.to_string());
        row.status = SubscriptionStatus::Pending;
        row.plan_type = Some(plan_type);
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn activate_from_checkout(
        &self,
        user_id: Option<Uuid>,
        stripe_customer_id: Option<&str>,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let row = match user_id {
            Some(user_id) => rows.get_mut(&user_id),
            None => rows
                .values_mut()
                .find(|r| stripe_customer_id.is_some() && r.stripe_customer_id.as_deref() == stripe_customer_id),
        };
        Ok(row.map(|row| {
            row.stripe_subscription_id = Some(stripe_subscription_id.to_string());
            row.status = SubscriptionStatus::Active;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn mirror_provider_status(
        &self,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .values_mut()
            .find(|r| r.stripe_subscription_id.as_deref() == Some(stripe_subscription_id))
            .map(|row| {
                row.status = status;
                if current_period_end.is_some() {
                    row.current_period_end = current_period_end;
                }
                row.updated_at = Utc::now();
                row.clone()
            }))
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    emails: Mutex<HashMap<Uuid, String>>,
}

impl InMemoryProfileStore {
    pub fn with_email(user_id: Uuid, email: &str) -> Self {
        let store = Self::default();
        store.emails.lock().unwrap().insert(user_id, email.to_string());
        store
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_email(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.emails.lock().unwrap().get(&user_id).cloned())
    }
}
