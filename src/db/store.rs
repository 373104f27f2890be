// src/db/store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        billing::{PlanType, Subscription, SubscriptionStatus},
        menu::{
            Category, CategoryPayload, ComplementGroup, ComplementItem, ComplementPayload,
            GroupPayload, Product, ProductComplementGroup, ProductGroup, ProductPayload,
            ProductSpecificComplement,
        },
    },
};

/// Tabelas do cardápio que têm a coluna `display_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntity {
    Category,
    Product,
    ComplementGroup,
    ProductGroup,
    ComplementItem,
}

// ---
// Cardápio
// ---
// Todas as operações recebem o dono (user_id). `None` significa que a linha
// não existe ou não pertence a ele.
#[async_trait]
pub trait MenuStore: Send + Sync {
    // Categorias
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, AppError>;
    async fn insert_category(&self, owner: Uuid, input: &CategoryPayload) -> Result<Category, AppError>;
    async fn update_category(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &CategoryPayload,
    ) -> Result<Option<Category>, AppError>;
    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    // Produtos
    async fn list_products(&self, owner: Uuid, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError>;
    async fn insert_product(&self, owner: Uuid, input: &ProductPayload) -> Result<Option<Product>, AppError>;
    async fn update_product(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &ProductPayload,
    ) -> Result<Option<Product>, AppError>;
    async fn set_product_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<Product>, AppError>;
    async fn delete_product(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    // Grupos de complementos
    async fn list_groups(&self, owner: Uuid) -> Result<Vec<ComplementGroup>, AppError>;
    async fn insert_group(&self, owner: Uuid, input: &GroupPayload) -> Result<ComplementGroup, AppError>;
    async fn update_group(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &GroupPayload,
    ) -> Result<Option<ComplementGroup>, AppError>;
    async fn set_group_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementGroup>, AppError>;
    async fn delete_group(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    // Vínculos produto <-> grupo
    async fn list_product_groups(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError>;
    async fn link_group(
        &self,
        owner: Uuid,
        product_id: Uuid,
        group_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductGroup>, AppError>;
    async fn set_link_required(
        &self,
        owner: Uuid,
        link_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductComplementGroup>, AppError>;
    async fn unlink_group(&self, owner: Uuid, link_id: Uuid) -> Result<bool, AppError>;

    // Itens de complemento
    async fn list_complements(&self, owner: Uuid, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError>;
    async fn find_complement(&self, owner: Uuid, id: Uuid) -> Result<Option<ComplementItem>, AppError>;
    async fn insert_complement(
        &self,
        owner: Uuid,
        group_id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError>;
    async fn update_complement(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError>;
    async fn set_complement_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementItem>, AppError>;
    async fn delete_complement(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    // Preços específicos por produto
    async fn list_price_overrides(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductSpecificComplement>, AppError>;

    /// Insere ou atualiza, de forma atômica, o preço do complemento para o produto.
    async fn upsert_price_override(
        &self,
        owner: Uuid,
        product_id: Uuid,
        complement_id: Uuid,
        group_id: Uuid,
        custom_price: Decimal,
    ) -> Result<Option<ProductSpecificComplement>, AppError>;

    // Ordenação: aplica todas as posições numa única transação
    async fn set_display_orders(
        &self,
        owner: Uuid,
        entity: MenuEntity,
        orders: &[(Uuid, i32)],
    ) -> Result<(), AppError>;
}

// ---
// Assinaturas
// ---
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError>;

    async fn refresh_status(
        &self,
        user_id: Uuid,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError>;

    /// Upsert da linha pendente criada junto com a sessão de checkout (chave: user_id).
    async fn upsert_pending(
        &self,
        user_id: Uuid,
        stripe_customer_id: &str,
        plan_type: PlanType,
    ) -> Result<Subscription, AppError>;

    /// Checkout concluído: anexa a assinatura e marca como ativa.
    /// Procura pelo usuário quando conhecido, senão pelo cliente da Stripe.
    async fn activate_from_checkout(
        &self,
        user_id: Option<Uuid>,
        stripe_customer_id: Option<&str>,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, AppError>;

    async fn mirror_provider_status(
        &self,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_email(&self, user_id: Uuid) -> Result<Option<String>, AppError>;
}
