// src/models/menu.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- 1. Enums do cardápio ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "complement_group_type", rename_all = "snake_case")] // Banco
#[serde(rename_all = "snake_case")] // JSON
pub enum GroupType {
    Ingredients,    // "ingredients"
    Specifications, // "specifications"
    CrossSell,      // "cross_sell"
    Disposables,    // "disposables"
}

/// Regra de preço para pizzas meio a meio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "half_half_pricing", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HalfHalfPricing {
    Highest, // Cobra o sabor mais caro
    Average, // Cobra a média dos sabores
}

// --- 2. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(ignore)] // O dono vem do token
    pub user_id: Uuid,
    #[schema(example = "Pizzas")]
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

// --- 3. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "Pizza Calabresa")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 49.9)]
    pub price: Decimal,
    pub is_active: bool,
    pub display_order: i32,

    // Controle de estoque (opcional)
    pub stock_enabled: bool,
    pub stock_quantity: Option<i32>,

    pub half_half_pricing: Option<HalfHalfPricing>,
    pub created_at: DateTime<Utc>,
}

// --- 4. Grupos de Complementos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplementGroup {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = "Adicionais")]
    pub name: String,
    pub group_type: GroupType,
    pub minimum_quantity: Option<i32>,
    pub maximum_quantity: Option<i32>,
    pub is_required: bool,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

// --- 5. Itens de Complemento ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplementItem {
    pub id: Uuid,
    pub group_id: Uuid,
    // Se preenchido, o item só aparece para este produto
    pub product_id: Option<Uuid>,
    #[schema(example = "Borda de Catupiry")]
    pub name: String,
    #[schema(example = 8.5)]
    pub price: Decimal,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

// --- 6. Vínculo Produto <-> Grupo ---
// Tabela 'product_complement_groups'.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductComplementGroup {
    pub id: Uuid,
    pub product_id: Uuid,
    pub group_id: Uuid,
    pub is_required: bool, // Sobrescreve o 'is_required' do grupo para este produto
    pub display_order: i32,
}

/// Visão do grupo já vinculado a um produto (JOIN do vínculo com o grupo).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductGroup {
    pub link_id: Uuid,
    pub product_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub group_type: GroupType,
    pub minimum_quantity: Option<i32>,
    pub maximum_quantity: Option<i32>,
    pub is_required: bool,
    pub is_active: bool,
    pub display_order: i32,
}

// --- 7. Preço específico de complemento por produto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecificComplement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub complement_id: Uuid,
    pub group_id: Uuid,
    pub custom_price: Decimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads (entrada)
// ---

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Bebidas")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub category_id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub stock_enabled: bool,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub stock_quantity: Option<i32>,

    pub half_half_pricing: Option<HalfHalfPricing>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub group_type: GroupType,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub minimum_quantity: Option<i32>,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub maximum_quantity: Option<i32>,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplementPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkGroupPayload {
    pub group_id: Uuid,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRequiredPayload {
    pub is_required: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActivePayload {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceOverridePayload {
    pub complement_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 5.0)]
    pub custom_price: Decimal,
}

// ---
// Nomes para exibição
// ---

/// Entidades que possuem um id e um nome legível.
pub trait Named {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty => $id:ident),* $(,)?) => {
        $(
            impl Named for $ty {
                fn id(&self) -> Uuid { self.$id }
                fn name(&self) -> &str { &self.name }
            }
        )*
    };
}

impl_named!(
    Category => id,
    Product => id,
    ComplementGroup => id,
    ComplementItem => id,
    ProductGroup => group_id,
);
