// src/services/menu_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::store::{MenuEntity, MenuStore},
    menu::{
        reorder::{plan_move, Direction, Ordered},
        selection::ComplementLookup,
    },
    models::menu::{
        validate_not_negative, Category, CategoryPayload, ComplementGroup, ComplementItem,
        ComplementPayload, GroupPayload, Product, ProductComplementGroup, ProductGroup,
        ProductPayload, ProductSpecificComplement,
    },
};

#[derive(Clone)]
pub struct MenuService {
    store: Arc<dyn MenuStore>,
}

impl MenuService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    /// Buscas dependentes do painel, já presas ao dono.
    pub fn lookup_for(&self, owner: Uuid) -> MenuLookup {
        MenuLookup { service: self.clone(), owner }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, AppError> {
        self.store.list_categories(owner).await
    }

    pub async fn create_category(&self, owner: Uuid, input: &CategoryPayload) -> Result<Category, AppError> {
        input.validate()?;
        let category = self.store.insert_category(owner, input).await?;
        tracing::info!("Categoria criada: {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update_category(&self, owner: Uuid, id: Uuid, input: &CategoryPayload) -> Result<Category, AppError> {
        input.validate()?;
        self.store
            .update_category(owner, id, input)
            .await?
            .ok_or(AppError::NotFound("Categoria"))
    }

    pub async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_category(owner, id).await? {
            return Err(AppError::NotFound("Categoria"));
        }
        Ok(())
    }

    pub async fn move_category(&self, owner: Uuid, id: Uuid, direction: Direction) -> Result<Vec<(Uuid, i32)>, AppError> {
        let siblings = self.store.list_categories(owner).await?;
        self.apply_move(owner, MenuEntity::Category, &siblings, id, direction, "Categoria")
            .await
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self, owner: Uuid, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        self.store.list_products(owner, category_id).await
    }

    pub async fn create_product(&self, owner: Uuid, input: &ProductPayload) -> Result<Product, AppError> {
        input.validate()?;
        self.store
            .insert_product(owner, input)
            .await?
            .ok_or(AppError::NotFound("Categoria"))
    }

    pub async fn update_product(&self, owner: Uuid, id: Uuid, input: &ProductPayload) -> Result<Product, AppError> {
        input.validate()?;
        self.store
            .update_product(owner, id, input)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn set_product_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Product, AppError> {
        self.store
            .set_product_active(owner, id, active)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn delete_product(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_product(owner, id).await? {
            return Err(AppError::NotFound("Produto"));
        }
        Ok(())
    }

    /// Produtos se movem dentro da própria categoria.
    pub async fn move_product(&self, owner: Uuid, id: Uuid, direction: Direction) -> Result<Vec<(Uuid, i32)>, AppError> {
        let all = self.store.list_products(owner, None).await?;
        let category_id = all
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.category_id)
            .ok_or(AppError::NotFound("Produto"))?;
        let siblings: Vec<Product> = all.into_iter().filter(|p| p.category_id == category_id).collect();
        self.apply_move(owner, MenuEntity::Product, &siblings, id, direction, "Produto")
            .await
    }

    // ---
    // Grupos de complementos
    // ---

    pub async fn list_groups(&self, owner: Uuid) -> Result<Vec<ComplementGroup>, AppError> {
        self.store.list_groups(owner).await
    }

    pub async fn create_group(&self, owner: Uuid, input: &GroupPayload) -> Result<ComplementGroup, AppError> {
        input.validate()?;
        let group = self.store.insert_group(owner, input).await?;
        tracing::info!("Grupo de complementos criado: {} ({})", group.name, group.id);
        Ok(group)
    }

    pub async fn update_group(&self, owner: Uuid, id: Uuid, input: &GroupPayload) -> Result<ComplementGroup, AppError> {
        input.validate()?;
        self.store
            .update_group(owner, id, input)
            .await?
            .ok_or(AppError::NotFound("Grupo de complementos"))
    }

    pub async fn set_group_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<ComplementGroup, AppError> {
        self.store
            .set_group_active(owner, id, active)
            .await?
            .ok_or(AppError::NotFound("Grupo de complementos"))
    }

    pub async fn delete_group(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_group(owner, id).await? {
            return Err(AppError::NotFound("Grupo de complementos"));
        }
        Ok(())
    }

    pub async fn move_group(&self, owner: Uuid, id: Uuid, direction: Direction) -> Result<Vec<(Uuid, i32)>, AppError> {
        let siblings = self.store.list_groups(owner).await?;
        self.apply_move(owner, MenuEntity::ComplementGroup, &siblings, id, direction, "Grupo de complementos")
            .await
    }

    // ---
    // Vínculos produto <-> grupo
    // ---

    pub async fn list_product_groups(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError> {
        self.store.list_product_groups(owner, product_id).await
    }

    pub async fn link_group(
        &self,
        owner: Uuid,
        product_id: Uuid,
        group_id: Uuid,
        is_required: bool,
    ) -> Result<ProductGroup, AppError> {
        self.store
            .link_group(owner, product_id, group_id, is_required)
            .await?
            .ok_or(AppError::NotFound("Produto ou grupo"))
    }

    pub async fn set_link_required(
        &self,
        owner: Uuid,
        link_id: Uuid,
        is_required: bool,
    ) -> Result<ProductComplementGroup, AppError> {
        self.store
            .set_link_required(owner, link_id, is_required)
            .await?
            .ok_or(AppError::NotFound("Vínculo"))
    }

    pub async fn unlink_group(&self, owner: Uuid, link_id: Uuid) -> Result<(), AppError> {
        if !self.store.unlink_group(owner, link_id).await? {
            return Err(AppError::NotFound("Vínculo"));
        }
        Ok(())
    }

    pub async fn move_product_group(
        &self,
        owner: Uuid,
        product_id: Uuid,
        link_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<(Uuid, i32)>, AppError> {
        let siblings = self.store.list_product_groups(owner, product_id).await?;
        self.apply_move(owner, MenuEntity::ProductGroup, &siblings, link_id, direction, "Vínculo")
            .await
    }

    // ---
    // Itens de complemento
    // ---

    pub async fn list_complements(&self, owner: Uuid, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError> {
        self.store.list_complements(owner, group_id).await
    }

    pub async fn create_complement(
        &self,
        owner: Uuid,
        group_id: Uuid,
        input: &ComplementPayload,
    ) -> Result<ComplementItem, AppError> {
        input.validate()?;
        self.store
            .insert_complement(owner, group_id, input)
            .await?
            .ok_or(AppError::NotFound("Grupo de complementos"))
    }

    pub async fn update_complement(&self, owner: Uuid, id: Uuid, input: &ComplementPayload) -> Result<ComplementItem, AppError> {
        input.validate()?;
        self.store
            .update_complement(owner, id, input)
            .await?
            .ok_or(AppError::NotFound("Complemento"))
    }

    pub async fn set_complement_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<ComplementItem, AppError> {
        self.store
            .set_complement_active(owner, id, active)
            .await?
            .ok_or(AppError::NotFound("Complemento"))
    }

    pub async fn delete_complement(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_complement(owner, id).await? {
            return Err(AppError::NotFound("Complemento"));
        }
        Ok(())
    }

    pub async fn move_complement(&self, owner: Uuid, id: Uuid, direction: Direction) -> Result<Vec<(Uuid, i32)>, AppError> {
        let item = self
            .store
            .find_complement(owner, id)
            .await?
            .ok_or(AppError::NotFound("Complemento"))?;
        let siblings = self.store.list_complements(owner, item.group_id).await?;
        self.apply_move(owner, MenuEntity::ComplementItem, &siblings, id, direction, "Complemento")
            .await
    }

    // ---
    // Preço específico por produto
    // ---

    pub async fn list_price_overrides(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductSpecificComplement>, AppError> {
        self.store.list_price_overrides(owner, product_id).await
    }

    /// Define o preço do complemento para um produto.
    /// Uma única escrita atômica: cria a linha na primeira vez e atualiza nas seguintes.
    pub async fn update_complement_price(
        &self,
        owner: Uuid,
        product_id: Uuid,
        complement_id: Uuid,
        custom_price: Decimal,
    ) -> Result<ProductSpecificComplement, AppError> {
        validate_not_negative(&custom_price).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("customPrice", e);
            AppError::ValidationError(errors)
        })?;

        // O grupo dono do complemento vai junto na linha
        let complement = self
            .store
            .find_complement(owner, complement_id)
            .await?
            .ok_or(AppError::NotFound("Complemento"))?;

        self.store
            .upsert_price_override(owner, product_id, complement_id, complement.group_id, custom_price)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    // ---
    // Ordenação
    // ---

    async fn apply_move<T: Ordered>(
        &self,
        owner: Uuid,
        entity: MenuEntity,
        siblings: &[T],
        id: Uuid,
        direction: Direction,
        label: &'static str,
    ) -> Result<Vec<(Uuid, i32)>, AppError> {
        if !siblings.iter().any(|s| s.order_id() == id) {
            return Err(AppError::NotFound(label));
        }
        // Já está na ponta: nada a fazer
        let Some(changes) = plan_move(siblings, id, direction) else {
            return Ok(Vec::new());
        };
        self.store.set_display_orders(owner, entity, &changes).await?;
        Ok(changes)
    }
}

/// `ComplementLookup` sobre o serviço, para alimentar a seleção em cascata.
#[derive(Clone)]
pub struct MenuLookup {
    service: MenuService,
    owner: Uuid,
}

#[async_trait]
impl ComplementLookup for MenuLookup {
    async fn groups_by_product(&self, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError> {
        self.service.list_product_groups(self.owner, product_id).await
    }

    async fn complements_by_group(&self, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError> {
        self.service.list_complements(self.owner, group_id).await
    }
}
