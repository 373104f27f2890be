// src/menu/actions.rs
//
// Ações de edição do painel. Cada operação faz uma escrita pelo MenuService,
// aplica a mesma mudança na cópia local e avisa quem está operando.
// Em caso de erro a cópia local fica como estava.

use std::{collections::HashMap, sync::Arc};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    menu::reorder::{apply_orders, Direction},
    models::menu::{ComplementGroup, ComplementItem, ComplementPayload, GroupPayload, ProductGroup},
    notify::{Notice, Notifier, TracingNotifier},
    services::menu_service::MenuService,
};

fn require(id: Option<Uuid>, message: &str) -> Result<Uuid, AppError> {
    id.ok_or_else(|| AppError::InvalidInput(message.to_string()))
}

// Emite o aviso correspondente e devolve o resultado intacto
fn report<T>(notifier: &dyn Notifier, result: Result<T, AppError>, success: &str) -> Result<T, AppError> {
    match &result {
        Ok(_) => notifier.notify(Notice::Success(success.to_string())),
        Err(e) => notifier.notify(Notice::Error(e.to_string())),
    }
    result
}

// ---
// Grupos vinculados a um produto
// ---

pub struct GroupActions {
    service: MenuService,
    notifier: Arc<dyn Notifier>,
    owner: Uuid,
    product_id: Option<Uuid>,
    groups: Vec<ProductGroup>,
}

impl GroupActions {
    pub fn new(service: MenuService, notifier: Arc<dyn Notifier>, owner: Uuid, product_id: Option<Uuid>) -> Self {
        Self { service, notifier, owner, product_id, groups: Vec::new() }
    }

    /// Avisos vão para o log.
    pub fn logged(service: MenuService, owner: Uuid, product_id: Option<Uuid>) -> Self {
        Self::new(service, Arc::new(TracingNotifier), owner, product_id)
    }

    pub fn groups(&self) -> &[ProductGroup] {
        &self.groups
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        let product_id = require(self.product_id, "Selecione um produto.")?;
        match self.service.list_product_groups(self.owner, product_id).await {
            Ok(groups) => {
                self.groups = groups;
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn link_group(&mut self, group_id: Option<Uuid>, is_required: bool) -> Result<(), AppError> {
        let product_id = require(self.product_id, "Selecione um produto.")?;
        let group_id = require(group_id, "Selecione um grupo.")?;

        let result = self.service.link_group(self.owner, product_id, group_id, is_required).await;
        let linked = report(self.notifier.as_ref(), result, "Grupo vinculado ao produto.")?;
        self.groups.push(linked);
        Ok(())
    }

    pub async fn unlink_group(&mut self, link_id: Uuid) -> Result<(), AppError> {
        let result = self.service.unlink_group(self.owner, link_id).await;
        report(self.notifier.as_ref(), result, "Grupo desvinculado do produto.")?;
        self.groups.retain(|g| g.link_id != link_id);
        Ok(())
    }

    pub async fn toggle_required(&mut self, link_id: Uuid) -> Result<(), AppError> {
        let current = self
            .groups
            .iter()
            .find(|g| g.link_id == link_id)
            .map(|g| g.is_required)
            .ok_or(AppError::NotFound("Vínculo"))?;

        let result = self.service.set_link_required(self.owner, link_id, !current).await;
        let link = report(self.notifier.as_ref(), result, "Obrigatoriedade atualizada.")?;
        if let Some(group) = self.groups.iter_mut().find(|g| g.link_id == link_id) {
            group.is_required = link.is_required;
        }
        Ok(())
    }

    pub async fn move_group(&mut self, link_id: Uuid, direction: Direction) -> Result<(), AppError> {
        let product_id = require(self.product_id, "Selecione um produto.")?;
        let result = self
            .service
            .move_product_group(self.owner, product_id, link_id, direction)
            .await;
        let changes = report(self.notifier.as_ref(), result, "Ordem atualizada.")?;
        apply_orders(&mut self.groups, &changes);
        Ok(())
    }
}

// ---
// Itens de um grupo (e preços específicos do produto atual)
// ---

pub struct ComplementActions {
    service: MenuService,
    notifier: Arc<dyn Notifier>,
    owner: Uuid,
    group_id: Option<Uuid>,
    product_id: Option<Uuid>,
    complements: Vec<ComplementItem>,
    // complement_id -> preço específico
    overrides: HashMap<Uuid, Decimal>,
}

impl ComplementActions {
    pub fn new(
        service: MenuService,
        notifier: Arc<dyn Notifier>,
        owner: Uuid,
        group_id: Option<Uuid>,
        product_id: Option<Uuid>,
    ) -> Self {
        Self {
            service,
            notifier,
            owner,
            group_id,
            product_id,
            complements: Vec::new(),
            overrides: HashMap::new(),
        }
    }

    pub fn logged(service: MenuService, owner: Uuid, group_id: Option<Uuid>, product_id: Option<Uuid>) -> Self {
        Self::new(service, Arc::new(TracingNotifier), owner, group_id, product_id)
    }

    pub fn complements(&self) -> &[ComplementItem] {
        &self.complements
    }

    pub fn override_for(&self, complement_id: Uuid) -> Option<Decimal> {
        self.overrides.get(&complement_id).copied()
    }

    /// Preço cobrado no produto atual: o específico, se houver, senão o do item.
    pub fn effective_price(&self, complement_id: Uuid) -> Option<Decimal> {
        self.override_for(complement_id).or_else(|| {
            self.complements
                .iter()
                .find(|c| c.id == complement_id)
                .map(|c| c.price)
        })
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        let group_id = require(self.group_id, "Selecione um grupo.")?;
        let loaded = async {
            let complements = self.service.list_complements(self.owner, group_id).await?;
            let overrides = match self.product_id {
                Some(product_id) => self.service.list_price_overrides(self.owner, product_id).await?,
                None => Vec::new(),
            };
            Ok::<_, AppError>((complements, overrides))
        }
        .await;

        match loaded {
            Ok((complements, overrides)) => {
                self.complements = complements;
                self.overrides = overrides
                    .into_iter()
                    .filter(|o| o.group_id == group_id)
                    .map(|o| (o.complement_id, o.custom_price))
                    .collect();
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, input: &ComplementPayload) -> Result<(), AppError> {
        let group_id = require(self.group_id, "Selecione um grupo.")?;
        let result = self.service.create_complement(self.owner, group_id, input).await;
        let item = report(self.notifier.as_ref(), result, "Complemento criado.")?;
        self.complements.push(item);
        Ok(())
    }

    pub async fn update(&mut self, id: Uuid, input: &ComplementPayload) -> Result<(), AppError> {
        let result = self.service.update_complement(self.owner, id, input).await;
        let item = report(self.notifier.as_ref(), result, "Complemento atualizado.")?;
        if let Some(slot) = self.complements.iter_mut().find(|c| c.id == id) {
            *slot = item;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), AppError> {
        let result = self.service.delete_complement(self.owner, id).await;
        report(self.notifier.as_ref(), result, "Complemento excluído.")?;
        self.complements.retain(|c| c.id != id);
        self.overrides.remove(&id);
        Ok(())
    }

    pub async fn toggle_active(&mut self, id: Uuid) -> Result<(), AppError> {
        let current = self
            .complements
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.is_active)
            .ok_or(AppError::NotFound("Complemento"))?;

        let result = self.service.set_complement_active(self.owner, id, !current).await;
        let item = report(self.notifier.as_ref(), result, "Status do complemento atualizado.")?;
        if let Some(slot) = self.complements.iter_mut().find(|c| c.id == id) {
            slot.is_active = item.is_active;
        }
        Ok(())
    }

    pub async fn update_complement_price(&mut self, complement_id: Uuid, custom_price: Decimal) -> Result<(), AppError> {
        let product_id = require(self.product_id, "Selecione um produto.")?;
        let result = self
            .service
            .update_complement_price(self.owner, product_id, complement_id, custom_price)
            .await;
        let row = report(self.notifier.as_ref(), result, "Preço do complemento atualizado.")?;
        self.overrides.insert(row.complement_id, row.custom_price);
        Ok(())
    }

    pub async fn move_complement(&mut self, id: Uuid, direction: Direction) -> Result<(), AppError> {
        let result = self.service.move_complement(self.owner, id, direction).await;
        let changes = report(self.notifier.as_ref(), result, "Ordem atualizada.")?;
        apply_orders(&mut self.complements, &changes);
        Ok(())
    }
}

// ---
// Cadastro de grupos
// ---

pub struct GroupConfiguration {
    service: MenuService,
    notifier: Arc<dyn Notifier>,
    owner: Uuid,
    groups: Vec<ComplementGroup>,
}

impl GroupConfiguration {
    pub fn new(service: MenuService, notifier: Arc<dyn Notifier>, owner: Uuid) -> Self {
        Self { service, notifier, owner, groups: Vec::new() }
    }

    pub fn logged(service: MenuService, owner: Uuid) -> Self {
        Self::new(service, Arc::new(TracingNotifier), owner)
    }

    pub fn groups(&self) -> &[ComplementGroup] {
        &self.groups
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        match self.service.list_groups(self.owner).await {
            Ok(groups) => {
                self.groups = groups;
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn create_group(&mut self, input: &GroupPayload) -> Result<ComplementGroup, AppError> {
        let result = self.service.create_group(self.owner, input).await;
        let group = report(self.notifier.as_ref(), result, "Grupo criado.")?;
        self.groups.push(group.clone());
        Ok(group)
    }

    pub async fn update_group(&mut self, id: Uuid, input: &GroupPayload) -> Result<(), AppError> {
        let result = self.service.update_group(self.owner, id, input).await;
        let group = report(self.notifier.as_ref(), result, "Grupo atualizado.")?;
        if let Some(slot) = self.groups.iter_mut().find(|g| g.id == id) {
            *slot = group;
        }
        Ok(())
    }

    pub async fn toggle_active(&mut self, id: Uuid) -> Result<(), AppError> {
        let current = self
            .groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.is_active)
            .ok_or(AppError::NotFound("Grupo de complementos"))?;

        let result = self.service.set_group_active(self.owner, id, !current).await;
        let group = report(self.notifier.as_ref(), result, "Status do grupo atualizado.")?;
        if let Some(slot) = self.groups.iter_mut().find(|g| g.id == id) {
            slot.is_active = group.is_active;
        }
        Ok(())
    }

    pub async fn delete_group(&mut self, id: Uuid) -> Result<(), AppError> {
        let result = self.service.delete_group(self.owner, id).await;
        report(self.notifier.as_ref(), result, "Grupo excluído.")?;
        self.groups.retain(|g| g.id != id);
        Ok(())
    }

    pub async fn move_group(&mut self, id: Uuid, direction: Direction) -> Result<(), AppError> {
        let result = self.service.move_group(self.owner, id, direction).await;
        let changes = report(self.notifier.as_ref(), result, "Ordem atualizada.")?;
        apply_orders(&mut self.groups, &changes);
        Ok(())
    }
}
