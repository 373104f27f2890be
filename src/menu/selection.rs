// src/menu/selection.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::menu::{ComplementItem, Product, ProductGroup},
};

/// Buscas dependentes disparadas pela seleção.
#[async_trait]
pub trait ComplementLookup: Send + Sync {
    async fn groups_by_product(&self, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError>;
    async fn complements_by_group(&self, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError>;
}

/// Identifica uma busca disparada. Só a mais recente de cada nível é aplicada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Level {
    current: u64,
}

impl Level {
    // Invalida qualquer busca em andamento e devolve o ticket da próxima
    fn bump(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}

/// Seleção em cascata categoria → produto → grupo do painel de ordenação.
pub struct MenuSelection<L> {
    lookup: L,
    products: Vec<Product>,

    active_category: Option<Uuid>,
    active_product: Option<Uuid>,
    active_group: Option<Uuid>,

    filtered_products: Vec<Product>,
    product_groups: Vec<ProductGroup>,
    group_complements: Vec<ComplementItem>,

    groups_level: Level,
    complements_level: Level,
}

impl<L: ComplementLookup> MenuSelection<L> {
    pub fn new(lookup: L, products: Vec<Product>) -> Self {
        Self {
            lookup,
            products,
            active_category: None,
            active_product: None,
            active_group: None,
            filtered_products: Vec::new(),
            product_groups: Vec::new(),
            group_complements: Vec::new(),
            groups_level: Level::default(),
            complements_level: Level::default(),
        }
    }

    pub fn active_category(&self) -> Option<Uuid> {
        self.active_category
    }

    pub fn active_product(&self) -> Option<Uuid> {
        self.active_product
    }

    pub fn active_group(&self) -> Option<Uuid> {
        self.active_group
    }

    pub fn filtered_products(&self) -> &[Product] {
        &self.filtered_products
    }

    pub fn product_groups(&self) -> &[ProductGroup] {
        &self.product_groups
    }

    pub fn group_complements(&self) -> &[ComplementItem] {
        &self.group_complements
    }

    /// Troca a lista de produtos (ex.: depois de um refetch) e refaz o filtro.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered_products = match self.active_category {
            Some(category_id) => self
                .products
                .iter()
                .filter(|p| p.category_id == category_id)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
    }

    fn clear_group(&mut self) {
        self.active_group = None;
        self.group_complements.clear();
        self.complements_level.bump();
    }

    fn clear_product(&mut self) {
        self.active_product = None;
        self.product_groups.clear();
        self.groups_level.bump();
        self.clear_group();
    }

    // ---
    // Categoria
    // ---

    /// Clicar de novo na categoria ativa limpa a seleção.
    pub fn select_category(&mut self, category_id: Uuid) {
        self.active_category = if self.active_category == Some(category_id) {
            None
        } else {
            Some(category_id)
        };
        self.clear_product();
        self.refilter();
    }

    // ---
    // Produto
    // ---

    /// Alterna o produto e devolve o ticket da busca de grupos, se houver uma a fazer.
    pub fn begin_select_product(&mut self, product_id: Uuid) -> Option<(Ticket, Uuid)> {
        let next = if self.active_product == Some(product_id) {
            None
        } else {
            Some(product_id)
        };
        self.clear_product();
        self.active_product = next;
        next.map(|id| (self.groups_level.bump(), id))
    }

    /// Aplica o resultado da busca de grupos. Devolve `false` se a resposta ficou obsoleta.
    pub fn apply_product_groups(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ProductGroup>, AppError>,
    ) -> bool {
        if !self.groups_level.is_current(ticket) {
            tracing::debug!("Resposta de grupos descartada (seleção mudou)");
            return false;
        }
        match result {
            Ok(groups) => self.product_groups = groups,
            Err(e) => {
                tracing::warn!("Falha ao carregar grupos do produto: {}", e);
                self.product_groups.clear();
            }
        }
        true
    }

    pub async fn select_product(&mut self, product_id: Uuid) {
        if let Some((ticket, id)) = self.begin_select_product(product_id) {
            let result = self.lookup.groups_by_product(id).await;
            self.apply_product_groups(ticket, result);
        }
    }

    // ---
    // Grupo
    // ---

    pub fn begin_select_group(&mut self, group_id: Uuid) -> Option<(Ticket, Uuid)> {
        let next = if self.active_group == Some(group_id) {
            None
        } else {
            Some(group_id)
        };
        self.clear_group();
        self.active_group = next;
        next.map(|id| (self.complements_level.bump(), id))
    }

    pub fn apply_group_complements(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ComplementItem>, AppError>,
    ) -> bool {
        if !self.complements_level.is_current(ticket) {
            tracing::debug!("Resposta de complementos descartada (seleção mudou)");
            return false;
        }
        match result {
            Ok(items) => self.group_complements = items,
            Err(e) => {
                tracing::warn!("Falha ao carregar complementos do grupo: {}", e);
                self.group_complements.clear();
            }
        }
        true
    }

    pub async fn select_group(&mut self, group_id: Uuid) {
        if let Some((ticket, id)) = self.begin_select_group(group_id) {
            let result = self.lookup.complements_by_group(id).await;
            self.apply_group_complements(ticket, result);
        }
    }
}
