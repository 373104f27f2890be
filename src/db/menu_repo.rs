// src/db/menu_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{MenuEntity, MenuStore},
    models::menu::{
        Category, CategoryPayload, ComplementGroup, ComplementItem, ComplementPayload,
        GroupPayload, Product, ProductComplementGroup, ProductGroup, ProductPayload,
        ProductSpecificComplement,
    },
};

// Filtros de dono reaproveitados nas queries de itens e vínculos,
// que não têm user_id próprio.
const OWNED_GROUPS: &str = "SELECT id FROM complement_groups WHERE user_id = $1";
const OWNED_PRODUCTS: &str = "SELECT id FROM products WHERE user_id = $1";

const PRODUCT_GROUP_SELECT: &str = r#"
    SELECT pcg.id AS link_id, pcg.product_id, pcg.group_id, g.name, g.group_type,
           g.minimum_quantity, g.maximum_quantity, pcg.is_required, g.is_active,
           pcg.display_order
    FROM product_complement_groups pcg
    JOIN complement_groups g ON g.id = pcg.group_id
"#;

// O repositório do cardápio, responsável pelas tabelas de categorias, produtos e complementos
#[derive(Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_product_group(&self, link_id: Uuid) -> Result<Option<ProductGroup>, AppError> {
        let sql = format!("{} WHERE pcg.id = $1", PRODUCT_GROUP_SELECT);
        let row = sqlx::query_as::<_, ProductGroup>(&sql)
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

impl MenuEntity {
    fn table(self) -> &'static str {
        match self {
            MenuEntity::Category => "categories",
            MenuEntity::Product => "products",
            MenuEntity::ComplementGroup => "complement_groups",
            MenuEntity::ProductGroup => "product_complement_groups",
            MenuEntity::ComplementItem => "complement_items",
        }
    }

    // Predicado de dono, sempre com o user_id em $3
    fn owner_filter(self) -> &'static str {
        match self {
            MenuEntity::Category | MenuEntity::Product | MenuEntity::ComplementGroup => "user_id = $3",
            MenuEntity::ProductGroup => {
                "product_id IN (SELECT id FROM products WHERE user_id = $3)"
            }
            MenuEntity::ComplementItem => {
                "group_id IN (SELECT id FROM complement_groups WHERE user_id = $3)"
            }
        }
    }
}

#[async_trait]
impl MenuStore for MenuRepository {
    // ---
    // Categorias
    // ---

    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE user_id = $1 ORDER BY display_order ASC, name ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn insert_category(&self, owner: Uuid, input: &CategoryPayload) -> Result<Category, AppError> {
        // Nova categoria vai para o fim da lista
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name, display_order)
            VALUES ($1, $2, (SELECT COALESCE(MAX(display_order) + 1, 0) FROM categories WHERE user_id = $1))
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &CategoryPayload,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $3 WHERE id = $2 AND user_id = $1 RETURNING *",
        )
        .bind(owner)
        .bind(id)
        .bind(&input.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $2 AND user_id = $1")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Produtos
    // ---

    async fn list_products(&self, owner: Uuid, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE user_id = $1 AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY display_order ASC, name ASC
            "#,
        )
        .bind(owner)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn insert_product(&self, owner: Uuid, input: &ProductPayload) -> Result<Option<Product>, AppError> {
        // O INSERT ... SELECT só gera linha se a categoria for do mesmo dono
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (user_id, category_id, name, description, price, is_active,
                                  stock_enabled, stock_quantity, half_half_pricing, display_order)
            SELECT $1, c.id, $3, $4, $5, $6, $7, $8, $9,
                   (SELECT COALESCE(MAX(display_order) + 1, 0) FROM products WHERE category_id = c.id)
            FROM categories c
            WHERE c.id = $2 AND c.user_id = $1
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.stock_enabled)
        .bind(input.stock_quantity)
        .bind(input.half_half_pricing)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &ProductPayload,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                category_id = $3, name = $4, description = $5, price = $6, is_active = $7,
                stock_enabled = $8, stock_quantity = $9, half_half_pricing = $10
            WHERE id = $2 AND user_id = $1
              AND EXISTS (SELECT 1 FROM categories WHERE id = $3 AND user_id = $1)
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.stock_enabled)
        .bind(input.stock_quantity)
        .bind(input.half_half_pricing)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn set_product_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET is_active = $3 WHERE id = $2 AND user_id = $1 RETURNING *",
        )
        .bind(owner)
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete_product(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $2 AND user_id = $1")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Grupos de complementos
    // ---

    async fn list_groups(&self, owner: Uuid) -> Result<Vec<ComplementGroup>, AppError> {
        let groups = sqlx::query_as::<_, ComplementGroup>(
            "SELECT * FROM complement_groups WHERE user_id = $1 ORDER BY display_order ASC, name ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn insert_group(&self, owner: Uuid, input: &GroupPayload) -> Result<ComplementGroup, AppError> {
        let group = sqlx::query_as::<_, ComplementGroup>(
            r#"
            INSERT INTO complement_groups (user_id, name, group_type, minimum_quantity, maximum_quantity,
                                           is_required, is_active, image_url, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    (SELECT COALESCE(MAX(display_order) + 1, 0) FROM complement_groups WHERE user_id = $1))
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&input.name)
        .bind(input.group_type)
        .bind(input.minimum_quantity)
        .bind(input.maximum_quantity)
        .bind(input.is_required)
        .bind(input.is_active)
        .bind(input.image_url.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(group)
    }

    async fn update_group(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &GroupPayload,
    ) -> Result<Option<ComplementGroup>, AppError> {
        let group = sqlx::query_as::<_, ComplementGroup>(
            r#"
            UPDATE complement_groups SET
                name = $3, group_type = $4, minimum_quantity = $5, maximum_quantity = $6,
                is_required = $7, is_active = $8, image_url = $9
            WHERE id = $2 AND user_id = $1
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(id)
        .bind(&input.name)
        .bind(input.group_type)
        .bind(input.minimum_quantity)
        .bind(input.maximum_quantity)
        .bind(input.is_required)
        .bind(input.is_active)
        .bind(input.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn set_group_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementGroup>, AppError> {
        let group = sqlx::query_as::<_, ComplementGroup>(
            "UPDATE complement_groups SET is_active = $3 WHERE id = $2 AND user_id = $1 RETURNING *",
        )
        .bind(owner)
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn delete_group(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM complement_groups WHERE id = $2 AND user_id = $1")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Vínculos produto <-> grupo
    // ---

    async fn list_product_groups(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductGroup>, AppError> {
        let sql = format!(
            "{} WHERE pcg.product_id = $2 AND g.user_id = $1 ORDER BY pcg.display_order ASC",
            PRODUCT_GROUP_SELECT
        );
        let groups = sqlx::query_as::<_, ProductGroup>(&sql)
            .bind(owner)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn link_group(
        &self,
        owner: Uuid,
        product_id: Uuid,
        group_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductGroup>, AppError> {
        let sql = format!(
            r#"
            INSERT INTO product_complement_groups (product_id, group_id, is_required, display_order)
            SELECT $2, $3, $4,
                   (SELECT COALESCE(MAX(display_order) + 1, 0) FROM product_complement_groups WHERE product_id = $2)
            WHERE $2 IN ({}) AND $3 IN ({})
            RETURNING *
            "#,
            OWNED_PRODUCTS, OWNED_GROUPS
        );
        let link = sqlx::query_as::<_, ProductComplementGroup>(&sql)
            .bind(owner)
            .bind(product_id)
            .bind(group_id)
            .bind(is_required)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::InvalidInput(
                            "Este grupo já está vinculado ao produto.".to_string(),
                        );
                    }
                }
                AppError::DatabaseError(e)
            })?;

        match link {
            Some(link) => self.find_product_group(link.id).await,
            None => Ok(None),
        }
    }

    async fn set_link_required(
        &self,
        owner: Uuid,
        link_id: Uuid,
        is_required: bool,
    ) -> Result<Option<ProductComplementGroup>, AppError> {
        let sql = format!(
            "UPDATE product_complement_groups SET is_required = $3 WHERE id = $2 AND product_id IN ({}) RETURNING *",
            OWNED_PRODUCTS
        );
        let link = sqlx::query_as::<_, ProductComplementGroup>(&sql)
            .bind(owner)
            .bind(link_id)
            .bind(is_required)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn unlink_group(&self, owner: Uuid, link_id: Uuid) -> Result<bool, AppError> {
        let sql = format!(
            "DELETE FROM product_complement_groups WHERE id = $2 AND product_id IN ({})",
            OWNED_PRODUCTS
        );
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(link_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Itens de complemento
    // ---

    async fn list_complements(&self, owner: Uuid, group_id: Uuid) -> Result<Vec<ComplementItem>, AppError> {
        let sql = format!(
            "SELECT * FROM complement_items WHERE group_id = $2 AND group_id IN ({}) ORDER BY display_order ASC, name ASC",
            OWNED_GROUPS
        );
        let items = sqlx::query_as::<_, ComplementItem>(&sql)
            .bind(owner)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn find_complement(&self, owner: Uuid, id: Uuid) -> Result<Option<ComplementItem>, AppError> {
        let sql = format!(
            "SELECT * FROM complement_items WHERE id = $2 AND group_id IN ({})",
            OWNED_GROUPS
        );
        let item = sqlx::query_as::<_, ComplementItem>(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn insert_complement(
        &self,
        owner: Uuid,
        group_id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError> {
        let sql = format!(
            r#"
            INSERT INTO complement_items (group_id, name, price, is_active, product_id, display_order)
            SELECT $2, $3, $4, $5, $6,
                   (SELECT COALESCE(MAX(display_order) + 1, 0) FROM complement_items WHERE group_id = $2)
            WHERE $2 IN ({})
            RETURNING *
            "#,
            OWNED_GROUPS
        );
        let item = sqlx::query_as::<_, ComplementItem>(&sql)
            .bind(owner)
            .bind(group_id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.is_active)
            .bind(input.product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn update_complement(
        &self,
        owner: Uuid,
        id: Uuid,
        input: &ComplementPayload,
    ) -> Result<Option<ComplementItem>, AppError> {
        let sql = format!(
            r#"
            UPDATE complement_items SET name = $3, price = $4, is_active = $5, product_id = $6
            WHERE id = $2 AND group_id IN ({})
            RETURNING *
            "#,
            OWNED_GROUPS
        );
        let item = sqlx::query_as::<_, ComplementItem>(&sql)
            .bind(owner)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.is_active)
            .bind(input.product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn set_complement_active(&self, owner: Uuid, id: Uuid, active: bool) -> Result<Option<ComplementItem>, AppError> {
        let sql = format!(
            "UPDATE complement_items SET is_active = $3 WHERE id = $2 AND group_id IN ({}) RETURNING *",
            OWNED_GROUPS
        );
        let item = sqlx::query_as::<_, ComplementItem>(&sql)
            .bind(owner)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn delete_complement(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let sql = format!(
            "DELETE FROM complement_items WHERE id = $2 AND group_id IN ({})",
            OWNED_GROUPS
        );
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Preços específicos por produto
    // ---

    async fn list_price_overrides(&self, owner: Uuid, product_id: Uuid) -> Result<Vec<ProductSpecificComplement>, AppError> {
        let sql = format!(
            "SELECT * FROM product_specific_complements WHERE product_id = $2 AND product_id IN ({})",
            OWNED_PRODUCTS
        );
        let overrides = sqlx::query_as::<_, ProductSpecificComplement>(&sql)
            .bind(owner)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(overrides)
    }

    async fn upsert_price_override(
        &self,
        owner: Uuid,
        product_id: Uuid,
        complement_id: Uuid,
        group_id: Uuid,
        custom_price: Decimal,
    ) -> Result<Option<ProductSpecificComplement>, AppError> {
        // A constraint UNIQUE (product_id, complement_id) garante uma linha só
        let sql = format!(
            r#"
            INSERT INTO product_specific_complements (product_id, complement_id, group_id, custom_price, is_active)
            SELECT $2, $3, $4, $5, TRUE
            WHERE $2 IN ({})
            ON CONFLICT ON CONSTRAINT product_specific_complements_unique
            DO UPDATE SET custom_price = EXCLUDED.custom_price, updated_at = NOW()
            RETURNING *
            "#,
            OWNED_PRODUCTS
        );
        let row = sqlx::query_as::<_, ProductSpecificComplement>(&sql)
            .bind(owner)
            .bind(product_id)
            .bind(complement_id)
            .bind(group_id)
            .bind(custom_price)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // ---
    // Ordenação
    // ---

    async fn set_display_orders(
        &self,
        owner: Uuid,
        entity: MenuEntity,
        orders: &[(Uuid, i32)],
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET display_order = $1 WHERE id = $2 AND {}",
            entity.table(),
            entity.owner_filter()
        );

        // As trocas vão juntas: ou todas, ou nenhuma
        let mut tx = self.pool.begin().await?;
        for (id, order) in orders {
            let result = sqlx::query(&sql)
                .bind(order)
                .bind(id)
                .bind(owner)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Item do cardápio"));
            }
        }
        tx.commit().await?;
        Ok(())
    }
}
