// src/handlers/menu.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    menu::reorder::{MovePayload, OrderChange},
    middleware::{auth::AuthenticatedUser, json::AppJson},
    models::menu::{
        Category, CategoryPayload, ComplementGroup, ComplementItem, ComplementPayload, GroupPayload,
        LinkGroupPayload, PriceOverridePayload, Product, ProductComplementGroup, ProductGroup,
        ProductPayload, ProductSpecificComplement, SetActivePayload, SetRequiredPayload,
    },
};

fn moved(changes: Vec<(Uuid, i32)>) -> Json<Vec<OrderChange>> {
    Json(changes.into_iter().map(OrderChange::from).collect())
}

// =============================================================================
//  CATEGORIAS
// =============================================================================

// GET /api/menu/categories
#[utoipa::path(
    get,
    path = "/api/menu/categories",
    tag = "Menu",
    responses((status = 200, description = "Categorias do restaurante", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.menu_service.list_categories(user.id).await?;
    Ok(Json(categories))
}

// POST /api/menu/categories
#[utoipa::path(
    post,
    path = "/api/menu/categories",
    tag = "Menu",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.menu_service.create_category(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// PUT /api/menu/categories/{id}
#[utoipa::path(
    put,
    path = "/api/menu/categories/{id}",
    tag = "Menu",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.menu_service.update_category(user.id, id, &payload).await?;
    Ok(Json(category))
}

// DELETE /api/menu/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/menu/categories/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.menu_service.delete_category(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/menu/categories/{id}/move
#[utoipa::path(
    post,
    path = "/api/menu/categories/{id}/move",
    tag = "Menu",
    request_body = MovePayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, description = "Posições alteradas", body = Vec<OrderChange>)),
    security(("api_jwt" = []))
)]
pub async fn move_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .menu_service
        .move_category(user.id, id, payload.direction)
        .await?;
    Ok(moved(changes))
}

// =============================================================================
//  PRODUTOS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Filtra pela categoria
    pub category_id: Option<Uuid>,
}

// GET /api/menu/products
#[utoipa::path(
    get,
    path = "/api/menu/products",
    tag = "Menu",
    params(ProductFilter),
    responses((status = 200, description = "Produtos do restaurante", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .menu_service
        .list_products(user.id, filter.category_id)
        .await?;
    Ok(Json(products))
}

// POST /api/menu/products
#[utoipa::path(
    post,
    path = "/api/menu/products",
    tag = "Menu",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.menu_service.create_product(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/menu/products/{id}
#[utoipa::path(
    put,
    path = "/api/menu/products/{id}",
    tag = "Menu",
    request_body = ProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.menu_service.update_product(user.id, id, &payload).await?;
    Ok(Json(product))
}

// PATCH /api/menu/products/{id}/active
#[utoipa::path(
    patch,
    path = "/api/menu/products/{id}/active",
    tag = "Menu",
    request_body = SetActivePayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Produto atualizado", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn set_product_active(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .menu_service
        .set_product_active(user.id, id, payload.is_active)
        .await?;
    Ok(Json(product))
}

// DELETE /api/menu/products/{id}
#[utoipa::path(
    delete,
    path = "/api/menu/products/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 204, description = "Produto excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.menu_service.delete_product(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/menu/products/{id}/move
#[utoipa::path(
    post,
    path = "/api/menu/products/{id}/move",
    tag = "Menu",
    request_body = MovePayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Posições alteradas", body = Vec<OrderChange>)),
    security(("api_jwt" = []))
)]
pub async fn move_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .menu_service
        .move_product(user.id, id, payload.direction)
        .await?;
    Ok(moved(changes))
}

// =============================================================================
//  GRUPOS DE COMPLEMENTOS
// =============================================================================

// GET /api/menu/groups
#[utoipa::path(
    get,
    path = "/api/menu/groups",
    tag = "Menu",
    responses((status = 200, description = "Grupos de complementos", body = Vec<ComplementGroup>)),
    security(("api_jwt" = []))
)]
pub async fn list_groups(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state.menu_service.list_groups(user.id).await?;
    Ok(Json(groups))
}

// POST /api/menu/groups
#[utoipa::path(
    post,
    path = "/api/menu/groups",
    tag = "Menu",
    request_body = GroupPayload,
    responses(
        (status = 201, description = "Grupo criado", body = ComplementGroup),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state.menu_service.create_group(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// PUT /api/menu/groups/{id}
#[utoipa::path(
    put,
    path = "/api/menu/groups/{id}",
    tag = "Menu",
    request_body = GroupPayload,
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses((status = 200, description = "Grupo atualizado", body = ComplementGroup)),
    security(("api_jwt" = []))
)]
pub async fn update_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state.menu_service.update_group(user.id, id, &payload).await?;
    Ok(Json(group))
}

// PATCH /api/menu/groups/{id}/active
#[utoipa::path(
    patch,
    path = "/api/menu/groups/{id}/active",
    tag = "Menu",
    request_body = SetActivePayload,
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses((status = 200, description = "Grupo atualizado", body = ComplementGroup)),
    security(("api_jwt" = []))
)]
pub async fn set_group_active(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .menu_service
        .set_group_active(user.id, id, payload.is_active)
        .await?;
    Ok(Json(group))
}

// DELETE /api/menu/groups/{id}
#[utoipa::path(
    delete,
    path = "/api/menu/groups/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses((status = 204, description = "Grupo excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.menu_service.delete_group(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/menu/groups/{id}/move
#[utoipa::path(
    post,
    path = "/api/menu/groups/{id}/move",
    tag = "Menu",
    request_body = MovePayload,
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses((status = 200, description = "Posições alteradas", body = Vec<OrderChange>)),
    security(("api_jwt" = []))
)]
pub async fn move_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .menu_service
        .move_group(user.id, id, payload.direction)
        .await?;
    Ok(moved(changes))
}

// =============================================================================
//  VÍNCULOS PRODUTO <-> GRUPO
// =============================================================================

// GET /api/menu/products/{id}/groups
#[utoipa::path(
    get,
    path = "/api/menu/products/{id}/groups",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Grupos vinculados ao produto", body = Vec<ProductGroup>)),
    security(("api_jwt" = []))
)]
pub async fn list_product_groups(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state
        .menu_service
        .list_product_groups(user.id, product_id)
        .await?;
    Ok(Json(groups))
}

// POST /api/menu/products/{id}/groups
#[utoipa::path(
    post,
    path = "/api/menu/products/{id}/groups",
    tag = "Menu",
    request_body = LinkGroupPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 201, description = "Grupo vinculado", body = ProductGroup),
        (status = 400, description = "Grupo já vinculado"),
        (status = 404, description = "Produto ou grupo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn link_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    AppJson(payload): AppJson<LinkGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let link = app_state
        .menu_service
        .link_group(user.id, product_id, payload.group_id, payload.is_required)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

// POST /api/menu/products/{id}/groups/{link_id}/move
#[utoipa::path(
    post,
    path = "/api/menu/products/{id}/groups/{link_id}/move",
    tag = "Menu",
    request_body = MovePayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("link_id" = Uuid, Path, description = "ID do vínculo")
    ),
    responses((status = 200, description = "Posições alteradas", body = Vec<OrderChange>)),
    security(("api_jwt" = []))
)]
pub async fn move_product_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((product_id, link_id)): Path<(Uuid, Uuid)>,
    AppJson(payload): AppJson<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .menu_service
        .move_product_group(user.id, product_id, link_id, payload.direction)
        .await?;
    Ok(moved(changes))
}

// PATCH /api/menu/product-groups/{link_id}/required
#[utoipa::path(
    patch,
    path = "/api/menu/product-groups/{link_id}/required",
    tag = "Menu",
    request_body = SetRequiredPayload,
    params(("link_id" = Uuid, Path, description = "ID do vínculo")),
    responses((status = 200, description = "Vínculo atualizado", body = ProductComplementGroup)),
    security(("api_jwt" = []))
)]
pub async fn set_link_required(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(link_id): Path<Uuid>,
    AppJson(payload): AppJson<SetRequiredPayload>,
) -> Result<impl IntoResponse, AppError> {
    let link = app_state
        .menu_service
        .set_link_required(user.id, link_id, payload.is_required)
        .await?;
    Ok(Json(link))
}

// DELETE /api/menu/product-groups/{link_id}
#[utoipa::path(
    delete,
    path = "/api/menu/product-groups/{link_id}",
    tag = "Menu",
    params(("link_id" = Uuid, Path, description = "ID do vínculo")),
    responses((status = 204, description = "Vínculo removido")),
    security(("api_jwt" = []))
)]
pub async fn unlink_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(link_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.menu_service.unlink_group(user.id, link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ITENS DE COMPLEMENTO
// =============================================================================

// GET /api/menu/groups/{id}/complements
#[utoipa::path(
    get,
    path = "/api/menu/groups/{id}/complements",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses((status = 200, description = "Itens do grupo", body = Vec<ComplementItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_complements(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.menu_service.list_complements(user.id, group_id).await?;
    Ok(Json(items))
}

// POST /api/menu/groups/{id}/complements
#[utoipa::path(
    post,
    path = "/api/menu/groups/{id}/complements",
    tag = "Menu",
    request_body = ComplementPayload,
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses(
        (status = 201, description = "Complemento criado", body = ComplementItem),
        (status = 404, description = "Grupo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_complement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
    AppJson(payload): AppJson<ComplementPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .menu_service
        .create_complement(user.id, group_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/menu/complements/{id}
#[utoipa::path(
    put,
    path = "/api/menu/complements/{id}",
    tag = "Menu",
    request_body = ComplementPayload,
    params(("id" = Uuid, Path, description = "ID do complemento")),
    responses((status = 200, description = "Complemento atualizado", body = ComplementItem)),
    security(("api_jwt" = []))
)]
pub async fn update_complement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ComplementPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.menu_service.update_complement(user.id, id, &payload).await?;
    Ok(Json(item))
}

// PATCH /api/menu/complements/{id}/active
#[utoipa::path(
    patch,
    path = "/api/menu/complements/{id}/active",
    tag = "Menu",
    request_body = SetActivePayload,
    params(("id" = Uuid, Path, description = "ID do complemento")),
    responses((status = 200, description = "Complemento atualizado", body = ComplementItem)),
    security(("api_jwt" = []))
)]
pub async fn set_complement_active(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .menu_service
        .set_complement_active(user.id, id, payload.is_active)
        .await?;
    Ok(Json(item))
}

// DELETE /api/menu/complements/{id}
#[utoipa::path(
    delete,
    path = "/api/menu/complements/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do complemento")),
    responses((status = 204, description = "Complemento excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_complement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.menu_service.delete_complement(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/menu/complements/{id}/move
#[utoipa::path(
    post,
    path = "/api/menu/complements/{id}/move",
    tag = "Menu",
    request_body = MovePayload,
    params(("id" = Uuid, Path, description = "ID do complemento")),
    responses((status = 200, description = "Posições alteradas", body = Vec<OrderChange>)),
    security(("api_jwt" = []))
)]
pub async fn move_complement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .menu_service
        .move_complement(user.id, id, payload.direction)
        .await?;
    Ok(moved(changes))
}

// =============================================================================
//  PREÇOS ESPECÍFICOS POR PRODUTO
// =============================================================================

// GET /api/menu/products/{id}/complement-prices
#[utoipa::path(
    get,
    path = "/api/menu/products/{id}/complement-prices",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Preços específicos do produto", body = Vec<ProductSpecificComplement>)),
    security(("api_jwt" = []))
)]
pub async fn list_price_overrides(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .menu_service
        .list_price_overrides(user.id, product_id)
        .await?;
    Ok(Json(rows))
}

// PUT /api/menu/products/{id}/complement-prices
#[utoipa::path(
    put,
    path = "/api/menu/products/{id}/complement-prices",
    tag = "Menu",
    request_body = PriceOverridePayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Preço definido", body = ProductSpecificComplement),
        (status = 404, description = "Produto ou complemento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_price_override(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    AppJson(payload): AppJson<PriceOverridePayload>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state
        .menu_service
        .update_complement_price(user.id, product_id, payload.complement_id, payload.custom_price)
        .await?;
    Ok(Json(row))
}
