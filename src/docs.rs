// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::menu;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Billing ---
        handlers::billing::check_subscription,
        handlers::billing::create_checkout,
        handlers::billing::stripe_webhook,

        // --- Categorias ---
        handlers::menu::list_categories,
        handlers::menu::create_category,
        handlers::menu::update_category,
        handlers::menu::delete_category,
        handlers::menu::move_category,

        // --- Produtos ---
        handlers::menu::list_products,
        handlers::menu::create_product,
        handlers::menu::update_product,
        handlers::menu::set_product_active,
        handlers::menu::delete_product,
        handlers::menu::move_product,

        // --- Grupos ---
        handlers::menu::list_groups,
        handlers::menu::create_group,
        handlers::menu::update_group,
        handlers::menu::set_group_active,
        handlers::menu::delete_group,
        handlers::menu::move_group,

        // --- Vínculos ---
        handlers::menu::list_product_groups,
        handlers::menu::link_group,
        handlers::menu::move_product_group,
        handlers::menu::set_link_required,
        handlers::menu::unlink_group,

        // --- Complementos ---
        handlers::menu::list_complements,
        handlers::menu::create_complement,
        handlers::menu::update_complement,
        handlers::menu::set_complement_active,
        handlers::menu::delete_complement,
        handlers::menu::move_complement,

        // --- Preços específicos ---
        handlers::menu::list_price_overrides,
        handlers::menu::upsert_price_override,
    ),
    components(
        schemas(
            // --- Billing ---
            models::billing::SubscriptionStatus,
            models::billing::PlanType,
            models::billing::Subscription,
            models::billing::SubscriptionState,
            models::billing::CheckoutRequest,
            models::billing::CheckoutResponse,
            models::billing::WebhookAck,

            // --- Cardápio ---
            models::menu::GroupType,
            models::menu::HalfHalfPricing,
            models::menu::Category,
            models::menu::Product,
            models::menu::ComplementGroup,
            models::menu::ComplementItem,
            models::menu::ProductComplementGroup,
            models::menu::ProductGroup,
            models::menu::ProductSpecificComplement,

            // --- Payloads ---
            models::menu::CategoryPayload,
            models::menu::ProductPayload,
            models::menu::GroupPayload,
            models::menu::ComplementPayload,
            models::menu::LinkGroupPayload,
            models::menu::SetRequiredPayload,
            models::menu::SetActivePayload,
            models::menu::PriceOverridePayload,

            // --- Ordenação ---
            menu::reorder::Direction,
            menu::reorder::MovePayload,
            menu::reorder::OrderChange,
        )
    ),
    tags(
        (name = "Billing", description = "Assinatura do painel (Stripe)"),
        (name = "Menu", description = "Cadastro do Cardápio")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/functions/v1/check-subscription",
            "/functions/v1/create-checkout",
            "/functions/v1/stripe-webhook",
            "/api/menu/products/{id}/complement-prices",
            "/api/menu/products/{id}/groups/{link_id}/move",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {path}");
        }
    }
}
