// src/routes.rs

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

// Sem credenciais, então `Any` vale para origem, métodos e cabeçalhos
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(app_state: AppState) -> Router {
    // Funções de assinatura (mesmos caminhos usados pelo front)
    let billing_routes = Router::new()
        .route("/check-subscription"
               ,post(handlers::billing::check_subscription)
               .get(handlers::billing::check_subscription)
        )
        .route("/create-checkout", post(handlers::billing::create_checkout))
        .route("/stripe-webhook", post(handlers::billing::stripe_webhook));

    let menu_routes = Router::new()
        // Categorias
        .route("/categories"
               ,get(handlers::menu::list_categories)
               .post(handlers::menu::create_category)
        )
        .route("/categories/{id}"
               ,put(handlers::menu::update_category)
               .delete(handlers::menu::delete_category)
        )
        .route("/categories/{id}/move", post(handlers::menu::move_category))
        // Produtos
        .route("/products"
               ,get(handlers::menu::list_products)
               .post(handlers::menu::create_product)
        )
        .route("/products/{id}"
               ,put(handlers::menu::update_product)
               .delete(handlers::menu::delete_product)
        )
        .route("/products/{id}/active", patch(handlers::menu::set_product_active))
        .route("/products/{id}/move", post(handlers::menu::move_product))
        // Vínculos produto <-> grupo
        .route("/products/{id}/groups"
               ,get(handlers::menu::list_product_groups)
               .post(handlers::menu::link_group)
        )
        .route("/products/{id}/groups/{link_id}/move", post(handlers::menu::move_product_group))
        .route("/product-groups/{link_id}", delete(handlers::menu::unlink_group))
        .route("/product-groups/{link_id}/required", patch(handlers::menu::set_link_required))
        // Preços específicos
        .route("/products/{id}/complement-prices"
               ,get(handlers::menu::list_price_overrides)
               .put(handlers::menu::upsert_price_override)
        )
        // Grupos de complementos
        .route("/groups"
               ,get(handlers::menu::list_groups)
               .post(handlers::menu::create_group)
        )
        .route("/groups/{id}"
               ,put(handlers::menu::update_group)
               .delete(handlers::menu::delete_group)
        )
        .route("/groups/{id}/active", patch(handlers::menu::set_group_active))
        .route("/groups/{id}/move", post(handlers::menu::move_group))
        // Itens de complemento
        .route("/groups/{id}/complements"
               ,get(handlers::menu::list_complements)
               .post(handlers::menu::create_complement)
        )
        .route("/complements/{id}"
               ,put(handlers::menu::update_complement)
               .delete(handlers::menu::delete_complement)
        )
        .route("/complements/{id}/active", patch(handlers::menu::set_complement_active))
        .route("/complements/{id}/move", post(handlers::menu::move_complement));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/functions/v1", billing_routes)
        .nest("/api/menu", menu_routes)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::memory::{InMemoryMenuStore, InMemoryProfileStore, InMemorySubscriptionStore},
        models::billing::SubscriptionStatus,
        payments::webhook::WebhookVerifier,
        services::{
            auth::AuthService,
            billing_service::{testing::FakeGateway, BillingService, PriceTable},
            menu_service::MenuService,
        },
    };

    const JWT_SECRET: &str = "segredo-de-teste";
    const WEBHOOK_SECRET: &str = "whsec_rotas";

    struct TestApp {
        router: Router,
        auth: AuthService,
        gateway: Arc<FakeGateway>,
    }

    fn app() -> TestApp {
        let auth = AuthService::new(JWT_SECRET, "authenticated");
        let gateway = Arc::new(FakeGateway::new(SubscriptionStatus::Active));
        let billing = BillingService::new(
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(InMemoryProfileStore::default()),
            gateway.clone(),
            PriceTable { monthly: "price_m".into(), yearly: "price_y".into() },
            "https://app.test".into(),
            WebhookVerifier::new(WEBHOOK_SECRET),
        );
        let state = AppState {
            auth_service: auth.clone(),
            menu_service: MenuService::new(Arc::new(InMemoryMenuStore::new())),
            billing_service: Arc::new(billing),
        };
        TestApp { router: build_router(state), auth, gateway }
    }

    fn bearer(app: &TestApp) -> String {
        let token = app
            .auth
            .issue_token(Uuid::new_v4(), Some("dono@pizzaria.com"), Duration::hours(1))
            .unwrap();
        format!("Bearer {}", token)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn preflight_is_answered_with_cors_headers() {
        let app = app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/functions/v1/create-checkout")
                    .header("origin", "https://app.test")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "authorization,content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn preflight_accepts_any_requested_header() {
        let app = app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/menu/categories")
                    .header("origin", "https://app.test")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "x-requested-with,x-client-info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-headers").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn check_without_row_is_not_subscribed() {
        let app = app();
        let auth = bearer(&app);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/check-subscription")
                    .header("authorization", auth)
                    .header("origin", "https://app.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));
        let body = json_body(response).await;
        assert_eq!(body, json!({ "subscribed": false, "subscription": null }));
    }

    #[tokio::test]
    async fn missing_token_is_a_400() {
        let app = app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/check-subscription")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_plan_is_a_400_without_provider_calls() {
        let app = app();
        let auth = bearer(&app);
        let gateway = app.gateway.clone();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/create-checkout")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"planType":"weekly"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("weekly"));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn checkout_body_without_plan_is_a_400_with_error() {
        let app = app();
        let auth = bearer(&app);
        let gateway = app.gateway.clone();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/create-checkout")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("planType"));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_menu_body_is_a_400_with_error() {
        let app = app();
        let auth = bearer(&app);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/menu/categories")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from("{\"name\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn webhook_without_signature_is_a_400() {
        let app = app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/stripe-webhook")
                    .body(Body::from(r#"{"id":"evt_1","type":"invoice.paid","data":{"object":{}}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_signed_event_is_acknowledged() {
        let app = app();
        let payload = r#"{"id":"evt_1","type":"invoice.paid","data":{"object":{}}}"#;
        let signature = WebhookVerifier::new(WEBHOOK_SECRET)
            .signature_header(payload.as_bytes(), Utc::now().timestamp())
            .unwrap();

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/stripe-webhook")
                    .header("stripe-signature", signature)
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "received": true }));
    }

    #[tokio::test]
    async fn menu_routes_create_and_list_categories() {
        let app = app();
        let auth = bearer(&app);

        let created = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/menu/categories")
                    .header("authorization", &auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Pizzas"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/menu/categories")
                    .header("authorization", &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(listed).await;
        assert_eq!(body[0]["name"], "Pizzas");
        assert_eq!(body[0]["displayOrder"], 0);
    }

    #[tokio::test]
    async fn unknown_menu_item_is_a_404() {
        let app = app();
        let auth = bearer(&app);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/menu/products/{}", Uuid::new_v4()))
                    .header("authorization", auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_category_payload_reports_field_details() {
        let app = app();
        let auth = bearer(&app);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/menu/categories")
                    .header("authorization", auth)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["details"]["name"].is_array());
    }
}
