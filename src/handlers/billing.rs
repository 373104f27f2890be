// src/handlers/billing.rs

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, json::AppJson},
    models::billing::{CheckoutRequest, CheckoutResponse, SubscriptionState, WebhookAck},
};

// POST /functions/v1/check-subscription
#[utoipa::path(
    post,
    path = "/functions/v1/check-subscription",
    tag = "Billing",
    responses(
        (status = 200, description = "Estado atual da assinatura", body = SubscriptionState),
        (status = 400, description = "Token inválido ou falha no provedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_subscription(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let state = app_state.billing_service.check_subscription(&user).await?;
    Ok(Json(state))
}

// POST /functions/v1/create-checkout
#[utoipa::path(
    post,
    path = "/functions/v1/create-checkout",
    tag = "Billing",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "URL da sessão de checkout", body = CheckoutResponse),
        (status = 400, description = "Plano inválido, token inválido ou falha no provedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_checkout(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state
        .billing_service
        .create_checkout(&user, &payload.plan_type)
        .await?;
    Ok(Json(response))
}

// POST /functions/v1/stripe-webhook
// O corpo é lido cru: a assinatura é calculada sobre os bytes exatos.
#[utoipa::path(
    post,
    path = "/functions/v1/stripe-webhook",
    tag = "Billing",
    request_body(content = String, description = "Evento da Stripe (JSON cru)", content_type = "application/json"),
    params(
        ("stripe-signature" = String, Header, description = "t=<timestamp>,v1=<assinatura>")
    ),
    responses(
        (status = 200, description = "Evento recebido", body = WebhookAck),
        (status = 400, description = "Assinatura ausente ou inválida")
    )
)]
pub async fn stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok());

    let ack = app_state.billing_service.handle_webhook(&body, signature).await?;
    Ok(Json(ack))
}
