// src/payments/stripe.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{PlanType, SubscriptionStatus},
};

/// Dados para abrir uma sessão de checkout de assinatura.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub user_id: Uuid,
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

/// Assinatura como a Stripe devolve (apenas os campos usados).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
}

impl ProviderSubscription {
    /// Fim do período atual. Versões novas da API só trazem o campo nos itens.
    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .or_else(|| self.items.data.first().and_then(|item| item.current_period_end))
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Cria o cliente e devolve o id (`cus_...`).
    async fn create_customer(&self, email: Option<&str>, user_id: Uuid) -> Result<String, AppError>;

    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession, AppError>;

    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<ProviderSubscription, AppError>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedCustomer {
    id: String,
}

/// Cliente da API REST da Stripe (corpo form-encoded, autenticação Bearer).
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, api_base: &str) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(&self, path: &str, form: &[(&str, String)]) -> Result<T, AppError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(response).await
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(response).await
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    tracing::error!("Falha ao falar com a Stripe: {:?}", err);
    AppError::PaymentProvider(err.to_string())
}

async fn parse_response<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(transport_error);
    }

    // A Stripe responde {"error": {"message": ...}}
    let message = response
        .json::<StripeErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error.message)
        .unwrap_or_else(|| format!("HTTP {}", status));
    tracing::warn!("Stripe recusou a requisição ({}): {}", status, message);
    Err(AppError::PaymentProvider(message))
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_customer(&self, email: Option<&str>, user_id: Uuid) -> Result<String, AppError> {
        let mut form = vec![("metadata[user_id]", user_id.to_string())];
        if let Some(email) = email {
            form.push(("email", email.to_string()));
        }
        let customer: CreatedCustomer = self.post_form("/v1/customers", &form).await?;
        tracing::info!("Cliente Stripe criado: {} (usuário {})", customer.id, user_id);
        Ok(customer.id)
    }

    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession, AppError> {
        let form = [
            ("customer", request.customer_id.clone()),
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", request.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[user_id]", request.user_id.to_string()),
            ("metadata[plan_type]", request.plan_type.as_str().to_string()),
        ];
        self.post_form("/v1/checkout/sessions", &form).await
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<ProviderSubscription, AppError> {
        self.get(&format!("/v1/subscriptions/{}", subscription_id)).await
    }
}
