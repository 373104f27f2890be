// src/services/billing_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{ProfileStore, SubscriptionStore},
    models::{
        auth::AuthUser,
        billing::{CheckoutResponse, PlanType, SubscriptionState, WebhookAck},
    },
    payments::{
        stripe::{CheckoutSessionRequest, PaymentGateway},
        webhook::{WebhookEvent, WebhookVerifier},
    },
};

/// Ids de preço da Stripe por plano.
#[derive(Debug, Clone)]
pub struct PriceTable {
    pub monthly: String,
    pub yearly: String,
}

impl PriceTable {
    pub fn price_for(&self, plan: PlanType) -> &str {
        match plan {
            PlanType::Monthly => &self.monthly,
            PlanType::Yearly => &self.yearly,
        }
    }
}

pub struct BillingService {
    subscriptions: Arc<dyn SubscriptionStore>,
    profiles: Arc<dyn ProfileStore>,
    gateway: Arc<dyn PaymentGateway>,
    prices: PriceTable,
    app_url: String,
    verifier: WebhookVerifier,
}

impl BillingService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        profiles: Arc<dyn ProfileStore>,
        gateway: Arc<dyn PaymentGateway>,
        prices: PriceTable,
        app_url: String,
        verifier: WebhookVerifier,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
            gateway,
            prices,
            app_url: app_url.trim_end_matches('/').to_string(),
            verifier,
        }
    }

    // ---
    // check-subscription
    // ---

    pub async fn check_subscription(&self, user: &AuthUser) -> Result<SubscriptionState, AppError> {
        let Some(row) = self.subscriptions.find_by_user(user.id).await? else {
            return Ok(SubscriptionState::none());
        };

        // Checkout ainda não concluído: nada para consultar na Stripe
        let Some(subscription_id) = row.stripe_subscription_id.clone() else {
            return Ok(SubscriptionState {
                subscribed: false,
                subscription: Some(row),
            });
        };

        let remote = self.gateway.retrieve_subscription(&subscription_id).await?;
        tracing::debug!("Assinatura {} na Stripe: {:?}", subscription_id, remote.status);

        let refreshed = self
            .subscriptions
            .refresh_status(user.id, remote.status, remote.period_end())
            .await?;

        Ok(refreshed
            .map(SubscriptionState::from_row)
            .unwrap_or_else(SubscriptionState::none))
    }

    // ---
    // create-checkout
    // ---

    pub async fn create_checkout(&self, user: &AuthUser, plan_type: &str) -> Result<CheckoutResponse, AppError> {
        // Plano inválido não chega ao banco nem à Stripe
        let plan: PlanType = plan_type.parse()?;

        let existing = self.subscriptions.find_by_user(user.id).await?;
        let customer_id = match existing.and_then(|row| row.stripe_customer_id) {
            Some(id) => id,
            None => {
                let email = match &user.email {
                    Some(email) => Some(email.clone()),
                    None => self.profiles.find_email(user.id).await?,
                };
                self.gateway.create_customer(email.as_deref(), user.id).await?
            }
        };

        let session = self
            .gateway
            .create_checkout_session(&CheckoutSessionRequest {
                customer_id: customer_id.clone(),
                price_id: self.prices.price_for(plan).to_string(),
                success_url: format!("{}/dashboard?checkout=success", self.app_url),
                cancel_url: format!("{}/pricing?checkout=canceled", self.app_url),
                user_id: user.id,
                plan_type: plan,
            })
            .await?;

        let url = session.url.ok_or_else(|| {
            AppError::PaymentProvider(format!("Sessão {} criada sem URL de checkout", session.id))
        })?;

        self.subscriptions.upsert_pending(user.id, &customer_id, plan).await?;
        tracing::info!("Checkout {} criado para o usuário {} (plano {})", session.id, user.id, plan.as_str());

        Ok(CheckoutResponse { url })
    }

    // ---
    // stripe-webhook
    // ---

    pub async fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookAck, AppError> {
        let signature = signature
            .ok_or_else(|| AppError::InvalidSignature("cabeçalho stripe-signature ausente".to_string()))?;
        self.verifier.verify(payload, signature)?;

        match WebhookEvent::parse(payload)? {
            WebhookEvent::CheckoutCompleted(session) => {
                let Some(subscription_id) = session.subscription.as_deref() else {
                    tracing::warn!("Checkout {} concluído sem assinatura; ignorado", session.id);
                    return Ok(WebhookAck { received: true });
                };
                let user_id = session
                    .metadata
                    .get("user_id")
                    .and_then(|raw| Uuid::parse_str(raw).ok());

                let updated = self
                    .subscriptions
                    .activate_from_checkout(user_id, session.customer.as_deref(), subscription_id)
                    .await?;
                match updated {
                    Some(row) => tracing::info!("Assinatura {} ativada para o usuário {}", subscription_id, row.user_id),
                    None => tracing::warn!("Checkout {} sem linha de assinatura correspondente", session.id),
                }
            }
            WebhookEvent::SubscriptionChanged(remote) => {
                let updated = self
                    .subscriptions
                    .mirror_provider_status(&remote.id, remote.status, remote.period_end())
                    .await?;
                if updated.is_none() {
                    tracing::warn!("Assinatura {} desconhecida; evento ignorado", remote.id);
                }
            }
            WebhookEvent::Ignored(event_type) => {
                tracing::debug!("Evento {} ignorado", event_type);
            }
        }

        Ok(WebhookAck { received: true })
    }
}
