// src/config.rs

use crate::{
    db::{MenuRepository, ProfileRepository, SubscriptionRepository},
    payments::{stripe::StripeClient, webhook::WebhookVerifier},
    services::{
        auth::AuthService,
        billing_service::{BillingService, PriceTable},
        menu_service::MenuService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_JWT_AUDIENCE: &str = "authenticated";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_price_monthly: String,
    pub stripe_price_yearly: String,
    pub stripe_api_base: String,
    pub app_url: String,
    pub bind_addr: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_audience: optional("JWT_AUDIENCE", DEFAULT_JWT_AUDIENCE),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            stripe_price_monthly: required("STRIPE_PRICE_MONTHLY")?,
            stripe_price_yearly: required("STRIPE_PRICE_YEARLY")?,
            stripe_api_base: optional("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE),
            app_url: required("APP_URL")?,
            bind_addr: optional("BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub menu_service: MenuService,
    pub billing_service: Arc<BillingService>,
}

impl AppState {
    /// Conecta ao banco e monta o gráfico de dependências.
    pub async fn new(config: &Config) -> anyhow::Result<(Self, PgPool)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let menu_repo = Arc::new(MenuRepository::new(db_pool.clone()));
        let subscription_repo = Arc::new(SubscriptionRepository::new(db_pool.clone()));
        let profile_repo = Arc::new(ProfileRepository::new(db_pool.clone()));
        let stripe = Arc::new(StripeClient::new(
            &config.stripe_secret_key,
            &config.stripe_api_base,
        )?);

        let billing_service = BillingService::new(
            subscription_repo,
            profile_repo,
            stripe,
            PriceTable {
                monthly: config.stripe_price_monthly.clone(),
                yearly: config.stripe_price_yearly.clone(),
            },
            config.app_url.clone(),
            WebhookVerifier::new(&config.stripe_webhook_secret),
        );

        let state = Self {
            auth_service: AuthService::new(&config.jwt_secret, &config.jwt_audience),
            menu_service: MenuService::new(menu_repo),
            billing_service: Arc::new(billing_service),
        };

        Ok((state, db_pool))
    }
}
