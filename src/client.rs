// src/client.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use crate::{
    common::error::AppError,
    models::billing::{CheckoutResponse, SubscriptionState},
    session::SubscriptionApi,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Cliente HTTP das funções de assinatura (`/functions/v1/...`).
#[derive(Clone)]
pub struct BillingClient {
    http: Client,
    base_url: String,
}

impl BillingClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::InternalServerError(e.into()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()));
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("HTTP {}", status));
    Err(AppError::Upstream(message))
}

#[async_trait]
impl SubscriptionApi for BillingClient {
    async fn check_subscription(&self, access_token: &str) -> Result<SubscriptionState, AppError> {
        let response = self
            .http
            .post(self.url("check-subscription"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        read(response).await
    }

    async fn create_checkout_session(&self, access_token: &str, plan_type: &str) -> Result<CheckoutResponse, AppError> {
        let response = self
            .http
            .post(self.url("create-checkout"))
            .bearer_auth(access_token)
            .json(&json!({ "planType": plan_type }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        read(response).await
    }
}
