// src/payments/webhook.rs

use std::collections::HashMap;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{common::error::AppError, payments::stripe::ProviderSubscription};

type HmacSha256 = Hmac<Sha256>;

/// Janela aceita entre o `t=` do cabeçalho e o relógio local (segundos).
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verifica o cabeçalho `stripe-signature` (`t=<unix>,v1=<hex>`).
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            tolerance_secs: SIGNATURE_TOLERANCE_SECS,
        }
    }

    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), AppError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), AppError> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::InvalidSignature("timestamp ausente no cabeçalho".to_string()))?;
        if signatures.is_empty() {
            return Err(AppError::InvalidSignature("assinatura v1 ausente no cabeçalho".to_string()));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| AppError::InvalidSignature("timestamp inválido".to_string()))?;
        if now.abs_diff(ts) > self.tolerance_secs.unsigned_abs() {
            return Err(AppError::InvalidSignature("timestamp fora da tolerância".to_string()));
        }

        let expected = self.sign(timestamp, payload)?;
        let matched = signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|bytes| bytes.ct_eq(&expected).into())
                .unwrap_or(false)
        });

        if !matched {
            return Err(AppError::InvalidSignature(
                "nenhuma assinatura corresponde ao conteúdo".to_string(),
            ));
        }
        Ok(())
    }

    /// Monta um cabeçalho válido para `payload` no instante `timestamp`.
    pub fn signature_header(&self, payload: &[u8], timestamp: i64) -> Result<String, AppError> {
        let ts = timestamp.to_string();
        Ok(format!("t={},v1={}", ts, hex::encode(self.sign(&ts, payload)?)))
    }

    fn sign(&self, timestamp: &str, payload: &[u8]) -> Result<Vec<u8>, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("chave HMAC inválida: {}", e)))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

// ---
// Eventos
// ---

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

/// Sessão de checkout concluída (campos usados).
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug)]
pub enum WebhookEvent {
    CheckoutCompleted(CheckoutSessionObject),
    SubscriptionChanged(ProviderSubscription),
    Ignored(String),
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, AppError> {
        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::InvalidInput(format!("Evento inválido: {}", e)))?;
        event.try_into()
    }
}

impl TryFrom<StripeEvent> for WebhookEvent {
    type Error = AppError;

    fn try_from(event: StripeEvent) -> Result<Self, Self::Error> {
        let invalid = |e: serde_json::Error| {
            AppError::InvalidInput(format!("Evento {} com objeto inválido: {}", event.id, e))
        };

        match event.event_type.as_str() {
            "checkout.session.completed" => serde_json::from_value(event.data.object.clone())
                .map(WebhookEvent::CheckoutCompleted)
                .map_err(invalid),
            "customer.subscription.updated" | "customer.subscription.deleted" => {
                serde_json::from_value(event.data.object.clone())
                    .map(WebhookEvent::SubscriptionChanged)
                    .map_err(invalid)
            }
            _ => Ok(WebhookEvent::Ignored(event.event_type.clone())),
        }
    }
}
