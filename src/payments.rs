// src/payments.rs

pub mod stripe;
pub mod webhook;

pub use stripe::{CheckoutSession, CheckoutSessionRequest, PaymentGateway, ProviderSubscription, StripeClient};
pub use webhook::{WebhookEvent, WebhookVerifier};
