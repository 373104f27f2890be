// src/session/subscription.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{CheckoutResponse, Subscription, SubscriptionState},
    notify::{Notice, Notifier},
};

/// Endpoints de assinatura, vistos de quem está logado.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn check_subscription(&self, access_token: &str) -> Result<SubscriptionState, AppError>;

    async fn create_checkout_session(&self, access_token: &str, plan_type: &str) -> Result<CheckoutResponse, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nenhuma verificação concluída desde o login. Erros ficam só no log.
    Uninitialized,
    Ready,
}

/// Estado de assinatura da sessão atual, vivo enquanto houver usuário.
pub struct SubscriptionContext<A> {
    api: A,
    notifier: Arc<dyn Notifier>,
    user: Option<SessionUser>,
    phase: Phase,
    is_loading: bool,
    is_subscribed: bool,
    subscription: Option<Subscription>,
}

impl<A: SubscriptionApi> SubscriptionContext<A> {
    pub fn new(api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            user: None,
            phase: Phase::Uninitialized,
            is_loading: false,
            is_subscribed: false,
            subscription: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Entrada ou saída de usuário.
    pub async fn on_user_changed(&mut self, user: Option<SessionUser>) {
        match user {
            Some(user) => {
                let switched = self.user.as_ref().is_none_or(|current| current.id != user.id);
                if switched {
                    self.reset();
                }
                self.user = Some(user);
                self.check_subscription().await;
            }
            None => self.reset(),
        }
    }

    fn reset(&mut self) {
        self.user = None;
        self.phase = Phase::Uninitialized;
        self.is_loading = false;
        self.is_subscribed = false;
        self.subscription = None;
    }

    pub async fn check_subscription(&mut self) {
        let Some(token) = self.user.as_ref().map(|u| u.access_token.clone()) else {
            self.reset();
            return;
        };

        self.is_loading = true;
        match self.api.check_subscription(&token).await {
            Ok(state) => {
                self.is_subscribed = state.subscribed;
                self.subscription = state.subscription;
            }
            Err(e) => match self.phase {
                Phase::Uninitialized => tracing::warn!("Verificação inicial de assinatura falhou: {}", e),
                Phase::Ready => self
                    .notifier
                    .notify(Notice::Error(format!("Não foi possível verificar a assinatura: {}", e))),
            },
        }
        self.is_loading = false;
        self.phase = Phase::Ready;
    }

    /// URL do checkout, ou `None` (com aviso) se não deu certo.
    pub async fn create_checkout_session(&self, plan_type: &str) -> Option<String> {
        let Some(user) = &self.user else {
            self.notifier
                .notify(Notice::Error("Faça login para assinar.".to_string()));
            return None;
        };

        match self.api.create_checkout_session(&user.access_token, plan_type).await {
            Ok(response) => Some(response.url),
            Err(e) => {
                self.notifier
                    .notify(Notice::Error(format!("Não foi possível iniciar o checkout: {}", e)));
                None
            }
        }
    }
}
