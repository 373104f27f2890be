// src/db/subscription_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::SubscriptionStore,
    models::billing::{PlanType, Subscription, SubscriptionStatus},
};

// Tabela 'subscriptions': uma linha por usuário
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn refresh_status(
        &self,
        user_id: Uuid,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = $2, current_period_end = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(current_period_end)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn upsert_pending(
        &self,
        user_id: Uuid,
        stripe_customer_id: &str,
        plan_type: PlanType,
    ) -> Result<Subscription, AppError> {
        // UPSERT (Insert or Update) pela chave user_id
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, stripe_customer_id, status, plan_type)
            VALUES ($1, $2, 'pending', $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                status = EXCLUDED.status,
                plan_type = EXCLUDED.plan_type,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(stripe_customer_id)
        .bind(plan_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn activate_from_checkout(
        &self,
        user_id: Option<Uuid>,
        stripe_customer_id: Option<&str>,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET stripe_subscription_id = $3, status = 'active', updated_at = NOW()
            WHERE ($1::uuid IS NOT NULL AND user_id = $1)
               OR ($1::uuid IS NULL AND stripe_customer_id = $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(stripe_customer_id)
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn mirror_provider_status(
        &self,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = $2, current_period_end = COALESCE($3, current_period_end), updated_at = NOW()
            WHERE stripe_subscription_id = $1
            RETURNING *
            "#,
        )
        .bind(stripe_subscription_id)
        .bind(status)
        .bind(current_period_end)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }
}
