use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::store::ProfileStore, models::auth::Profile};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca o perfil pelo ID do usuário
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, email, restaurant_name FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_email(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.find_by_id(user_id).await?.and_then(|p| p.email))
    }
}
