// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, Claims},
};

// Valida os tokens emitidos pelo provedor de autenticação (HS256 com segredo compartilhado)
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    audience: String,
}

impl AuthService {
    pub fn new(jwt_secret: &str, audience: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            audience: audience.to_string(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(AuthUser {
            id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }

    /// Emite um token no mesmo formato do provedor. Usado por ferramentas locais e testes.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        ttl: chrono::Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id,
            email: email.map(str::to_string),
            aud: self.audience.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
