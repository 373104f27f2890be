use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Token de autenticação inválido ou ausente.")]
    InvalidToken,

    #[error("{0} não encontrado(a).")]
    NotFound(&'static str),

    // O texto da verificação volta para quem chamou o webhook
    #[error("Falha na verificação do webhook: {0}")]
    InvalidSignature(String),

    #[error("Erro no provedor de pagamento: {0}")]
    PaymentProvider(String),

    #[error("Falha na chamada remota: {0}")]
    Upstream(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            // Erros de infraestrutura: detalhe só no log
            AppError::DatabaseError(_) | AppError::InternalServerError(_) | AppError::JwtError(_) => {
                tracing::error!("Erro Interno do Servidor: {:?}", self);
                (StatusCode::BAD_REQUEST, "Ocorreu um erro inesperado.".to_string())
            }

            // Todo o resto vira 400 com a mensagem do erro.
            ref e => {
                tracing::warn!("Requisição rejeitada: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
