use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante corresponde a uma classe da taxonomia do núcleo;
// detalhe interno (texto de erro do banco, etc.) nunca cruza a borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado")]
    NaoEncontrado(String),

    #[error("Transição inválida: {0}")]
    EstadoInvalido(String),

    #[error("Entrada inválida: {0}")]
    EntradaInvalida(String),

    // Identidade é afirmada pelo chamador via x-user-id; sem ela, nada anda.
    #[error("Usuário não identificado")]
    NaoIdentificado,

    #[error("Permissão negada: {0}")]
    PermissaoNegada(String),

    // Distinto de NaoEncontrado: a escala existe, mas pertence a outro usuário.
    #[error("Escala não pertence ao usuário")]
    EscalaNaoPertence,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// O INSERT bateu numa restrição de unicidade. Usado onde a corrida é
    /// esperada e tem um caminho de recuperação próprio.
    pub fn violacao_de_unicidade(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
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
            AppError::NaoEncontrado(ref alvo) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", alvo))
            }
            AppError::NaoIdentificado => (
                StatusCode::UNAUTHORIZED,
                "Usuário não identificado.".to_string(),
            ),
            AppError::EstadoInvalido(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::EntradaInvalida(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PermissaoNegada(ref msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::EscalaNaoPertence => (
                StatusCode::FORBIDDEN,
                "Escala pertence a outro usuário.".to_string(),
            ),
            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn corpo_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn escala_de_outro_usuario_nao_se_confunde_com_inexistente() {
        // 404 diz "não existe"; 403 diz só "é de outra pessoa".
        let resp = AppError::EscalaNaoPertence.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let corpo = corpo_json(resp).await;
        assert_eq!(corpo["error"], "Escala pertence a outro usuário.");

        let resp = AppError::NaoEncontrado("Escala".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let corpo = corpo_json(resp).await;
        assert_eq!(corpo["error"], "Escala não encontrado.");
    }

    #[test]
    fn so_violacao_de_unicidade_e_classificada_como_tal() {
        assert!(!AppError::DatabaseError(sqlx::Error::RowNotFound).violacao_de_unicidade());
        assert!(!AppError::DatabaseError(sqlx::Error::PoolTimedOut).violacao_de_unicidade());
        assert!(!AppError::NaoIdentificado.violacao_de_unicidade());
    }
}
