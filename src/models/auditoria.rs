// src/models/auditoria.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// Quem fez o quê, imutável (Tabela logs_auditoria).
// Toda ação mutante do núcleo gera exatamente uma entrada.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogAuditoria {
    pub id: i64,
    pub responsavel: String,
    pub acao: String,
    pub alvo: String,
    pub detalhes: Option<String>,
    pub timestamp: DateTime<Utc>,
}
