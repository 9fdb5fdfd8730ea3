// src/db/auditoria_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::auditoria::LogAuditoria;

#[derive(Clone)]
pub struct AuditoriaRepository {
    pool: PgPool,
}

impl AuditoriaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Append-only; quem decide o que fazer com falhas é o serviço.
    pub async fn registrar(
        &self,
        responsavel: &str,
        acao: &str,
        alvo: &str,
        detalhes: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO logs_auditoria (responsavel, acao, alvo, detalhes, timestamp) VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(responsavel)
        .bind(acao)
        .bind(alvo)
        .bind(detalhes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn listar_recentes(&self, limite: i64) -> Result<Vec<LogAuditoria>, AppError> {
        let logs = sqlx::query_as::<_, LogAuditoria>(
            "SELECT id, responsavel, acao, alvo, detalhes, timestamp \
             FROM logs_auditoria ORDER BY timestamp DESC, id DESC LIMIT $1",
        )
        .bind(limite)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
