// src/db/notificacao_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::notificacao::{CanalNotificacao, Notificacao, StatusNotificacao};

const COLUNAS_NOTIFICACAO: &str = "id, id_usuario, id_incidente, canal, destinatario, titulo, \
     mensagem, status, lida, metadados, created_at";

/// Dados de uma linha nova; o id e o created_at ficam com o banco.
#[derive(Debug)]
pub struct NovaNotificacao<'a> {
    pub id_usuario: Option<i32>,
    pub id_incidente: Option<i64>,
    pub canal: CanalNotificacao,
    pub destinatario: &'a str,
    pub titulo: &'a str,
    pub mensagem: &'a str,
    pub status: StatusNotificacao,
    pub metadados: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct NotificacaoRepository {
    pool: PgPool,
}

impl NotificacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn registrar(&self, nova: NovaNotificacao<'_>) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO notificacoes
                (id_usuario, id_incidente, canal, destinatario, titulo, mensagem, status, metadados)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(nova.id_usuario)
        .bind(nova.id_incidente)
        .bind(nova.canal.as_str())
        .bind(nova.destinatario)
        .bind(nova.titulo)
        .bind(nova.mensagem)
        .bind(nova.status.as_str())
        .bind(nova.metadados)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn pendentes_do_usuario(
        &self,
        id_usuario: i32,
    ) -> Result<Vec<Notificacao>, AppError> {
        let notificacoes = sqlx::query_as::<_, Notificacao>(&format!(
            r#"
            SELECT {COLUNAS_NOTIFICACAO} FROM notificacoes
            WHERE id_usuario = $1 AND lida = false
            ORDER BY created_at DESC
            "#
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;

        Ok(notificacoes)
    }

    pub async fn marcar_lida(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notificacoes SET lida = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
