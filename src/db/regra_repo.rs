// src/db/regra_repo.rs

use sqlx::{PgPool, Postgres, Executor};

use crate::common::error::AppError;
use crate::models::regra::Regra;

#[derive(Clone)]
pub struct RegraRepository {
    pool: PgPool,
}

impl RegraRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn buscar_por_id(&self, id: i32) -> Result<Option<Regra>, AppError> {
        let regra = sqlx::query_as::<_, Regra>(
            r#"
            SELECT id, nome, prioridade, canal, role_target, email_notificacao, silenciado_ate
            FROM regras WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(regra)
    }

    // Quem respeita a janela de silêncio é o runner; aqui só se grava.
    pub async fn silenciar(&self, id: i32, minutos: i32) -> Result<Option<Regra>, AppError> {
        let regra = sqlx::query_as::<_, Regra>(
            r#"
            UPDATE regras
            SET silenciado_ate = NOW() + make_interval(mins => $1)
            WHERE id = $2
            RETURNING id, nome, prioridade, canal, role_target, email_notificacao, silenciado_ate
            "#,
        )
        .bind(minutos)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(regra)
    }

    // Um pedido de rodada nova na fila do runner externo.
    pub async fn enfileirar_execucao<'e, E>(
        &self,
        executor: E,
        id_regra: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO fila_runner (id_regra, status, agendado_para) VALUES ($1, 'pendente', NOW())",
        )
        .bind(id_regra)
        .execute(executor)
        .await?;

        Ok(())
    }
}
