// src/db/incidente_repo.rs

use sqlx::{PgPool, Postgres, Executor};

use crate::common::error::AppError;
use crate::models::incidente::{EventoIncidente, Incidente, TipoEvento};

const COLUNAS_INCIDENTE: &str = "id_incidente, id_regra, status, prioridade, detalhes, \
     comentario_resolucao, data_abertura, data_ultima_ocorrencia, id_execucao_origem";

#[derive(Clone)]
pub struct IncidenteRepository {
    pool: PgPool,
}

impl IncidenteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Leitura simples, sem lock; quem transiciona usa buscar_para_atualizar.
    pub async fn buscar_por_id(&self, id_incidente: i64) -> Result<Option<Incidente>, AppError> {
        let incidente = sqlx::query_as::<_, Incidente>(&format!(
            "SELECT {COLUNAS_INCIDENTE} FROM incidentes WHERE id_incidente = $1"
        ))
        .bind(id_incidente)
        .fetch_optional(&self.pool)
        .await?;

        Ok(incidente)
    }

    // FOR UPDATE: as transições rodam sob exclusão mútua por incidente;
    // o perdedor de uma corrida enxerga o estado já atualizado.
    pub async fn buscar_para_atualizar<'e, E>(
        &self,
        executor: E,
        id_incidente: i64,
    ) -> Result<Option<Incidente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let incidente = sqlx::query_as::<_, Incidente>(&format!(
            "SELECT {COLUNAS_INCIDENTE} FROM incidentes WHERE id_incidente = $1 FOR UPDATE"
        ))
        .bind(id_incidente)
        .fetch_optional(executor)
        .await?;

        Ok(incidente)
    }

    // Incidentes são deduplicados por regra enquanto não resolvidos.
    pub async fn buscar_aberto_por_regra<'e, E>(
        &self,
        executor: E,
        id_regra: i32,
    ) -> Result<Option<Incidente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let incidente = sqlx::query_as::<_, Incidente>(&format!(
            r#"
            SELECT {COLUNAS_INCIDENTE} FROM incidentes
            WHERE id_regra = $1 AND status IN ('OPEN', 'ACK')
            ORDER BY id_incidente
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(id_regra)
        .fetch_optional(executor)
        .await?;

        Ok(incidente)
    }

    pub async fn criar<'e, E>(
        &self,
        executor: E,
        id_regra: i32,
        prioridade: i32,
        detalhes: &str,
        id_execucao_origem: i64,
    ) -> Result<Incidente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let incidente = sqlx::query_as::<_, Incidente>(&format!(
            r#"
            INSERT INTO incidentes
                (id_regra, status, prioridade, detalhes, data_ultima_ocorrencia, id_execucao_origem)
            VALUES ($1, 'OPEN', $2, $3, NOW(), $4)
            RETURNING {COLUNAS_INCIDENTE}
            "#
        ))
        .bind(id_regra)
        .bind(prioridade)
        .bind(detalhes)
        .bind(id_execucao_origem)
        .fetch_one(executor)
        .await?;

        Ok(incidente)
    }

    pub async fn registrar_recorrencia<'e, E>(
        &self,
        executor: E,
        id_incidente: i64,
        detalhes: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE incidentes SET data_ultima_ocorrencia = NOW(), detalhes = $1 WHERE id_incidente = $2",
        )
        .bind(detalhes)
        .bind(id_incidente)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn atualizar_status<'e, E>(
        &self,
        executor: E,
        id_incidente: i64,
        status: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE incidentes SET status = $1 WHERE id_incidente = $2")
            .bind(status)
            .bind(id_incidente)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn fechar<'e, E>(
        &self,
        executor: E,
        id_incidente: i64,
        comentario: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE incidentes SET status = 'CLOSED', comentario_resolucao = $1 WHERE id_incidente = $2",
        )
        .bind(comentario)
        .bind(id_incidente)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Uma linha por transição; nunca atualizada.
    pub async fn registrar_evento<'e, E>(
        &self,
        executor: E,
        id_incidente: i64,
        tipo: TipoEvento,
        usuario: &str,
        detalhes: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO eventos_incidente (id_incidente, tipo, usuario, detalhes) VALUES ($1, $2, $3, $4)",
        )
        .bind(id_incidente)
        .bind(tipo.as_str())
        .bind(usuario)
        .bind(detalhes)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn listar_eventos(
        &self,
        id_incidente: i64,
    ) -> Result<Vec<EventoIncidente>, AppError> {
        let eventos = sqlx::query_as::<_, EventoIncidente>(
            r#"
            SELECT id, id_incidente, tipo, usuario, detalhes, timestamp
            FROM eventos_incidente
            WHERE id_incidente = $1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(id_incidente)
        .fetch_all(&self.pool)
        .await?;

        Ok(eventos)
    }
}
