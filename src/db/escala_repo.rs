// src/db/escala_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::escala::{Escala, CONFIRMACAO_ACK_OK};

const COLUNAS_ESCALA: &str =
    "id, id_usuario, canal, data_inicio, data_fim, status_confirmacao";

#[derive(Clone)]
pub struct EscalaRepository {
    pool: PgPool,
}

impl EscalaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn criar(
        &self,
        id_usuario: i32,
        canal: &str,
        data_inicio: DateTime<Utc>,
        data_fim: DateTime<Utc>,
    ) -> Result<Escala, AppError> {
        let escala = sqlx::query_as::<_, Escala>(&format!(
            r#"
            INSERT INTO escalas (id_usuario, canal, data_inicio, data_fim)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUNAS_ESCALA}
            "#
        ))
        .bind(id_usuario)
        .bind(canal)
        .bind(data_inicio)
        .bind(data_fim)
        .fetch_one(&self.pool)
        .await?;

        Ok(escala)
    }

    pub async fn buscar_por_id(&self, id: i32) -> Result<Option<Escala>, AppError> {
        let escala = sqlx::query_as::<_, Escala>(&format!(
            "SELECT {COLUNAS_ESCALA} FROM escalas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(escala)
    }

    // A escrita só acontece se a escala pertencer ao usuário; o serviço usa
    // buscar_por_id antes para distinguir "não existe" de "não é sua".
    pub async fn confirmar(&self, id: i32, id_usuario: i32) -> Result<Option<Escala>, AppError> {
        let escala = sqlx::query_as::<_, Escala>(&format!(
            r#"
            UPDATE escalas SET status_confirmacao = $1
            WHERE id = $2 AND id_usuario = $3
            RETURNING {COLUNAS_ESCALA}
            "#
        ))
        .bind(CONFIRMACAO_ACK_OK)
        .bind(id)
        .bind(id_usuario)
        .fetch_optional(&self.pool)
        .await?;

        Ok(escala)
    }

    // Casamento de canal é case-insensitive. A ordenação espelha o desempate
    // do serviço (início mais antigo, depois menor id).
    pub async fn vigentes_no_canal(
        &self,
        canal: &str,
        em: DateTime<Utc>,
    ) -> Result<Vec<Escala>, AppError> {
        let escalas = sqlx::query_as::<_, Escala>(&format!(
            r#"
            SELECT {COLUNAS_ESCALA} FROM escalas
            WHERE UPPER(canal) = UPPER($1)
              AND data_inicio <= $2
              AND $2 <= data_fim
            ORDER BY data_inicio ASC, id ASC
            "#
        ))
        .bind(canal)
        .bind(em)
        .fetch_all(&self.pool)
        .await?;

        Ok(escalas)
    }

    pub async fn usuario_de_plantao(
        &self,
        id_usuario: i32,
        canal: &str,
        em: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let (existe,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM escalas
                WHERE id_usuario = $1
                  AND UPPER(canal) = UPPER($2)
                  AND data_inicio <= $3
                  AND $3 <= data_fim
            )
            "#,
        )
        .bind(id_usuario)
        .bind(canal)
        .bind(em)
        .fetch_one(&self.pool)
        .await?;

        Ok(existe)
    }
}
