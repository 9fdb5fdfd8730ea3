// src/db/permissao_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::permissao::{Permissao, PermissaoRole};

/// As duas fontes possíveis de um código para um usuário, ainda separadas.
/// A fusão (override > role > negado) acontece no serviço, nunca em SQL.
#[derive(Debug, sqlx::FromRow)]
pub struct LinhaFontes {
    pub permissao_id: i32,
    pub codigo: String,
    pub descricao: Option<String>,
    pub ativo_role: Option<bool>,
    pub ativo_override: Option<bool>,
}

#[derive(Clone)]
pub struct PermissaoRepository {
    pool: PgPool,
}

impl PermissaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn listar_permissoes(&self) -> Result<Vec<Permissao>, AppError> {
        let permissoes = sqlx::query_as::<_, Permissao>(
            "SELECT id, codigo, descricao FROM permissoes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissoes)
    }

    pub async fn listar_vinculos_roles(&self) -> Result<Vec<PermissaoRole>, AppError> {
        let vinculos = sqlx::query_as::<_, PermissaoRole>(
            "SELECT id, role, permissao_id, ativo FROM permissoes_roles ORDER BY role, permissao_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vinculos)
    }

    // Uma linha por código conhecido, mesmo sem vínculo algum (ambos NULL),
    // para o chamador renderizar a matriz completa de toggles.
    pub async fn fontes_do_usuario(
        &self,
        usuario_id: i32,
        role: &str,
    ) -> Result<Vec<LinhaFontes>, AppError> {
        let linhas = sqlx::query_as::<_, LinhaFontes>(
            r#"
            SELECT p.id AS permissao_id,
                   p.codigo,
                   p.descricao,
                   pr.ativo AS ativo_role,
                   pu.ativo AS ativo_override
            FROM permissoes p
            LEFT JOIN permissoes_roles pr
                   ON pr.permissao_id = p.id AND pr.role = $1
            LEFT JOIN permissoes_usuarios pu
                   ON pu.permissao_id = p.id AND pu.usuario_id = $2
            ORDER BY p.id
            "#,
        )
        .bind(role)
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(linhas)
    }

    pub async fn fontes_para_codigo(
        &self,
        usuario_id: i32,
        role: &str,
        codigo: &str,
    ) -> Result<Option<LinhaFontes>, AppError> {
        let linha = sqlx::query_as::<_, LinhaFontes>(
            r#"
            SELECT p.id AS permissao_id,
                   p.codigo,
                   p.descricao,
                   pr.ativo AS ativo_role,
                   pu.ativo AS ativo_override
            FROM permissoes p
            LEFT JOIN permissoes_roles pr
                   ON pr.permissao_id = p.id AND pr.role = $1
            LEFT JOIN permissoes_usuarios pu
                   ON pu.permissao_id = p.id AND pu.usuario_id = $2
            WHERE p.codigo = $3
            "#,
        )
        .bind(role)
        .bind(usuario_id)
        .bind(codigo)
        .fetch_optional(&self.pool)
        .await?;

        Ok(linha)
    }

    pub async fn buscar_por_id(&self, permissao_id: i32) -> Result<Option<Permissao>, AppError> {
        let permissao = sqlx::query_as::<_, Permissao>(
            "SELECT id, codigo, descricao FROM permissoes WHERE id = $1",
        )
        .bind(permissao_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(permissao)
    }

    // Upsert: no máximo um vínculo por (role, permissao)
    pub async fn upsert_vinculo_role(
        &self,
        role: &str,
        permissao_id: i32,
        ativo: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO permissoes_roles (role, permissao_id, ativo)
            VALUES ($1, $2, $3)
            ON CONFLICT (role, permissao_id) DO UPDATE SET ativo = $3
            "#,
        )
        .bind(role)
        .bind(permissao_id)
        .bind(ativo)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Upsert: no máximo um override por (usuario, permissao); sempre customizado
    pub async fn upsert_override_usuario(
        &self,
        usuario_id: i32,
        permissao_id: i32,
        ativo: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO permissoes_usuarios (usuario_id, permissao_id, ativo, is_customizado)
            VALUES ($1, $2, $3, true)
            ON CONFLICT (usuario_id, permissao_id) DO UPDATE
                SET ativo = $3, is_customizado = true
            "#,
        )
        .bind(usuario_id)
        .bind(permissao_id)
        .bind(ativo)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
