// src/db/usuario_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::usuario::Usuario;

const COLUNAS_USUARIO: &str = "id, nome, email, role, recebe_push, recebe_email, \
     inicio_nao_perturbe, fim_nao_perturbe, fuso_horario_minutos";

#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn buscar_por_id(&self, id: i32) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {COLUNAS_USUARIO} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }

    pub async fn buscar_por_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {COLUNAS_USUARIO} FROM usuarios WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }

    pub async fn listar_por_role(&self, role: &str) -> Result<Vec<Usuario>, AppError> {
        let usuarios = sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {COLUNAS_USUARIO} FROM usuarios WHERE LOWER(role) = LOWER($1)"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(usuarios)
    }

    // Grava o registro já fundido; a fusão campo a campo fica no modelo
    // (PreferenciasPayload::aplicar).
    pub async fn atualizar_preferencias(&self, usuario: &Usuario) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE usuarios
            SET recebe_push = $1,
                recebe_email = $2,
                inicio_nao_perturbe = $3,
                fim_nao_perturbe = $4,
                fuso_horario_minutos = $5
            WHERE id = $6
            "#,
        )
        .bind(usuario.recebe_push)
        .bind(usuario.recebe_email)
        .bind(usuario.inicio_nao_perturbe)
        .bind(usuario.fim_nao_perturbe)
        .bind(usuario.fuso_horario_minutos)
        .bind(usuario.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Tokens vivos do usuário; a coluna ativo marca dispositivos desligados.
    pub async fn tokens_ativos(&self, usuario_id: i32) -> Result<Vec<String>, AppError> {
        let tokens: Vec<(String,)> = sqlx::query_as(
            "SELECT push_token FROM dispositivos_usuarios WHERE id_usuario = $1 AND ativo = true",
        )
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens.into_iter().map(|(t,)| t).collect())
    }

    // Um token pertence a no máximo um usuário; revincular atualiza o dono.
    pub async fn salvar_dispositivo(
        &self,
        usuario_id: i32,
        push_token: &str,
        tipo_dispositivo: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO dispositivos_usuarios (id_usuario, push_token, tipo_dispositivo, ultimo_acesso, ativo)
            VALUES ($1, $2, $3, NOW(), true)
            ON CONFLICT (push_token)
            DO UPDATE SET id_usuario = $1, ultimo_acesso = NOW(), ativo = true
            "#,
        )
        .bind(usuario_id)
        .bind(push_token)
        .bind(tipo_dispositivo)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
