// src/handlers/permissoes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::UsuarioAtuante,
        rbac::{ExigirPermissao, GerirPermissoes},
    },
    models::permissao::{TogglePermissaoRolePayload, TogglePermissaoUsuarioPayload},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutorizarSqlPayload {
    #[validate(length(min = 1, message = "O comando SQL é obrigatório."))]
    #[schema(example = "DELETE FROM logs WHERE id = 1")]
    pub sql: String,
}

/// A matriz efetiva de um usuário: uma linha por código conhecido, com a
/// origem (role ou exceção individual) resolvida.
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}/permissoes-calculadas",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Matriz efetiva do usuário"),
        (status = 404, description = "Usuário não encontrado")
    ),
    tag = "Permissões"
)]
pub async fn permissoes_calculadas(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let calculadas = app_state.permissao_service.resolver_todas(id).await?;
    Ok(Json(calculadas))
}

/// Exceção individual: vence o padrão da role em qualquer direção.
#[utoipa::path(
    post,
    path = "/api/usuarios/{id}/toggle-permissao",
    params(("id" = i32, Path, description = "ID do usuário alvo")),
    request_body = TogglePermissaoUsuarioPayload,
    responses(
        (status = 200, description = "Exceção registrada"),
        (status = 403, description = "Sem permissão GERIR_PERMISSOES"),
        (status = 404, description = "Usuário ou permissão não encontrados")
    ),
    tag = "Permissões"
)]
pub async fn toggle_permissao_usuario(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    _guard: ExigirPermissao<GerirPermissoes>,
    Path(id): Path<i32>,
    Json(payload): Json<TogglePermissaoUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .permissao_service
        .alternar_permissao_usuario(&ator.nome, id, payload.permissao_id, payload.ativo)
        .await?;

    Ok(Json(json!({ "message": "Permissão do usuário atualizada." })))
}

/// Padrão de uma role inteira; usuários com exceção individual não mudam.
#[utoipa::path(
    post,
    path = "/api/sistema/toggle-permissao",
    request_body = TogglePermissaoRolePayload,
    responses(
        (status = 200, description = "Padrão da role atualizado"),
        (status = 403, description = "Sem permissão GERIR_PERMISSOES"),
        (status = 404, description = "Permissão não encontrada")
    ),
    tag = "Permissões"
)]
pub async fn toggle_permissao_role(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    _guard: ExigirPermissao<GerirPermissoes>,
    Json(payload): Json<TogglePermissaoRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .permissao_service
        .alternar_permissao_role(&ator.nome, &payload.role, payload.permissao_id, payload.ativo)
        .await?;

    Ok(Json(json!({ "message": "Permissão da role atualizada." })))
}

#[utoipa::path(
    get,
    path = "/api/sistema/matriz-permissoes",
    responses(
        (status = 200, description = "Catálogo de permissões e vínculos por role")
    ),
    tag = "Permissões"
)]
pub async fn matriz_permissoes(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let matriz = app_state.permissao_service.matriz_permissoes().await?;
    Ok(Json(matriz))
}

/// Classifica o comando pela palavra-chave inicial e checa a permissão da
/// classe. Quem executa o SQL é outro componente; aqui só se decide.
#[utoipa::path(
    post,
    path = "/api/sql/autorizar",
    request_body = AutorizarSqlPayload,
    responses(
        (status = 200, description = "Comando autorizado", body = crate::services::permissao_service::AutorizacaoComando),
        (status = 403, description = "Permissão da classe negada")
    ),
    tag = "Permissões"
)]
pub async fn autorizar_sql(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Json(payload): Json<AutorizarSqlPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let autorizacao = app_state
        .permissao_service
        .autorizar_comando(ator.id, &payload.sql)
        .await?;

    Ok((StatusCode::OK, Json(autorizacao)))
}
