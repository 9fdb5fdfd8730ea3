// src/handlers/regras.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::UsuarioAtuante,
        rbac::{ExigirPermissao, GerirRegras},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SilenciarRegraPayload {
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    #[schema(example = 60)]
    pub minutos: i32,
}

/// Silencia a regra por N minutos; o runner pula regras silenciadas.
#[utoipa::path(
    put,
    path = "/api/regras/{id}/silenciar",
    params(("id" = i32, Path, description = "ID da regra")),
    request_body = SilenciarRegraPayload,
    responses(
        (status = 200, description = "Regra silenciada", body = crate::models::regra::Regra),
        (status = 403, description = "Sem permissão GERIR_REGRAS"),
        (status = 404, description = "Regra não encontrada")
    ),
    tag = "Regras"
)]
pub async fn silenciar(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    _guard: ExigirPermissao<GerirRegras>,
    Path(id): Path<i32>,
    Json(payload): Json<SilenciarRegraPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let regra = app_state
        .regra_service
        .silenciar(&ator.nome, id, payload.minutos)
        .await?;

    Ok(Json(regra))
}
