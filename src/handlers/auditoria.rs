// src/handlers/auditoria.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{ExigirPermissao, GerirPermissoes},
};

const LIMITE_PADRAO: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuditoriaQuery {
    pub limite: Option<i64>,
}

/// A trilha de auditoria, mais recente primeiro.
#[utoipa::path(
    get,
    path = "/api/sistema/auditoria",
    params(AuditoriaQuery),
    responses(
        (status = 200, description = "Entradas recentes da trilha"),
        (status = 403, description = "Sem permissão GERIR_PERMISSOES")
    ),
    tag = "Auditoria"
)]
pub async fn listar_recentes(
    State(app_state): State<AppState>,
    _guard: ExigirPermissao<GerirPermissoes>,
    Query(query): Query<AuditoriaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limite = query.limite.unwrap_or(LIMITE_PADRAO).clamp(1, 1_000);
    let logs = app_state.auditoria_service.recentes(limite).await?;
    Ok(Json(logs))
}
