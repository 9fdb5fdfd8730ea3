// src/handlers/incidentes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::UsuarioAtuante,
    models::incidente::{FalhaExecucaoPayload, FecharIncidentePayload},
    services::incidente_service::ResultadoFalha,
};

/// OPEN → ACK. Um segundo ACK é aceito em silêncio; sobre CLOSED é 409.
/// A permissão GERIR_INCIDENTES é checada dentro do serviço.
#[utoipa::path(
    post,
    path = "/api/incidentes/{id}/ack",
    params(("id" = i64, Path, description = "ID do incidente")),
    responses(
        (status = 200, description = "Incidente reconhecido"),
        (status = 403, description = "Sem permissão GERIR_INCIDENTES"),
        (status = 404, description = "Incidente não encontrado"),
        (status = 409, description = "Incidente já encerrado")
    ),
    tag = "Incidentes"
)]
pub async fn reconhecer(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.incidente_service.reconhecer(&ator, id).await?;
    Ok(Json(json!({ "idIncidente": id, "status": status.as_str() })))
}

#[utoipa::path(
    post,
    path = "/api/incidentes/{id}/close",
    params(("id" = i64, Path, description = "ID do incidente")),
    request_body = FecharIncidentePayload,
    responses(
        (status = 200, description = "Incidente fechado"),
        (status = 403, description = "Sem permissão GERIR_INCIDENTES"),
        (status = 404, description = "Incidente não encontrado")
    ),
    tag = "Incidentes"
)]
pub async fn fechar(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Path(id): Path<i64>,
    Json(payload): Json<FecharIncidentePayload>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state
        .incidente_service
        .fechar(&ator, id, payload.comentario.as_deref())
        .await?;

    Ok(Json(json!({ "idIncidente": id, "status": status.as_str() })))
}

/// Reenfileira a regra de origem; o estado do incidente não muda.
#[utoipa::path(
    post,
    path = "/api/incidentes/{id}/reexecute",
    params(("id" = i64, Path, description = "ID do incidente")),
    responses(
        (status = 202, description = "Reexecução enfileirada"),
        (status = 403, description = "Sem permissão GERIR_INCIDENTES"),
        (status = 404, description = "Incidente não encontrado")
    ),
    tag = "Incidentes"
)]
pub async fn solicitar_reexecucao(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.incidente_service.solicitar_reexecucao(&ator, id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Reexecução enfileirada." })),
    ))
}

/// A linha do tempo do incidente: aberturas, reconhecimentos, fechamentos
/// e reexecuções, em ordem de ocorrência.
#[utoipa::path(
    get,
    path = "/api/incidentes/{id}/eventos",
    params(("id" = i64, Path, description = "ID do incidente")),
    responses(
        (status = 200, description = "Eventos do incidente"),
        (status = 404, description = "Incidente não encontrado")
    ),
    tag = "Incidentes"
)]
pub async fn linha_do_tempo(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let eventos = app_state.incidente_service.linha_do_tempo(id).await?;
    Ok(Json(eventos))
}

/// Gatilho do runner: uma execução de regra falhou. Incidente novo sai
/// como 201; falha repetida de regra já aberta vira recorrência (200).
#[utoipa::path(
    post,
    path = "/api/execucoes/falha",
    request_body = FalhaExecucaoPayload,
    responses(
        (status = 201, description = "Incidente aberto", body = ResultadoFalha),
        (status = 200, description = "Recorrência registrada", body = ResultadoFalha),
        (status = 404, description = "Regra não encontrada")
    ),
    tag = "Incidentes"
)]
pub async fn registrar_falha(
    State(app_state): State<AppState>,
    Json(payload): Json<FalhaExecucaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let resultado = app_state.incidente_service.abrir_ou_atualizar(payload).await?;

    let status = match &resultado {
        ResultadoFalha::Aberto { .. } => StatusCode::CREATED,
        ResultadoFalha::Recorrencia { .. } => StatusCode::OK,
    };

    Ok((status, Json(resultado)))
}
