// src/handlers/notificacoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::notificacao::EnviarPushPayload,
    models::usuario::{PreferenciasPayload, SalvarDispositivoPayload},
};

/// Envio de push para um alvo: e-mail explícito, role inteira ou o
/// plantonista de um canal. Preferências e não-perturbe são respeitados;
/// "ninguém elegível" é resposta normal, não erro.
#[utoipa::path(
    post,
    path = "/api/notificacoes/push",
    request_body = EnviarPushPayload,
    responses(
        (status = 200, description = "Resultado do envio", body = crate::services::notificacao_service::ResultadoEnvio),
        (status = 400, description = "Nenhum alvo informado")
    ),
    tag = "Notificações"
)]
pub async fn enviar_push(
    State(app_state): State<AppState>,
    Json(payload): Json<EnviarPushPayload>,
) -> Result<impl IntoResponse, AppError> {
    let destino = payload.destino().ok_or_else(|| {
        AppError::EntradaInvalida(
            "Informe emailAlvo, targetRole ou canal como destino.".into(),
        )
    })?;

    let resultado = app_state
        .notificacao_service
        .enviar_push(destino, &payload.titulo, &payload.mensagem, payload.id_incidente)
        .await?;

    Ok(Json(resultado))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PendentesQuery {
    pub id_usuario: i32,
}

#[utoipa::path(
    get,
    path = "/api/notificacoes/pendentes",
    params(PendentesQuery),
    responses(
        (status = 200, description = "Notificações não lidas, mais recentes primeiro")
    ),
    tag = "Notificações"
)]
pub async fn pendentes(
    State(app_state): State<AppState>,
    Query(query): Query<PendentesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notificacoes = app_state
        .notificacao_service
        .pendentes_do_usuario(query.id_usuario)
        .await?;

    Ok(Json(notificacoes))
}

#[utoipa::path(
    put,
    path = "/api/notificacoes/{id}/ler",
    params(("id" = i64, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Marcada como lida"),
        (status = 404, description = "Notificação não encontrada")
    ),
    tag = "Notificações"
)]
pub async fn marcar_lida(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.notificacao_service.marcar_lida(id).await?;
    Ok(Json(json!({ "message": "Notificação marcada como lida." })))
}

/// Registra (ou reativa) o token de push de um dispositivo.
#[utoipa::path(
    post,
    path = "/api/dispositivos",
    request_body = SalvarDispositivoPayload,
    responses(
        (status = 201, description = "Dispositivo registrado"),
        (status = 404, description = "Usuário não encontrado")
    ),
    tag = "Notificações"
)]
pub async fn salvar_dispositivo(
    State(app_state): State<AppState>,
    Json(payload): Json<SalvarDispositivoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.notificacao_service.salvar_dispositivo(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Dispositivo registrado." })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/preferencias",
    params(("id" = i32, Path, description = "ID do usuário")),
    request_body = PreferenciasPayload,
    responses(
        (status = 200, description = "Preferências atualizadas"),
        (status = 404, description = "Usuário não encontrado")
    ),
    tag = "Notificações"
)]
pub async fn atualizar_preferencias(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PreferenciasPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .notificacao_service
        .atualizar_preferencias(id, &payload)
        .await?;

    Ok(Json(json!({ "message": "Preferências atualizadas." })))
}
