// src/handlers/escalas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::UsuarioAtuante,
        rbac::{ExigirPermissao, GerirEscalas},
    },
    models::escala::CriarEscalaPayload,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TitularQuery {
    pub canal: String,

    // Instante de referência; ausente = agora.
    pub em: Option<DateTime<Utc>>,
}

/// Quem é o plantonista do canal no instante dado. Sobreposições resolvem
/// sempre para a mesma pessoa; `titular: null` quando ninguém cobre a janela.
#[utoipa::path(
    get,
    path = "/api/escalas/titular",
    params(TitularQuery),
    responses(
        (status = 200, description = "Titular vigente do canal, ou null")
    ),
    tag = "Escalas"
)]
pub async fn titular(
    State(app_state): State<AppState>,
    Query(query): Query<TitularQuery>,
) -> Result<impl IntoResponse, AppError> {
    let em = query.em.unwrap_or_else(Utc::now);
    let titular = app_state.escala_service.titular_do_canal(&query.canal, em).await?;

    let corpo = match titular {
        Some((escala, usuario)) => json!({
            "titular": {
                "escala": escala,
                "usuario": { "id": usuario.id, "nome": usuario.nome, "email": usuario.email },
            }
        }),
        None => json!({ "titular": null }),
    };

    Ok(Json(corpo))
}

#[utoipa::path(
    post,
    path = "/api/escalas",
    request_body = CriarEscalaPayload,
    responses(
        (status = 201, description = "Escala criada", body = crate::models::escala::Escala),
        (status = 400, description = "Janela inválida"),
        (status = 403, description = "Sem permissão GERIR_ESCALAS"),
        (status = 404, description = "Usuário não encontrado")
    ),
    tag = "Escalas"
)]
pub async fn criar(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    _guard: ExigirPermissao<GerirEscalas>,
    Json(payload): Json<CriarEscalaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let escala = app_state.escala_service.criar_escala(&ator.nome, payload).await?;

    Ok((StatusCode::CREATED, Json(escala)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DePlantaoQuery {
    pub canal: String,
}

/// O chamador está coberto por alguma escala do canal agora?
#[utoipa::path(
    get,
    path = "/api/escalas/de-plantao",
    params(DePlantaoQuery),
    responses(
        (status = 200, description = "Cobertura do chamador no canal")
    ),
    tag = "Escalas"
)]
pub async fn de_plantao(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Query(query): Query<DePlantaoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let coberto = app_state
        .escala_service
        .esta_de_plantao(ator.id, &query.canal, Utc::now())
        .await?;

    Ok(Json(json!({ "dePlantao": coberto, "canal": query.canal })))
}

/// Confirmação de presença no plantão. Só o próprio escalado confirma.
#[utoipa::path(
    put,
    path = "/api/escalas/{id}/ack",
    params(("id" = i32, Path, description = "ID da escala")),
    responses(
        (status = 200, description = "Presença confirmada", body = crate::models::escala::Escala),
        (status = 403, description = "Escala pertence a outro usuário"),
        (status = 404, description = "Escala não encontrada")
    ),
    tag = "Escalas"
)]
pub async fn confirmar(
    State(app_state): State<AppState>,
    UsuarioAtuante(ator): UsuarioAtuante,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let escala = app_state.escala_service.confirmar_escala(id, ator.id).await?;
    Ok(Json(escala))
}
