// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{common::error::AppError, config::AppState, models::usuario::Usuario};

/// O usuário que está agindo nesta requisição. A identidade é afirmada
/// pelo chamador no header `x-user-id`; não há sessão nem token aqui.
/// O extractor carrega o cadastro completo para os serviços terem nome,
/// role e preferências à mão.
pub struct UsuarioAtuante(pub Usuario);

impl<S> FromRequestParts<S> for UsuarioAtuante
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let id: i32 = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .ok_or(AppError::NaoIdentificado)?;

        let usuario = app_state
            .usuario_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoIdentificado)?;

        Ok(UsuarioAtuante(usuario))
    }
}
