// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::UsuarioAtuante,
    services::permissao_service::{PERM_GERIR_ESCALAS, PERM_GERIR_PERMISSOES, PERM_GERIR_REGRAS},
};

/// O trait que define o que é uma permissão exigível na borda HTTP.
pub trait PermissaoDef: Send + Sync + 'static {
    fn codigo() -> &'static str;
}

/// O guardião: presente na assinatura do handler, a rota só executa se o
/// resolvedor conceder o código. A negação nomeia a permissão que falta.
pub struct ExigirPermissao<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for ExigirPermissao<T>
where
    T: PermissaoDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let UsuarioAtuante(usuario) = UsuarioAtuante::from_request_parts(parts, state).await?;

        if !app_state
            .permissao_service
            .resolver(usuario.id, T::codigo())
            .await
        {
            return Err(AppError::PermissaoNegada(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                T::codigo()
            )));
        }

        Ok(ExigirPermissao(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct GerirPermissoes;
impl PermissaoDef for GerirPermissoes {
    fn codigo() -> &'static str {
        PERM_GERIR_PERMISSOES
    }
}

pub struct GerirEscalas;
impl PermissaoDef for GerirEscalas {
    fn codigo() -> &'static str {
        PERM_GERIR_ESCALAS
    }
}

pub struct GerirRegras;
impl PermissaoDef for GerirRegras {
    fn codigo() -> &'static str {
        PERM_GERIR_REGRAS
    }
}
