// src/services/regra_service.rs

use crate::common::error::AppError;
use crate::db::RegraRepository;
use crate::models::regra::Regra;
use crate::services::auditoria_service::AuditoriaService;

#[derive(Clone)]
pub struct RegraService {
    repo: RegraRepository,
    auditoria: AuditoriaService,
}

impl RegraService {
    pub fn new(repo: RegraRepository, auditoria: AuditoriaService) -> Self {
        Self { repo, auditoria }
    }

    /// Silencia a regra por N minutos a partir de agora. O runner pula
    /// regras silenciadas; incidentes já abertos não são afetados.
    pub async fn silenciar(
        &self,
        responsavel: &str,
        regra_id: i32,
        minutos: i32,
    ) -> Result<Regra, AppError> {
        if minutos <= 0 {
            return Err(AppError::EntradaInvalida(
                "A duração do silêncio deve ser positiva.".into(),
            ));
        }

        let regra = self
            .repo
            .silenciar(regra_id, minutos)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Regra".into()))?;

        self.auditoria
            .registrar(
                responsavel,
                "REGRA_SILENCIAR",
                &format!("Regra ID {}", regra_id),
                &format!("Silenciada por {} min", minutos),
            )
            .await;

        Ok(regra)
    }
}
