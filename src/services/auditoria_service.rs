// src/services/auditoria_service.rs

use crate::common::error::AppError;
use crate::db::AuditoriaRepository;
use crate::models::auditoria::LogAuditoria;

// Escrita de auditoria é fire-and-forget: uma falha aqui jamais desfaz ou
// falha a ação primária, só aparece no canal operacional (tracing).
#[derive(Clone)]
pub struct AuditoriaService {
    repo: AuditoriaRepository,
}

impl AuditoriaService {
    pub fn new(repo: AuditoriaRepository) -> Self {
        Self { repo }
    }

    pub async fn registrar(&self, responsavel: &str, acao: &str, alvo: &str, detalhes: &str) {
        if let Err(e) = self.repo.registrar(responsavel, acao, alvo, detalhes).await {
            tracing::error!(%acao, %alvo, erro = %e, "Falha ao gravar log de auditoria");
        }
    }

    // A trilha é consultada, nunca editada.
    pub async fn recentes(&self, limite: i64) -> Result<Vec<LogAuditoria>, AppError> {
        self.repo.listar_recentes(limite).await
    }
}
