// src/services/incidente_service.rs

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::db::{IncidenteRepository, RegraRepository};
use crate::models::incidente::{
    EventoIncidente, FalhaExecucaoPayload, Incidente, StatusIncidente, TipoEvento,
};
use crate::models::notificacao::DestinoNotificacao;
use crate::models::regra::Regra;
use crate::models::usuario::Usuario;
use crate::services::auditoria_service::AuditoriaService;
use crate::services::escala_service::EscalaService;
use crate::services::notificacao_service::NotificacaoService;
use crate::services::permissao_service::{PermissaoService, PERM_GERIR_INCIDENTES};

// Resultado do gatilho externo: incidente novo ou recorrência deduplicada.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "resultado", rename_all = "camelCase")]
pub enum ResultadoFalha {
    #[serde(rename_all = "camelCase")]
    Aberto { incidente: Incidente },
    #[serde(rename_all = "camelCase")]
    Recorrencia { id_incidente: i64 },
}

#[derive(Clone)]
pub struct IncidenteService {
    repo: IncidenteRepository,
    regra_repo: RegraRepository,
    permissao_service: PermissaoService,
    escala_service: EscalaService,
    notificacao_service: NotificacaoService,
    auditoria: AuditoriaService,
    pool: PgPool,
}

impl IncidenteService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: IncidenteRepository,
        regra_repo: RegraRepository,
        permissao_service: PermissaoService,
        escala_service: EscalaService,
        notificacao_service: NotificacaoService,
        auditoria: AuditoriaService,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            regra_repo,
            permissao_service,
            escala_service,
            notificacao_service,
            auditoria,
            pool,
        }
    }

    // Toda ação de operador passa primeiro pelo resolvedor.
    async fn exigir_gestao_de_incidentes(&self, ator: &Usuario) -> Result<(), AppError> {
        if !self
            .permissao_service
            .resolver(ator.id, PERM_GERIR_INCIDENTES)
            .await
        {
            return Err(AppError::PermissaoNegada(format!(
                "Você precisa da permissão '{}' para agir sobre incidentes.",
                PERM_GERIR_INCIDENTES
            )));
        }
        Ok(())
    }

    /// OPEN → ACK. Um ACK repetido sobre ACK é sucesso silencioso (operador
    /// clicando duas vezes numa corrida), mas o evento ainda é registrado.
    /// Sobre CLOSED é EstadoInvalido: nada sai do estado terminal via ACK.
    pub async fn reconhecer(
        &self,
        ator: &Usuario,
        id_incidente: i64,
    ) -> Result<StatusIncidente, AppError> {
        self.exigir_gestao_de_incidentes(ator).await?;

        let mut tx = self.pool.begin().await?;

        let incidente = self
            .repo
            .buscar_para_atualizar(&mut *tx, id_incidente)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Incidente".into()))?;

        let status = incidente
            .status_atual()
            .ok_or_else(|| anyhow::anyhow!("status desconhecido: {}", incidente.status))?;

        if !status.aceita_reconhecimento() {
            return Err(AppError::EstadoInvalido(
                "Incidente já encerrado; reconhecimento não se aplica.".into(),
            ));
        }

        if status == StatusIncidente::Open {
            self.repo
                .atualizar_status(&mut *tx, id_incidente, StatusIncidente::Ack.as_str())
                .await?;
        }

        self.repo
            .registrar_evento(
                &mut *tx,
                id_incidente,
                TipoEvento::Ack,
                &ator.nome,
                "Incidente reconhecido",
            )
            .await?;

        tx.commit().await?;

        self.auditoria
            .registrar(
                &ator.nome,
                "INCIDENTE_ACK",
                &format!("Incidente {}", id_incidente),
                "Reconhecido pelo operador",
            )
            .await;

        Ok(StatusIncidente::Ack)
    }

    /// Vale de OPEN e de ACK. Refechar um CLOSED sobrescreve o comentário e
    /// re-loga o evento — comportamento herdado da origem (ver DESIGN.md).
    pub async fn fechar(
        &self,
        ator: &Usuario,
        id_incidente: i64,
        comentario: Option<&str>,
    ) -> Result<StatusIncidente, AppError> {
        self.exigir_gestao_de_incidentes(ator).await?;

        let mut tx = self.pool.begin().await?;

        let incidente = self
            .repo
            .buscar_para_atualizar(&mut *tx, id_incidente)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Incidente".into()))?;

        // Fechamento não tem guarda de estado (ver doc acima); o parse só
        // barra um status corrompido no banco.
        incidente
            .status_atual()
            .ok_or_else(|| anyhow::anyhow!("status desconhecido: {}", incidente.status))?;

        self.repo.fechar(&mut *tx, id_incidente, comentario).await?;

        self.repo
            .registrar_evento(
                &mut *tx,
                id_incidente,
                TipoEvento::Close,
                &ator.nome,
                &format!("Fechado: {}", comentario.unwrap_or("Sem detalhes")),
            )
            .await?;

        tx.commit().await?;

        self.auditoria
            .registrar(
                &ator.nome,
                "INCIDENTE_CLOSE",
                &format!("Incidente #{}", id_incidente),
                "Status CLOSED",
            )
            .await;

        Ok(StatusIncidente::Closed)
    }

    /// Não muda o estado do incidente; enfileira uma rodada nova da regra de
    /// origem. Válido de qualquer estado, inclusive CLOSED — reexecutar a
    /// checagem de um incidente resolvido é permitido de propósito.
    pub async fn solicitar_reexecucao(
        &self,
        ator: &Usuario,
        id_incidente: i64,
    ) -> Result<(), AppError> {
        self.exigir_gestao_de_incidentes(ator).await?;

        let incidente = self
            .repo
            .buscar_por_id(id_incidente)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Incidente".into()))?;

        let mut tx = self.pool.begin().await?;

        self.regra_repo
            .enfileirar_execucao(&mut *tx, incidente.id_regra)
            .await?;

        self.repo
            .registrar_evento(
                &mut *tx,
                id_incidente,
                TipoEvento::Reexecute,
                &ator.nome,
                "Solicitada reexecução",
            )
            .await?;

        tx.commit().await?;

        self.auditoria
            .registrar(
                &ator.nome,
                "INCIDENTE_REEXECUTE",
                &format!("Incidente {}", id_incidente),
                "Solicitada reexecução",
            )
            .await;

        Ok(())
    }

    /// A linha do tempo completa do incidente, em ordem de ocorrência.
    pub async fn linha_do_tempo(
        &self,
        id_incidente: i64,
    ) -> Result<Vec<EventoIncidente>, AppError> {
        self.repo
            .buscar_por_id(id_incidente)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Incidente".into()))?;

        self.repo.listar_eventos(id_incidente).await
    }

    /// Gatilho externo de falha de execução. Enquanto houver incidente
    /// aberto (OPEN/ACK) para a regra, falhas repetidas só avançam a última
    /// ocorrência — uma regra oscilando produz um incidente, não um por
    /// falha. Incidente novo dispara o roteamento de notificações.
    pub async fn abrir_ou_atualizar(
        &self,
        payload: FalhaExecucaoPayload,
    ) -> Result<ResultadoFalha, AppError> {
        let regra = self
            .regra_repo
            .buscar_por_id(payload.id_regra)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Regra".into()))?;

        // Duas voltas: dois gatilhos simultâneos da mesma regra leem ambos
        // "sem incidente aberto", mas o índice único parcial deixa só um
        // INSERT passar. O perdedor volta ao início e reencontra o incidente
        // do vencedor como recorrência.
        for _ in 0..2 {
            let mut tx = self.pool.begin().await?;

            if let Some(existente) = self
                .repo
                .buscar_aberto_por_regra(&mut *tx, payload.id_regra)
                .await?
            {
                let detalhes = format!(
                    "Recorrência em {}: {}",
                    Utc::now().to_rfc3339(),
                    payload.detalhes
                );
                self.repo
                    .registrar_recorrencia(&mut *tx, existente.id_incidente, &detalhes)
                    .await?;
                tx.commit().await?;

                tracing::info!(
                    id_incidente = existente.id_incidente,
                    id_regra = payload.id_regra,
                    "Recorrência registrada em incidente aberto"
                );
                return Ok(ResultadoFalha::Recorrencia {
                    id_incidente: existente.id_incidente,
                });
            }

            let incidente = match self
                .repo
                .criar(
                    &mut *tx,
                    regra.id,
                    regra.prioridade,
                    &payload.detalhes,
                    payload.id_execucao,
                )
                .await
            {
                Ok(incidente) => incidente,
                Err(e) if e.violacao_de_unicidade() => {
                    tx.rollback().await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.repo
                .registrar_evento(
                    &mut *tx,
                    incidente.id_incidente,
                    TipoEvento::Open,
                    "Sistema",
                    &format!("Aberto pela execução {}", payload.id_execucao),
                )
                .await?;

            tx.commit().await?;

            self.auditoria
                .registrar(
                    "Sistema",
                    "INCIDENTE_ABRIR",
                    &format!("Incidente #{}", incidente.id_incidente),
                    &format!("Regra {} falhou", regra.nome),
                )
                .await;

            // Melhor esforço: problema no fan-out não desfaz o incidente criado.
            if let Err(e) = self.rotear_notificacoes(&regra, &incidente).await {
                tracing::warn!(
                    id_incidente = incidente.id_incidente,
                    erro = %e,
                    "Falha ao rotear notificações do incidente"
                );
            }

            return Ok(ResultadoFalha::Aberto { incidente });
        }

        // Só alcançável se o incidente concorrente foi aberto e fechado
        // entre as duas voltas; o gatilho pode simplesmente repetir o envio.
        Err(anyhow::anyhow!(
            "corrida persistente ao abrir incidente da regra {}",
            payload.id_regra
        )
        .into())
    }

    // Plantonista do canal da regra recebe push + e-mail; admins recebem
    // broadcast; destinatário fixo da regra recebe e-mail.
    async fn rotear_notificacoes(
        &self,
        regra: &Regra,
        incidente: &Incidente,
    ) -> Result<(), AppError> {
        let canal = regra.canal_de_roteamento();
        let titular = self.escala_service.titular_do_canal(canal, Utc::now()).await?;

        let nome_titular = match &titular {
            Some((_, usuario)) => {
                self.notificacao_service
                    .enviar_push(
                        DestinoNotificacao::Usuario(usuario.email.clone()),
                        &format!("AÇÃO NECESSÁRIA #{}", incidente.id_incidente),
                        &format!("Você está de plantão! Falha em: {}", regra.nome),
                        Some(incidente.id_incidente),
                    )
                    .await?;

                self.notificacao_service
                    .enfileirar_email(
                        usuario,
                        Some(incidente.id_incidente),
                        &format!("Ação NECESSÁRIA #{}", incidente.id_incidente),
                        &format!("Sua vez: {}. Ação necessária.", regra.nome),
                        Some(json!({
                            "rota": format!("/operador/incidentes/{}", incidente.id_incidente),
                            "prioridade": "alta",
                        })),
                    )
                    .await?;

                usuario.nome.clone()
            }
            None => {
                tracing::warn!(canal, "Sem plantonista ativo para o canal");
                "Ninguém".to_string()
            }
        };

        self.notificacao_service
            .enviar_push(
                DestinoNotificacao::Role("admin".into()),
                &format!("Novo Incidente #{}", incidente.id_incidente),
                &format!("Regra: {} | Operador: {}", regra.nome, nome_titular),
                Some(incidente.id_incidente),
            )
            .await?;

        if let Some(email) = regra.email_notificacao.as_deref().filter(|e| e.contains('@')) {
            self.notificacao_service
                .enfileirar_email_fixo(
                    email,
                    Some(incidente.id_incidente),
                    &format!("Alerta Específico: {}", regra.nome),
                    &format!(
                        "A regra '{}' falhou e você está configurado como receptor fixo. Incidente #{}",
                        regra.nome, incidente.id_incidente
                    ),
                )
                .await?;
        }

        Ok(())
    }
}
