// src/services/escala_service.rs

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::common::error::AppError;
use crate::db::notificacao_repo::NovaNotificacao;
use crate::db::{EscalaRepository, NotificacaoRepository, UsuarioRepository};
use crate::models::escala::{escolher_titular, janela_valida, CriarEscalaPayload, Escala};
use crate::models::notificacao::{CanalNotificacao, StatusNotificacao};
use crate::models::usuario::Usuario;
use crate::services::auditoria_service::AuditoriaService;

#[derive(Clone)]
pub struct EscalaService {
    repo: EscalaRepository,
    usuario_repo: UsuarioRepository,
    notificacao_repo: NotificacaoRepository,
    auditoria: AuditoriaService,
}

impl EscalaService {
    pub fn new(
        repo: EscalaRepository,
        usuario_repo: UsuarioRepository,
        notificacao_repo: NotificacaoRepository,
        auditoria: AuditoriaService,
    ) -> Self {
        Self {
            repo,
            usuario_repo,
            notificacao_repo,
            auditoria,
        }
    }

    /// Quem é dono do canal no instante dado. Sobreposições resolvem de
    /// forma determinística: início mais antigo vence, empate pelo menor id.
    pub async fn titular_do_canal(
        &self,
        canal: &str,
        em: DateTime<Utc>,
    ) -> Result<Option<(Escala, Usuario)>, AppError> {
        let vigentes = self.repo.vigentes_no_canal(canal, em).await?;

        let Some(escala) = escolher_titular(&vigentes, em).cloned() else {
            return Ok(None);
        };

        let usuario = self
            .usuario_repo
            .buscar_por_id(escala.id_usuario)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário da escala".into()))?;

        Ok(Some((escala, usuario)))
    }

    pub async fn esta_de_plantao(
        &self,
        usuario_id: i32,
        canal: &str,
        em: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        self.repo.usuario_de_plantao(usuario_id, canal, em).await
    }

    pub async fn criar_escala(
        &self,
        responsavel: &str,
        payload: CriarEscalaPayload,
    ) -> Result<Escala, AppError> {
        if !janela_valida(payload.data_inicio, payload.data_fim) {
            return Err(AppError::EntradaInvalida(
                "Data final deve ser maior que a inicial.".into(),
            ));
        }

        let usuario = self
            .usuario_repo
            .buscar_por_id(payload.id_usuario)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário".into()))?;

        let escala = self
            .repo
            .criar(
                payload.id_usuario,
                &payload.canal,
                payload.data_inicio,
                payload.data_fim,
            )
            .await?;

        // Avisa o escalado por e-mail; quem envia é o worker externo.
        let mensagem = format!(
            "Olá {}, você foi escalado para {} de {} até {}.",
            usuario.nome, escala.canal, escala.data_inicio, escala.data_fim
        );
        self.notificacao_repo
            .registrar(NovaNotificacao {
                id_usuario: Some(usuario.id),
                id_incidente: None,
                canal: CanalNotificacao::Email,
                destinatario: &usuario.email,
                titulo: &format!("Nova Escala: {}", escala.canal),
                mensagem: &mensagem,
                status: StatusNotificacao::Pending,
                metadados: Some(json!({ "tipo": "escala", "id_escala": escala.id })),
            })
            .await?;

        self.auditoria
            .registrar(
                responsavel,
                "ESCALA_CRIAR",
                &format!("User {}", escala.id_usuario),
                &format!("Escala criada para {}", escala.canal),
            )
            .await;

        Ok(escala)
    }

    /// Só o dono da escala pode confirmar presença. Escala de outro usuário
    /// devolve um erro próprio, distinto de "não existe".
    pub async fn confirmar_escala(
        &self,
        escala_id: i32,
        usuario_id: i32,
    ) -> Result<Escala, AppError> {
        let existente = self
            .repo
            .buscar_por_id(escala_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Escala".into()))?;

        if existente.id_usuario != usuario_id {
            return Err(AppError::EscalaNaoPertence);
        }

        let escala = self
            .repo
            .confirmar(escala_id, usuario_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Escala".into()))?;

        self.auditoria
            .registrar(
                &format!("User {}", usuario_id),
                "ESCALA_ACK",
                &format!("Escala {}", escala_id),
                "Confirmou presença no plantão",
            )
            .await;

        Ok(escala)
    }
}
