// src/services/notificacao_service.rs

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::db::notificacao_repo::NovaNotificacao;
use crate::db::{NotificacaoRepository, UsuarioRepository};
use crate::models::notificacao::{
    CanalNotificacao, DestinoNotificacao, Notificacao, StatusNotificacao,
};
use crate::models::usuario::{PreferenciasPayload, SalvarDispositivoPayload, Usuario};
use crate::services::auditoria_service::AuditoriaService;
use crate::services::escala_service::EscalaService;
use crate::services::push::{enviar_com_timeout, ErroTransporte, PushTransport, RelatorioEnvio};

/// Hora de parede do destinatário, derivada do deslocamento guardado no
/// cadastro. O servidor nunca substitui o fuso do usuário pelo próprio.
pub fn hora_local(usuario: &Usuario, agora: DateTime<Utc>) -> NaiveTime {
    let segundos = usuario.fuso_horario_minutos.unwrap_or(0) * 60;
    // Deslocamento absurdo no cadastro cai em UTC em vez de derrubar o envio.
    let fuso: FixedOffset = FixedOffset::east_opt(segundos).unwrap_or_else(|| Utc.fix());
    agora.with_timezone(&fuso).time()
}

/// Janela de não-perturbe, inclusiva nas bordas. Janela invertida
/// (início > fim) atravessa a meia-noite.
pub fn em_nao_perturbe(usuario: &Usuario, agora: DateTime<Utc>) -> bool {
    let (Some(inicio), Some(fim)) = (usuario.inicio_nao_perturbe, usuario.fim_nao_perturbe)
    else {
        return false;
    };

    let t = hora_local(usuario, agora);
    if inicio <= fim {
        inicio <= t && t <= fim
    } else {
        t >= inicio || t <= fim
    }
}

// Filtro aplicado depois da resolução e antes do envio.
pub fn filtrar_elegiveis_push(usuarios: Vec<Usuario>, agora: DateTime<Utc>) -> Vec<Usuario> {
    usuarios
        .into_iter()
        .filter(|u| u.aceita_push() && !em_nao_perturbe(u, agora))
        .collect()
}

/// Um dispositivo físico nunca recebe o mesmo alerta duas vezes, mesmo
/// alcançado por mais de um caminho de resolução.
pub fn deduplicar_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Qualquer sucesso ⇒ SENT; tudo falhou ⇒ FAILED; provedor fora ⇒ PENDING.
pub fn status_agregado(resultado: &Result<RelatorioEnvio, ErroTransporte>) -> StatusNotificacao {
    match resultado {
        Ok(relatorio) if relatorio.sucessos > 0 => StatusNotificacao::Sent,
        Ok(_) => StatusNotificacao::Failed,
        Err(_) => StatusNotificacao::Pending,
    }
}

// "Ninguém elegível" não é erro de transporte; o chamador distingue.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "resultado", rename_all = "camelCase")]
pub enum ResultadoEnvio {
    SemDestinatarios,
    #[serde(rename_all = "camelCase")]
    Registrado {
        status: StatusNotificacao,
        destinatarios: usize,
        tokens: usize,
        sucessos: usize,
        falhas: usize,
    },
}

#[derive(Clone)]
pub struct NotificacaoService {
    repo: NotificacaoRepository,
    usuario_repo: UsuarioRepository,
    escala_service: EscalaService,
    auditoria: AuditoriaService,
    transporte: Arc<dyn PushTransport>,
    limite_push: Duration,
}

impl NotificacaoService {
    pub fn new(
        repo: NotificacaoRepository,
        usuario_repo: UsuarioRepository,
        escala_service: EscalaService,
        auditoria: AuditoriaService,
        transporte: Arc<dyn PushTransport>,
        limite_push: Duration,
    ) -> Self {
        Self {
            repo,
            usuario_repo,
            escala_service,
            auditoria,
            transporte,
            limite_push,
        }
    }

    async fn resolver_destinatarios(
        &self,
        destino: &DestinoNotificacao,
        agora: DateTime<Utc>,
    ) -> Result<Vec<Usuario>, AppError> {
        match destino {
            DestinoNotificacao::Usuario(email) => {
                Ok(self.usuario_repo.buscar_por_email(email).await?.into_iter().collect())
            }
            DestinoNotificacao::Role(role) => self.usuario_repo.listar_por_role(role).await,
            DestinoNotificacao::TitularCanal(canal) => {
                let titular = self.escala_service.titular_do_canal(canal, agora).await?;
                Ok(titular.map(|(_, usuario)| usuario).into_iter().collect())
            }
        }
    }

    /// Resolve destinatários, filtra preferências e não-perturbe, deduplica
    /// tokens e entrega uma única vez ao provedor, com espera limitada.
    pub async fn enviar_push(
        &self,
        destino: DestinoNotificacao,
        titulo: &str,
        mensagem: &str,
        id_incidente: Option<i64>,
    ) -> Result<ResultadoEnvio, AppError> {
        let agora = Utc::now();

        let resolvidos = self.resolver_destinatarios(&destino, agora).await?;
        let elegiveis = filtrar_elegiveis_push(resolvidos, agora);

        if elegiveis.is_empty() {
            tracing::info!(?destino, "Nenhum destinatário elegível para push");
            return Ok(ResultadoEnvio::SemDestinatarios);
        }

        let mut tokens = Vec::new();
        for usuario in &elegiveis {
            tokens.extend(self.usuario_repo.tokens_ativos(usuario.id).await?);
        }
        let tokens = deduplicar_tokens(tokens);

        if tokens.is_empty() {
            tracing::info!(?destino, "Destinatários sem dispositivo ativo");
            return Ok(ResultadoEnvio::SemDestinatarios);
        }

        let resultado = enviar_com_timeout(
            self.transporte.as_ref(),
            self.limite_push,
            &tokens,
            titulo,
            mensagem,
        )
        .await;

        if let Err(e) = &resultado {
            tracing::warn!(erro = %e, "Falha no provedor de push; registrando PENDING/FAILED");
        }

        let status = status_agregado(&resultado);
        let (sucessos, falhas) = match &resultado {
            Ok(r) => (r.sucessos, r.falhas),
            Err(_) => (0, tokens.len()),
        };

        // Uma linha por destinatário resolvido, por envio lógico.
        for usuario in &elegiveis {
            self.repo
                .registrar(NovaNotificacao {
                    id_usuario: Some(usuario.id),
                    id_incidente,
                    canal: CanalNotificacao::Push,
                    destinatario: &usuario.email,
                    titulo,
                    mensagem,
                    status,
                    metadados: None,
                })
                .await?;
        }

        Ok(ResultadoEnvio::Registrado {
            status,
            destinatarios: elegiveis.len(),
            tokens: tokens.len(),
            sucessos,
            falhas,
        })
    }

    /// Enfileira um e-mail para o worker de entrega externo, respeitando o
    /// opt-out do destinatário. Devolve se algo foi enfileirado.
    pub async fn enfileirar_email(
        &self,
        usuario: &Usuario,
        id_incidente: Option<i64>,
        titulo: &str,
        mensagem: &str,
        metadados: Option<serde_json::Value>,
    ) -> Result<bool, AppError> {
        if !usuario.aceita_email() {
            tracing::info!(usuario = %usuario.nome, "Usuário desativou e-mails; ignorando envio");
            return Ok(false);
        }

        self.repo
            .registrar(NovaNotificacao {
                id_usuario: Some(usuario.id),
                id_incidente,
                canal: CanalNotificacao::Email,
                destinatario: &usuario.email,
                titulo,
                mensagem,
                status: StatusNotificacao::Pending,
                metadados,
            })
            .await?;

        Ok(true)
    }

    // Destinatário fixo configurado na regra, sem usuário por trás.
    pub async fn enfileirar_email_fixo(
        &self,
        destinatario: &str,
        id_incidente: Option<i64>,
        titulo: &str,
        mensagem: &str,
    ) -> Result<(), AppError> {
        self.repo
            .registrar(NovaNotificacao {
                id_usuario: None,
                id_incidente,
                canal: CanalNotificacao::Email,
                destinatario,
                titulo,
                mensagem,
                status: StatusNotificacao::Pending,
                metadados: None,
            })
            .await?;

        Ok(())
    }

    pub async fn pendentes_do_usuario(&self, id_usuario: i32) -> Result<Vec<Notificacao>, AppError> {
        self.repo.pendentes_do_usuario(id_usuario).await
    }

    pub async fn marcar_lida(&self, id: i64) -> Result<(), AppError> {
        let alteradas = self.repo.marcar_lida(id).await?;
        if alteradas == 0 {
            return Err(AppError::NaoEncontrado("Notificação".into()));
        }
        Ok(())
    }

    pub async fn salvar_dispositivo(
        &self,
        payload: &SalvarDispositivoPayload,
    ) -> Result<(), AppError> {
        self.usuario_repo
            .buscar_por_id(payload.id_usuario)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário".into()))?;

        self.usuario_repo
            .salvar_dispositivo(
                payload.id_usuario,
                &payload.push_token,
                payload.tipo_dispositivo.as_deref().unwrap_or("WEB"),
            )
            .await
    }

    pub async fn atualizar_preferencias(
        &self,
        usuario_id: i32,
        prefs: &PreferenciasPayload,
    ) -> Result<(), AppError> {
        let atual = self
            .usuario_repo
            .buscar_por_id(usuario_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário".into()))?;

        self.usuario_repo
            .atualizar_preferencias(&prefs.aplicar(&atual))
            .await?;

        self.auditoria
            .registrar(
                &format!("User {}", usuario_id),
                "UPDATE_PREFS",
                &format!("ID {}", usuario_id),
                "Preferências de notificação atualizadas",
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn usuario(
        id: i32,
        recebe_push: Option<bool>,
        nao_perturbe: Option<(&str, &str)>,
        fuso_minutos: Option<i32>,
    ) -> Usuario {
        Usuario {
            id,
            nome: format!("u{id}"),
            email: format!("u{id}@x.com"),
            role: "operator".into(),
            recebe_push,
            recebe_email: None,
            inicio_nao_perturbe: nao_perturbe.map(|(i, _)| i.parse().unwrap()),
            fim_nao_perturbe: nao_perturbe.map(|(_, f)| f.parse().unwrap()),
            fuso_horario_minutos: fuso_minutos,
        }
    }

    #[test]
    fn opt_out_de_push_derruba_o_destinatario() {
        let agora = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let elegiveis = filtrar_elegiveis_push(
            vec![
                usuario(1, Some(false), None, None),
                usuario(2, Some(true), None, None),
                usuario(3, None, None, None), // NULL conta como habilitado
            ],
            agora,
        );

        let ids: Vec<i32> = elegiveis.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn nao_perturbe_usa_o_relogio_do_destinatario() {
        // 23:00 UTC; janela 22:00-06:00 no fuso local
        let agora = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();

        // Sem deslocamento: 23:00 local, dentro da janela
        let dormindo = usuario(1, None, Some(("22:00:00", "06:00:00")), Some(0));
        assert!(em_nao_perturbe(&dormindo, agora));

        // UTC+5: 04:00 local, ainda dentro da janela invertida
        let madrugada = usuario(2, None, Some(("22:00:00", "06:00:00")), Some(300));
        assert!(em_nao_perturbe(&madrugada, agora));

        // UTC-3: 20:00 local, fora da janela
        let acordado = usuario(3, None, Some(("22:00:00", "06:00:00")), Some(-180));
        assert!(!em_nao_perturbe(&acordado, agora));
    }

    #[test]
    fn janela_simples_nao_atravessa_meia_noite() {
        let u = usuario(1, None, Some(("12:00:00", "14:00:00")), Some(0));
        let dentro = Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap();
        let fora = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
        assert!(em_nao_perturbe(&u, dentro));
        assert!(!em_nao_perturbe(&u, fora));
    }

    #[test]
    fn sem_janela_configurada_nunca_bloqueia() {
        let u = usuario(1, None, None, Some(0));
        let agora = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        assert!(!em_nao_perturbe(&u, agora));
    }

    #[test]
    fn tokens_repetidos_colapsam_em_um() {
        let tokens = deduplicar_tokens(vec![
            "abc".into(),
            "def".into(),
            "abc".into(),
        ]);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn qualquer_sucesso_agrega_como_sent() {
        let parcial: Result<RelatorioEnvio, ErroTransporte> = Ok(RelatorioEnvio {
            sucessos: 1,
            falhas: 9,
        });
        assert_eq!(status_agregado(&parcial), StatusNotificacao::Sent);

        let tudo_falhou: Result<RelatorioEnvio, ErroTransporte> = Ok(RelatorioEnvio {
            sucessos: 0,
            falhas: 3,
        });
        assert_eq!(status_agregado(&tudo_falhou), StatusNotificacao::Failed);

        let fora: Result<RelatorioEnvio, ErroTransporte> = Err(ErroTransporte::TempoEsgotado);
        assert_eq!(status_agregado(&fora), StatusNotificacao::Pending);
    }
}
