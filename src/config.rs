// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db::{
    AuditoriaRepository, EscalaRepository, IncidenteRepository, NotificacaoRepository,
    PermissaoRepository, RegraRepository, UsuarioRepository,
};
use crate::services::{
    auditoria_service::AuditoriaService, escala_service::EscalaService,
    incidente_service::IncidenteService, notificacao_service::NotificacaoService,
    permissao_service::PermissaoService, push::FcmClient, regra_service::RegraService,
};

const LIMITE_PUSH_PADRAO_SEGUNDOS: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    // O repositório de usuários fica exposto para o extractor de identidade.
    pub usuario_repo: UsuarioRepository,
    pub permissao_service: PermissaoService,
    pub escala_service: EscalaService,
    pub incidente_service: IncidenteService,
    pub notificacao_service: NotificacaoService,
    pub auditoria_service: AuditoriaService,
    pub regra_service: RegraService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let fcm_url = env::var("FCM_URL")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());
        let fcm_chave = env::var("FCM_SERVER_KEY").unwrap_or_default();
        let limite_push = env::var("PUSH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(LIMITE_PUSH_PADRAO_SEGUNDOS));

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let permissao_repo = PermissaoRepository::new(db_pool.clone());
        let escala_repo = EscalaRepository::new(db_pool.clone());
        let regra_repo = RegraRepository::new(db_pool.clone());
        let incidente_repo = IncidenteRepository::new(db_pool.clone());
        let notificacao_repo = NotificacaoRepository::new(db_pool.clone());
        let auditoria_repo = AuditoriaRepository::new(db_pool.clone());

        let auditoria = AuditoriaService::new(auditoria_repo);
        let permissao_service =
            PermissaoService::new(permissao_repo, usuario_repo.clone(), auditoria.clone());
        let escala_service = EscalaService::new(
            escala_repo,
            usuario_repo.clone(),
            notificacao_repo.clone(),
            auditoria.clone(),
        );

        let transporte = Arc::new(FcmClient::new(fcm_url, fcm_chave));
        let notificacao_service = NotificacaoService::new(
            notificacao_repo,
            usuario_repo.clone(),
            escala_service.clone(),
            auditoria.clone(),
            transporte,
            limite_push,
        );

        let regra_service = RegraService::new(regra_repo.clone(), auditoria.clone());

        let incidente_service = IncidenteService::new(
            incidente_repo,
            regra_repo,
            permissao_service.clone(),
            escala_service.clone(),
            notificacao_service.clone(),
            auditoria.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            usuario_repo,
            permissao_service,
            escala_service,
            incidente_service,
            notificacao_service,
            auditoria_service: auditoria,
            regra_service,
        })
    }
}
