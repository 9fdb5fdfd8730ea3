// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Permissões ---
        handlers::permissoes::permissoes_calculadas,
        handlers::permissoes::toggle_permissao_usuario,
        handlers::permissoes::toggle_permissao_role,
        handlers::permissoes::matriz_permissoes,
        handlers::permissoes::autorizar_sql,

        // --- Escalas ---
        handlers::escalas::titular,
        handlers::escalas::de_plantao,
        handlers::escalas::criar,
        handlers::escalas::confirmar,

        // --- Incidentes ---
        handlers::incidentes::reconhecer,
        handlers::incidentes::fechar,
        handlers::incidentes::linha_do_tempo,
        handlers::incidentes::solicitar_reexecucao,
        handlers::incidentes::registrar_falha,

        // --- Regras ---
        handlers::regras::silenciar,

        // --- Auditoria ---
        handlers::auditoria::listar_recentes,

        // --- Notificações ---
        handlers::notificacoes::enviar_push,
        handlers::notificacoes::pendentes,
        handlers::notificacoes::marcar_lida,
        handlers::notificacoes::salvar_dispositivo,
        handlers::notificacoes::atualizar_preferencias,
    ),
    components(
        schemas(
            // --- Permissões ---
            models::permissao::Permissao,
            models::permissao::PermissaoRole,
            models::permissao::PermissaoCalculada,
            models::permissao::TogglePermissaoRolePayload,
            models::permissao::TogglePermissaoUsuarioPayload,
            services::permissao_service::AutorizacaoComando,
            services::permissao_service::MatrizPermissoes,
            handlers::permissoes::AutorizarSqlPayload,

            // --- Usuários ---
            models::usuario::Usuario,
            models::usuario::SalvarDispositivoPayload,
            models::usuario::PreferenciasPayload,

            // --- Escalas ---
            models::escala::Escala,
            models::escala::CriarEscalaPayload,

            // --- Incidentes ---
            models::incidente::Incidente,
            models::incidente::StatusIncidente,
            models::incidente::EventoIncidente,
            models::incidente::FecharIncidentePayload,
            models::incidente::FalhaExecucaoPayload,
            services::incidente_service::ResultadoFalha,

            // --- Regras ---
            models::regra::Regra,
            handlers::regras::SilenciarRegraPayload,

            // --- Auditoria ---
            models::auditoria::LogAuditoria,

            // --- Notificações ---
            models::notificacao::Notificacao,
            models::notificacao::StatusNotificacao,
            models::notificacao::EnviarPushPayload,
            services::notificacao_service::ResultadoEnvio,
        )
    ),
    tags(
        (name = "Permissões", description = "Resolução e gestão de permissões"),
        (name = "Escalas", description = "Plantões e titularidade por canal"),
        (name = "Incidentes", description = "Ciclo de vida de incidentes"),
        (name = "Notificações", description = "Push, e-mail enfileirado e preferências"),
        (name = "Regras", description = "Regras de monitoramento (lado do núcleo)"),
        (name = "Auditoria", description = "Trilha imutável de ações")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_id_header",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
        );
    }
}
