//src/main.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let usuario_routes = Router::new()
        .route(
            "/{id}/permissoes-calculadas",
            get(handlers::permissoes::permissoes_calculadas),
        )
        .route(
            "/{id}/toggle-permissao",
            post(handlers::permissoes::toggle_permissao_usuario),
        )
        .route(
            "/{id}/preferencias",
            put(handlers::notificacoes::atualizar_preferencias),
        );

    let sistema_routes = Router::new()
        .route(
            "/toggle-permissao",
            post(handlers::permissoes::toggle_permissao_role),
        )
        .route(
            "/matriz-permissoes",
            get(handlers::permissoes::matriz_permissoes),
        )
        .route("/auditoria", get(handlers::auditoria::listar_recentes));

    let escala_routes = Router::new()
        .route("/", post(handlers::escalas::criar))
        .route("/titular", get(handlers::escalas::titular))
        .route("/de-plantao", get(handlers::escalas::de_plantao))
        .route("/{id}/ack", put(handlers::escalas::confirmar));

    let incidente_routes = Router::new()
        .route("/{id}/ack", post(handlers::incidentes::reconhecer))
        .route("/{id}/close", post(handlers::incidentes::fechar))
        .route("/{id}/eventos", get(handlers::incidentes::linha_do_tempo))
        .route(
            "/{id}/reexecute",
            post(handlers::incidentes::solicitar_reexecucao),
        );

    let notificacao_routes = Router::new()
        .route("/push", post(handlers::notificacoes::enviar_push))
        .route("/pendentes", get(handlers::notificacoes::pendentes))
        .route("/{id}/ler", put(handlers::notificacoes::marcar_lida));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/sql/autorizar", post(handlers::permissoes::autorizar_sql))
        .route(
            "/api/execucoes/falha",
            post(handlers::incidentes::registrar_falha),
        )
        .route(
            "/api/dispositivos",
            post(handlers::notificacoes::salvar_dispositivo),
        )
        .route(
            "/api/regras/{id}/silenciar",
            put(handlers::regras::silenciar),
        )
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/sistema", sistema_routes)
        .nest("/api/escalas", escala_routes)
        .nest("/api/incidentes", incidente_routes)
        .nest("/api/notificacoes", notificacao_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
