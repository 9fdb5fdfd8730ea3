pub mod auditoria_repo;
pub use auditoria_repo::AuditoriaRepository;
pub mod escala_repo;
pub use escala_repo::EscalaRepository;
pub mod incidente_repo;
pub use incidente_repo::IncidenteRepository;
pub mod notificacao_repo;
pub use notificacao_repo::NotificacaoRepository;
pub mod permissao_repo;
pub use permissao_repo::PermissaoRepository;
pub mod regra_repo;
pub use regra_repo::RegraRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
