pub mod auditoria;
pub mod escalas;
pub mod incidentes;
pub mod notificacoes;
pub mod permissoes;
pub mod regras;
