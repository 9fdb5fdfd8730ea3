pub mod auditoria_service;
pub mod escala_service;
pub mod incidente_service;
pub mod notificacao_service;
pub mod permissao_service;
pub mod regra_service;
pub mod push;
