pub mod auditoria;
pub mod escala;
pub mod incidente;
pub mod notificacao;
pub mod permissao;
pub mod regra;
pub mod usuario;
