// src/models/notificacao.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Registro persistido de um envio (Tabela notificacoes). Quem flipa o
// status final do e-mail é o worker de entrega externo; o núcleo registra.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notificacao {
    pub id: i64,
    pub id_usuario: Option<i32>,
    pub id_incidente: Option<i64>,
    pub canal: String,
    pub destinatario: String,
    pub titulo: Option<String>,
    pub mensagem: String,
    pub status: String,
    pub lida: bool,
    pub metadados: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanalNotificacao {
    Email,
    Push,
}

impl CanalNotificacao {
    pub fn as_str(self) -> &'static str {
        match self {
            CanalNotificacao::Email => "EMAIL",
            CanalNotificacao::Push => "PUSH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum StatusNotificacao {
    Pending,
    Sent,
    Failed,
}

impl StatusNotificacao {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusNotificacao::Pending => "PENDING",
            StatusNotificacao::Sent => "SENT",
            StatusNotificacao::Failed => "FAILED",
        }
    }
}

/// Para quem vai o alerta: endereço explícito, broadcast por role,
/// ou o titular de plantão de um canal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinoNotificacao {
    Usuario(String),
    Role(String),
    TitularCanal(String),
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnviarPushPayload {
    pub titulo: String,
    pub mensagem: String,

    // Exatamente um dos três alvos; a precedência segue a ordem abaixo.
    pub email_alvo: Option<String>,
    pub target_role: Option<String>,
    pub canal: Option<String>,

    pub id_incidente: Option<i64>,
}

impl EnviarPushPayload {
    pub fn destino(&self) -> Option<DestinoNotificacao> {
        if let Some(email) = self.email_alvo.as_deref().filter(|e| !e.is_empty()) {
            return Some(DestinoNotificacao::Usuario(email.to_string()));
        }
        if let Some(role) = self.target_role.as_deref().filter(|r| !r.is_empty()) {
            return Some(DestinoNotificacao::Role(role.to_string()));
        }
        if let Some(canal) = self.canal.as_deref().filter(|c| !c.is_empty()) {
            return Some(DestinoNotificacao::TitularCanal(canal.to_string()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        email_alvo: Option<&str>,
        target_role: Option<&str>,
        canal: Option<&str>,
    ) -> EnviarPushPayload {
        EnviarPushPayload {
            titulo: "t".into(),
            mensagem: "m".into(),
            email_alvo: email_alvo.map(String::from),
            target_role: target_role.map(String::from),
            canal: canal.map(String::from),
            id_incidente: None,
        }
    }

    #[test]
    fn precedencia_email_depois_role_depois_canal() {
        assert_eq!(
            payload(Some("a@b.c"), Some("admin"), Some("DBA")).destino(),
            Some(DestinoNotificacao::Usuario("a@b.c".into()))
        );
        assert_eq!(
            payload(None, Some("admin"), Some("DBA")).destino(),
            Some(DestinoNotificacao::Role("admin".into()))
        );
        assert_eq!(
            payload(None, None, Some("DBA")).destino(),
            Some(DestinoNotificacao::TitularCanal("DBA".into()))
        );
        assert_eq!(payload(None, None, None).destino(), None);
    }
}
