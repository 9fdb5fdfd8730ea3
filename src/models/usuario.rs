// src/models/usuario.rs

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Representa um usuário vindo do banco de dados.
// A identidade é afirmada pelo chamador (header x-user-id); não há senha aqui.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i32,
    pub nome: String,
    pub email: String,

    #[schema(example = "operator")]
    pub role: String,

    // Preferências de notificação. NULL conta como habilitado,
    // como no esquema original.
    pub recebe_push: Option<bool>,
    pub recebe_email: Option<bool>,

    pub inicio_nao_perturbe: Option<NaiveTime>,
    pub fim_nao_perturbe: Option<NaiveTime>,

    // Deslocamento do fuso do usuário, em minutos a leste de UTC.
    pub fuso_horario_minutos: Option<i32>,
}

impl Usuario {
    pub fn aceita_push(&self) -> bool {
        self.recebe_push.unwrap_or(true)
    }

    pub fn aceita_email(&self) -> bool {
        self.recebe_email.unwrap_or(true)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalvarDispositivoPayload {
    pub id_usuario: i32,

    #[validate(length(min = 1, message = "O token do dispositivo é obrigatório."))]
    pub push_token: String,

    pub tipo_dispositivo: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferenciasPayload {
    pub recebe_push: Option<bool>,
    pub recebe_email: Option<bool>,
    pub inicio_nao_perturbe: Option<NaiveTime>,
    pub fim_nao_perturbe: Option<NaiveTime>,
    pub fuso_horario_minutos: Option<i32>,
}

impl PreferenciasPayload {
    /// Atualização parcial: campo ausente preserva o valor gravado, campo
    /// presente sobrescreve. Vale para todos os cinco, sem exceção.
    pub fn aplicar(&self, usuario: &Usuario) -> Usuario {
        let mut novo = usuario.clone();
        if let Some(v) = self.recebe_push {
            novo.recebe_push = Some(v);
        }
        if let Some(v) = self.recebe_email {
            novo.recebe_email = Some(v);
        }
        if let Some(v) = self.inicio_nao_perturbe {
            novo.inicio_nao_perturbe = Some(v);
        }
        if let Some(v) = self.fim_nao_perturbe {
            novo.fim_nao_perturbe = Some(v);
        }
        if let Some(v) = self.fuso_horario_minutos {
            novo.fuso_horario_minutos = Some(v);
        }
        novo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario_base() -> Usuario {
        Usuario {
            id: 7,
            nome: "Ana".into(),
            email: "ana@exemplo.com".into(),
            role: "operator".into(),
            recebe_push: Some(true),
            recebe_email: Some(false),
            inicio_nao_perturbe: NaiveTime::from_hms_opt(22, 0, 0),
            fim_nao_perturbe: NaiveTime::from_hms_opt(7, 0, 0),
            fuso_horario_minutos: Some(-180),
        }
    }

    #[test]
    fn campo_ausente_preserva_o_valor_gravado() {
        let prefs = PreferenciasPayload {
            recebe_push: Some(false),
            recebe_email: None,
            inicio_nao_perturbe: None,
            fim_nao_perturbe: None,
            fuso_horario_minutos: None,
        };

        let novo = prefs.aplicar(&usuario_base());
        assert_eq!(novo.recebe_push, Some(false));
        // O que não veio no payload fica como estava, inclusive o não-perturbe.
        assert_eq!(novo.recebe_email, Some(false));
        assert_eq!(novo.inicio_nao_perturbe, NaiveTime::from_hms_opt(22, 0, 0));
        assert_eq!(novo.fim_nao_perturbe, NaiveTime::from_hms_opt(7, 0, 0));
        assert_eq!(novo.fuso_horario_minutos, Some(-180));
    }

    #[test]
    fn campo_presente_sobrescreve() {
        let prefs = PreferenciasPayload {
            recebe_push: None,
            recebe_email: Some(true),
            inicio_nao_perturbe: NaiveTime::from_hms_opt(23, 30, 0),
            fim_nao_perturbe: NaiveTime::from_hms_opt(6, 0, 0),
            fuso_horario_minutos: Some(60),
        };

        let novo = prefs.aplicar(&usuario_base());
        assert_eq!(novo.recebe_push, Some(true));
        assert_eq!(novo.recebe_email, Some(true));
        assert_eq!(novo.inicio_nao_perturbe, NaiveTime::from_hms_opt(23, 30, 0));
        assert_eq!(novo.fim_nao_perturbe, NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(novo.fuso_horario_minutos, Some(60));
    }
}
