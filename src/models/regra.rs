// src/models/regra.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Canal genérico usado quando a regra não configura nem canal nem role alvo.
pub const CANAL_GERAL: &str = "GERAL";

// Só as colunas relevantes para roteamento; a execução da regra em si
// (agendamento, SQL alvo, limites de erro) pertence ao runner externo.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Regra {
    pub id: i32,
    pub nome: String,
    pub prioridade: i32,
    pub canal: Option<String>,
    pub role_target: Option<String>,
    pub email_notificacao: Option<String>,
    pub silenciado_ate: Option<DateTime<Utc>>,
}

impl Regra {
    /// Canal de roteamento do incidente: o canal configurado, senão a role
    /// alvo, senão o balde GERAL.
    pub fn canal_de_roteamento(&self) -> &str {
        self.canal
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self
                .role_target
                .as_deref()
                .filter(|r| !r.trim().is_empty()))
            .unwrap_or(CANAL_GERAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regra(canal: Option<&str>, role_target: Option<&str>) -> Regra {
        Regra {
            id: 1,
            nome: "R1".into(),
            prioridade: 0,
            canal: canal.map(String::from),
            role_target: role_target.map(String::from),
            email_notificacao: None,
            silenciado_ate: None,
        }
    }

    #[test]
    fn canal_configurado_tem_prioridade() {
        assert_eq!(regra(Some("DBA"), Some("operator")).canal_de_roteamento(), "DBA");
    }

    #[test]
    fn sem_canal_cai_na_role_alvo() {
        assert_eq!(regra(None, Some("operator")).canal_de_roteamento(), "operator");
        assert_eq!(regra(Some("  "), Some("operator")).canal_de_roteamento(), "operator");
    }

    #[test]
    fn sem_nada_cai_no_geral() {
        assert_eq!(regra(None, None).canal_de_roteamento(), CANAL_GERAL);
    }
}
