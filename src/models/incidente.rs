// src/models/incidente.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// O registro rastreado de um problema detectado (Tabela incidentes).
// Distinto da execução bruta da regra que o disparou.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incidente {
    pub id_incidente: i64,
    pub id_regra: i32,

    #[schema(example = "OPEN")]
    pub status: String,

    pub prioridade: i32,
    pub detalhes: Option<String>,
    pub comentario_resolucao: Option<String>,
    pub data_abertura: DateTime<Utc>,
    pub data_ultima_ocorrencia: Option<DateTime<Utc>>,
    pub id_execucao_origem: Option<i64>,
}

impl Incidente {
    pub fn status_atual(&self) -> Option<StatusIncidente> {
        StatusIncidente::parse(&self.status)
    }
}

/// A máquina de estados: OPEN → ACK → CLOSED, com OPEN → CLOSED direto.
/// CLOSED é terminal para reconhecimento; reexecução vale de qualquer estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum StatusIncidente {
    Open,
    Ack,
    Closed,
}

impl StatusIncidente {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusIncidente::Open => "OPEN",
            StatusIncidente::Ack => "ACK",
            StatusIncidente::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(StatusIncidente::Open),
            "ACK" => Some(StatusIncidente::Ack),
            "CLOSED" => Some(StatusIncidente::Closed),
            _ => None,
        }
    }

    pub fn terminal(self) -> bool {
        matches!(self, StatusIncidente::Closed)
    }

    /// ACK transita só de OPEN; um ACK repetido sobre ACK é sucesso
    /// silencioso (o operador clicou duas vezes); sobre CLOSED é inválido.
    /// Fechar não tem predicado: vale de qualquer estado, inclusive refechar
    /// um CLOSED, que sobrescreve o comentário e re-loga o evento.
    pub fn aceita_reconhecimento(self) -> bool {
        !self.terminal()
    }
}

// Entrada imutável da linha do tempo (Tabela eventos_incidente)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventoIncidente {
    pub id: i64,
    pub id_incidente: i64,
    pub tipo: String,
    pub usuario: String,
    pub detalhes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoEvento {
    Open,
    Ack,
    Close,
    Reexecute,
}

impl TipoEvento {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoEvento::Open => "OPEN",
            TipoEvento::Ack => "ACK",
            TipoEvento::Close => "CLOSE",
            TipoEvento::Reexecute => "REEXECUTE",
        }
    }
}

// Payloads das ações do operador
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FecharIncidentePayload {
    pub comentario: Option<String>,
}

// Gatilho externo: uma execução de regra falhou (vinda do runner)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FalhaExecucaoPayload {
    pub id_regra: i32,
    pub id_execucao: i64,
    pub detalhes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconhecer_vale_de_open_e_de_ack_mas_nao_de_closed() {
        assert!(StatusIncidente::Open.aceita_reconhecimento());
        // ACK repetido: aceito como sucesso silencioso
        assert!(StatusIncidente::Ack.aceita_reconhecimento());
        // CLOSED é terminal: nenhuma transição sai dele via ACK
        assert!(!StatusIncidente::Closed.aceita_reconhecimento());
    }

    #[test]
    fn so_closed_e_terminal() {
        assert!(!StatusIncidente::Open.terminal());
        assert!(!StatusIncidente::Ack.terminal());
        assert!(StatusIncidente::Closed.terminal());
    }

    #[test]
    fn parse_ida_e_volta() {
        for status in [
            StatusIncidente::Open,
            StatusIncidente::Ack,
            StatusIncidente::Closed,
        ] {
            assert_eq!(StatusIncidente::parse(status.as_str()), Some(status));
        }
        assert_eq!(StatusIncidente::parse("REOPENED"), None);
    }
}
