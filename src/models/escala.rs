// src/models/escala.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const CONFIRMACAO_PENDING: &str = "PENDING";
pub const CONFIRMACAO_ACK_OK: &str = "ACK_OK";

// Uma janela de plantão (Tabela escalas)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Escala {
    pub id: i32,
    pub id_usuario: i32,

    #[schema(example = "DBA")]
    pub canal: String,

    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,

    #[schema(example = "PENDING")]
    pub status_confirmacao: String,
}

impl Escala {
    // Janela inclusiva nas duas pontas.
    pub fn cobre(&self, em: DateTime<Utc>) -> bool {
        self.data_inicio <= em && em <= self.data_fim
    }
}

/// Desempate determinístico entre escalas sobrepostas de um mesmo canal:
/// vence a de `data_inicio` mais antiga; persistindo o empate, o menor id.
pub fn escolher_titular(escalas: &[Escala], em: DateTime<Utc>) -> Option<&Escala> {
    escalas
        .iter()
        .filter(|e| e.cobre(em))
        .min_by_key(|e| (e.data_inicio, e.id))
}

/// Janela bem formada: início estritamente antes do fim. Janela vazia
/// (início igual ao fim) também é rejeitada.
pub fn janela_valida(inicio: DateTime<Utc>, fim: DateTime<Utc>) -> bool {
    inicio < fim
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarEscalaPayload {
    pub id_usuario: i32,

    #[validate(length(min = 1, message = "O canal é obrigatório."))]
    pub canal: String,

    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn escala(id: i32, usuario: i32, inicio: i64, fim: i64) -> Escala {
        Escala {
            id,
            id_usuario: usuario,
            canal: "DBA".into(),
            data_inicio: Utc.timestamp_opt(inicio, 0).unwrap(),
            data_fim: Utc.timestamp_opt(fim, 0).unwrap(),
            status_confirmacao: CONFIRMACAO_PENDING.into(),
        }
    }

    #[test]
    fn sobreposicao_vence_o_inicio_mais_antigo() {
        let escalas = vec![escala(2, 20, 1_000, 9_000), escala(1, 10, 500, 9_000)];
        let em = Utc.timestamp_opt(5_000, 0).unwrap();

        // Determinístico em chamadas repetidas
        for _ in 0..3 {
            let titular = escolher_titular(&escalas, em).unwrap();
            assert_eq!(titular.id_usuario, 10);
        }
    }

    #[test]
    fn empate_de_inicio_vence_o_menor_id() {
        let escalas = vec![escala(7, 70, 1_000, 9_000), escala(3, 30, 1_000, 9_000)];
        let em = Utc.timestamp_opt(2_000, 0).unwrap();
        assert_eq!(escolher_titular(&escalas, em).unwrap().id, 3);
    }

    #[test]
    fn fora_da_janela_nao_ha_titular() {
        let escalas = vec![escala(1, 10, 1_000, 2_000)];
        let em = Utc.timestamp_opt(3_000, 0).unwrap();
        assert!(escolher_titular(&escalas, em).is_none());
    }

    #[test]
    fn janela_com_inicio_igual_ao_fim_e_invalida() {
        let em = Utc.timestamp_opt(1_000, 0).unwrap();
        assert!(!janela_valida(em, em));
    }

    #[test]
    fn janela_com_inicio_depois_do_fim_e_invalida() {
        let inicio = Utc.timestamp_opt(2_000, 0).unwrap();
        let fim = Utc.timestamp_opt(1_000, 0).unwrap();
        assert!(!janela_valida(inicio, fim));
        assert!(janela_valida(fim, inicio));
    }

    #[test]
    fn janela_inclui_as_bordas() {
        let e = escala(1, 10, 1_000, 2_000);
        assert!(e.cobre(Utc.timestamp_opt(1_000, 0).unwrap()));
        assert!(e.cobre(Utc.timestamp_opt(2_000, 0).unwrap()));
        assert!(!e.cobre(Utc.timestamp_opt(999, 0).unwrap()));
    }
}
