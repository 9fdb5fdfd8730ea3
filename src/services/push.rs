// src/services/push.rs
//
// A fronteira com o provedor de fan-out externo: ele recebe a lista de
// tokens deduplicada + título/corpo e devolve o placar por token.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErroTransporte {
    #[error("Provedor de push inacessível")]
    Indisponivel(#[from] reqwest::Error),

    #[error("Resposta inesperada do provedor (HTTP {0})")]
    RespostaInvalida(u16),

    #[error("Tempo de espera do provedor esgotado")]
    TempoEsgotado,
}

// Placar agregado devolvido pelo provedor.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RelatorioEnvio {
    #[serde(rename = "success")]
    pub sucessos: usize,
    #[serde(rename = "failure")]
    pub falhas: usize,
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn enviar_multicast(
        &self,
        tokens: &[String],
        titulo: &str,
        corpo: &str,
    ) -> Result<RelatorioEnvio, ErroTransporte>;
}

/// Espera limitada: um provedor travado não pode segurar o chamador; o
/// estouro degrada para TempoEsgotado e o despacho registra PENDING.
pub async fn enviar_com_timeout(
    transporte: &dyn PushTransport,
    limite: Duration,
    tokens: &[String],
    titulo: &str,
    corpo: &str,
) -> Result<RelatorioEnvio, ErroTransporte> {
    match tokio::time::timeout(limite, transporte.enviar_multicast(tokens, titulo, corpo)).await {
        Ok(resultado) => resultado,
        Err(_) => Err(ErroTransporte::TempoEsgotado),
    }
}

// Cliente HTTP no formato multicast legado do FCM.
#[derive(Clone)]
pub struct FcmClient {
    http: reqwest::Client,
    url: String,
    chave_servidor: String,
}

impl FcmClient {
    pub fn new(url: String, chave_servidor: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            chave_servidor,
        }
    }
}

#[async_trait]
impl PushTransport for FcmClient {
    async fn enviar_multicast(
        &self,
        tokens: &[String],
        titulo: &str,
        corpo: &str,
    ) -> Result<RelatorioEnvio, ErroTransporte> {
        let resposta = self
            .http
            .post(&self.url)
            .header("Authorization", format!("key={}", self.chave_servidor))
            .json(&json!({
                "registration_ids": tokens,
                "notification": { "title": titulo, "body": corpo },
            }))
            .send()
            .await?;

        if !resposta.status().is_success() {
            return Err(ErroTransporte::RespostaInvalida(resposta.status().as_u16()));
        }

        let relatorio = resposta.json::<RelatorioEnvio>().await?;
        Ok(relatorio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TransporteLento;

    #[async_trait]
    impl PushTransport for TransporteLento {
        async fn enviar_multicast(
            &self,
            _tokens: &[String],
            _titulo: &str,
            _corpo: &str,
        ) -> Result<RelatorioEnvio, ErroTransporte> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(RelatorioEnvio::default())
        }
    }

    struct TransporteImediato;

    #[async_trait]
    impl PushTransport for TransporteImediato {
        async fn enviar_multicast(
            &self,
            tokens: &[String],
            _titulo: &str,
            _corpo: &str,
        ) -> Result<RelatorioEnvio, ErroTransporte> {
            Ok(RelatorioEnvio {
                sucessos: tokens.len(),
                falhas: 0,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn provedor_travado_degrada_para_tempo_esgotado() {
        let tokens = vec!["t1".to_string()];
        let resultado = enviar_com_timeout(
            &TransporteLento,
            Duration::from_secs(5),
            &tokens,
            "titulo",
            "corpo",
        )
        .await;

        assert!(matches!(resultado, Err(ErroTransporte::TempoEsgotado)));
    }

    #[tokio::test]
    async fn provedor_rapido_responde_dentro_do_limite() {
        let tokens = vec!["t1".to_string(), "t2".to_string()];
        let relatorio = enviar_com_timeout(
            &TransporteImediato,
            Duration::from_secs(5),
            &tokens,
            "titulo",
            "corpo",
        )
        .await
        .unwrap();

        assert_eq!(relatorio.sucessos, 2);
        assert_eq!(relatorio.falhas, 0);
    }
}
