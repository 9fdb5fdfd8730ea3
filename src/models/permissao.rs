// src/models/permissao.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// O que sai do banco (Tabela permissoes)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permissao {
    pub id: i32,

    #[schema(example = "SQL_DELETE")]
    pub codigo: String,

    #[schema(example = "Executar comandos destrutivos")]
    pub descricao: Option<String>,
}

// Vínculo padrão de uma role (Tabela permissoes_roles)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissaoRole {
    pub id: i32,
    pub role: String,
    pub permissao_id: i32,
    pub ativo: bool,
}

// Linha da matriz efetiva de um usuário: uma por código conhecido.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissaoCalculada {
    pub permissao_id: i32,
    pub codigo: String,
    pub descricao: Option<String>,
    pub ativo_final: bool,
    pub is_customizado: bool,
}

/// A cadeia de precedência, explícita em vez de COALESCE:
/// override individual > padrão da role > negado.
/// A ausência de qualquer registro nunca concede acesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontePermissao {
    Customizada { ativo: bool },
    PadraoRole { ativo: bool },
    Nenhuma,
}

impl FontePermissao {
    pub fn resolver(customizada: Option<bool>, padrao_role: Option<bool>) -> Self {
        match (customizada, padrao_role) {
            (Some(ativo), _) => FontePermissao::Customizada { ativo },
            (None, Some(ativo)) => FontePermissao::PadraoRole { ativo },
            (None, None) => FontePermissao::Nenhuma,
        }
    }

    pub fn ativo_final(self) -> bool {
        match self {
            FontePermissao::Customizada { ativo } => ativo,
            FontePermissao::PadraoRole { ativo } => ativo,
            FontePermissao::Nenhuma => false,
        }
    }

    pub fn is_customizado(self) -> bool {
        matches!(self, FontePermissao::Customizada { .. })
    }
}

// Payloads dos toggles (telas de controle de acesso)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePermissaoRolePayload {
    #[schema(example = "operator")]
    pub role: String,
    pub permissao_id: i32,
    pub ativo: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePermissaoUsuarioPayload {
    pub permissao_id: i32,
    pub ativo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_sempre_vence_o_padrao_da_role() {
        // Role concede, override nega
        let fonte = FontePermissao::resolver(Some(false), Some(true));
        assert_eq!(fonte, FontePermissao::Customizada { ativo: false });
        assert!(!fonte.ativo_final());

        // Role nega, override concede
        let fonte = FontePermissao::resolver(Some(true), Some(false));
        assert!(fonte.ativo_final());
        assert!(fonte.is_customizado());
    }

    #[test]
    fn sem_override_vale_o_padrao_da_role() {
        assert!(FontePermissao::resolver(None, Some(true)).ativo_final());
        assert!(!FontePermissao::resolver(None, Some(false)).ativo_final());
        assert!(!FontePermissao::resolver(None, Some(true)).is_customizado());
    }

    #[test]
    fn sem_nenhum_registro_nega_por_padrao() {
        let fonte = FontePermissao::resolver(None, None);
        assert_eq!(fonte, FontePermissao::Nenhuma);
        assert!(!fonte.ativo_final());
    }
}
