// src/services/permissao_service.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::db::{PermissaoRepository, UsuarioRepository};
use crate::models::permissao::{
    FontePermissao, Permissao, PermissaoCalculada, PermissaoRole,
};
use crate::services::auditoria_service::AuditoriaService;

// Códigos conhecidos pelo núcleo.
pub const PERM_SQL_SELECT: &str = "SQL_SELECT";
pub const PERM_SQL_INSERT: &str = "SQL_INSERT";
pub const PERM_SQL_UPDATE: &str = "SQL_UPDATE";
pub const PERM_SQL_DELETE: &str = "SQL_DELETE";
pub const PERM_GERIR_INCIDENTES: &str = "GERIR_INCIDENTES";
pub const PERM_GERIR_ESCALAS: &str = "GERIR_ESCALAS";
pub const PERM_GERIR_REGRAS: &str = "GERIR_REGRAS";
pub const PERM_GERIR_PERMISSOES: &str = "GERIR_PERMISSOES";

/// Tabela fechada: palavra-chave inicial -> permissão exigida.
/// Comando fora da tabela é tratado como o mais perigoso (SQL_DELETE);
/// essa regra é deliberada e não deve ser afrouxada.
const CLASSES_COMANDO: &[(&str, &str)] = &[
    ("SELECT", PERM_SQL_SELECT),
    ("SHOW", PERM_SQL_SELECT),
    ("EXPLAIN", PERM_SQL_SELECT),
    ("DELETE", PERM_SQL_DELETE),
    ("DROP", PERM_SQL_DELETE),
    ("TRUNCATE", PERM_SQL_DELETE),
    ("ALTER", PERM_SQL_DELETE),
    ("INSERT", PERM_SQL_INSERT),
    ("UPDATE", PERM_SQL_UPDATE),
];

pub fn permissao_necessaria(comando: &str) -> &'static str {
    let palavra = comando
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_uppercase();

    CLASSES_COMANDO
        .iter()
        .find(|(chave, _)| *chave == palavra)
        .map(|(_, permissao)| *permissao)
        .unwrap_or(PERM_SQL_DELETE)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutorizacaoComando {
    #[schema(example = "DROP")]
    pub comando: String,
    #[schema(example = "SQL_DELETE")]
    pub permissao_necessaria: String,
    pub permitido: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrizPermissoes {
    pub permissoes: Vec<Permissao>,
    pub configuracoes: Vec<PermissaoRole>,
}

#[derive(Clone)]
pub struct PermissaoService {
    repo: PermissaoRepository,
    usuario_repo: UsuarioRepository,
    auditoria: AuditoriaService,
}

impl PermissaoService {
    pub fn new(
        repo: PermissaoRepository,
        usuario_repo: UsuarioRepository,
        auditoria: AuditoriaService,
    ) -> Self {
        Self {
            repo,
            usuario_repo,
            auditoria,
        }
    }

    /// Consulta pontual: "o usuário U pode fazer A?".
    /// Fail-closed: usuário inexistente, código desconhecido ou qualquer
    /// erro de leitura resolvem para `false` — nunca concessão parcial.
    pub async fn resolver(&self, usuario_id: i32, codigo: &str) -> bool {
        match self.resolver_interno(usuario_id, codigo).await {
            Ok(permitido) => permitido,
            Err(e) => {
                tracing::warn!(usuario_id, codigo, erro = %e, "Falha ao resolver permissão; negando");
                false
            }
        }
    }

    async fn resolver_interno(&self, usuario_id: i32, codigo: &str) -> Result<bool, AppError> {
        let Some(usuario) = self.usuario_repo.buscar_por_id(usuario_id).await? else {
            return Ok(false);
        };

        let Some(linha) = self
            .repo
            .fontes_para_codigo(usuario_id, &usuario.role, codigo)
            .await?
        else {
            return Ok(false);
        };

        let fonte = FontePermissao::resolver(linha.ativo_override, linha.ativo_role);
        Ok(fonte.ativo_final())
    }

    /// A matriz completa do usuário: uma linha por código conhecido, mesmo
    /// os sem vínculo algum (efetivo = false), para a tela de toggles.
    pub async fn resolver_todas(
        &self,
        usuario_id: i32,
    ) -> Result<Vec<PermissaoCalculada>, AppError> {
        let usuario = self
            .usuario_repo
            .buscar_por_id(usuario_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário".into()))?;

        let linhas = self.repo.fontes_do_usuario(usuario_id, &usuario.role).await?;

        let calculadas = linhas
            .into_iter()
            .map(|linha| {
                let fonte = FontePermissao::resolver(linha.ativo_override, linha.ativo_role);
                PermissaoCalculada {
                    permissao_id: linha.permissao_id,
                    codigo: linha.codigo,
                    descricao: linha.descricao,
                    ativo_final: fonte.ativo_final(),
                    is_customizado: fonte.is_customizado(),
                }
            })
            .collect();

        Ok(calculadas)
    }

    /// Classifica o comando submetido e verifica a permissão exigida.
    /// Negação vira PermissaoNegada nomeando a permissão que falta.
    pub async fn autorizar_comando(
        &self,
        usuario_id: i32,
        sql: &str,
    ) -> Result<AutorizacaoComando, AppError> {
        let comando = sql
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_uppercase();
        let permissao = permissao_necessaria(sql);

        if !self.resolver(usuario_id, permissao).await {
            return Err(AppError::PermissaoNegada(format!(
                "Você precisa da permissão '{}' para rodar comandos {}.",
                permissao, comando
            )));
        }

        // Classe destrutiva autorizada fica rastreável.
        if permissao == PERM_SQL_DELETE {
            self.auditoria
                .registrar(
                    &format!("User {}", usuario_id),
                    "SQL_EXEC_DANGER",
                    "Banco de Dados",
                    &format!("Autorizado comando {}", comando),
                )
                .await;
        }

        Ok(AutorizacaoComando {
            comando,
            permissao_necessaria: permissao.to_string(),
            permitido: true,
        })
    }

    pub async fn matriz_permissoes(&self) -> Result<MatrizPermissoes, AppError> {
        Ok(MatrizPermissoes {
            permissoes: self.repo.listar_permissoes().await?,
            configuracoes: self.repo.listar_vinculos_roles().await?,
        })
    }

    pub async fn alternar_permissao_role(
        &self,
        responsavel: &str,
        role: &str,
        permissao_id: i32,
        ativo: bool,
    ) -> Result<(), AppError> {
        self.repo
            .buscar_por_id(permissao_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Permissão".into()))?;

        self.repo.upsert_vinculo_role(role, permissao_id, ativo).await?;

        self.auditoria
            .registrar(
                responsavel,
                "PERMISSAO_ROLE_CHANGE",
                &format!("Role: {}", role),
                &format!("Permissão ID {} set to {}", permissao_id, ativo),
            )
            .await;

        Ok(())
    }

    pub async fn alternar_permissao_usuario(
        &self,
        responsavel: &str,
        usuario_id: i32,
        permissao_id: i32,
        ativo: bool,
    ) -> Result<(), AppError> {
        self.usuario_repo
            .buscar_por_id(usuario_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Usuário".into()))?;
        self.repo
            .buscar_por_id(permissao_id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado("Permissão".into()))?;

        self.repo
            .upsert_override_usuario(usuario_id, permissao_id, ativo)
            .await?;

        self.auditoria
            .registrar(
                responsavel,
                "PERMISSAO_USER_CHANGE",
                &format!("User ID: {}", usuario_id),
                &format!("Permissão ID {} set to {}", permissao_id, ativo),
            )
            .await;

        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leitura_exige_sql_select() {
        assert_eq!(permissao_necessaria("SELECT * FROM usuarios"), PERM_SQL_SELECT);
        assert_eq!(permissao_necessaria("show tables"), PERM_SQL_SELECT);
        assert_eq!(permissao_necessaria("  EXPLAIN SELECT 1"), PERM_SQL_SELECT);
    }

    #[test]
    fn destrutivos_exigem_sql_delete() {
        for cmd in ["DELETE FROM x", "DROP TABLE x", "TRUNCATE x", "alter table x"] {
            assert_eq!(permissao_necessaria(cmd), PERM_SQL_DELETE);
        }
    }

    #[test]
    fn insert_e_update_tem_classes_proprias() {
        assert_eq!(permissao_necessaria("INSERT INTO x VALUES (1)"), PERM_SQL_INSERT);
        assert_eq!(permissao_necessaria("update x set a = 1"), PERM_SQL_UPDATE);
    }

    #[test]
    fn comando_desconhecido_cai_na_classe_mais_restritiva() {
        assert_eq!(permissao_necessaria("GRANT ALL ON x TO y"), PERM_SQL_DELETE);
        assert_eq!(permissao_necessaria("VACUUM"), PERM_SQL_DELETE);
        assert_eq!(permissao_necessaria(""), PERM_SQL_DELETE);
    }
}
