// ── Creation forms ──
//
// Validation and submission for the three "novo" screens. Lookups for
// the atendimento form load independently: one failing dropdown leaves
// the others usable.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use despacho_api::models::{
    AtendimentoCreate, ChamadoCreate, ChamadoOption, PessoaAssistidaCreate, SelectOption,
    ViaturaOption,
};
use serde::Serialize;
use tracing::{error, info};

use crate::console::Console;
use crate::error::CoreError;
use crate::route::Route;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Por favor, preencha todos os campos obrigatórios.";
pub const ATENDIMENTO_CREATE_ERROR: &str = "Erro ao criar atendimento. Tente novamente.";
pub const CHAMADO_CREATE_ERROR: &str = "Erro ao criar chamado. Tente novamente.";
pub const PESSOA_CREATED_MESSAGE: &str = "Pessoa assistida criada com sucesso!";
pub const PESSOA_CREATE_ERROR: &str = "Erro ao criar pessoa assistida. Verifique os dados.";

/// Recorded as creator of records made from the console.
pub const AUDIT_USER: &str = "despacho";

// ── Atendimento ──────────────────────────────────────────────────────

/// Dropdown contents of `/atendimentos/novo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtendimentoOptions {
    pub pessoas: Vec<SelectOption>,
    pub chamados: Vec<ChamadoOption>,
    pub viaturas: Vec<ViaturaOption>,
    pub usuarios: Vec<SelectOption>,
    pub tipos: Vec<SelectOption>,
}

/// Every reference must be chosen; `observacao` is optional.
pub fn validate_atendimento(body: &AtendimentoCreate) -> Result<(), CoreError> {
    let ids = [
        body.pessoa_assistida_id,
        body.chamado_id,
        body.viatura_id,
        body.responsavel_id,
        body.atendimento_tipo_id,
    ];
    if ids.contains(&0) {
        return Err(CoreError::ValidationFailed {
            message: REQUIRED_FIELDS_MESSAGE.into(),
        });
    }
    Ok(())
}

// ── Pessoa assistida ─────────────────────────────────────────────────

/// Fields typed by the operator on `/pessoas-assistidas/novo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PessoaAssistidaForm {
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: String,
    pub cep: String,
    pub rua: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
}

impl PessoaAssistidaForm {
    /// Server-side validation decides what is acceptable; the console
    /// only stamps the audit fields.
    pub fn into_request(self, now: DateTime<Utc>) -> PessoaAssistidaCreate {
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        PessoaAssistidaCreate {
            id: 0,
            data_ultima_alteracao: stamp.clone(),
            usuario_ultima_alteracao: AUDIT_USER.into(),
            data_cadastro: stamp,
            usuario_cadastro: AUDIT_USER.into(),
            nome: self.nome,
            cpf: self.cpf,
            telefone: self.telefone,
            email: self.email,
            cep: self.cep,
            rua: self.rua,
            bairro: self.bairro,
            cidade: self.cidade,
            estado: self.estado,
            ativo: true,
        }
    }
}

// ── Chamado ──────────────────────────────────────────────────────────

pub fn validate_chamado(body: &ChamadoCreate) -> Result<(), CoreError> {
    if body.pessoa_assistida_id == 0 || body.rua.trim().is_empty() {
        return Err(CoreError::ValidationFailed {
            message: REQUIRED_FIELDS_MESSAGE.into(),
        });
    }
    Ok(())
}

// ── Submission ───────────────────────────────────────────────────────

impl Console {
    /// Load the five dropdowns concurrently.
    pub async fn atendimento_options(&self) -> AtendimentoOptions {
        let gateway = self.gateway();
        let (pessoas, chamados, viaturas, usuarios, tipos) = tokio::join!(
            lookup("pessoas assistidas", gateway.select_pessoas_assistidas()),
            lookup("chamados", gateway.select_chamados()),
            lookup("viaturas", gateway.select_viaturas()),
            lookup("usuarios", gateway.select_usuarios()),
            lookup("tipos de atendimento", gateway.select_atendimento_tipos()),
        );
        AtendimentoOptions {
            pessoas,
            chamados,
            viaturas,
            usuarios,
            tipos,
        }
    }

    /// Validate and post a new atendimento, then go to the list.
    pub async fn create_atendimento(&self, body: &AtendimentoCreate) -> Result<(), CoreError> {
        validate_atendimento(body)?;

        if let Err(e) = self.gateway().create_atendimento(body).await {
            error!(chamado_id = body.chamado_id, error = %e, "atendimento creation failed");
            return Err(CoreError::OperationFailed {
                message: ATENDIMENTO_CREATE_ERROR.into(),
            });
        }

        info!(chamado_id = body.chamado_id, "atendimento created");
        self.navigate(Route::Atendimentos);
        Ok(())
    }

    /// Post a new assisted person. The server's own validation message
    /// is surfaced when it sends one.
    pub async fn create_pessoa_assistida(&self, form: PessoaAssistidaForm) -> Result<(), CoreError> {
        let body = form.into_request(Utc::now());

        if let Err(e) = self.gateway().create_pessoa_assistida(&body).await {
            error!(error = %e, "pessoa assistida creation failed");
            let message = match e {
                despacho_api::Error::Api { message, .. } if !message.trim().is_empty() => message,
                _ => PESSOA_CREATE_ERROR.into(),
            };
            self.notifier().alert(message.clone());
            return Err(CoreError::OperationFailed { message });
        }

        info!(nome = %body.nome, "pessoa assistida created");
        self.notifier().success(PESSOA_CREATED_MESSAGE);
        self.navigate(Route::Chamados);
        Ok(())
    }

    /// Open a new chamado on behalf of an assisted person.
    pub async fn create_chamado(&self, body: &ChamadoCreate) -> Result<(), CoreError> {
        validate_chamado(body)?;

        if let Err(e) = self.gateway().create_chamado(body).await {
            error!(
                pessoa_assistida_id = body.pessoa_assistida_id,
                error = %e,
                "chamado creation failed"
            );
            return Err(CoreError::OperationFailed {
                message: CHAMADO_CREATE_ERROR.into(),
            });
        }

        info!(pessoa_assistida_id = body.pessoa_assistida_id, "chamado created");
        self.navigate(Route::Chamados);
        Ok(())
    }
}

async fn lookup<T>(
    what: &'static str,
    fetch: impl Future<Output = Result<Vec<T>, despacho_api::Error>>,
) -> Vec<T> {
    fetch.await.unwrap_or_else(|e| {
        error!(lookup = what, error = %e, "lookup failed");
        Vec::new()
    })
}
