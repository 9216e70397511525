// Resource endpoints
//
// Typed wrappers over the gateway verbs. Every wrapper unwraps the
// envelope through `crate::envelope` probes; a shape mismatch degrades to
// an empty result instead of an error.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::envelope::{self, Page, Probe};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::models::{
    AtendimentoCreate, AtendimentoDetail, ChamadoCreate, ChamadoDetail, ChamadoOption,
    PessoaAssistidaCreate, SelectOption, ViaturaOption,
};

pub const CHAMADO_LIST_PATH: &str = "Chamado/listagem";
pub const ATENDIMENTO_LIST_PATH: &str = "Atendimento/listagem";
const FINALIZE_PATH: &str = "Atendimento/Finalizar";

/// Page size used when a list endpoint feeds a dropdown instead of a table.
const LOOKUP_PAGE_SIZE: u32 = 1000;

impl Gateway {
    // ── Lists ────────────────────────────────────────────────────────

    /// POST a list query and probe the envelope for a page.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Value,
    ) -> Result<Page<T>, Error> {
        let envelope = self.post(path, payload).await?;
        Ok(envelope::probe_page(&envelope).unwrap_or_default())
    }

    // ── Details ──────────────────────────────────────────────────────

    pub async fn chamado(&self, id: i64) -> Result<Probe<ChamadoDetail>, Error> {
        let envelope = self.get(&format!("Chamado/{id}")).await?;
        Ok(envelope::probe_entity(&envelope))
    }

    pub async fn atendimento(&self, id: i64) -> Result<Probe<AtendimentoDetail>, Error> {
        let envelope = self.get(&format!("Atendimento/{id}")).await?;
        Ok(envelope::probe_entity(&envelope))
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// `GET /Atendimento/Finalizar?AtendimentoId={id}`. The response body
    /// carries nothing; re-fetch the detail to observe the new status.
    pub async fn finalize_atendimento(&self, id: i64) -> Result<(), Error> {
        debug!(atendimento_id = id, "finalizing atendimento");
        self.get_no_response(FINALIZE_PATH, &[("AtendimentoId", id.to_string())])
            .await
    }

    // ── Creation ─────────────────────────────────────────────────────

    pub async fn create_atendimento(&self, body: &AtendimentoCreate) -> Result<(), Error> {
        self.post_no_response("Atendimento", body).await
    }

    pub async fn create_pessoa_assistida(&self, body: &PessoaAssistidaCreate) -> Result<(), Error> {
        self.post_no_response("PessoaAssistida", body).await
    }

    pub async fn create_chamado(&self, body: &ChamadoCreate) -> Result<(), Error> {
        self.post_no_response("Chamado", body).await
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub async fn select_pessoas_assistidas(&self) -> Result<Vec<SelectOption>, Error> {
        self.select("PessoaAssistida/Select", &json!({})).await
    }

    /// Only vehicles currently available for dispatch.
    pub async fn select_viaturas(&self) -> Result<Vec<ViaturaOption>, Error> {
        self.select("Viatura/Select", &json!({ "disponivel": true }))
            .await
    }

    pub async fn select_usuarios(&self) -> Result<Vec<SelectOption>, Error> {
        self.select("Usuario/Select", &json!({})).await
    }

    pub async fn select_atendimento_tipos(&self) -> Result<Vec<SelectOption>, Error> {
        self.select("AtendimentoTipo/select", &json!({ "pesquisa": "" }))
            .await
    }

    /// Active chamados for the attendance form, fetched through the list
    /// endpoint with a page large enough to hold them all.
    pub async fn select_chamados(&self) -> Result<Vec<ChamadoOption>, Error> {
        self.select(
            CHAMADO_LIST_PATH,
            &json!({ "pageSize": LOOKUP_PAGE_SIZE, "currentPage": 1, "ativo": true }),
        )
        .await
    }

    async fn select<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<Vec<T>, Error> {
        let envelope = self.post(path, body).await?;
        Ok(envelope::probe_collection(&envelope).unwrap_or_default())
    }
}
