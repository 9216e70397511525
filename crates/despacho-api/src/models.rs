// Wire types for the dispatch API.
//
// Field names follow the server's camelCase JSON. Nested references are
// optional because list and detail endpoints omit them inconsistently.

use serde::{Deserialize, Deserializer, Serialize};

// ── Shared pieces ───────────────────────────────────────────────────

/// Status object attached to chamados and atendimentos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default, deserialize_with = "opt_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    #[serde(default, deserialize_with = "string_or_default")]
    pub nome: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Assisted person as embedded in detail payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PessoaResumo {
    #[serde(default, deserialize_with = "string_or_default")]
    pub nome: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub telefone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaturaRef {
    #[serde(default)]
    pub placa: Option<String>,
    #[serde(default)]
    pub identificador: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispositivo {
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub identificador: Option<String>,
}

// ── Chamado ─────────────────────────────────────────────────────────

/// Row of `POST /Chamado/listagem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadoListItem {
    pub id: i64,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub rua: Option<String>,
    #[serde(default)]
    pub data_cadastro: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

/// Payload of `GET /Chamado/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadoDetail {
    pub id: i64,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub rua: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub numero: Option<String>,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub data_cadastro: Option<String>,
    #[serde(default)]
    pub data_respondido: Option<String>,
    #[serde(default)]
    pub pessoa_assistida: Option<PessoaResumo>,
    #[serde(default)]
    pub dispositivo: Option<Dispositivo>,
}

/// Body of `POST /Chamado`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadoCreate {
    pub pessoa_assistida_id: i64,
    pub bairro: String,
    pub rua: String,
    pub numero: String,
    pub cep: String,
    pub cidade: String,
    pub estado: String,
}

// ── Atendimento ─────────────────────────────────────────────────────

/// Row of `POST /Atendimento/listagem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoListItem {
    pub id: i64,
    #[serde(default)]
    pub data_inicio: Option<String>,
    #[serde(default)]
    pub pessoa_assistida: Option<NameRef>,
    #[serde(default)]
    pub chamado: Option<IdRef>,
    #[serde(default)]
    pub viatura: Option<ViaturaRef>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamadoRef {
    pub id: i64,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub rua: Option<String>,
}

/// Payload of `GET /Atendimento/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoDetail {
    pub id: i64,
    #[serde(default)]
    pub data_inicio: Option<String>,
    #[serde(default)]
    pub data_fim: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub pessoa_assistida: Option<PessoaResumo>,
    #[serde(default)]
    pub chamado: Option<ChamadoRef>,
    #[serde(default)]
    pub viatura: Option<ViaturaRef>,
    #[serde(default)]
    pub responsavel: Option<NameRef>,
}

impl AtendimentoDetail {
    /// Status label, empty when the server sent none.
    pub fn status_label(&self) -> &str {
        self.status.as_ref().map_or("", |s| s.label.as_str())
    }
}

/// Body of `POST /Atendimento`. Every id must be non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtendimentoCreate {
    pub responsavel_id: i64,
    pub pessoa_assistida_id: i64,
    pub chamado_id: i64,
    pub viatura_id: i64,
    pub atendimento_tipo_id: i64,
    pub observacao: String,
}

// ── Pessoa assistida ────────────────────────────────────────────────

/// Body of `POST /PessoaAssistida`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PessoaAssistidaCreate {
    pub id: i64,
    pub data_ultima_alteracao: String,
    pub usuario_ultima_alteracao: String,
    pub data_cadastro: String,
    pub usuario_cadastro: String,
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: String,
    pub cep: String,
    pub rua: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub ativo: bool,
}

// ── Lookups ─────────────────────────────────────────────────────────

/// Generic `{id, descricao}` option from the `*/Select` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub descricao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaturaOption {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub placa: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub identificador: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamadoOption {
    pub id: i64,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub rua: Option<String>,
}

// ── Lenient field decoding ──────────────────────────────────────────

/// Accept a string, a number, or null for text fields the server
/// sometimes sends as numbers (house number, CPF, device ids).
fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Required text that the server may still send as null.
fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chamado_detail_tolerates_numeric_numero() {
        let detail: ChamadoDetail = serde_json::from_value(json!({
            "id": 5,
            "status": { "value": 1, "label": "Pendente", "type": "warning" },
            "rua": "Rua das Flores",
            "numero": 120,
            "dataRespondido": null
        }))
        .unwrap();
        assert_eq!(detail.numero.as_deref(), Some("120"));
        assert_eq!(detail.status.unwrap().value.as_deref(), Some("1"));
        assert!(detail.data_respondido.is_none());
        assert!(detail.pessoa_assistida.is_none());
    }

    #[test]
    fn atendimento_create_serializes_camel_case() {
        let body = serde_json::to_value(AtendimentoCreate {
            responsavel_id: 1,
            pessoa_assistida_id: 2,
            chamado_id: 3,
            viatura_id: 4,
            atendimento_tipo_id: 5,
            observacao: "urgente".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "responsavelId": 1,
                "pessoaAssistidaId": 2,
                "chamadoId": 3,
                "viaturaId": 4,
                "atendimentoTipoId": 5,
                "observacao": "urgente"
            })
        );
    }

    #[test]
    fn atendimento_status_label_defaults_empty() {
        let detail: AtendimentoDetail = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(detail.status_label(), "");
    }

    #[test]
    fn null_names_and_labels_decode_as_empty() {
        let detail: AtendimentoDetail = serde_json::from_value(json!({
            "id": 42,
            "status": { "value": 2, "label": null },
            "pessoaAssistida": { "nome": null, "cpf": null },
            "responsavel": { "nome": null }
        }))
        .unwrap();
        assert_eq!(detail.status_label(), "");
        assert_eq!(detail.pessoa_assistida.unwrap().nome, "");
        assert_eq!(detail.responsavel.unwrap().nome, "");
    }

    #[test]
    fn null_lookup_text_decodes_as_empty() {
        let viatura: ViaturaOption =
            serde_json::from_value(json!({ "id": 1, "placa": "ABC1D23", "identificador": null }))
                .unwrap();
        assert_eq!(viatura.identificador, "");

        let option: SelectOption =
            serde_json::from_value(json!({ "id": 3, "descricao": null })).unwrap();
        assert_eq!(option.descricao, "");
    }
}
