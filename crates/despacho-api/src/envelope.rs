// Response envelope probing
//
// The API wraps payloads inconsistently: `{dados: {dados: [...], totalPages}}`,
// `{dados: [...]}`, or a bare array, depending on the endpoint and on when it
// was written. Call sites never unwrap by hand; they run one of the ordered
// probes below, deepest shape first, and get a tagged result back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of probing an envelope for a known payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    Empty,
}

impl<T> Probe<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Empty => None,
        }
    }

    /// Collapse `Empty` into the type's default (an empty page or list).
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }
}

// ── Probes ──────────────────────────────────────────────────────────

/// Probe a list-endpoint envelope.
///
/// Order: `dados.dados` (pages from `dados.totalPages`, default 0), then a
/// `dados` array (pages from top-level `totalPages`, default 1), then a bare
/// array (one page), then `Empty`.
pub fn probe_page<T: DeserializeOwned>(envelope: &Value) -> Probe<Page<T>> {
    let dados = envelope.get("dados");

    if let Some(nested) = dados.and_then(|d| d.get("dados")).filter(|v| !v.is_null()) {
        if let Some(items) = decode_items(nested, "dados.dados") {
            let total_pages = dados.map_or(0, |d| total_pages(d, 0));
            return Probe::Found(Page { items, total_pages });
        }
    }

    if let Some(array) = dados.filter(|d| d.is_array()) {
        if let Some(items) = decode_items(array, "dados") {
            return Probe::Found(Page {
                items,
                total_pages: total_pages(envelope, 1),
            });
        }
    }

    if envelope.is_array() {
        if let Some(items) = decode_items(envelope, "<root>") {
            return Probe::Found(Page {
                items,
                total_pages: 1,
            });
        }
    }

    debug!("no list shape matched the envelope; treating as empty");
    Probe::Empty
}

/// Probe a lookup (select) envelope for a flat collection.
///
/// Order: `dados.dados` array, then a `dados` array, then a bare array.
pub fn probe_collection<T: DeserializeOwned>(envelope: &Value) -> Probe<Vec<T>> {
    let dados = envelope.get("dados");

    if let Some(array) = dados.and_then(|d| d.get("dados")).filter(|v| v.is_array()) {
        if let Some(items) = decode_items(array, "dados.dados") {
            return Probe::Found(items);
        }
    }

    if let Some(array) = dados.filter(|d| d.is_array()) {
        if let Some(items) = decode_items(array, "dados") {
            return Probe::Found(items);
        }
    }

    if envelope.is_array() {
        if let Some(items) = decode_items(envelope, "<root>") {
            return Probe::Found(items);
        }
    }

    debug!("no collection shape matched the envelope; treating as empty");
    Probe::Empty
}

/// Probe a detail envelope for a single entity.
///
/// Order: `dados` object, then the envelope itself when it carries no
/// `dados` key, then `Empty`.
pub fn probe_entity<T: DeserializeOwned>(envelope: &Value) -> Probe<T> {
    match envelope.get("dados") {
        Some(inner) if inner.is_object() => {
            match serde_json::from_value::<T>(inner.clone()) {
                Ok(entity) => return Probe::Found(entity),
                Err(e) => warn!(error = %e, "entity under `dados` did not decode"),
            }
        }
        Some(_) => {}
        None if envelope.is_object() => {
            match serde_json::from_value::<T>(envelope.clone()) {
                Ok(entity) => return Probe::Found(entity),
                Err(e) => warn!(error = %e, "bare entity did not decode"),
            }
        }
        None => {}
    }

    debug!("no entity shape matched the envelope; treating as empty");
    Probe::Empty
}

// ── Server messages ─────────────────────────────────────────────────

/// Extract the human-readable `mensagem` the API attaches to errors,
/// with `<br>` line breaks turned into newlines.
pub fn server_message(body: &Value) -> Option<String> {
    body.get("mensagem")
        .or_else(|| body.get("dados").and_then(|d| d.get("mensagem")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(br_to_newline)
}

/// Replace `<br>`, `<br/>` and `<br />` (any case, any whitespace before
/// the slash) with `\n`.
pub fn br_to_newline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = find_ascii_ci(rest, "<br") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 3..];
        let trimmed = tail.trim_start_matches(char::is_whitespace);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if let Some(after) = trimmed.strip_prefix('>') {
            out.push('\n');
            rest = after;
        } else {
            out.push_str(&rest[start..start + 3]);
            rest = tail;
        }
    }

    out.push_str(rest);
    out
}

// ── Helpers ─────────────────────────────────────────────────────────

fn decode_items<T: DeserializeOwned>(value: &Value, shape: &str) -> Option<Vec<T>> {
    if !value.is_array() {
        return None;
    }
    match serde_json::from_value::<Vec<T>>(value.clone()) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(shape, error = %e, "list payload did not decode");
            None
        }
    }
}

fn total_pages(container: &Value, default: u32) -> u32 {
    container
        .get("totalPages")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn page_prefers_nested_shape() {
        let envelope = json!({ "dados": { "dados": [{ "id": 1 }], "totalPages": 3 } });
        let page: Page<Item> = probe_page(&envelope).into_option().unwrap();
        assert_eq!(page.items, vec![Item { id: 1 }]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_nested_without_total_defaults_to_zero() {
        let envelope = json!({ "dados": { "dados": [] } });
        let page: Page<Item> = probe_page(&envelope).into_option().unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn page_falls_back_to_flat_dados() {
        let envelope = json!({ "dados": [{ "id": 7 }, { "id": 8 }], "totalPages": 2 });
        let page: Page<Item> = probe_page(&envelope).into_option().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);

        let envelope = json!({ "dados": [{ "id": 7 }] });
        let page: Page<Item> = probe_page(&envelope).into_option().unwrap();
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_accepts_bare_array() {
        let envelope = json!([{ "id": 4 }]);
        let page: Page<Item> = probe_page(&envelope).into_option().unwrap();
        assert_eq!(page.items, vec![Item { id: 4 }]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_mismatch_is_empty() {
        assert_eq!(probe_page::<Item>(&json!({ "dados": { "foo": 1 } })), Probe::Empty);
        assert_eq!(probe_page::<Item>(&json!(null)), Probe::Empty);
        assert_eq!(probe_page::<Item>(&json!({ "dados": [{ "nope": true }] })), Probe::Empty);
        assert_eq!(probe_page::<Item>(&json!("texto")).unwrap_or_default(), Page::default());
    }

    #[test]
    fn collection_probe_order() {
        let flat = json!({ "dados": [{ "id": 1 }] });
        assert_eq!(probe_collection::<Item>(&flat), Probe::Found(vec![Item { id: 1 }]));

        let nested = json!({ "dados": { "dados": [{ "id": 2 }], "totalPages": 1 } });
        assert_eq!(probe_collection::<Item>(&nested), Probe::Found(vec![Item { id: 2 }]));

        let bare = json!([{ "id": 3 }]);
        assert_eq!(probe_collection::<Item>(&bare), Probe::Found(vec![Item { id: 3 }]));

        assert_eq!(probe_collection::<Item>(&json!({})), Probe::Empty);
    }

    #[test]
    fn entity_probe() {
        assert_eq!(
            probe_entity::<Item>(&json!({ "dados": { "id": 42 } })),
            Probe::Found(Item { id: 42 })
        );
        assert_eq!(probe_entity::<Item>(&json!({ "id": 9 })), Probe::Found(Item { id: 9 }));
        assert_eq!(probe_entity::<Item>(&json!({ "dados": null })), Probe::Empty);
        assert_eq!(probe_entity::<Item>(&json!([])), Probe::Empty);
    }

    #[test]
    fn server_message_converts_line_breaks() {
        let body = json!({ "mensagem": "CPF inválido<br>Telefone obrigatório<BR />Email inválido" });
        assert_eq!(
            server_message(&body).unwrap(),
            "CPF inválido\nTelefone obrigatório\nEmail inválido"
        );
        assert_eq!(server_message(&json!({ "mensagem": "  " })), None);
        assert_eq!(server_message(&json!({})), None);
    }

    #[test]
    fn br_to_newline_leaves_other_tags() {
        assert_eq!(br_to_newline("a<brx>b"), "a<brx>b");
        assert_eq!(br_to_newline("a<br/>b"), "a\nb");
        assert_eq!(br_to_newline("sem quebras"), "sem quebras");
    }

    #[test]
    fn br_to_newline_accepts_tabs_and_newlines() {
        assert_eq!(br_to_newline("a<br\t/>b"), "a\nb");
        assert_eq!(br_to_newline("a<BR\n>b"), "a\nb");
        assert_eq!(br_to_newline("a<br \t\n/>b"), "a\nb");
    }

    #[test]
    fn null_text_in_one_row_keeps_the_page() {
        use crate::models::{AtendimentoDetail, AtendimentoListItem, ViaturaOption};

        let page = probe_page::<AtendimentoListItem>(&json!({
            "dados": {
                "dados": [
                    { "id": 1, "pessoaAssistida": { "nome": "Maria" } },
                    { "id": 2, "pessoaAssistida": { "nome": null }, "status": { "label": null } }
                ],
                "totalPages": 3
            }
        }))
        .into_option()
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 3);

        let detail = probe_entity::<AtendimentoDetail>(&json!({
            "dados": { "id": 42, "status": { "label": null } }
        }));
        assert!(detail.is_found());

        let viaturas = probe_collection::<ViaturaOption>(&json!({
            "dados": [{ "id": 1, "placa": "ABC1D23", "identificador": null }]
        }));
        assert_eq!(viaturas.into_option().map(|v| v.len()), Some(1));
    }
}
