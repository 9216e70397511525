#![allow(clippy::unwrap_used)]
// Atendimento detail view and finalize action against a mock dispatch API.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use despacho_api::Gateway;
use despacho_core::finalize::{FINALIZE_ERROR, TOAST_DURATION};
use despacho_core::{AtendimentoView, FinalizeOutcome};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<Gateway>) {
    let server = MockServer::start().await;
    let gateway = Gateway::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    (server, Arc::new(gateway))
}

fn detail(status: &str) -> Value {
    json!({
        "dados": {
            "id": 42,
            "status": { "value": 1, "label": status, "type": "warning" },
            "observacao": "Idosa sozinha",
            "pessoaAssistida": { "nome": "Maria" }
        }
    })
}

/// First detail fetch returns `before`, every later one `after`.
async fn mount_detail(server: &MockServer, before: &str, after: &str) {
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail(before)))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail(after)))
        .mount(server)
        .await;
}

fn finalize_mock(response: ResponseTemplate) -> Mock {
    Mock::given(method("GET"))
        .and(path("/Atendimento/Finalizar"))
        .and(query_param("AtendimentoId", "42"))
        .respond_with(response)
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_finalize_replaces_entity_and_shows_toast() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Em andamento", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;
    assert!(view.snapshot().can_finalize());

    assert_eq!(view.finalize().await, FinalizeOutcome::Finalized);

    let state = view.snapshot();
    assert_eq!(state.entity.as_ref().unwrap().status_label(), "Finalizado");
    assert!(state.finalize.toast_visible);
    assert!(!state.finalize.in_flight);
    assert!(!state.can_finalize());
}

#[tokio::test]
async fn test_finalize_accepts_null_text_in_refetch() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail("Em andamento")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dados": {
                "id": 42,
                "status": { "value": 2, "label": null },
                "pessoaAssistida": { "nome": null }
            }
        })))
        .mount(&server)
        .await;
    finalize_mock(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;

    assert_eq!(view.finalize().await, FinalizeOutcome::Finalized);
    let state = view.snapshot();
    assert_eq!(state.entity.as_ref().unwrap().status_label(), "");
    assert!(state.finalize.last_error.is_none());
}

#[tokio::test]
async fn test_double_finalize_sends_one_request() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Em andamento", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;

    let (first, second) = tokio::join!(view.finalize(), view.finalize());
    let mut outcomes = [first, second];
    outcomes.sort_by_key(|o| *o == FinalizeOutcome::Skipped);
    assert_eq!(outcomes, [FinalizeOutcome::Finalized, FinalizeOutcome::Skipped]);
}

#[tokio::test]
async fn test_finalized_status_skips_request() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Finalizado", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;
    assert_eq!(view.finalize().await, FinalizeOutcome::Skipped);
}

#[tokio::test]
async fn test_finalize_before_load_is_skipped() {
    let (_server, gateway) = setup().await;
    let view = AtendimentoView::new(gateway, 42);
    assert_eq!(view.finalize().await, FinalizeOutcome::Skipped);
}

#[tokio::test]
async fn test_finalize_failure_keeps_entity() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Em andamento", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(500).set_body_json(json!({ "mensagem": "Erro" })))
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;
    let before = view.snapshot().entity;

    assert_eq!(view.finalize().await, FinalizeOutcome::Failed);

    let state = view.snapshot();
    assert_eq!(state.entity, before);
    assert_eq!(state.finalize.last_error.as_deref(), Some(FINALIZE_ERROR));
    assert!(!state.finalize.toast_visible);
    assert!(state.can_finalize());
}

#[tokio::test]
async fn test_toast_clears_after_three_seconds() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Em andamento", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(200)).mount(&server).await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;
    view.finalize().await;

    let mut rx = view.subscribe();
    rx.borrow_and_update();
    tokio::time::pause();
    let started = tokio::time::Instant::now();

    rx.changed().await.unwrap();
    let waited = started.elapsed();

    assert!(!view.snapshot().finalize.toast_visible);
    assert!(waited <= TOAST_DURATION, "cleared late: {waited:?}");
    assert!(
        waited >= TOAST_DURATION - Duration::from_millis(250),
        "cleared early: {waited:?}"
    );
}

#[tokio::test]
async fn test_teardown_cancels_toast_timer() {
    let (server, gateway) = setup().await;
    mount_detail(&server, "Em andamento", "Finalizado").await;
    finalize_mock(ResponseTemplate::new(200)).mount(&server).await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;
    view.finalize().await;
    view.teardown();

    tokio::time::pause();
    tokio::time::advance(TOAST_DURATION * 2).await;
    tokio::task::yield_now().await;

    // The timer never fired, so the flag was left as it was.
    assert!(view.snapshot().finalize.toast_visible);
}

#[tokio::test]
async fn test_missing_detail_is_not_an_error() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": null })))
        .mount(&server)
        .await;

    let view = AtendimentoView::new(gateway, 42);
    view.load().await;

    let state = view.snapshot();
    assert!(state.entity.is_none());
    assert!(state.load_error.is_none());
    assert!(!state.loading);
}
