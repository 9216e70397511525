#![allow(clippy::unwrap_used)]
// Session store and route guard behaviour against a mock dispatch API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use despacho_api::Gateway;
use despacho_core::session::{INCOMPLETE_MESSAGE, MISSING_TOKEN_MESSAGE, REJECTED_MESSAGE};
use despacho_core::{
    AuthStatus, Console, Credentials, Decision, MemoryTokenStore, NoticeKind, NoticeReceiver,
    Route, SignInOutcome, TokenStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

type Fixture = (MockServer, Console, NoticeReceiver, Arc<MemoryTokenStore>);

async fn setup(tokens: MemoryTokenStore) -> Fixture {
    let server = MockServer::start().await;
    let gateway = Gateway::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    let tokens = Arc::new(tokens);
    let store: Arc<dyn TokenStore> = Arc::clone(&tokens) as Arc<dyn TokenStore>;
    let (console, notices) = Console::with_gateway(gateway, store);
    (server, console, notices, tokens)
}

fn credentials() -> Credentials {
    Credentials::new("operador@example.org", "senha-certa")
}

fn drain(rx: &mut NoticeReceiver) -> Vec<(NoticeKind, String)> {
    let mut out = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        out.push((notice.kind, notice.message));
    }
    out
}

async fn mount_login(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("PUT"))
        .and(path("/Auth/login"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── Restore ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_guard_shows_placeholder_until_restored() {
    let (_server, console, _notices, _tokens) = setup(MemoryTokenStore::with_token("jwt-old")).await;

    assert_eq!(console.session().status(), AuthStatus::Loading);
    assert_eq!(console.navigate(Route::Atendimento(42)), Decision::Placeholder);
    assert_eq!(console.router().current(), None);

    assert_eq!(console.restore(), AuthStatus::Authenticated);
    assert_eq!(console.router().current(), Some(Route::Atendimento(42)));
}

#[tokio::test]
async fn test_restore_adopts_persisted_token_without_network() {
    let (server, console, _notices, _tokens) = setup(MemoryTokenStore::with_token("jwt-old")).await;

    assert_eq!(console.restore(), AuthStatus::Authenticated);
    assert!(console.session().is_authenticated());
    assert!(console.gateway().has_bearer_token());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_without_token_redirects_to_login() {
    let (_server, console, _notices, _tokens) = setup(MemoryTokenStore::new()).await;

    assert_eq!(console.restore(), AuthStatus::Unauthenticated);
    assert!(!console.session().is_authenticated());
    assert_eq!(console.navigate(Route::Chamados), Decision::Redirect(Route::Login));
}

#[tokio::test]
async fn test_restore_ignores_empty_token() {
    let (_server, console, _notices, _tokens) = setup(MemoryTokenStore::with_token("")).await;
    assert_eq!(console.restore(), AuthStatus::Unauthenticated);
}

// ── Sign in ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_success_side_effects() {
    let (server, console, mut notices, tokens) = setup(MemoryTokenStore::new()).await;
    console.restore();
    mount_login(&server, 200, json!({ "dados": { "token": "jwt-123" } })).await;

    let before = console.router().location().navigations;
    let outcome = console.session().sign_in(&credentials()).await;

    assert_eq!(outcome, SignInOutcome::SignedIn);
    assert!(console.session().is_authenticated());
    assert_eq!(console.session().status(), AuthStatus::Authenticated);
    assert_eq!(tokens.load().unwrap().as_deref(), Some("jwt-123"));
    assert_eq!(tokens.writes(), 1);
    assert_eq!(console.router().location().navigations, before + 1);
    assert_eq!(console.router().current(), Some(Route::Chamados));
    assert!(drain(&mut notices).is_empty());

    // Later calls carry the new token.
    Mock::given(method("GET"))
        .and(path("/Chamado/9"))
        .and(header("Authorization", "Bearer jwt-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": { "id": 9 } })))
        .expect(1)
        .mount(&server)
        .await;
    let detail = console.chamado(9).await.unwrap().unwrap();
    assert_eq!(detail.id, 9);
}

#[tokio::test]
async fn test_sign_in_rejected_leaves_no_trace() {
    let (server, console, mut notices, tokens) = setup(MemoryTokenStore::new()).await;
    console.restore();
    mount_login(&server, 401, json!({ "mensagem": "Credenciais inválidas" })).await;

    let before = console.router().location().navigations;
    let outcome = console.session().sign_in(&credentials()).await;

    assert_eq!(outcome, SignInOutcome::Rejected);
    assert!(!console.session().is_authenticated());
    assert!(!console.gateway().has_bearer_token());
    assert_eq!(tokens.writes(), 0);
    assert_eq!(console.router().location().navigations, before);
    assert_eq!(
        drain(&mut notices),
        vec![(NoticeKind::Alert, REJECTED_MESSAGE.to_owned())]
    );
}

#[tokio::test]
async fn test_sign_in_server_error_is_rejection() {
    let (server, console, mut notices, tokens) = setup(MemoryTokenStore::new()).await;
    console.restore();
    mount_login(&server, 500, json!({ "mensagem": "Falha" })).await;

    assert_eq!(console.session().sign_in(&credentials()).await, SignInOutcome::Rejected);
    assert_eq!(tokens.writes(), 0);
    assert_eq!(drain(&mut notices).len(), 1);
}

#[tokio::test]
async fn test_sign_in_without_token_is_anomaly() {
    let (server, console, mut notices, tokens) = setup(MemoryTokenStore::new()).await;
    console.restore();
    mount_login(&server, 200, json!({ "dados": { "token": "" } })).await;

    let outcome = console.session().sign_in(&credentials()).await;

    assert_eq!(outcome, SignInOutcome::MissingToken);
    assert!(!console.session().is_authenticated());
    assert_eq!(tokens.writes(), 0);
    assert_eq!(
        drain(&mut notices),
        vec![(NoticeKind::Alert, MISSING_TOKEN_MESSAGE.to_owned())]
    );
}

#[tokio::test]
async fn test_sign_in_with_blank_field_sends_nothing() {
    let (server, console, mut notices, _tokens) = setup(MemoryTokenStore::new()).await;
    console.restore();

    let outcome = console
        .session()
        .sign_in(&Credentials::new("operador@example.org", ""))
        .await;

    assert_eq!(outcome, SignInOutcome::Incomplete);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(
        drain(&mut notices),
        vec![(NoticeKind::Alert, INCOMPLETE_MESSAGE.to_owned())]
    );
}

// ── Sign out ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_out_then_guarded_route_redirects() {
    let (server, console, _notices, tokens) = setup(MemoryTokenStore::with_token("jwt-old")).await;
    console.restore();

    console.session().sign_out();

    assert!(!console.session().is_authenticated());
    assert!(!console.gateway().has_bearer_token());
    assert_eq!(tokens.load().unwrap(), None);
    assert_eq!(console.router().current(), Some(Route::Login));
    assert_eq!(
        console.navigate(Route::Atendimento(42)),
        Decision::Redirect(Route::Login)
    );

    // Idempotent.
    console.session().sign_out();
    assert_eq!(console.session().status(), AuthStatus::Unauthenticated);

    // Anonymous requests carry no Authorization header.
    Mock::given(method("GET"))
        .and(path("/Chamado/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dados": { "id": 1 } })))
        .mount(&server)
        .await;
    console.chamado(1).await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test]
async fn test_signed_in_operator_is_sent_away_from_login() {
    let (_server, console, _notices, _tokens) = setup(MemoryTokenStore::with_token("jwt-old")).await;
    console.restore();
    assert_eq!(console.navigate(Route::Login), Decision::Redirect(Route::Chamados));
}
