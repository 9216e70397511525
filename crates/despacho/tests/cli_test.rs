//! Integration tests for the `despacho` binary.
//!
//! Argument parsing, help, completions and error exits run without any
//! server. The session tests talk to a wiremock dispatch API and keep
//! their token file inside a temporary data directory.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `despacho` binary with env isolation.
///
/// Config and data directories point into `home`, and every
/// `DESPACHO_*` variable is cleared so the user's setup never leaks in.
fn despacho_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("despacho");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("DESPACHO_PROFILE")
        .env_remove("DESPACHO_API_URL")
        .env_remove("DESPACHO_OUTPUT")
        .env_remove("DESPACHO_INSECURE")
        .env_remove("DESPACHO_TIMEOUT")
        .env_remove("DESPACHO_EMAIL")
        .env_remove("DESPACHO_SENHA")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(home: &Path, args: &[&str]) -> Output {
    let mut cmd = despacho_cmd(home);
    cmd.args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("PUT"))
        .and(path("/Auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "dados": { "token": token } })),
        )
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_usage() {
    let home = TempDir::new().unwrap();
    let output = despacho_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("chamados")
                .and(predicate::str::contains("atendimentos"))
                .and(predicate::str::contains("login")),
        );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("despacho"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    for shell in ["bash", "zsh", "fish"] {
        despacho_cmd(home.path())
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("despacho"));
    }
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .arg("viaturas")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .args(["--output", "xml", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_atendido_filter() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .args(["chamados", "list", "--atendido", "talvez"])
        .assert()
        .code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_list_without_config_explains_setup() {
    let home = TempDir::new().unwrap();
    let output = despacho_cmd(home.path())
        .args(["chamados", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("despacho config init"));
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = TempDir::new().unwrap();
    let output = despacho_cmd(home.path())
        .args(["--profile", "plantao", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("plantao"));
}

#[test]
fn test_config_path_lives_under_config_home() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(home.path().to_str().unwrap()));
}

#[test]
fn test_config_show_reads_profiles() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("despacho");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "default_profile = \"central\"\n\n[profiles.central]\napi_url = \"https://central.example.org/api\"\n",
    )
    .unwrap();

    let output = despacho_cmd(home.path())
        .args(["--output", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["default_profile"], "central");
    assert_eq!(
        value["profiles"]["central"]["api_url"],
        "https://central.example.org/api"
    );

    despacho_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("central *"));
}

#[test]
fn test_config_use_rejects_unknown_profile() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .args(["config", "use", "plantao"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("plantao"));
}

// ── Session ─────────────────────────────────────────────────────────

#[test]
fn test_status_without_session() {
    let home = TempDir::new().unwrap();
    despacho_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9/api", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessão:   nenhuma"));
}

#[test]
fn test_protected_command_without_session_exits_with_auth_code() {
    let home = TempDir::new().unwrap();
    let output = despacho_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9/api", "chamados", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("despacho login"));
}

#[tokio::test]
async fn test_login_with_empty_password_is_incomplete() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let output = run(
        home.path(),
        &["--api-url", &server.uri(), "login", "--email", "op@example.org", "--senha", ""],
    )
    .await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Por favor, preencha todos os campos."));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_login_exits_with_auth_code() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/Auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "mensagem": "Credenciais inválidas" })),
        )
        .mount(&server)
        .await;

    let output = run(
        home.path(),
        &["--api-url", &server.uri(), "login", "--email", "op@example.org", "--senha", "errada"],
    )
    .await;

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert_eq!(text.matches("Email ou senha incorretos!").count(), 1, "{text}");
}

#[tokio::test]
async fn test_login_persists_token_for_later_commands() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "jwt-cli").await;

    Mock::given(method("POST"))
        .and(path("/Chamado/listagem"))
        .and(header("Authorization", "Bearer jwt-cli"))
        .and(body_partial_json(json!({ "currentPage": 1, "pageSize": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dados": {
                "dados": [{ "id": 7, "bairro": "Boa Vista", "rua": "Rua Aurora" }],
                "totalPages": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let login = run(
        home.path(),
        &["--api-url", &uri, "login", "--email", "op@example.org", "--senha", "certa"],
    )
    .await;
    assert!(login.status.success(), "{}", combined_output(&login));

    let token = home.path().join("data").join("despacho").join("default").join("token");
    assert_eq!(std::fs::read_to_string(token).unwrap().trim_end(), "jwt-cli");

    let list = run(home.path(), &["--api-url", &uri, "--color", "never", "chamados", "list"]).await;
    assert!(list.status.success(), "{}", combined_output(&list));
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("Boa Vista"));
    assert!(stdout.contains("Rua Aurora"));

    let logout = run(home.path(), &["--api-url", &uri, "logout"]).await;
    assert!(logout.status.success());
    let after = run(home.path(), &["--api-url", &uri, "chamados", "list"]).await;
    assert_eq!(after.status.code(), Some(3));
}

#[tokio::test]
async fn test_finalize_with_yes_skips_prompt() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "jwt-cli").await;

    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dados": {
                "id": 42,
                "dataInicio": "2024-03-07T08:00:00",
                "status": { "value": "1", "label": "Em andamento" }
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/Finalizar"))
        .and(query_param("AtendimentoId", "42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Atendimento/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dados": {
                "id": 42,
                "dataInicio": "2024-03-07T08:00:00",
                "dataFim": "2024-03-07T09:30:00",
                "status": { "value": "2", "label": "Finalizado" }
            }
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let login = run(
        home.path(),
        &["--api-url", &uri, "login", "--email", "op@example.org", "--senha", "certa"],
    )
    .await;
    assert!(login.status.success(), "{}", combined_output(&login));

    let output = run(
        home.path(),
        &["--api-url", &uri, "--color", "never", "--yes", "atendimentos", "finalize", "42"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(text.contains("Atendimento finalizado com sucesso!"), "{text}");
    assert!(text.contains("Finalizado"));
}
