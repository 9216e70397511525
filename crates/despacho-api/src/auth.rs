// Login endpoint
//
// `PUT /Auth/login` with `{email, senha}`. A successful response carries
// the bearer token at `dados.token`. The gateway does not adopt the token
// itself: storing it and setting the default header belong to the
// session owner.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::gateway::Gateway;

const LOGIN_PATH: &str = "Auth/login";

/// Operator credentials for the login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub senha: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, senha: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            senha: SecretString::from(senha.into()),
        }
    }

    /// Both fields filled in (whitespace-only counts as empty).
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.senha.expose_secret().is_empty()
    }
}

/// Result of a login call that the server accepted (2xx).
#[derive(Debug)]
pub enum LoginOutcome {
    /// The envelope carried a bearer token.
    Token(SecretString),
    /// 2xx without a token: the server broke its own contract.
    MissingToken,
}

impl Gateway {
    /// Authenticate with email/password.
    ///
    /// Non-2xx responses and transport failures are returned as errors
    /// (`Error::Authentication` for 401). A 2xx response yields
    /// [`LoginOutcome::MissingToken`] when `dados.token` is absent or empty.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, Error> {
        debug!(email = %credentials.email, "logging in");

        let body = json!({
            "email": credentials.email,
            "senha": credentials.senha.expose_secret(),
        });

        let envelope = self.put(LOGIN_PATH, &body).await.map_err(|e| match e {
            Error::Api { status, message } if status == 400 || status == 403 => {
                Error::Authentication {
                    message: format!("login rejected (HTTP {status}): {message}"),
                }
            }
            other => other,
        })?;

        Ok(match extract_token(&envelope) {
            Some(token) => {
                debug!("login successful");
                LoginOutcome::Token(token)
            }
            None => LoginOutcome::MissingToken,
        })
    }
}

/// Pull the bearer token out of a login envelope (`dados.token`).
pub fn extract_token(envelope: &Value) -> Option<SecretString> {
    envelope
        .get("dados")
        .and_then(|d| d.get("token"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.to_owned()))
}
