// Authorized request gateway
//
// Wraps `reqwest::Client` with base-URL joining, the default bearer
// header, and status handling. Verbs hand back the raw JSON envelope;
// unwrapping is left to call sites via `crate::envelope`. Endpoint
// modules (auth, resources) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use arc_swap::ArcSwapOption;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::envelope;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Single choke point for every outbound call to the dispatch API.
///
/// Holds the base URL and the default `Authorization` header. The header
/// is the only mutable state here; setting or clearing it any number of
/// times is safe and leaves the gateway in the same state.
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    authorization: ArcSwapOption<HeaderValue>,
}

impl Gateway {
    /// Create a gateway from a base URL and transport config.
    ///
    /// The base URL may carry a path prefix (e.g. `https://host/api`);
    /// request paths are joined beneath it.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            authorization: ArcSwapOption::empty(),
        })
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Default authorization header ─────────────────────────────────

    /// Attach `Authorization: Bearer <token>` to every subsequent request.
    pub fn set_bearer_token(&self, token: &SecretString) -> Result<(), Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        value.set_sensitive(true);
        self.authorization.store(Some(value.into()));
        debug!("default authorization header set");
        Ok(())
    }

    /// Stop sending an `Authorization` header.
    pub fn clear_bearer_token(&self) {
        self.authorization.store(None);
        debug!("default authorization header cleared");
    }

    /// Whether requests currently carry a bearer token.
    pub fn has_bearer_token(&self) -> bool {
        self.authorization.load().is_some()
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.authorization.load_full() {
            Some(value) => builder.header(AUTHORIZATION, (*value).clone()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"Atendimento/42"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// Send a GET request and return the raw envelope.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        handle_response(resp).await
    }

    /// Send a GET request with query parameters and return the raw envelope.
    pub async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url).query(params))
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Send a GET request whose body carries nothing usable.
    pub async fn get_no_response(&self, path: &str, params: &[(&str, String)]) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url).query(params))
            .send()
            .await?;
        handle_empty(resp).await
    }

    /// Send a POST request with a JSON body and return the raw envelope.
    pub async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        handle_response(resp).await
    }

    /// Send a POST request and ignore the response body.
    pub async fn post_no_response<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        handle_empty(resp).await
    }

    /// Send a PUT request with a JSON body and return the raw envelope.
    pub async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url).json(body)).send().await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Map the status and parse the body as JSON. An empty 2xx body becomes
/// `Value::Null`.
async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    trace!(len = body.len(), "response body received");

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..floor_char_boundary(&body, 200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    check_status(resp).await.map(drop)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(envelope::server_message)
        .unwrap_or_else(|| body[..floor_char_boundary(&body, 200)].to_owned());

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: if message.is_empty() {
                "token missing, expired or invalid".into()
            } else {
                message
            },
        });
    }

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Largest index `<= max` that sits on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}
