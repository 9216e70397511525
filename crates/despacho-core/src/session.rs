// ── Session store ──
//
// Owns the in-memory bearer token and keeps three things in lockstep:
// the gateway's default `Authorization` header, the durable token slot,
// and the guard's `AuthStatus`. Every transition leaves all three
// consistent or none changed.

use std::sync::Arc;

use despacho_api::{Credentials, Gateway, LoginOutcome};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::notice::Notifier;
use crate::route::{AuthStatus, Route, Router};
use crate::token::TokenStore;

pub const INCOMPLETE_MESSAGE: &str = "Por favor, preencha todos os campos.";
pub const MISSING_TOKEN_MESSAGE: &str = "Login bem-sucedido, mas o token não foi fornecido.";
pub const REJECTED_MESSAGE: &str = "Email ou senha incorretos!";

/// Result of [`SessionStore::sign_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Token adopted and persisted; navigated to the landing route.
    SignedIn,
    /// A field was blank; nothing was sent.
    Incomplete,
    /// Server answered 2xx without a token.
    MissingToken,
    /// Credentials refused or the call failed.
    Rejected,
}

pub struct SessionStore {
    gateway: Arc<Gateway>,
    tokens: Arc<dyn TokenStore>,
    router: Arc<Router>,
    notifier: Notifier,
    token: watch::Sender<Option<SecretString>>,
    status: watch::Sender<AuthStatus>,
}

impl SessionStore {
    /// `status` must be the sending half of the channel `router` reads.
    pub fn new(
        gateway: Arc<Gateway>,
        tokens: Arc<dyn TokenStore>,
        router: Arc<Router>,
        notifier: Notifier,
        status: watch::Sender<AuthStatus>,
    ) -> Self {
        let (token, _) = watch::channel(None);
        Self {
            gateway,
            tokens,
            router,
            notifier,
            token,
            status,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// True iff an in-memory token is present and non-empty.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .borrow()
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Rehydrate from durable storage.
    ///
    /// A stored non-empty token is adopted without validating it against
    /// the server; the first request that comes back 401 reveals a stale
    /// one. Storage failures degrade to an anonymous session.
    pub fn restore(&self) -> AuthStatus {
        let stored = match self.tokens.load() {
            Ok(stored) => stored.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                None
            }
        };

        let status = match stored {
            Some(raw) => {
                let token = SecretString::from(raw);
                match self.gateway.set_bearer_token(&token) {
                    Ok(()) => {
                        self.token.send_replace(Some(token));
                        debug!("session restored from persisted token");
                        AuthStatus::Authenticated
                    }
                    Err(e) => {
                        warn!(error = %e, "persisted token unusable; discarding");
                        if let Err(e) = self.tokens.clear() {
                            warn!(error = %e, "could not clear persisted token");
                        }
                        AuthStatus::Unauthenticated
                    }
                }
            }
            None => {
                debug!("no persisted session");
                AuthStatus::Unauthenticated
            }
        };

        self.status.send_replace(status);
        self.router.reevaluate();
        status
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is adopted in memory, installed as the
    /// default header, persisted, and the operator is sent to the landing
    /// route exactly once. Every other outcome leaves the session
    /// untouched and raises one alert.
    pub async fn sign_in(&self, credentials: &Credentials) -> SignInOutcome {
        if !credentials.is_complete() {
            self.notifier.alert(INCOMPLETE_MESSAGE);
            return SignInOutcome::Incomplete;
        }

        let token = match self.gateway.login(credentials).await {
            Ok(LoginOutcome::Token(token)) => token,
            Ok(LoginOutcome::MissingToken) => {
                warn!(email = %credentials.email, "login succeeded without a token");
                self.notifier.alert(MISSING_TOKEN_MESSAGE);
                return SignInOutcome::MissingToken;
            }
            Err(e) => {
                error!(email = %credentials.email, error = %e, "login failed");
                self.notifier.alert(REJECTED_MESSAGE);
                return SignInOutcome::Rejected;
            }
        };

        if let Err(e) = self.gateway.set_bearer_token(&token) {
            warn!(error = %e, "login returned a token that cannot be sent back");
            self.notifier.alert(MISSING_TOKEN_MESSAGE);
            return SignInOutcome::MissingToken;
        }

        if let Err(e) = self.tokens.save(token.expose_secret()) {
            warn!(error = %e, "could not persist token; session lasts until exit");
        }
        self.token.send_replace(Some(token));
        self.status.send_replace(AuthStatus::Authenticated);

        info!(email = %credentials.email, "signed in");
        self.router.navigate(Route::LANDING);
        SignInOutcome::SignedIn
    }

    /// Drop the session. Safe to call when already signed out.
    pub fn sign_out(&self) {
        self.token.send_replace(None);
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "could not clear persisted token");
        }
        self.gateway.clear_bearer_token();
        self.status.send_replace(AuthStatus::Unauthenticated);

        info!("signed out");
        self.router.navigate(Route::Login);
    }
}
