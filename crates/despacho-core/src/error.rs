// ── Core error types ──
//
// Errors surfaced to console consumers. Raw HTTP details stay inside
// `despacho-api`; the `From<despacho_api::Error>` impl folds them into
// variants a screen or command can act on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the dispatch API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("{message}")]
    ValidationFailed { message: String },

    #[error("{message}")]
    OperationFailed { message: String },

    #[error("Operation not allowed: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if a response was received).
        status: Option<u16>,
    },

    // ── Configuration / storage ──────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Token storage error: {message}")]
    Storage { message: String },
}

impl CoreError {
    /// Returns `true` when signing in again may resolve the failure.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<despacho_api::Error> for CoreError {
    fn from(err: despacho_api::Error) -> Self {
        use despacho_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } | ApiError::InvalidToken(message) => {
                Self::AuthenticationFailed { message }
            }
            ApiError::Transport(ref e) if e.is_timeout() => Self::Timeout,
            ApiError::Transport(ref e) if e.is_connect() => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            ApiError::Transport(e) => Self::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            ApiError::InvalidUrl(e) => Self::Config {
                message: format!("invalid API URL: {e}"),
            },
            ApiError::Tls(message) => Self::ConnectionFailed {
                url: "<tls>".into(),
                reason: message,
            },
            ApiError::Api {
                status: 403,
                message,
            } => Self::AuthenticationFailed { message },
            ApiError::Api {
                status: 404,
                message,
            } => Self::NotFound {
                entity_type: "Resource".into(),
                identifier: message,
            },
            ApiError::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            ApiError::Deserialization { message, .. } => Self::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
