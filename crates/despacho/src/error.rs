//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use despacho_config::ConfigError;
use despacho_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the dispatch API at {url}: {reason}")]
    #[diagnostic(
        code(despacho::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(despacho::timeout),
        help("Increase the timeout with --timeout or check the API's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(despacho::not_signed_in),
        help("Run: despacho login --profile {profile}")
    )]
    NotSignedIn { profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(despacho::auth_failed),
        help("Your session may have expired. Run: despacho login")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} {identifier} not found")]
    #[diagnostic(
        code(despacho::not_found),
        help("Run: despacho {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(despacho::operation_failed))]
    OperationFailed { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(despacho::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(despacho::validation))]
    Validation { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(despacho::invalid_value))]
    InvalidValue { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(despacho::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: despacho config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(despacho::no_config),
        help(
            "Create a profile with: despacho config init\n\
             Or pass --api-url / set DESPACHO_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(despacho::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(despacho::interactive),
        help("Pass the values as flags in non-interactive contexts.")
    )]
    Prompt(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotSignedIn { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidValue { .. } | Self::Prompt(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    pub fn prompt(err: impl std::fmt::Display) -> Self {
        Self::Prompt(err.to_string())
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotAuthenticated => Self::NotSignedIn {
                profile: despacho_config::DEFAULT_PROFILE.into(),
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation { message },
            CoreError::OperationFailed { message } | CoreError::Rejected { message } => {
                Self::OperationFailed { message }
            }
            CoreError::Api { message, .. } => Self::ApiError { message },
            CoreError::Config { message } | CoreError::Storage { message } => {
                Self::InvalidValue {
                    field: "configuration".into(),
                    reason: message,
                }
            }
        }
    }
}
