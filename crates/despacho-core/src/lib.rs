//! State layer between `despacho-api` and the console front ends.
//!
//! - **[`Console`]**: the root object. Owns the one [`Gateway`], the
//!   [`Router`] and the [`SessionStore`], and vends per-screen controllers.
//!
//! - **[`SessionStore`]**: sign-in, sign-out and restore. Keeps the
//!   in-memory token, the gateway's default `Authorization` header and
//!   the durable [`TokenStore`] consistent.
//!
//! - **[`Router`]** / [`route::decide`]: the authentication guard over
//!   the console's [`Route`]s, with a placeholder while the session is
//!   still restoring.
//!
//! - **[`ListController`]**: paginated, filterable lists (chamados and
//!   atendimentos) with draft/active filters and stale-response discarding.
//!
//! - **[`AtendimentoView`]**: the atendimento detail screen and its
//!   finalize action with the timed success toast.
//!
//! State is published through `tokio::sync::watch` channels so front ends
//! can `subscribe()` and re-render on change.
//!
//! [`Gateway`]: despacho_api::Gateway

pub mod config;
pub mod console;
pub mod error;
pub mod finalize;
pub mod forms;
pub mod list;
pub mod notice;
pub mod route;
pub mod session;
pub mod token;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ApiConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use finalize::{AtendimentoView, DetailState, FinalizeOutcome, FinalizeState};
pub use forms::{AtendimentoOptions, PessoaAssistidaForm};
pub use list::{
    Atendido, AtendimentoFilters, Atendimentos, ChamadoFilters, Chamados, ListController,
    ListResource, ListState, Pagination, PendingFetch, Phase, Resolution,
};
pub use notice::{Notice, NoticeKind, NoticeReceiver, Notifier};
pub use route::{AuthStatus, Decision, Route, Router};
pub use session::{SessionStore, SignInOutcome};
pub use token::{MemoryTokenStore, TOKEN_KEY, TokenStore, TokenStoreError};

// Wire types used throughout the public API.
pub use despacho_api::models;
pub use despacho_api::{Credentials, Page};
