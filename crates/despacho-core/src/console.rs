// ── Console root ──
//
// Owns the single gateway, router and session of a running console and
// vends the per-screen controllers. Everything that needs the session
// receives the `Console` by reference.

use std::sync::Arc;

use despacho_api::models::ChamadoDetail;
use despacho_api::{Gateway, Probe};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::finalize::AtendimentoView;
use crate::list::{Atendimentos, Chamados, ListController};
use crate::notice::{NoticeReceiver, Notifier};
use crate::route::{AuthStatus, Decision, Route, Router};
use crate::session::SessionStore;
use crate::token::TokenStore;

pub struct Console {
    gateway: Arc<Gateway>,
    router: Arc<Router>,
    session: SessionStore,
    notifier: Notifier,
}

impl Console {
    /// Build a console for `config`. The session starts in `Loading`;
    /// call [`restore`](Self::restore) before navigating.
    pub fn new(
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<(Self, NoticeReceiver), CoreError> {
        let gateway = Gateway::new(config.url.as_str(), &config.transport())?;
        Ok(Self::with_gateway(gateway, tokens))
    }

    /// Build a console around an existing gateway.
    pub fn with_gateway(gateway: Gateway, tokens: Arc<dyn TokenStore>) -> (Self, NoticeReceiver) {
        let gateway = Arc::new(gateway);
        let (notifier, notices) = Notifier::channel();
        let (status, status_rx) = watch::channel(AuthStatus::Loading);
        let router = Arc::new(Router::new(status_rx, Route::LANDING));
        let session = SessionStore::new(
            Arc::clone(&gateway),
            tokens,
            Arc::clone(&router),
            notifier.clone(),
            status,
        );

        let console = Self {
            gateway,
            router,
            session,
            notifier,
        };
        (console, notices)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Rehydrate the persisted session and settle the guard.
    pub fn restore(&self) -> AuthStatus {
        self.session.restore()
    }

    pub fn navigate(&self, route: Route) -> Decision {
        self.router.navigate(route)
    }

    /// Navigate to a protected route, failing when the guard does not
    /// render it for a signed-in operator.
    pub fn enter(&self, route: Route) -> Result<(), CoreError> {
        match self.navigate(route) {
            Decision::Render(_) => Ok(()),
            Decision::Redirect(Route::Login) | Decision::Placeholder => {
                Err(CoreError::NotAuthenticated)
            }
            Decision::Redirect(other) => {
                debug!(requested = %route, landed = %other, "redirected");
                Ok(())
            }
        }
    }

    // ── Screens ──────────────────────────────────────────────────────

    pub fn chamados(&self) -> ListController<Chamados> {
        ListController::new(Arc::clone(&self.gateway))
    }

    pub fn atendimentos(&self) -> ListController<Atendimentos> {
        ListController::new(Arc::clone(&self.gateway))
    }

    pub fn atendimento(&self, id: i64) -> AtendimentoView {
        AtendimentoView::new(Arc::clone(&self.gateway), id)
    }

    /// Load `/chamados/{id}`. `Ok(None)` when the server has no such record.
    pub async fn chamado(&self, id: i64) -> Result<Option<ChamadoDetail>, CoreError> {
        match self.gateway.chamado(id).await {
            Ok(Probe::Found(detail)) => Ok(Some(detail)),
            Ok(Probe::Empty) => {
                debug!(chamado_id = id, "chamado not found");
                Ok(None)
            }
            Err(e) => {
                error!(chamado_id = id, error = %e, "chamado detail fetch failed");
                Err(e.into())
            }
        }
    }
}
