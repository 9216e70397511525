// ── Routes and the authentication guard ──
//
// Every screen of the console is a `Route`. Protected routes render only
// for an authenticated session; the guard shows a placeholder while the
// session is still being restored so a valid persisted token never
// flashes the login screen.

use std::fmt;
use std::str::FromStr;

use tokio::sync::watch;
use tracing::debug;

// ── Route ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Chamados,
    ChamadoNovo,
    Chamado(i64),
    Atendimentos,
    AtendimentoNovo,
    Atendimento(i64),
    PessoaAssistidaNova,
}

impl Route {
    /// Where a signed-in operator lands.
    pub const LANDING: Self = Self::Chamados;

    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("/login"),
            Self::Chamados => f.write_str("/chamados"),
            Self::ChamadoNovo => f.write_str("/chamados/novo"),
            Self::Chamado(id) => write!(f, "/chamados/{id}"),
            Self::Atendimentos => f.write_str("/atendimentos"),
            Self::AtendimentoNovo => f.write_str("/atendimentos/novo"),
            Self::Atendimento(id) => write!(f, "/atendimentos/{id}"),
            Self::PessoaAssistidaNova => f.write_str("/pessoas-assistidas/novo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            ["login"] => Self::Login,
            [] | ["chamados"] => Self::Chamados,
            ["chamados", "novo"] => Self::ChamadoNovo,
            ["chamados", id] => Self::Chamado(parse_id(path, id)?),
            ["atendimentos"] => Self::Atendimentos,
            ["atendimentos", "novo"] => Self::AtendimentoNovo,
            ["atendimentos", id] => Self::Atendimento(parse_id(path, id)?),
            ["pessoas-assistidas", "novo"] => Self::PessoaAssistidaNova,
            _ => return Err(UnknownRoute(path.to_owned())),
        };
        Ok(route)
    }
}

fn parse_id(path: &str, raw: &str) -> Result<i64, UnknownRoute> {
    raw.parse()
        .ok()
        .filter(|id: &i64| *id > 0)
        .ok_or_else(|| UnknownRoute(path.to_owned()))
}

// ── Guard ────────────────────────────────────────────────────────────

/// Authentication status as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Persisted session not yet restored.
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

/// What the shell should show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Session still restoring: show a neutral placeholder.
    Placeholder,
    Render(Route),
    Redirect(Route),
}

impl Decision {
    /// The route that ends up on screen, if any.
    pub fn route(self) -> Option<Route> {
        match self {
            Self::Placeholder => None,
            Self::Render(route) | Self::Redirect(route) => Some(route),
        }
    }
}

/// Pure guard decision.
///
/// Protected routes require `Authenticated`. `/login` is always
/// reachable once loading settles, except that a signed-in operator is
/// sent to the landing route instead.
pub fn decide(status: AuthStatus, target: Route) -> Decision {
    match (status, target.is_protected()) {
        (AuthStatus::Loading, _) => Decision::Placeholder,
        (AuthStatus::Authenticated, true) | (AuthStatus::Unauthenticated, false) => {
            Decision::Render(target)
        }
        (AuthStatus::Authenticated, false) => Decision::Redirect(Route::LANDING),
        (AuthStatus::Unauthenticated, true) => Decision::Redirect(Route::Login),
    }
}

// ── Router ───────────────────────────────────────────────────────────

/// Observable router state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Route most recently asked for.
    pub requested: Route,
    /// Outcome of guarding `requested`.
    pub decision: Decision,
    /// Number of navigations performed so far.
    pub navigations: u64,
}

/// Current location plus the guard, reading the session's status.
pub struct Router {
    status: watch::Receiver<AuthStatus>,
    location: watch::Sender<Location>,
}

impl Router {
    pub fn new(status: watch::Receiver<AuthStatus>, initial: Route) -> Self {
        let decision = decide(*status.borrow(), initial);
        let (location, _) = watch::channel(Location {
            requested: initial,
            decision,
            navigations: 0,
        });
        Self { status, location }
    }

    /// Navigate to `target`, applying the guard.
    pub fn navigate(&self, target: Route) -> Decision {
        let decision = decide(*self.status.borrow(), target);
        debug!(%target, ?decision, "navigate");
        self.location.send_modify(|loc| {
            loc.requested = target;
            loc.decision = decision;
            loc.navigations += 1;
        });
        decision
    }

    /// Re-run the guard for the pending route after the session status
    /// changed (e.g. restore finished). Not counted as a navigation.
    pub fn reevaluate(&self) -> Decision {
        let status = *self.status.borrow();
        let mut decision = Decision::Placeholder;
        self.location.send_if_modified(|loc| {
            decision = decide(status, loc.requested);
            let changed = loc.decision != decision;
            loc.decision = decision;
            changed
        });
        decision
    }

    pub fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    /// Route currently on screen (`None` while the placeholder shows).
    pub fn current(&self) -> Option<Route> {
        self.location.borrow().decision.route()
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}
